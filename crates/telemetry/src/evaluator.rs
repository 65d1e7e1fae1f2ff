//! Device Telemetry Evaluator

use crate::TelemetryConfig;
use alerting::{AlertDispatcher, AlertError, AlertLevel, Subscriber};
use fleet_registry::{DeviceRegistry, MiningDevice, TemperatureTransition};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Category of a diagnosed fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultType {
    HardwareFailure,
}

impl fmt::Display for FaultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultType::HardwareFailure => f.write_str("Hardware Failure"),
        }
    }
}

/// Outcome of a fault sweep that found failed devices
#[derive(Debug, Clone, PartialEq)]
pub struct FaultDiagnosis {
    /// Diagnosed fault category
    pub fault_type: FaultType,
    /// Addresses of the failed devices
    pub affected: Vec<String>,
}

/// Turns registry telemetry into alerts
pub struct TelemetryEvaluator {
    config: TelemetryConfig,
    dispatcher: Arc<AlertDispatcher>,
    subscribers: Vec<Subscriber>,
}

impl TelemetryEvaluator {
    /// Create an evaluator delivering to `subscribers` through `dispatcher`
    pub fn new(
        config: TelemetryConfig,
        dispatcher: Arc<AlertDispatcher>,
        subscribers: Vec<Subscriber>,
    ) -> Self {
        Self {
            config,
            dispatcher,
            subscribers,
        }
    }

    /// Active thresholds
    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Check one device against `threshold_c`.
    ///
    /// Returns `true` when this call raised a new overheat alert. A device
    /// that stays hot raises nothing further until it has cooled to the
    /// threshold or below.
    pub fn check_temperature(
        &self,
        device: &MiningDevice,
        threshold_c: f64,
    ) -> Result<bool, AlertError> {
        match device.evaluate_temperature(threshold_c) {
            TemperatureTransition::Raised(message) => {
                warn!("{}", message);
                self.dispatcher.raise(
                    "Temperature",
                    AlertLevel::High,
                    device.address(),
                    &self.subscribers,
                )?;
                Ok(true)
            }
            TemperatureTransition::Sustained => {
                debug!("Machine {} still above {}°C", device.address(), threshold_c);
                Ok(false)
            }
            TemperatureTransition::Normal => Ok(false),
        }
    }

    /// Check every registered device at the configured threshold and return
    /// the overheated subset.
    ///
    /// A delivery error on one device does not stop the sweep; every device
    /// is evaluated and the first error is returned afterwards.
    pub fn monitor_temperature(
        &self,
        registry: &DeviceRegistry,
    ) -> Result<Vec<Arc<MiningDevice>>, AlertError> {
        let threshold = self.config.temperature_threshold_c;

        let mut first_error = None;
        for device in registry.all() {
            if let Err(e) = self.check_temperature(&device, threshold) {
                warn!("Alert delivery failed for {}: {}", device.address(), e);
                first_error.get_or_insert(e);
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        let overheated = registry.overheated(threshold);
        if !overheated.is_empty() {
            warn!("Warning: {} machines are overheating!", overheated.len());
        }
        Ok(overheated)
    }

    /// Look for devices in `Failed` status and raise a fault alert if any
    pub fn diagnose_faults(
        &self,
        registry: &DeviceRegistry,
    ) -> Result<Option<FaultDiagnosis>, AlertError> {
        let failed = registry.failed();
        if failed.is_empty() {
            debug!("No faulty machines detected");
            return Ok(None);
        }

        let diagnosis = FaultDiagnosis {
            fault_type: FaultType::HardwareFailure,
            affected: failed.iter().map(|d| d.address().to_string()).collect(),
        };
        info!(
            "Detected {} machines with faults. Fault Type: {}",
            diagnosis.affected.len(),
            diagnosis.fault_type
        );

        self.dispatcher
            .raise("Hardware Fault", AlertLevel::High, "MonitoringSystem", &self.subscribers)?;
        Ok(Some(diagnosis))
    }
}
