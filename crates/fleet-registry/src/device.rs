//! Mining Device Model

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Simulated time a device takes to come back after a restart
const DEFAULT_RESTART_DELAY_MS: u64 = 2000;

/// Operational status of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    Active,
    Restarting,
    Operational,
    Failed,
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceStatus::Active => "Active",
            DeviceStatus::Restarting => "Restarting",
            DeviceStatus::Operational => "Operational",
            DeviceStatus::Failed => "Failed",
        };
        f.write_str(s)
    }
}

/// How a device resolves its own restart attempts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RestartPolicy {
    /// Every restart succeeds
    AlwaysSucceed,
    /// Every restart fails
    AlwaysFail,
    /// Succeeds for roughly `success_rate` of attempts (0.0 - 1.0)
    Flaky { success_rate: f64 },
}

impl Default for RestartPolicy {
    fn default() -> Self {
        RestartPolicy::Flaky { success_rate: 0.9 }
    }
}

impl RestartPolicy {
    /// Decide the outcome of one attempt.
    ///
    /// `Flaky` hashes the device address with the attempt number, so a given
    /// device produces the same outcome sequence on every run.
    fn resolve(&self, address: &str, attempt: u64) -> bool {
        match *self {
            RestartPolicy::AlwaysSucceed => true,
            RestartPolicy::AlwaysFail => false,
            RestartPolicy::Flaky { success_rate } => {
                let mut hasher = DefaultHasher::new();
                address.hash(&mut hasher);
                attempt.hash(&mut hasher);
                let roll = (hasher.finish() % 10_000) as f64 / 10_000.0;
                roll < success_rate
            }
        }
    }
}

/// Result of evaluating a device's temperature against a threshold
#[derive(Debug, Clone, PartialEq)]
pub enum TemperatureTransition {
    /// Newly above threshold; carries the alert message appended to the device
    Raised(String),
    /// Still above threshold, alert already raised
    Sustained,
    /// At or below threshold; overheat flag is clear
    Normal,
}

/// Point-in-time copy of a device's telemetry
#[derive(Debug, Clone, Serialize)]
pub struct DeviceSnapshot {
    /// Network address
    pub address: String,
    /// Hardware model
    pub model: String,
    /// Hashrate in TH/s
    pub hash_rate: f64,
    /// Temperature in °C
    pub temperature: f64,
    /// Operational status
    pub status: DeviceStatus,
    /// Overheat flag
    pub overheated: bool,
    /// Alert messages, oldest first
    pub alerts: Vec<String>,
}

#[derive(Debug)]
struct DeviceState {
    temperature: f64,
    status: DeviceStatus,
    overheated: bool,
    alerts: Vec<String>,
    restart_attempts: u64,
}

/// A monitored mining machine
///
/// Identity fields are immutable; telemetry sits behind a mutex so the same
/// device can be shared between the registry and a restart batch.
#[derive(Debug)]
pub struct MiningDevice {
    address: String,
    model: String,
    hash_rate: f64,
    restart_policy: RestartPolicy,
    restart_delay: Duration,
    state: Mutex<DeviceState>,
}

impl MiningDevice {
    /// Create a new device
    ///
    /// # Arguments
    /// * `address` - Network address, unique within a registry
    /// * `model` - Hardware model identifier
    /// * `hash_rate` - Hashrate in TH/s; negative or non-finite values become 0
    /// * `temperature` - Current temperature in °C
    /// * `status` - Initial operational status
    pub fn new(
        address: impl Into<String>,
        model: impl Into<String>,
        hash_rate: f64,
        temperature: f64,
        status: DeviceStatus,
    ) -> Self {
        let hash_rate = if hash_rate.is_finite() && hash_rate > 0.0 {
            hash_rate
        } else {
            0.0
        };

        Self {
            address: address.into(),
            model: model.into(),
            hash_rate,
            restart_policy: RestartPolicy::default(),
            restart_delay: Duration::from_millis(DEFAULT_RESTART_DELAY_MS),
            state: Mutex::new(DeviceState {
                temperature,
                status,
                overheated: false,
                alerts: Vec::new(),
                restart_attempts: 0,
            }),
        }
    }

    /// Replace the restart outcome policy
    pub fn with_restart_policy(mut self, policy: RestartPolicy) -> Self {
        self.restart_policy = policy;
        self
    }

    /// Replace the simulated restart delay
    pub fn with_restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }

    fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Network address, unique within a registry
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Hardware model identifier
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Hashrate in TH/s
    pub fn hash_rate(&self) -> f64 {
        self.hash_rate
    }

    /// Latest temperature reading in °C
    pub fn temperature(&self) -> f64 {
        self.state().temperature
    }

    /// Record a new temperature reading
    pub fn set_temperature(&self, temperature: f64) {
        self.state().temperature = temperature;
    }

    /// Current operational status
    pub fn status(&self) -> DeviceStatus {
        self.state().status
    }

    /// Overwrite the operational status
    pub fn set_status(&self, status: DeviceStatus) {
        self.state().status = status;
    }

    /// Whether the overheat flag is set
    pub fn is_overheated(&self) -> bool {
        self.state().overheated
    }

    /// Alert messages recorded on this device, oldest first
    pub fn alerts(&self) -> Vec<String> {
        self.state().alerts.clone()
    }

    /// Append an alert message
    pub fn add_alert(&self, message: impl Into<String>) {
        self.state().alerts.push(message.into());
    }

    /// Edge-triggered overheat check.
    ///
    /// Above the threshold the first call sets the overheat flag and appends
    /// one alert message; later calls are no-ops until a reading at or below
    /// the threshold clears the flag again.
    pub fn evaluate_temperature(&self, threshold_c: f64) -> TemperatureTransition {
        let mut state = self.state();

        if state.temperature > threshold_c {
            if state.overheated {
                return TemperatureTransition::Sustained;
            }
            state.overheated = true;
            let message = format!(
                "High temperature alert! Machine {} at {} is at {}°C.",
                self.model, self.address, state.temperature
            );
            state.alerts.push(message.clone());
            TemperatureTransition::Raised(message)
        } else {
            state.overheated = false;
            TemperatureTransition::Normal
        }
    }

    /// Human-readable status line
    pub fn monitor_status(&self) -> String {
        let state = self.state();
        let alerts = if state.alerts.is_empty() {
            "No alerts".to_string()
        } else {
            state.alerts.join(", ")
        };
        format!(
            "Machine {} at {} is currently {}. Hashrate: {} TH/s. Temperature: {}°C. Alerts: {}",
            self.model, self.address, state.status, self.hash_rate, state.temperature, alerts
        )
    }

    /// Copy the current telemetry
    pub fn snapshot(&self) -> DeviceSnapshot {
        let state = self.state();
        DeviceSnapshot {
            address: self.address.clone(),
            model: self.model.clone(),
            hash_rate: self.hash_rate,
            temperature: state.temperature,
            status: state.status,
            overheated: state.overheated,
            alerts: state.alerts.clone(),
        }
    }

    /// Restart the device.
    ///
    /// Marks the device `Restarting`, waits out the simulated boot delay and
    /// resolves to `Operational` or `Failed` according to the restart policy.
    /// One attempt, no retry.
    pub async fn restart(&self) -> bool {
        info!("Restarting machine {} at {}", self.model, self.address);

        let attempt = {
            let mut state = self.state();
            state.status = DeviceStatus::Restarting;
            state.restart_attempts += 1;
            state.restart_attempts
        };

        tokio::time::sleep(self.restart_delay).await;

        let success = self.restart_policy.resolve(&self.address, attempt);
        self.state().status = if success {
            DeviceStatus::Operational
        } else {
            DeviceStatus::Failed
        };

        if success {
            debug!("Machine {} restarted (attempt {})", self.address, attempt);
        } else {
            warn!("Machine {} failed to restart (attempt {})", self.address, attempt);
        }
        success
    }
}
