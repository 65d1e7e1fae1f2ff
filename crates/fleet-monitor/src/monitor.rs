//! Fleet monitor wiring

use crate::settings::FleetConfig;
use alerting::{AlertDispatcher, AlertError, Operator, Subscriber};
use batch_restart::RestartOperation;
use fleet_registry::{DeviceRegistry, DeviceStatus, MiningDevice, RestartPolicy};
use reports::{ReportFactory, ReportGenerator, ReportKind};
use std::sync::Arc;
use std::time::Duration;
use telemetry::{FaultDiagnosis, PriceWatcher, TelemetryEvaluator};
use tracing::{info, warn};

/// One fleet view: registry, alert fan-out, and the monitors feeding it
pub struct FleetMonitor {
    config: FleetConfig,
    registry: Arc<DeviceRegistry>,
    dispatcher: Arc<AlertDispatcher>,
    operators: Vec<Arc<Operator>>,
    evaluator: TelemetryEvaluator,
    pricing: PriceWatcher,
}

impl FleetMonitor {
    /// Build the fleet from configuration, registering every configured
    /// machine. Duplicate addresses are logged and skipped.
    pub fn from_config(config: FleetConfig) -> Self {
        let registry = Arc::new(DeviceRegistry::new());
        let dispatcher = Arc::new(AlertDispatcher::new());

        let operators: Vec<Arc<Operator>> = config
            .operators
            .iter()
            .map(|o| Arc::new(Operator::new(o.id.clone(), o.role.clone())))
            .collect();
        let subscribers = Self::as_subscribers(&operators);

        let policy = RestartPolicy::Flaky {
            success_rate: config.restart.success_rate,
        };
        let delay = Duration::from_millis(config.restart.delay_ms);
        for machine in &config.machines {
            let device = MiningDevice::new(
                machine.address.clone(),
                machine.model.clone(),
                machine.hash_rate,
                machine.temperature,
                DeviceStatus::Active,
            )
            .with_restart_policy(policy)
            .with_restart_delay(delay);

            if let Err(e) = registry.register(device) {
                warn!("Skipping configured machine: {}", e);
            }
        }
        info!(
            "Fleet monitor ready: {} machines, {} operators",
            registry.len(),
            operators.len()
        );

        let evaluator =
            TelemetryEvaluator::new(config.telemetry.clone(), dispatcher.clone(), subscribers);
        let pricing = PriceWatcher::new(&config.pricing, dispatcher.clone());

        Self {
            config,
            registry,
            dispatcher,
            operators,
            evaluator,
            pricing,
        }
    }

    fn as_subscribers(operators: &[Arc<Operator>]) -> Vec<Subscriber> {
        operators
            .iter()
            .map(|o| Arc::clone(o) as Subscriber)
            .collect()
    }

    /// Registered devices
    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    /// Shared alert dispatcher
    pub fn dispatcher(&self) -> &Arc<AlertDispatcher> {
        &self.dispatcher
    }

    /// Configured operators, in subscription order
    pub fn operators(&self) -> &[Arc<Operator>] {
        &self.operators
    }

    /// Electricity price watcher
    pub fn pricing(&self) -> &PriceWatcher {
        &self.pricing
    }

    /// Sweep the registry for overheating machines
    pub fn monitor_temperature(&self) -> Result<Vec<Arc<MiningDevice>>, AlertError> {
        self.evaluator.monitor_temperature(&self.registry)
    }

    /// Sweep the registry for failed machines
    pub fn diagnose_faults(&self) -> Result<Option<FaultDiagnosis>, AlertError> {
        self.evaluator.diagnose_faults(&self.registry)
    }

    /// Record an electricity price, alerting every operator when it is too high
    pub fn record_price(&mut self, price: f64) -> Result<bool, AlertError> {
        let subscribers = Self::as_subscribers(&self.operators);
        self.pricing.record_price(price, &subscribers)
    }

    /// Render a report over the current registry
    pub fn report(&self, kind: ReportKind) -> String {
        ReportFactory::generate_report(kind, &self.registry, &self.config.reports).generate()
    }

    /// Prepare a restart batch over `devices`
    pub fn restart_operation(&self, devices: &[Arc<MiningDevice>]) -> RestartOperation {
        let mut operation = RestartOperation::new(Vec::new());
        operation.select_devices(devices);
        operation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{MachineConfig, RestartConfig};

    fn config() -> FleetConfig {
        FleetConfig {
            restart: RestartConfig {
                delay_ms: 50,
                success_rate: 1.0,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_registers_configured_machines() {
        let mut config = config();
        config.machines.push(MachineConfig {
            address: "192.168.1.101".to_string(),
            model: "Duplicate".to_string(),
            hash_rate: 1.0,
            temperature: 1.0,
        });

        let monitor = FleetMonitor::from_config(config);
        assert_eq!(monitor.registry().len(), 2);
        assert_eq!(
            monitor.registry().find("192.168.1.101").unwrap().model(),
            "Antminer S19"
        );
    }

    #[test]
    fn test_alerts_reach_operators() {
        let mut monitor = FleetMonitor::from_config(config());

        let hot = monitor.monitor_temperature().unwrap();
        assert_eq!(hot.len(), 1);
        assert!(monitor.record_price(0.16).unwrap());
        assert!(!monitor.record_price(0.10).unwrap());

        for operator in monitor.operators() {
            let inbox = operator.notifications();
            assert_eq!(inbox.len(), 2);
            assert_eq!(inbox[0].content(), "Alert: Temperature - Level: High");
            assert_eq!(inbox[1].content(), "Alert: Electricity Pricing - Level: Critical");
        }
        assert_eq!(monitor.dispatcher().history().len(), 2);
    }

    #[test]
    fn test_reports_read_registry() {
        let monitor = FleetMonitor::from_config(config());
        assert!(monitor
            .report(ReportKind::Performance)
            .contains("Total machines: 2"));
        assert!(monitor
            .report(ReportKind::Financial)
            .contains("Total hashrate: 175 TH/s"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_overheated_then_diagnose() {
        let monitor = FleetMonitor::from_config(config());
        let hot = monitor.monitor_temperature().unwrap();

        let mut operation = monitor.restart_operation(&hot);
        let summary = operation.execute_restart().await;

        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(hot[0].status(), DeviceStatus::Operational);
        assert_eq!(monitor.diagnose_faults().unwrap(), None);
    }
}
