//! Performance projection

use crate::ReportGenerator;
use fleet_registry::DeviceRegistry;

/// Average hashrate across the fleet
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    average_hashrate: Option<f64>,
    machine_count: usize,
}

impl PerformanceReport {
    /// Snapshot performance figures from the registry
    pub fn new(registry: &DeviceRegistry) -> Self {
        let devices = registry.all();
        let machine_count = devices.len();
        let average_hashrate = (machine_count > 0).then(|| {
            devices.iter().map(|d| d.hash_rate()).sum::<f64>() / machine_count as f64
        });

        Self {
            average_hashrate,
            machine_count,
        }
    }

    /// Mean hashrate, 0 for an empty fleet
    pub fn average_hashrate(&self) -> f64 {
        self.average_hashrate.unwrap_or(0.0)
    }

    /// Number of machines counted
    pub fn machine_count(&self) -> usize {
        self.machine_count
    }
}

impl ReportGenerator for PerformanceReport {
    fn generate(&self) -> String {
        let average = match self.average_hashrate {
            Some(avg) => format!("{:.2}", avg),
            None => "0".to_string(),
        };
        format!(
            "Performance Report:\n- Average hashrate: {} TH/s\n- Total machines: {}",
            average, self.machine_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_registry::{DeviceStatus, MiningDevice};
    use proptest::prelude::*;

    #[test]
    fn test_average_hashrate() {
        let registry = DeviceRegistry::new();
        registry
            .register(MiningDevice::new("10.0.0.1", "S19", 85.0, 70.0, DeviceStatus::Active))
            .unwrap();
        registry
            .register(MiningDevice::new("10.0.0.2", "M30S", 90.0, 70.0, DeviceStatus::Active))
            .unwrap();

        let report = PerformanceReport::new(&registry);
        assert_eq!(report.average_hashrate(), 87.5);
        let text = report.generate();
        assert!(text.contains("Average hashrate: 87.50 TH/s"));
        assert!(text.contains("Total machines: 2"));
    }

    #[test]
    fn test_empty_fleet() {
        let text = PerformanceReport::new(&DeviceRegistry::new()).generate();
        assert!(text.contains("Average hashrate: 0 TH/s"));
        assert!(text.contains("Total machines: 0"));
    }

    proptest! {
        #[test]
        fn prop_average_is_within_bounds(rates in prop::collection::vec(0.0f64..500.0, 1..20)) {
            let registry = DeviceRegistry::new();
            for (i, rate) in rates.iter().enumerate() {
                registry
                    .register(MiningDevice::new(format!("10.2.0.{}", i), "S19", *rate, 60.0, DeviceStatus::Active))
                    .unwrap();
            }
            let report = PerformanceReport::new(&registry);
            let min = rates.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = rates.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(report.average_hashrate() >= min - 1e-9);
            prop_assert!(report.average_hashrate() <= max + 1e-9);
            prop_assert_eq!(report.machine_count(), rates.len());
        }
    }
}
