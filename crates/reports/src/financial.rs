//! Financial projection

use crate::{ReportConfig, ReportGenerator};
use fleet_registry::DeviceRegistry;

/// Revenue and cost estimate computed from the fleet at construction time
#[derive(Debug, Clone, PartialEq)]
pub struct FinancialReport {
    total_hashrate: f64,
    electricity_cost: f64,
    revenue: f64,
}

impl FinancialReport {
    /// Snapshot financial figures from the registry
    pub fn new(registry: &DeviceRegistry, config: &ReportConfig) -> Self {
        let devices = registry.all();
        let total_hashrate: f64 = devices.iter().map(|d| d.hash_rate()).sum();
        let electricity_cost = devices.len() as f64 * config.cost_per_machine;
        let revenue = total_hashrate * config.revenue_per_th - electricity_cost;

        Self {
            total_hashrate,
            electricity_cost,
            revenue,
        }
    }

    /// Sum of hashrates in TH/s
    pub fn total_hashrate(&self) -> f64 {
        self.total_hashrate
    }

    /// Electricity cost for the fleet
    pub fn electricity_cost(&self) -> f64 {
        self.electricity_cost
    }

    /// Projected revenue
    pub fn revenue(&self) -> f64 {
        self.revenue
    }
}

impl ReportGenerator for FinancialReport {
    fn generate(&self) -> String {
        format!(
            "Financial Report:\n- Total revenue: ${:.2}\n- Total hashrate: {} TH/s\n- Electricity cost: ${:.2}",
            self.revenue, self.total_hashrate, self.electricity_cost
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_registry::{DeviceStatus, MiningDevice};

    fn registry() -> DeviceRegistry {
        let registry = DeviceRegistry::new();
        registry
            .register(MiningDevice::new("192.168.1.101", "Antminer S19", 85.0, 70.0, DeviceStatus::Active))
            .unwrap();
        registry
            .register(MiningDevice::new("192.168.1.102", "Whatsminer M30S", 90.0, 75.0, DeviceStatus::Active))
            .unwrap();
        registry
    }

    #[test]
    fn test_financial_metrics() {
        let report = FinancialReport::new(&registry(), &ReportConfig::default());
        assert_eq!(report.total_hashrate(), 175.0);
        assert!((report.electricity_cost() - 0.2).abs() < 1e-9);
        assert!((report.revenue() - 8.55).abs() < 1e-9);
    }

    #[test]
    fn test_financial_output() {
        let text = FinancialReport::new(&registry(), &ReportConfig::default()).generate();
        assert!(text.starts_with("Financial Report:"));
        assert!(text.contains("Total revenue: $8.55"));
        assert!(text.contains("Total hashrate: 175 TH/s"));
        assert!(text.contains("Electricity cost: $0.20"));
    }

    #[test]
    fn test_empty_fleet() {
        let report = FinancialReport::new(&DeviceRegistry::new(), &ReportConfig::default());
        assert_eq!(report.total_hashrate(), 0.0);
        assert!(report.generate().contains("Total revenue: $0.00"));
    }
}
