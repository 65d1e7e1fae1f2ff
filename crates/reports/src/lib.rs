//! Fleet Reports
//!
//! Read-only projections over the device registry. Reports are a closed set
//! of variants chosen through [`ReportKind`].

mod factory;
mod financial;
mod performance;

pub use factory::{MonitoringReport, ReportFactory, ReportKind};
pub use financial::FinancialReport;
pub use performance::PerformanceReport;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Report errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportError {
    /// Requested report type is not one of the known kinds
    #[error("Invalid report type: {0}")]
    InvalidReportType(String),
}

/// Anything that renders a report body
pub trait ReportGenerator {
    fn generate(&self) -> String;
}

/// Cost model used by the financial projection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Electricity cost charged per machine ($)
    pub cost_per_machine: f64,
    /// Revenue earned per TH/s of hashrate ($)
    pub revenue_per_th: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            cost_per_machine: 0.1,
            revenue_per_th: 0.05,
        }
    }
}
