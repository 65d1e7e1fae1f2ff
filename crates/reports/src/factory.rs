//! Report selection

use crate::{FinancialReport, PerformanceReport, ReportConfig, ReportError, ReportGenerator};
use fleet_registry::DeviceRegistry;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Known report kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Financial,
    Performance,
}

impl FromStr for ReportKind {
    type Err = ReportError;

    /// Case-insensitive; unknown names are an error, never a default
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "financial" => Ok(ReportKind::Financial),
            "performance" => Ok(ReportKind::Performance),
            _ => Err(ReportError::InvalidReportType(s.to_string())),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Financial => f.write_str("financial"),
            ReportKind::Performance => f.write_str("performance"),
        }
    }
}

/// A generated report of any kind
#[derive(Debug, Clone, PartialEq)]
pub enum MonitoringReport {
    Financial(FinancialReport),
    Performance(PerformanceReport),
}

impl MonitoringReport {
    /// Kind of this report
    pub fn kind(&self) -> ReportKind {
        match self {
            MonitoringReport::Financial(_) => ReportKind::Financial,
            MonitoringReport::Performance(_) => ReportKind::Performance,
        }
    }
}

impl ReportGenerator for MonitoringReport {
    fn generate(&self) -> String {
        match self {
            MonitoringReport::Financial(report) => report.generate(),
            MonitoringReport::Performance(report) => report.generate(),
        }
    }
}

/// Builds reports from the registry
pub struct ReportFactory;

impl ReportFactory {
    /// Display name of the factory
    pub const FACTORY_NAME: &'static str = "Mining Report Factory";

    /// Build a report of `kind` from the current registry contents
    pub fn generate_report(
        kind: ReportKind,
        registry: &DeviceRegistry,
        config: &ReportConfig,
    ) -> MonitoringReport {
        debug!("Generating {} report over {} machines", kind, registry.len());
        match kind {
            ReportKind::Financial => {
                MonitoringReport::Financial(FinancialReport::new(registry, config))
            }
            ReportKind::Performance => {
                MonitoringReport::Performance(PerformanceReport::new(registry))
            }
        }
    }

    /// Build a report from a kind name such as `"financial"`
    pub fn generate_report_named(
        name: &str,
        registry: &DeviceRegistry,
        config: &ReportConfig,
    ) -> Result<MonitoringReport, ReportError> {
        let kind = name.parse::<ReportKind>()?;
        Ok(Self::generate_report(kind, registry, config))
    }
}
