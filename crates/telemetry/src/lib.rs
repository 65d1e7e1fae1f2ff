//! Telemetry Evaluation
//!
//! Derives alert-worthy conditions from the fleet registry (overheating,
//! hardware faults) and from electricity price updates.

mod evaluator;
mod pricing;

pub use evaluator::{FaultDiagnosis, FaultType, TelemetryEvaluator};
pub use pricing::PriceWatcher;

use serde::{Deserialize, Serialize};

/// Device telemetry thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Temperature above which a device is overheating (°C)
    pub temperature_threshold_c: f64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            temperature_threshold_c: 80.0,
        }
    }
}

/// Electricity price monitoring settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Price at startup ($/kWh)
    pub initial_price: f64,
    /// Price above which every update raises a critical alert ($/kWh)
    pub cost_threshold: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            initial_price: 0.12,
            cost_threshold: 0.15,
        }
    }
}
