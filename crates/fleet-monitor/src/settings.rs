//! Fleet settings

use reports::ReportConfig;
use serde::{Deserialize, Serialize};
use telemetry::{PricingConfig, TelemetryConfig};
use thiserror::Error;
use tracing::info;

/// Environment variable prefix, e.g. `FLEET__TELEMETRY__TEMPERATURE_THRESHOLD_C`
const ENV_PREFIX: &str = "FLEET";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Operator subscribed to fleet alerts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// Recipient id
    pub id: String,
    /// Free-form role, e.g. "admin"
    pub role: String,
}

/// Machine registered at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Network address, unique within the fleet
    pub address: String,
    /// Hardware model identifier
    pub model: String,
    /// Hashrate (TH/s)
    pub hash_rate: f64,
    /// Last known temperature (°C)
    pub temperature: f64,
}

/// Simulated restart behaviour applied to configured machines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestartConfig {
    /// Simulated boot time (milliseconds)
    pub delay_ms: u64,
    /// Fraction of restart attempts that succeed
    pub success_rate: f64,
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            delay_ms: 2000,
            success_rate: 0.9,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Temperature thresholds
    pub telemetry: TelemetryConfig,
    /// Electricity pricing
    pub pricing: PricingConfig,
    /// Report coefficients
    pub reports: ReportConfig,
    /// Simulated restart behavior
    pub restart: RestartConfig,
    /// Operators subscribed to alerts
    pub operators: Vec<OperatorConfig>,
    /// Machines registered at startup
    pub machines: Vec<MachineConfig>,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            telemetry: TelemetryConfig::default(),
            pricing: PricingConfig::default(),
            reports: ReportConfig::default(),
            restart: RestartConfig::default(),
            operators: vec![
                OperatorConfig {
                    id: "user1".to_string(),
                    role: "admin".to_string(),
                },
                OperatorConfig {
                    id: "user2".to_string(),
                    role: "engineer".to_string(),
                },
            ],
            machines: vec![
                MachineConfig {
                    address: "192.168.1.101".to_string(),
                    model: "Antminer S19".to_string(),
                    hash_rate: 85.0,
                    temperature: 90.0,
                },
                MachineConfig {
                    address: "192.168.1.102".to_string(),
                    model: "Whatsminer M30S".to_string(),
                    hash_rate: 90.0,
                    temperature: 80.0,
                },
            ],
        }
    }
}

/// Load configuration from an optional file plus `FLEET__*` environment
/// variables. Missing keys fall back to defaults.
pub fn load_config(path: Option<&str>) -> Result<FleetConfig, ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        info!("Loading configuration from {}", path);
        builder = builder.add_source(config::File::with_name(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_sources() {
        let config = load_config(None).unwrap();
        assert_eq!(config.telemetry.temperature_threshold_c, 80.0);
        assert_eq!(config.pricing.cost_threshold, 0.15);
        assert_eq!(config.machines.len(), 2);
        assert_eq!(config.operators.len(), 2);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("fleet-monitor-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[telemetry]\ntemperature_threshold_c = 85.0\n\n[pricing]\ncost_threshold = 0.2\n",
        )
        .unwrap();

        let config = load_config(path.to_str()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.telemetry.temperature_threshold_c, 85.0);
        assert_eq!(config.pricing.cost_threshold, 0.2);
        assert_eq!(config.pricing.initial_price, 0.12);
        assert_eq!(config.restart.delay_ms, 2000);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_config(Some("/nonexistent/fleet-monitor.toml")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load configuration"));
    }
}
