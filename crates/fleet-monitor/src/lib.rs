//! Mining Fleet Monitor
//!
//! Wires the registry, alerting, telemetry, restart, and report crates into
//! one process-wide fleet view.

mod settings;
mod monitor;

pub use settings::{load_config, ConfigError, FleetConfig, MachineConfig, OperatorConfig, RestartConfig};
pub use monitor::FleetMonitor;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging
pub fn init_logging() -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}
