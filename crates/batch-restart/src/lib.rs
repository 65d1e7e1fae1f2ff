//! Batch Restart Coordination
//!
//! Fans a restart out across a selected set of devices, waits for every
//! attempt to resolve, and tallies the outcomes.

mod operation;

pub use operation::{RestartOperation, RestartSummary};

use async_trait::async_trait;
use fleet_registry::MiningDevice;
use thiserror::Error;

/// Errors a restart target can report for a single attempt
#[derive(Debug, Clone, Error)]
pub enum RestartError {
    /// Target could not be reached
    #[error("Device {0} is unreachable")]
    Unreachable(String),

    /// Target reported a fault while restarting
    #[error("Restart of {device} failed: {reason}")]
    Fault { device: String, reason: String },
}

/// Something the coordinator can restart
///
/// Each call is one best-effort attempt; retries and latency bounds are the
/// target's own concern.
#[async_trait]
pub trait RestartTarget: Send + Sync {
    /// Name used in logs
    fn label(&self) -> String;

    /// Restart and report whether the target came back
    async fn restart(&self) -> Result<bool, RestartError>;
}

#[async_trait]
impl RestartTarget for MiningDevice {
    fn label(&self) -> String {
        format!("{} at {}", self.model(), self.address())
    }

    async fn restart(&self) -> Result<bool, RestartError> {
        Ok(MiningDevice::restart(self).await)
    }
}
