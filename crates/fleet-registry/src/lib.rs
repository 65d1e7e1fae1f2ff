//! Fleet Registry
//!
//! Holds the canonical set of monitored mining devices, keyed by address,
//! together with the per-device telemetry state they carry.

mod device;
mod registry;

pub use device::{DeviceSnapshot, DeviceStatus, MiningDevice, RestartPolicy, TemperatureTransition};
pub use registry::{DeviceRegistry, DEFAULT_FIRMWARE_VERSION};

use thiserror::Error;

/// Registry errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A device with the same address is already registered
    #[error("Machine with address {0} is already in the system")]
    DuplicateAddress(String),

    /// Firmware version string was empty or blank
    #[error("Invalid firmware version: {0:?}")]
    InvalidFirmwareVersion(String),
}
