//! Device Registry Implementation

use crate::device::{DeviceStatus, MiningDevice};
use crate::RegistryError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Firmware version a fresh registry reports
pub const DEFAULT_FIRMWARE_VERSION: &str = "v1.0.0";

/// In-memory registry of monitored devices
///
/// Constructed once per process and passed to whatever needs the fleet view.
pub struct DeviceRegistry {
    /// Registered devices, in insertion order
    devices: Mutex<Vec<Arc<MiningDevice>>>,
    /// Fleet-wide firmware version
    firmware_version: Mutex<String>,
}

impl DeviceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        info!("Creating device registry");
        Self {
            devices: Mutex::new(Vec::new()),
            firmware_version: Mutex::new(DEFAULT_FIRMWARE_VERSION.to_string()),
        }
    }

    fn devices(&self) -> MutexGuard<'_, Vec<Arc<MiningDevice>>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a device to monitoring
    ///
    /// A device whose address is already present is rejected and the registry
    /// is left unchanged.
    pub fn register(&self, device: impl Into<Arc<MiningDevice>>) -> Result<(), RegistryError> {
        let device = device.into();
        let mut devices = self.devices();

        if devices.iter().any(|d| d.address() == device.address()) {
            warn!("Machine with address {} is already in the system", device.address());
            return Err(RegistryError::DuplicateAddress(device.address().to_string()));
        }

        debug!("Registered machine {} ({})", device.address(), device.model());
        devices.push(device);
        Ok(())
    }

    /// Handles to every registered device
    pub fn all(&self) -> Vec<Arc<MiningDevice>> {
        self.devices().clone()
    }

    /// Look up a device by address
    pub fn find(&self, address: &str) -> Option<Arc<MiningDevice>> {
        self.devices().iter().find(|d| d.address() == address).cloned()
    }

    /// Number of registered devices
    pub fn len(&self) -> usize {
        self.devices().len()
    }

    /// Whether no devices are registered
    pub fn is_empty(&self) -> bool {
        self.devices().is_empty()
    }

    /// Devices whose temperature is strictly above `threshold_c`
    pub fn overheated(&self, threshold_c: f64) -> Vec<Arc<MiningDevice>> {
        self.devices()
            .iter()
            .filter(|d| d.temperature() > threshold_c)
            .cloned()
            .collect()
    }

    /// Devices currently in `Failed` status
    pub fn failed(&self) -> Vec<Arc<MiningDevice>> {
        self.devices()
            .iter()
            .filter(|d| d.status() == DeviceStatus::Failed)
            .cloned()
            .collect()
    }

    /// Remove every device
    pub fn reset(&self) {
        let mut devices = self.devices();
        info!("Clearing {} machines from registry", devices.len());
        devices.clear();
    }

    /// Current fleet firmware version
    pub fn firmware_version(&self) -> String {
        self.firmware_version
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Record a fleet firmware update
    ///
    /// Returns `Ok(false)` when the fleet is already on `version`.
    pub fn update_firmware(&self, version: &str) -> Result<bool, RegistryError> {
        let version = version.trim();
        if version.is_empty() {
            warn!("Invalid firmware version provided");
            return Err(RegistryError::InvalidFirmwareVersion(version.to_string()));
        }

        let mut current = self.firmware_version.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == version {
            info!("Firmware is already up-to-date (version: {})", version);
            return Ok(false);
        }

        info!("Updating firmware from {} to {}", current, version);
        *current = version.to_string();
        Ok(true)
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
