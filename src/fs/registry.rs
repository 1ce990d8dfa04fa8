/*!
 * Filesystem Registry
 * Ordered driver list, probe-based selection and total type lookup
 */

use tracing::{debug, info, trace, warn};

use super::traits::FsDriver;
use super::types::FsType;
use super::unsupported::Unsupported;
use crate::block::{BlockDeviceHandle, PartitionDescriptor};
use crate::core::{FsError, FsResult};

/// Driver registry
///
/// Registration order is the probe order and the only tie-break between
/// drivers that recognize the same partition. The sentinel sits outside
/// the list: it is reachable through `resolve` but never probed.
pub struct Registry {
    drivers: Vec<Box<dyn FsDriver>>,
    sentinel: Unsupported,
}

impl Registry {
    /// Create a registry holding only the sentinel
    pub fn new() -> Self {
        Self {
            drivers: Vec::new(),
            sentinel: Unsupported,
        }
    }

    /// Append a driver to the probe order
    pub fn register(&mut self, driver: Box<dyn FsDriver>) -> FsResult<()> {
        let fs_type = driver.fs_type();
        if fs_type.is_any() {
            return Err(FsError::InvalidArgument(format!(
                "driver {} cannot register under the wildcard type",
                driver.name()
            )));
        }
        if self.drivers.iter().any(|d| d.fs_type() == fs_type) {
            return Err(FsError::AlreadyExists(format!("driver for {}", fs_type)));
        }

        debug!(fs_type = %fs_type, name = driver.name(), position = self.drivers.len(), "Registered filesystem driver");
        self.drivers.push(driver);
        Ok(())
    }

    /// Builder-style registration
    pub fn with_driver(mut self, driver: Box<dyn FsDriver>) -> FsResult<Self> {
        self.register(driver)?;
        Ok(self)
    }

    /// Registered types in probe order
    pub fn types(&self) -> Vec<FsType> {
        self.drivers.iter().map(|d| d.fs_type()).collect()
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Driver for `fs_type`, or the sentinel when none is registered
    pub fn resolve(&self, fs_type: FsType) -> &dyn FsDriver {
        match self.drivers.iter().find(|d| d.fs_type() == fs_type) {
            Some(driver) => &**driver,
            None => &self.sentinel,
        }
    }

    /// Mutable variant of [`Registry::resolve`]
    pub fn resolve_mut(&mut self, fs_type: FsType) -> &mut dyn FsDriver {
        match self.drivers.iter().position(|d| d.fs_type() == fs_type) {
            Some(idx) => &mut *self.drivers[idx],
            None => &mut self.sentinel,
        }
    }

    /// Probe drivers in order and return the type of the first that recognizes the partition
    ///
    /// A driver is skipped when the request names a different concrete type,
    /// or when there is no device and the driver needs one.
    pub fn select(
        &mut self,
        device: Option<&BlockDeviceHandle>,
        partition: &PartitionDescriptor,
        requested: FsType,
    ) -> FsResult<FsType> {
        for driver in self.drivers.iter_mut() {
            let fs_type = driver.fs_type();

            if !requested.admits(fs_type) {
                trace!(driver = %fs_type, requested = %requested, "Skipping driver of other type");
                continue;
            }
            if device.is_none() && !driver.allows_null_device() {
                trace!(driver = %fs_type, "Skipping driver that needs a block device");
                continue;
            }

            match driver.probe(device, partition) {
                Ok(()) => {
                    info!(fs_type = %fs_type, partition = %partition, "Filesystem recognized");
                    return Ok(fs_type);
                }
                Err(e) => {
                    debug!(driver = %fs_type, error = %e, "Probe rejected partition");
                }
            }
        }

        warn!(partition = %partition, requested = %requested, "Unrecognized filesystem type");
        Err(FsError::ProbeFailure(format!(
            "{} (requested {})",
            partition, requested
        )))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("drivers", &self.types()).finish()
    }
}
