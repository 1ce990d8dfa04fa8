/*!
 * Partition Binder
 * Resolves interface/device/partition tokens into a bound partition
 */

pub mod resolver;
pub mod spec;

pub use resolver::{DeviceTable, PartitionResolver, Resolved};
pub use spec::{DevicePartSpec, PartSelector};

use tracing::{debug, warn};

use crate::block::{BlockDeviceHandle, PartitionDescriptor};
use crate::core::FsResult;

/// A bound device/partition pair
///
/// Only one binding is live at a time; binding again replaces it.
#[derive(Clone)]
pub struct Binding {
    pub interface: String,
    pub device: Option<BlockDeviceHandle>,
    pub partition: PartitionDescriptor,
}

impl Binding {
    /// Whether the binding has no backing block device
    #[inline]
    pub fn is_virtual(&self) -> bool {
        self.device.is_none()
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("interface", &self.interface)
            .field("device", &self.device.as_ref().map(|d| d.name().to_string()))
            .field("partition", &self.partition)
            .finish()
    }
}

/// Resolve `interface` + `spec` through `resolver`
///
/// Whole-disk binding is always permitted here, matching loaders that
/// accept unpartitioned media.
pub fn bind(resolver: &dyn PartitionResolver, interface: &str, spec: Option<&str>) -> FsResult<Binding> {
    match resolver.resolve(interface, spec, true) {
        Ok(resolved) => {
            debug!(
                interface,
                spec = spec.unwrap_or(""),
                partition = %resolved.partition,
                virtual_device = resolved.device.is_none(),
                "Bound partition"
            );
            Ok(Binding {
                interface: interface.to_string(),
                device: resolved.device,
                partition: resolved.partition,
            })
        }
        Err(e) => {
            warn!(interface, spec = spec.unwrap_or(""), error = %e, "Device resolution failed");
            Err(e)
        }
    }
}
