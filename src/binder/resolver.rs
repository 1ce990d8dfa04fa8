/*!
 * Partition Resolver
 * Maps interface names and device tokens to devices and partitions
 */

use ahash::RandomState;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::spec::{DevicePartSpec, PartSelector};
use crate::block::{BlockDevice, BlockDeviceHandle, PartitionDescriptor};
use crate::core::{FsError, FsResult};

/// Result of resolving a `dev[:part]` token
#[derive(Clone)]
pub struct Resolved {
    /// Absent for virtual filesystems that are not backed by a block device
    pub device: Option<BlockDeviceHandle>,
    pub partition: PartitionDescriptor,
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolved")
            .field("device", &self.device.as_ref().map(|d| d.name().to_string()))
            .field("partition", &self.partition)
            .finish()
    }
}

/// Device/partition resolver trait
///
/// Partition-table parsing and device enumeration live behind this seam.
pub trait PartitionResolver: Send {
    /// Resolve `spec` on `interface`; `None` selects the default device
    fn resolve(&self, interface: &str, spec: Option<&str>, allow_whole_disk: bool) -> FsResult<Resolved>;
}

/// A device attached to an interface with its declared partitions
struct AttachedDevice {
    handle: BlockDeviceHandle,
    partitions: Vec<PartitionDescriptor>,
}

enum Interface {
    Block(HashMap<u32, AttachedDevice, RandomState>),
    Virtual,
}

/// Static device table
///
/// Devices are attached up front with their partition lists; virtual
/// interfaces resolve to an absent device and a zero-sized descriptor.
pub struct DeviceTable {
    interfaces: HashMap<String, Interface, RandomState>,
}

impl DeviceTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            interfaces: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Attach a device at `index` on `interface` with its partitions
    pub fn attach<S: Into<String>>(
        &mut self,
        interface: S,
        index: u32,
        device: BlockDeviceHandle,
        partitions: Vec<PartitionDescriptor>,
    ) -> FsResult<()> {
        let interface = interface.into();
        let entry = self
            .interfaces
            .entry(interface.clone())
            .or_insert_with(|| Interface::Block(HashMap::with_hasher(RandomState::new())));

        let devices = match entry {
            Interface::Block(devices) => devices,
            Interface::Virtual => {
                return Err(FsError::InvalidArgument(format!(
                    "interface {} is virtual",
                    interface
                )))
            }
        };

        if devices.contains_key(&index) {
            return Err(FsError::AlreadyExists(format!("{} {:x}", interface, index)));
        }

        for part in &partitions {
            if part.index == 0 {
                return Err(FsError::InvalidArgument(
                    "partition index 0 is reserved for the whole disk".into(),
                ));
            }
            let end = part.start.checked_add(part.blocks).ok_or_else(|| {
                FsError::InvalidArgument(format!("partition {} geometry overflows", part.index))
            })?;
            if end > device.block_count() {
                return Err(FsError::InvalidArgument(format!(
                    "partition {} extends past the end of {}",
                    part.index,
                    device.name()
                )));
            }
        }

        debug!(interface = %interface, index, partitions = partitions.len(), "Attached block device");
        devices.insert(
            index,
            AttachedDevice {
                handle: device,
                partitions,
            },
        );
        Ok(())
    }

    /// Register a deviceless interface (e.g. `hostfs`)
    pub fn add_virtual<S: Into<String>>(&mut self, interface: S) -> FsResult<()> {
        let interface = interface.into();
        if self.interfaces.contains_key(&interface) {
            return Err(FsError::AlreadyExists(interface));
        }
        self.interfaces.insert(interface, Interface::Virtual);
        Ok(())
    }

    /// Devices attached to a block interface
    pub fn devices(&self, interface: &str) -> Vec<(u32, Arc<dyn BlockDevice>)> {
        match self.interfaces.get(interface) {
            Some(Interface::Block(devices)) => {
                let mut list: Vec<_> = devices
                    .iter()
                    .map(|(idx, dev)| (*idx, dev.handle.clone()))
                    .collect();
                list.sort_by_key(|(idx, _)| *idx);
                list
            }
            _ => Vec::new(),
        }
    }

    fn resolve_virtual(interface: &str, spec: Option<&str>) -> FsResult<Resolved> {
        match spec.map(str::trim) {
            None | Some("") | Some("-") | Some("0") => Ok(Resolved {
                device: None,
                partition: PartitionDescriptor::virtual_root(interface),
            }),
            Some(other) => Err(FsError::DeviceResolution(format!(
                "{} takes no device, got {}",
                interface, other
            ))),
        }
    }
}

impl Default for DeviceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PartitionResolver for DeviceTable {
    fn resolve(&self, interface: &str, spec: Option<&str>, allow_whole_disk: bool) -> FsResult<Resolved> {
        let devices = match self.interfaces.get(interface) {
            Some(Interface::Block(devices)) => devices,
            Some(Interface::Virtual) => return Self::resolve_virtual(interface, spec),
            None => {
                return Err(FsError::DeviceResolution(format!(
                    "unknown interface {}",
                    interface
                )))
            }
        };

        let parsed = DevicePartSpec::parse_opt(spec)?;
        let attached = devices.get(&parsed.device).ok_or_else(|| {
            FsError::DeviceResolution(format!("no device {} {:x}", interface, parsed.device))
        })?;

        let whole_disk = || {
            if allow_whole_disk {
                Ok(PartitionDescriptor::whole_disk(attached.handle.as_ref()))
            } else {
                Err(FsError::DeviceResolution(format!(
                    "whole-disk access to {} {:x} not allowed",
                    interface, parsed.device
                )))
            }
        };

        let partition = match parsed.partition {
            PartSelector::WholeDisk => whole_disk()?,
            PartSelector::Auto => match attached.partitions.first() {
                Some(part) => part.clone(),
                None => whole_disk()?,
            },
            PartSelector::Index(n) => attached
                .partitions
                .iter()
                .find(|p| p.index == n)
                .cloned()
                .ok_or_else(|| {
                    FsError::DeviceResolution(format!(
                        "no partition {} on {} {:x}",
                        n, interface, parsed.device
                    ))
                })?,
        };

        Ok(Resolved {
            device: Some(attached.handle.clone()),
            partition,
        })
    }
}
