/*!
 * Boot Filesystem Context
 * Owns the registry, the resolver, the binding slot and the active type
 */

use tracing::{debug, info};

use super::registry::Registry;
use super::session::Session;
use super::types::FsType;
use crate::binder::{self, Binding, PartitionResolver};
use crate::block::{BlockDeviceHandle, PartitionDescriptor};
use crate::core::{FsError, FsResult};

/// Boot filesystem context
///
/// Holds the single binding slot and the active filesystem type. Binding
/// replaces the previous slot; selection updates the active type only on
/// success. Auto-close never touches the active type.
pub struct BootFs {
    registry: Registry,
    resolver: Box<dyn PartitionResolver>,
    binding: Option<Binding>,
    active: FsType,
    probed: bool,
}

impl BootFs {
    /// Create a context with nothing bound
    pub fn new(registry: Registry, resolver: Box<dyn PartitionResolver>) -> Self {
        Self {
            registry,
            resolver,
            binding: None,
            active: FsType::Any,
            probed: false,
        }
    }

    /// Type selected by the most recent successful probe (`Any` before the first)
    #[inline]
    pub fn active_type(&self) -> FsType {
        self.active
    }

    /// Current binding, if any
    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    /// Currently bound partition, if any
    pub fn partition(&self) -> Option<&PartitionDescriptor> {
        self.binding.as_ref().map(|b| &b.partition)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Resolve and bind a partition without probing
    ///
    /// On failure the previous binding stays in place.
    pub fn bind(&mut self, interface: &str, spec: Option<&str>) -> FsResult<()> {
        let binding = binder::bind(self.resolver.as_ref(), interface, spec)?;
        self.install(binding);
        Ok(())
    }

    /// Probe the bound partition
    ///
    /// On failure the active type is left as it was.
    pub fn select(&mut self, requested: FsType) -> FsResult<FsType> {
        let binding = self
            .binding
            .as_ref()
            .ok_or_else(|| FsError::DeviceResolution("no partition bound".into()))?;

        let fs_type = self
            .registry
            .select(binding.device.as_ref(), &binding.partition, requested)?;

        if fs_type != self.active {
            info!(from = %self.active, to = %fs_type, "Active filesystem type changed");
        }
        self.active = fs_type;
        self.probed = true;
        Ok(fs_type)
    }

    /// Bind `spec` on `interface` and probe it, returning the session
    pub fn bind_and_probe(
        &mut self,
        interface: &str,
        spec: Option<&str>,
        requested: FsType,
    ) -> FsResult<Session<'_>> {
        self.bind(interface, spec)?;
        self.select(requested)?;
        self.resume()
    }

    /// Bind an already-resolved device/partition pair and probe it
    pub fn attach(
        &mut self,
        interface: &str,
        device: Option<BlockDeviceHandle>,
        partition: PartitionDescriptor,
        requested: FsType,
    ) -> FsResult<Session<'_>> {
        self.install(Binding {
            interface: interface.to_string(),
            device,
            partition,
        });
        self.select(requested)?;
        self.resume()
    }

    /// Session on the active type for the current binding, without probing again
    ///
    /// Fails until the current binding has been probed successfully.
    pub fn resume(&mut self) -> FsResult<Session<'_>> {
        if !self.probed {
            return Err(FsError::ProbeFailure("bound partition has not been probed".into()));
        }
        let binding = self
            .binding
            .as_ref()
            .ok_or_else(|| FsError::DeviceResolution("no partition bound".into()))?;
        Ok(Session::new(&mut self.registry, binding, self.active))
    }

    /// Bind, probe and check for `path`; any bind or probe failure reads as absent
    pub fn file_exists(&mut self, interface: &str, spec: Option<&str>, path: &str, requested: FsType) -> bool {
        match self.bind_and_probe(interface, spec, requested) {
            Ok(mut session) => session.exists(path),
            Err(e) => {
                debug!(interface, path, error = %e, "file_exists: partition unavailable");
                false
            }
        }
    }

    fn install(&mut self, binding: Binding) {
        if let Some(previous) = &self.binding {
            debug!(previous = %previous.partition, next = %binding.partition, "Replacing binding");
        }
        self.binding = Some(binding);
        self.probed = false;
    }
}

impl std::fmt::Debug for BootFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootFs")
            .field("registry", &self.registry)
            .field("binding", &self.binding)
            .field("active", &self.active)
            .finish()
    }
}
