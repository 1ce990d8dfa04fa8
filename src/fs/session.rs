/*!
 * Session Dispatcher
 * Routes file operations to the active driver and applies auto-close
 */

use tracing::{debug, instrument, warn};

use super::registry::Registry;
use super::traits::FsDriver;
use super::types::{DirEntry, FsType, Identifier, Transfer};
use crate::binder::Binding;
use crate::block::PartitionDescriptor;
use crate::core::{FsError, FsResult};

/// A bound and probed partition
///
/// Borrows the owning [`BootFs`](super::BootFs) mutably, so only one session
/// can be live at a time. `size`, `read_file` and `write_file` close the
/// driver before returning; the active type is kept for the next probe.
pub struct Session<'a> {
    registry: &'a mut Registry,
    binding: &'a Binding,
    fs_type: FsType,
}

impl<'a> Session<'a> {
    pub(crate) fn new(registry: &'a mut Registry, binding: &'a Binding, fs_type: FsType) -> Self {
        Self {
            registry,
            binding,
            fs_type,
        }
    }

    /// Type the session routes to
    #[inline]
    pub fn fs_type(&self) -> FsType {
        self.fs_type
    }

    /// Name of the driver the session routes to
    pub fn driver_name(&self) -> &str {
        self.registry.resolve(self.fs_type).name()
    }

    pub fn binding(&self) -> &Binding {
        self.binding
    }

    pub fn partition(&self) -> &PartitionDescriptor {
        &self.binding.partition
    }

    /// Active driver, resolved on every call (sentinel when unknown)
    pub(crate) fn driver(&mut self) -> &mut dyn FsDriver {
        self.registry.resolve_mut(self.fs_type)
    }

    /// List a directory; leaves the driver mounted
    #[instrument(level = "debug", skip(self), fields(fs = %self.fs_type))]
    pub fn list(&mut self, dir: &str) -> FsResult<Vec<DirEntry>> {
        self.driver().list(dir)
    }

    /// Check for a file or directory; leaves the driver mounted
    #[instrument(level = "debug", skip(self), fields(fs = %self.fs_type))]
    pub fn exists(&mut self, path: &str) -> bool {
        self.driver().exists(path)
    }

    /// File size; always closes the driver
    #[instrument(level = "debug", skip(self), fields(fs = %self.fs_type))]
    pub fn size(&mut self, path: &str) -> FsResult<u64> {
        let result = self.driver().size(path);
        self.auto_close();
        result
    }

    /// Read `len` bytes at `offset` into `buf`; always closes the driver
    ///
    /// `len == 0` reads to end of file and fails with `BufferTooSmall` when
    /// the rest of the file does not fit in `buf`. A successful read that
    /// moves a different amount than a nonzero `len` is logged as a short
    /// transfer and still returned as success.
    #[instrument(level = "debug", skip(self, buf), fields(fs = %self.fs_type, buf_len = buf.len()))]
    pub fn read_file(&mut self, path: &str, buf: &mut [u8], offset: u64, len: u64) -> FsResult<Transfer> {
        let result = if len > buf.len() as u64 {
            Err(FsError::BufferTooSmall {
                needed: len,
                available: buf.len() as u64,
            })
        } else if len == 0 {
            self.read_to_end(path, buf, offset)
        } else {
            self.driver().read(path, buf, offset, len)
        };
        self.auto_close();

        let transfer = Transfer::new(len, result?);
        if transfer.is_short() {
            warn!(
                path,
                offset,
                requested = transfer.requested,
                actual = transfer.actual,
                "** {} shorter than offset + len **",
                path
            );
        }
        Ok(transfer)
    }

    /// Write `data` at `offset`; always closes the driver
    ///
    /// A failure that left a different byte count than requested is
    /// reported as [`FsError::WriteFailed`].
    #[instrument(level = "debug", skip(self, data), fields(fs = %self.fs_type, len = data.len()))]
    pub fn write_file(&mut self, path: &str, data: &[u8], offset: u64) -> FsResult<Transfer> {
        let requested = data.len() as u64;
        let result = self.driver().write(path, data, offset);
        self.auto_close();

        match result {
            Ok(actual) => {
                let transfer = Transfer::new(requested, actual);
                if transfer.is_short() {
                    warn!(path, requested, actual, "Driver wrote fewer bytes than requested");
                }
                Ok(transfer)
            }
            Err(e) if e.bytes_transferred() != requested => {
                warn!(path, error = %e, "** Unable to write file {} **", path);
                Err(FsError::WriteFailed(path.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Zero `id` and let the driver fill it; leaves the driver mounted
    pub fn identifier_into(&mut self, id: &mut Identifier) -> FsResult<()> {
        *id = Identifier::zeroed();
        self.driver().identifier(id)
    }

    /// Filesystem identifier (UUID for block filesystems)
    pub fn identifier(&mut self) -> FsResult<Identifier> {
        let mut id = Identifier::zeroed();
        self.identifier_into(&mut id)?;
        Ok(id)
    }

    /// Forward to the driver's own close; the active type is kept
    pub fn close(&mut self) {
        self.auto_close();
    }

    fn read_to_end(&mut self, path: &str, buf: &mut [u8], offset: u64) -> FsResult<u64> {
        let remaining = self.driver().size(path)?.saturating_sub(offset);
        if remaining > buf.len() as u64 {
            warn!(path, offset, remaining, available = buf.len(), "File does not fit in the load buffer");
            return Err(FsError::BufferTooSmall {
                needed: remaining,
                available: buf.len() as u64,
            });
        }
        self.driver().read(path, buf, offset, 0)
    }

    fn auto_close(&mut self) {
        debug!(fs = %self.fs_type, "Closing filesystem driver");
        self.driver().close();
    }
}

impl std::fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("fs_type", &self.fs_type)
            .field("binding", self.binding)
            .finish()
    }
}
