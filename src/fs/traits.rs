/*!
 * Driver Traits
 * Capability set every filesystem driver implements
 */

use crate::block::{BlockDeviceHandle, PartitionDescriptor};
use crate::core::FsResult;

use super::types::{DirEntry, FsType, Identifier};

/// Filesystem driver trait
///
/// A driver recognizes a partition in `probe`, keeps whatever mount state
/// it needs, and releases that state in `close`. Operations issued after
/// `close` and before the next successful probe fail with `NotMounted`.
pub trait FsDriver: Send {
    /// Type tag used for lookup and probe filtering
    fn fs_type(&self) -> FsType;

    /// Driver name (for diagnostics and `fstype`)
    fn name(&self) -> &str;

    /// Whether `probe` may be called without a block device
    ///
    /// False for drivers reading on-disk structures; true for virtual
    /// filesystems that are not backed by a block device.
    fn allows_null_device(&self) -> bool {
        false
    }

    /// Inspect the partition and mount it if recognized
    fn probe(&mut self, device: Option<&BlockDeviceHandle>, partition: &PartitionDescriptor) -> FsResult<()>;

    /// List directory contents
    fn list(&mut self, dir: &str) -> FsResult<Vec<DirEntry>>;

    /// Check if a file or directory exists
    fn exists(&mut self, path: &str) -> bool;

    /// File size in bytes
    fn size(&mut self, path: &str) -> FsResult<u64>;

    /// Read `len` bytes at `offset` into `buf`, returning the bytes read
    ///
    /// `len == 0` reads to end of file. `buf` is at least `len` bytes long.
    fn read(&mut self, path: &str, buf: &mut [u8], offset: u64, len: u64) -> FsResult<u64>;

    /// Write `data` at `offset`, returning the bytes written
    ///
    /// A partial write is reported as `FsError::ShortWrite`.
    fn write(&mut self, path: &str, data: &[u8], offset: u64) -> FsResult<u64>;

    /// Release mount state; harmless when already closed
    fn close(&mut self);

    /// Fill `id` with the filesystem identifier (at most 36 characters)
    fn identifier(&mut self, id: &mut Identifier) -> FsResult<()>;
}
