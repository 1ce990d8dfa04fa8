/*!
 * Block Device Trait
 * Transport-agnostic block I/O consumed by filesystem drivers
 */

use std::sync::Arc;

use crate::core::{FsError, FsResult};

/// Shared handle to a block device
///
/// Devices are owned by the device table and borrowed by sessions and
/// drivers for as long as a partition stays bound.
pub type BlockDeviceHandle = Arc<dyn BlockDevice>;

/// Block device trait
///
/// All transfers are whole blocks. Buffers passed to `read_blocks` and
/// `write_blocks` must be a multiple of `block_size()`.
pub trait BlockDevice: Send + Sync {
    /// Human-readable device name (for diagnostics)
    fn name(&self) -> &str;

    /// Size of one block in bytes
    fn block_size(&self) -> usize;

    /// Number of addressable blocks
    fn block_count(&self) -> u64;

    /// Read `buf.len() / block_size()` blocks starting at `lba`
    fn read_blocks(&self, lba: u64, buf: &mut [u8]) -> FsResult<()>;

    /// Write `data.len() / block_size()` blocks starting at `lba`
    fn write_blocks(&self, lba: u64, data: &[u8]) -> FsResult<()>;
}

/// Validate a transfer against device geometry, returning the block count
pub(crate) fn check_transfer(
    device: &dyn BlockDevice,
    lba: u64,
    len: usize,
) -> FsResult<u64> {
    let block_size = device.block_size();
    if len % block_size != 0 {
        return Err(FsError::InvalidArgument(format!(
            "transfer of {} bytes is not a multiple of block size {}",
            len, block_size
        )));
    }

    let blocks = (len / block_size) as u64;
    let end = lba.checked_add(blocks).ok_or_else(|| {
        FsError::InvalidArgument(format!("block range overflows at lba {}", lba))
    })?;
    if end > device.block_count() {
        return Err(FsError::InvalidArgument(format!(
            "blocks {}..{} beyond end of {} ({} blocks)",
            lba,
            end,
            device.name(),
            device.block_count()
        )));
    }
    Ok(blocks)
}
