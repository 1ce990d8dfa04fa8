/*!
 * Partition Descriptor
 * Partition geometry and partition-relative block I/O
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use super::device::BlockDevice;
use crate::core::{FsError, FsResult};

/// Partition geometry bound to a device
///
/// Index 0 denotes the whole disk; numbered partitions start at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionDescriptor {
    pub index: u32,
    pub start: u64,
    pub blocks: u64,
    pub block_size: usize,
    pub name: String,
}

impl PartitionDescriptor {
    pub fn new<S: Into<String>>(index: u32, start: u64, blocks: u64, block_size: usize, name: S) -> Self {
        Self {
            index,
            start,
            blocks,
            block_size,
            name: name.into(),
        }
    }

    /// Descriptor spanning an entire device
    pub fn whole_disk(device: &dyn BlockDevice) -> Self {
        Self::new(0, 0, device.block_count(), device.block_size(), device.name())
    }

    /// Zero-sized descriptor used for virtual (deviceless) filesystems
    pub fn virtual_root<S: Into<String>>(name: S) -> Self {
        Self::new(0, 0, 0, 0, name)
    }

    /// Partition size in bytes
    #[inline]
    #[must_use]
    pub fn byte_len(&self) -> u64 {
        self.blocks * self.block_size as u64
    }

    /// Read blocks relative to the partition start
    pub fn read_blocks(&self, device: &dyn BlockDevice, rel_lba: u64, buf: &mut [u8]) -> FsResult<()> {
        let lba = self.absolute(rel_lba, buf.len())?;
        device.read_blocks(lba, buf)
    }

    /// Write blocks relative to the partition start
    pub fn write_blocks(&self, device: &dyn BlockDevice, rel_lba: u64, data: &[u8]) -> FsResult<()> {
        let lba = self.absolute(rel_lba, data.len())?;
        device.write_blocks(lba, data)
    }

    fn absolute(&self, rel_lba: u64, len: usize) -> FsResult<u64> {
        if self.block_size == 0 {
            return Err(FsError::InvalidArgument(format!(
                "partition {} has no block geometry",
                self.name
            )));
        }
        let blocks = len.div_ceil(self.block_size) as u64;
        if rel_lba.saturating_add(blocks) > self.blocks {
            return Err(FsError::OutOfSpace);
        }
        Ok(self.start + rel_lba)
    }
}

impl fmt::Display for PartitionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{} (lba {}+{}, {}B blocks)",
            self.name, self.index, self.start, self.blocks, self.block_size
        )
    }
}
