/*!
 * RAM Disk
 * Volatile block device backed by a byte vector
 */

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use super::device::{check_transfer, BlockDevice};
use crate::core::limits::DEFAULT_BLOCK_SIZE;
use crate::core::{FsError, FsResult};

/// In-memory block device
///
/// Used for disk images loaded from the host and throughout the tests.
/// Tracks whether any block was written so callers can persist changes.
#[derive(Debug)]
pub struct RamDisk {
    name: String,
    block_size: usize,
    data: RwLock<Vec<u8>>,
    dirty: AtomicBool,
}

impl RamDisk {
    /// Create a zero-filled disk of `blocks` blocks of the default size
    pub fn new<S: Into<String>>(name: S, blocks: u64) -> Self {
        Self::with_block_size(name, blocks, DEFAULT_BLOCK_SIZE)
    }

    /// Create a zero-filled disk with an explicit block size
    pub fn with_block_size<S: Into<String>>(name: S, blocks: u64, block_size: usize) -> Self {
        Self {
            name: name.into(),
            block_size,
            data: RwLock::new(vec![0u8; blocks as usize * block_size]),
            dirty: AtomicBool::new(false),
        }
    }

    /// Wrap an existing image, padding it up to a whole number of blocks
    pub fn from_image<S: Into<String>>(name: S, mut image: Vec<u8>, block_size: usize) -> FsResult<Self> {
        if block_size == 0 {
            return Err(FsError::InvalidArgument("block size must be nonzero".into()));
        }
        let rem = image.len() % block_size;
        if rem != 0 {
            image.resize(image.len() + block_size - rem, 0);
        }
        Ok(Self {
            name: name.into(),
            block_size,
            data: RwLock::new(image),
            dirty: AtomicBool::new(false),
        })
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> Vec<u8> {
        self.data.read().clone()
    }

    /// Whether any write reached the disk since creation
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }
}

impl BlockDevice for RamDisk {
    fn name(&self) -> &str {
        &self.name
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn block_count(&self) -> u64 {
        (self.data.read().len() / self.block_size) as u64
    }

    fn read_blocks(&self, lba: u64, buf: &mut [u8]) -> FsResult<()> {
        check_transfer(self, lba, buf.len())?;
        let start = lba as usize * self.block_size;
        let data = self.data.read();
        buf.copy_from_slice(&data[start..start + buf.len()]);
        Ok(())
    }

    fn write_blocks(&self, lba: u64, data: &[u8]) -> FsResult<()> {
        check_transfer(self, lba, data.len())?;
        let start = lba as usize * self.block_size;
        let mut disk = self.data.write();
        disk[start..start + data.len()].copy_from_slice(data);
        self.dirty.store(true, Ordering::Release);
        Ok(())
    }
}
