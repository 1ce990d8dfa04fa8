/*!
 * Simulated System Memory
 * Flat byte array standing in for physical RAM at a fixed base address
 */

use parking_lot::{Mutex, MutexGuard};

use super::traits::{BufferMapper, MappedBuffer};
use crate::core::limits::{DEFAULT_MEMORY_BASE, DEFAULT_MEMORY_SIZE};
use crate::core::{FsError, FsResult};

/// System memory
///
/// One mapping is live at a time; mapping again blocks until the previous
/// buffer is dropped.
#[derive(Debug)]
pub struct SysMem {
    base: u64,
    bytes: Mutex<Vec<u8>>,
}

impl SysMem {
    pub fn new(base: u64, size: u64) -> Self {
        Self {
            base,
            bytes: Mutex::new(vec![0u8; size as usize]),
        }
    }

    #[inline]
    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn size(&self) -> u64 {
        self.bytes.lock().len() as u64
    }

    /// One past the last addressable byte
    pub fn end(&self) -> u64 {
        self.base + self.size()
    }

    fn range(&self, addr: u64, len: u64, size: u64) -> FsResult<(usize, usize)> {
        let end = self.base + size;
        if addr < self.base || addr > end {
            return Err(FsError::InvalidArgument(format!(
                "address {:#x} outside memory {:#x}..{:#x}",
                addr, self.base, end
            )));
        }

        let start = addr - self.base;
        let available = size - start;
        let len = if len == 0 { available } else { len };
        if len > available {
            return Err(FsError::BufferTooSmall {
                needed: len,
                available,
            });
        }
        Ok((start as usize, (start + len) as usize))
    }
}

impl Default for SysMem {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_BASE, DEFAULT_MEMORY_SIZE)
    }
}

impl BufferMapper for SysMem {
    fn map(&self, addr: u64, len: u64) -> FsResult<MappedBuffer<'_>> {
        let guard = self.bytes.lock();
        let (start, end) = self.range(addr, len, guard.len() as u64)?;
        let region = MutexGuard::map(guard, |bytes| &mut bytes[start..end]);
        Ok(MappedBuffer::new(addr, Box::new(region)))
    }
}
