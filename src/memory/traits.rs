/*!
 * Memory Traits
 * Address-to-buffer mapping consumed by the command layer
 */

use std::ops::{Deref, DerefMut};
use tracing::trace;

use crate::core::FsResult;

/// Translates a load address into a byte region
///
/// `len == 0` maps from `addr` to the end of addressable memory. The region
/// stays mapped until the returned buffer is dropped.
pub trait BufferMapper: Send + Sync {
    fn map(&self, addr: u64, len: u64) -> FsResult<MappedBuffer<'_>>;
}

/// A mapped memory region, unmapped on drop
pub struct MappedBuffer<'a> {
    addr: u64,
    region: Box<dyn DerefMut<Target = [u8]> + 'a>,
}

impl<'a> MappedBuffer<'a> {
    pub fn new(addr: u64, region: Box<dyn DerefMut<Target = [u8]> + 'a>) -> Self {
        trace!(addr = format_args!("{:#x}", addr), len = region.len(), "map");
        Self { addr, region }
    }

    /// Address the region starts at
    #[inline]
    pub fn addr(&self) -> u64 {
        self.addr
    }
}

impl Deref for MappedBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.region
    }
}

impl DerefMut for MappedBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.region
    }
}

impl Drop for MappedBuffer<'_> {
    fn drop(&mut self) {
        trace!(addr = format_args!("{:#x}", self.addr), "unmap");
    }
}

impl std::fmt::Debug for MappedBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedBuffer")
            .field("addr", &format_args!("{:#x}", self.addr))
            .field("len", &self.region.len())
            .finish()
    }
}
