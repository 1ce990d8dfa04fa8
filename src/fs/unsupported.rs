/*!
 * Unsupported Sentinel
 * Default driver returned for unrecognized or unset filesystem types
 */

use tracing::warn;

use super::traits::FsDriver;
use super::types::{DirEntry, FsType, Identifier};
use crate::block::{BlockDeviceHandle, PartitionDescriptor};
use crate::core::{FsError, FsResult};

/// Sentinel driver
///
/// Every capability fails or reports empty, except `close` which does
/// nothing. Never part of the probe order.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unsupported;

impl Unsupported {
    pub const NAME: &'static str = "unsupported";

    fn refuse<T>(op: &str) -> FsResult<T> {
        Err(FsError::NotSupported(format!("{} on unrecognized filesystem", op)))
    }
}

impl FsDriver for Unsupported {
    fn fs_type(&self) -> FsType {
        FsType::Any
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn allows_null_device(&self) -> bool {
        true
    }

    fn probe(&mut self, _device: Option<&BlockDeviceHandle>, partition: &PartitionDescriptor) -> FsResult<()> {
        warn!(partition = %partition, "Unrecognized filesystem type");
        Err(FsError::ProbeFailure(partition.name.clone()))
    }

    fn list(&mut self, _dir: &str) -> FsResult<Vec<DirEntry>> {
        Self::refuse("list")
    }

    fn exists(&mut self, _path: &str) -> bool {
        false
    }

    fn size(&mut self, _path: &str) -> FsResult<u64> {
        Self::refuse("size")
    }

    fn read(&mut self, _path: &str, _buf: &mut [u8], _offset: u64, _len: u64) -> FsResult<u64> {
        Self::refuse("read")
    }

    fn write(&mut self, _path: &str, _data: &[u8], _offset: u64) -> FsResult<u64> {
        Self::refuse("write")
    }

    fn close(&mut self) {}

    fn identifier(&mut self, _id: &mut Identifier) -> FsResult<()> {
        Self::refuse("identifier")
    }
}
