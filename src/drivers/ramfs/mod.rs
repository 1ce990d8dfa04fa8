/*!
 * RAM-Backed Filesystem Driver
 * Lossless block-backed filesystem with a whole-tree image format
 */

mod image;
mod ops;

use ahash::RandomState;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::block::{BlockDeviceHandle, PartitionDescriptor};
use crate::core::{FsError, FsResult};
use crate::fs::{DirEntry, FsDriver, FsType, Identifier};
use image::Node;

pub use image::RamImage;

/// State held between a successful probe and `close`
struct Mount {
    device: BlockDeviceHandle,
    partition: PartitionDescriptor,
    uuid: Uuid,
    nodes: DashMap<PathBuf, Node, RandomState>,
}

/// RamFs driver
///
/// Probe loads the whole node tree from the partition; every write flushes
/// the tree back. Needs a block device.
#[derive(Default)]
pub struct RamFs {
    mount: Option<Mount>,
}

impl RamFs {
    pub const NAME: &'static str = "ramfs";

    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a partition is currently mounted
    pub fn is_mounted(&self) -> bool {
        self.mount.is_some()
    }

    /// Normalize path (make absolute and clean)
    pub(super) fn normalize(path: &str) -> PathBuf {
        let path = Path::new(path);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new("/").join(path)
        };
        PathBuf::from(path_clean::clean(&path))
    }

    fn mounted(&self) -> FsResult<&Mount> {
        self.mount.as_ref().ok_or(FsError::NotMounted)
    }

    /// Write the tree back to the partition
    fn flush(mount: &Mount) -> FsResult<()> {
        let mut nodes: Vec<(String, Node)> = mount
            .nodes
            .iter()
            .map(|entry| (entry.key().to_string_lossy().into_owned(), entry.value().clone()))
            .collect();
        nodes.sort_by(|a, b| a.0.cmp(&b.0));
        image::store(mount.device.as_ref(), &mount.partition, mount.uuid, &nodes)
    }
}

impl std::fmt::Debug for RamFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.mount {
            Some(mount) => f
                .debug_struct("RamFs")
                .field("partition", &mount.partition)
                .field("uuid", &mount.uuid)
                .field("nodes", &mount.nodes.len())
                .finish(),
            None => f.debug_struct("RamFs").field("mounted", &false).finish(),
        }
    }
}

impl FsDriver for RamFs {
    fn fs_type(&self) -> FsType {
        FsType::Ram
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn probe(&mut self, device: Option<&BlockDeviceHandle>, partition: &PartitionDescriptor) -> FsResult<()> {
        let device = device.ok_or_else(|| FsError::NotSupported("ramfs needs a block device".into()))?;
        let (superblock, entries) = image::load(device.as_ref(), partition)?;

        let nodes = DashMap::with_hasher(RandomState::new());
        for (path, node) in entries {
            nodes.insert(Self::normalize(&path), node);
        }
        match nodes.get(Path::new("/")).map(|n| n.is_dir()) {
            Some(true) => {}
            _ => return Err(FsError::Corrupted("image has no root directory".into())),
        }

        info!(partition = %partition, uuid = %superblock.uuid, nodes = nodes.len(), "Mounted ramfs");
        self.mount = Some(Mount {
            device: device.clone(),
            partition: partition.clone(),
            uuid: superblock.uuid,
            nodes,
        });
        Ok(())
    }

    fn list(&mut self, dir: &str) -> FsResult<Vec<DirEntry>> {
        self.list_impl(dir)
    }

    fn exists(&mut self, path: &str) -> bool {
        self.exists_impl(path)
    }

    fn size(&mut self, path: &str) -> FsResult<u64> {
        self.size_impl(path)
    }

    fn read(&mut self, path: &str, buf: &mut [u8], offset: u64, len: u64) -> FsResult<u64> {
        self.read_impl(path, buf, offset, len)
    }

    fn write(&mut self, path: &str, data: &[u8], offset: u64) -> FsResult<u64> {
        self.write_impl(path, data, offset)
    }

    fn close(&mut self) {
        if let Some(mount) = self.mount.take() {
            debug!(partition = %mount.partition, "Unmounted ramfs");
        }
    }

    fn identifier(&mut self, id: &mut Identifier) -> FsResult<()> {
        let mount = self.mounted()?;
        id.set(&mount.uuid.hyphenated().to_string())
    }
}
