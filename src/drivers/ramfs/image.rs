/*!
 * RamFs On-Disk Image
 * Superblock codec and bincode-encoded node tree
 */

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::block::{BlockDevice, PartitionDescriptor};
use crate::core::limits::{RAMFS_MAGIC, RAMFS_SUPERBLOCK_LEN, RAMFS_VERSION};
use crate::core::{FsError, FsResult};

/// Node stored in the image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(super) enum Node {
    File { data: Vec<u8> },
    Directory,
}

impl Node {
    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory)
    }
}

/// Partition block 0: magic, version, UUID and payload length, little-endian
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Superblock {
    pub uuid: Uuid,
    pub payload_len: u64,
}

impl Superblock {
    pub fn encode(&self) -> [u8; RAMFS_SUPERBLOCK_LEN] {
        let mut raw = [0u8; RAMFS_SUPERBLOCK_LEN];
        raw[0..8].copy_from_slice(&RAMFS_MAGIC);
        raw[8..12].copy_from_slice(&RAMFS_VERSION.to_le_bytes());
        raw[12..28].copy_from_slice(self.uuid.as_bytes());
        raw[28..36].copy_from_slice(&self.payload_len.to_le_bytes());
        raw
    }

    pub fn decode(raw: &[u8]) -> FsResult<Self> {
        if raw.len() < RAMFS_SUPERBLOCK_LEN {
            return Err(FsError::Corrupted("superblock truncated".into()));
        }
        if raw[0..8] != RAMFS_MAGIC {
            return Err(FsError::Corrupted("bad ramfs magic".into()));
        }

        let mut word = [0u8; 4];
        word.copy_from_slice(&raw[8..12]);
        let version = u32::from_le_bytes(word);
        if version != RAMFS_VERSION {
            return Err(FsError::Corrupted(format!("unsupported ramfs version {}", version)));
        }

        let mut uuid = [0u8; 16];
        uuid.copy_from_slice(&raw[12..28]);
        let mut len = [0u8; 8];
        len.copy_from_slice(&raw[28..36]);

        Ok(Self {
            uuid: Uuid::from_bytes(uuid),
            payload_len: u64::from_le_bytes(len),
        })
    }
}

fn blocks_for(len: u64, block_size: usize) -> u64 {
    len.div_ceil(block_size as u64)
}

fn check_geometry(partition: &PartitionDescriptor) -> FsResult<()> {
    if partition.block_size < RAMFS_SUPERBLOCK_LEN {
        return Err(FsError::NotSupported(format!(
            "block size {} too small for a ramfs superblock",
            partition.block_size
        )));
    }
    if partition.blocks == 0 {
        return Err(FsError::OutOfSpace);
    }
    Ok(())
}

/// Read and decode the image on `partition`
pub(super) fn load(
    device: &dyn BlockDevice,
    partition: &PartitionDescriptor,
) -> FsResult<(Superblock, Vec<(String, Node)>)> {
    check_geometry(partition)?;

    let mut block = vec![0u8; partition.block_size];
    partition.read_blocks(device, 0, &mut block)?;
    let superblock = Superblock::decode(&block)?;

    let payload_blocks = blocks_for(superblock.payload_len, partition.block_size);
    if 1 + payload_blocks > partition.blocks {
        return Err(FsError::Corrupted(format!(
            "payload of {} bytes overruns partition {}",
            superblock.payload_len, partition
        )));
    }

    let mut payload = vec![0u8; payload_blocks as usize * partition.block_size];
    partition.read_blocks(device, 1, &mut payload)?;
    payload.truncate(superblock.payload_len as usize);

    let nodes: Vec<(String, Node)> = bincode::deserialize(&payload)
        .map_err(|e| FsError::Corrupted(format!("node table: {}", e)))?;
    Ok((superblock, nodes))
}

/// Encode `nodes` and write superblock plus payload to `partition`
pub(super) fn store(
    device: &dyn BlockDevice,
    partition: &PartitionDescriptor,
    uuid: Uuid,
    nodes: &[(String, Node)],
) -> FsResult<()> {
    check_geometry(partition)?;

    let payload = bincode::serialize(nodes).map_err(|e| FsError::Io(format!("encode node table: {}", e)))?;
    let payload_blocks = blocks_for(payload.len() as u64, partition.block_size);
    if 1 + payload_blocks > partition.blocks {
        return Err(FsError::OutOfSpace);
    }

    let superblock = Superblock {
        uuid,
        payload_len: payload.len() as u64,
    };

    let mut raw = vec![0u8; (1 + payload_blocks as usize) * partition.block_size];
    raw[..RAMFS_SUPERBLOCK_LEN].copy_from_slice(&superblock.encode());
    raw[partition.block_size..partition.block_size + payload.len()].copy_from_slice(&payload);
    partition.write_blocks(device, 0, &raw)
}

/// Builder that formats a partition with an initial tree
///
/// ```ignore
/// RamImage::new(Uuid::new_v4())
///     .with_dir("/boot")
///     .with_file("/boot/vmlinuz", kernel)
///     .write_to(disk.as_ref(), &partition)?;
/// ```
#[derive(Debug, Clone)]
pub struct RamImage {
    uuid: Uuid,
    nodes: Vec<(String, Node)>,
}

impl RamImage {
    /// Empty image holding only the root directory
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            nodes: vec![("/".to_string(), Node::Directory)],
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn with_dir<S: Into<String>>(mut self, path: S) -> Self {
        self.nodes.push((path.into(), Node::Directory));
        self
    }

    pub fn with_file<S: Into<String>>(mut self, path: S, data: impl Into<Vec<u8>>) -> Self {
        self.nodes.push((path.into(), Node::File { data: data.into() }));
        self
    }

    /// Format `partition` with this image
    pub fn write_to(&self, device: &dyn BlockDevice, partition: &PartitionDescriptor) -> FsResult<()> {
        store(device, partition, self.uuid, &self.nodes)
    }
}
