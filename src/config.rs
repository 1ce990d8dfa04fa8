/*!
 * Boot Configuration
 * Memory layout, defaults and disk images, from JSON plus env overrides
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::binder::DeviceTable;
use crate::block::{BlockDevice, PartitionDescriptor, RamDisk};
use crate::core::limits::{DEFAULT_BLOCK_SIZE, DEFAULT_LOAD_ADDR, DEFAULT_MEMORY_BASE, DEFAULT_MEMORY_SIZE};
use crate::core::{FsError, FsResult};
use crate::drivers::RamImage;

/// Path of the JSON configuration file
pub const CONFIG_ENV: &str = "BOOTFS_CONFIG";
pub const LOADADDR_ENV: &str = "BOOTFS_LOADADDR";
pub const BOOTFILE_ENV: &str = "BOOTFS_BOOTFILE";
pub const HOST_ROOT_ENV: &str = "BOOTFS_HOST_ROOT";
pub const MEM_SIZE_ENV: &str = "BOOTFS_MEM_SIZE";

/// Interface name the host directory is exposed under
pub const HOST_INTERFACE: &str = "hostfs";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootConfig {
    /// Load address used when neither the command nor `loadaddr` give one
    pub load_addr: u64,
    /// Initial value of the `bootfile` variable
    pub bootfile: Option<String>,
    pub memory_base: u64,
    pub memory_size: u64,
    /// Host directory served by the `hostfs` interface
    pub host_root: Option<PathBuf>,
    pub devices: Vec<DeviceConfig>,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            load_addr: DEFAULT_LOAD_ADDR,
            bootfile: None,
            memory_base: DEFAULT_MEMORY_BASE,
            memory_size: DEFAULT_MEMORY_SIZE,
            host_root: None,
            devices: Vec::new(),
        }
    }
}

/// A disk attached at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    pub interface: String,
    #[serde(default)]
    pub index: u32,
    /// Image file; a blank disk of `blocks` blocks when absent
    #[serde(default)]
    pub image: Option<PathBuf>,
    #[serde(default)]
    pub blocks: Option<u64>,
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    /// Partitions in declaration order, numbered from 1
    #[serde(default)]
    pub partitions: Vec<PartitionConfig>,
    /// Format every declared partition (or the whole disk) as an empty ramfs
    #[serde(default)]
    pub format: bool,
    /// Write the disk back to `image` on exit when it changed
    #[serde(default)]
    pub persist: bool,
}

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartitionConfig {
    pub start: u64,
    pub blocks: u64,
    #[serde(default)]
    pub name: Option<String>,
}

/// A disk whose contents go back to an image file on exit
#[derive(Debug, Clone)]
pub struct PersistTarget {
    pub disk: Arc<RamDisk>,
    pub path: PathBuf,
}

impl PersistTarget {
    /// Write the disk back if any block changed; returns whether it wrote
    pub fn persist(&self) -> FsResult<bool> {
        if !self.disk.is_dirty() {
            return Ok(false);
        }
        std::fs::write(&self.path, self.disk.snapshot())
            .map_err(|e| FsError::from_io(e, format!("persist {}", self.path.display())))?;
        info!(disk = self.disk.name(), path = %self.path.display(), "Persisted disk image");
        Ok(true)
    }
}

impl BootConfig {
    /// Parse a JSON document
    pub fn from_json(text: &str) -> FsResult<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| FsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file named by `BOOTFS_CONFIG` (defaults when unset), then apply env overrides
    pub fn from_env() -> FsResult<Self> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        if let Ok(value) = std::env::var(LOADADDR_ENV) {
            config.load_addr = parse_number(LOADADDR_ENV, &value)?;
        }
        if let Ok(value) = std::env::var(BOOTFILE_ENV) {
            config.bootfile = Some(value);
        }
        if let Ok(value) = std::env::var(HOST_ROOT_ENV) {
            config.host_root = Some(PathBuf::from(value));
        }
        if let Ok(value) = std::env::var(MEM_SIZE_ENV) {
            config.memory_size = parse_number(MEM_SIZE_ENV, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> FsResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| FsError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    /// Check memory layout and the default load address
    pub fn validate(&self) -> FsResult<()> {
        if self.memory_size == 0 {
            return Err(FsError::Config("memory_size must be nonzero".into()));
        }
        let end = self
            .memory_base
            .checked_add(self.memory_size)
            .ok_or_else(|| FsError::Config("memory range overflows".into()))?;
        if self.load_addr < self.memory_base || self.load_addr >= end {
            return Err(FsError::Config(format!(
                "load_addr {:#x} outside memory {:#x}..{:#x}",
                self.load_addr, self.memory_base, end
            )));
        }
        for device in &self.devices {
            if device.block_size == 0 {
                return Err(FsError::Config(format!(
                    "{} {:x}: block_size must be nonzero",
                    device.interface, device.index
                )));
            }
            if device.image.is_none() && device.blocks.is_none() {
                return Err(FsError::Config(format!(
                    "{} {:x}: needs an image or a block count",
                    device.interface, device.index
                )));
            }
        }
        Ok(())
    }

    /// Open every configured disk and register it, plus the host interface
    pub fn device_table(&self) -> FsResult<(DeviceTable, Vec<PersistTarget>)> {
        let mut table = DeviceTable::new();
        let mut persist = Vec::new();

        for device in &self.devices {
            let (disk, partitions) = device.open()?;
            if device.persist {
                match &device.image {
                    Some(path) => persist.push(PersistTarget {
                        disk: disk.clone(),
                        path: path.clone(),
                    }),
                    None => warn!(interface = %device.interface, index = device.index, "persist set without an image"),
                }
            }
            table.attach(device.interface.clone(), device.index, disk, partitions)?;
        }

        if self.host_root.is_some() {
            table.add_virtual(HOST_INTERFACE)?;
        }
        Ok((table, persist))
    }
}

impl DeviceConfig {
    /// Disk size in bytes implied by `blocks`
    fn disk_len(&self) -> FsResult<Option<usize>> {
        let Some(blocks) = self.blocks else {
            return Ok(None);
        };
        usize::try_from(blocks)
            .ok()
            .and_then(|blocks| blocks.checked_mul(self.block_size))
            .map(Some)
            .ok_or_else(|| {
                FsError::InvalidArgument(format!(
                    "{} {:x}: {} blocks of {} bytes overflows",
                    self.interface, self.index, blocks, self.block_size
                ))
            })
    }

    /// Load or create the disk and build its partition descriptors
    pub fn open(&self) -> FsResult<(Arc<RamDisk>, Vec<PartitionDescriptor>)> {
        let name = format!("{}{:x}", self.interface, self.index);
        let disk = match &self.image {
            Some(path) => {
                let mut bytes = std::fs::read(path)
                    .map_err(|e| FsError::Config(format!("{}: {}", path.display(), e)))?;
                if let Some(wanted) = self.disk_len()? {
                    if bytes.len() < wanted {
                        bytes.resize(wanted, 0);
                    }
                }
                RamDisk::from_image(name.clone(), bytes, self.block_size)?
            }
            None => {
                self.disk_len()?;
                RamDisk::with_block_size(name.clone(), self.blocks.unwrap_or(0), self.block_size)
            }
        };

        let partitions: Vec<_> = self
            .partitions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let index = i as u32 + 1;
                let label = p.name.clone().unwrap_or_else(|| format!("{}:{}", name, index));
                PartitionDescriptor::new(index, p.start, p.blocks, self.block_size, label)
            })
            .collect();

        if self.format {
            let targets = if partitions.is_empty() {
                vec![PartitionDescriptor::whole_disk(&disk)]
            } else {
                partitions.clone()
            };
            for part in &targets {
                RamImage::new(Uuid::new_v4()).write_to(&disk, part)?;
                info!(partition = %part, "Formatted ramfs");
            }
        }

        Ok((Arc::new(disk), partitions))
    }
}

/// Parse `0x`-prefixed hex or plain decimal
fn parse_number(name: &str, value: &str) -> FsResult<u64> {
    let value = value.trim();
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|_| FsError::Config(format!("{}: invalid number {:?}", name, value)))
}
