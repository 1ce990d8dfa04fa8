/*!
 * Filesystem Type Tags
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::FsError;

/// Filesystem type tag used for driver lookup and probe filtering
///
/// `Any` doubles as the wildcard in requests and as the tag of the
/// unsupported sentinel; no registered driver may carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsType {
    #[default]
    Any,
    Ext4,
    Fat,
    #[serde(rename = "ramfs")]
    Ram,
    #[serde(rename = "hostfs")]
    Host,
}

impl FsType {
    /// All concrete (non-wildcard) tags
    pub const CONCRETE: [FsType; 4] = [FsType::Ext4, FsType::Fat, FsType::Ram, FsType::Host];

    /// Canonical lowercase name, also used as command prefix
    pub const fn as_str(&self) -> &'static str {
        match self {
            FsType::Any => "any",
            FsType::Ext4 => "ext4",
            FsType::Fat => "fat",
            FsType::Ram => "ramfs",
            FsType::Host => "hostfs",
        }
    }

    /// Whether this tag matches every driver
    #[inline]
    pub const fn is_any(&self) -> bool {
        matches!(self, FsType::Any)
    }

    /// Probe filter: a request admits a driver unless both are concrete and differ
    #[inline]
    pub fn admits(&self, driver: FsType) -> bool {
        self.is_any() || driver.is_any() || *self == driver
    }
}

impl fmt::Display for FsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FsType {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "any" => Ok(FsType::Any),
            "ext4" | "ext2" | "ext" => Ok(FsType::Ext4),
            "fat" | "vfat" => Ok(FsType::Fat),
            "ramfs" => Ok(FsType::Ram),
            "hostfs" | "sandbox" => Ok(FsType::Host),
            other => Err(FsError::InvalidArgument(format!(
                "unknown filesystem type {}",
                other
            ))),
        }
    }
}
