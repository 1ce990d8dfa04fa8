/*!
 * Directory Entries
 * Listing results returned by drivers
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::{FsError, FsResult};

/// Entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    #[default]
    File,
    Directory,
    Symlink,
    Unknown,
}

/// Directory entry with type-safe construction and validation
///
/// Entry names must be non-empty and cannot contain null bytes or path separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub file_type: FileType,
    pub size: u64,
}

impl DirEntry {
    /// Create a new directory entry with validation
    pub fn new(name: String, file_type: FileType, size: u64) -> FsResult<Self> {
        if name.is_empty() {
            return Err(FsError::InvalidPath("entry name cannot be empty".into()));
        }
        if name.contains('\0') {
            return Err(FsError::InvalidPath("entry name cannot contain null bytes".into()));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(FsError::InvalidPath(
                "entry name cannot contain path separators".into(),
            ));
        }
        Ok(Self {
            name,
            file_type,
            size,
        })
    }

    /// Create a file entry
    #[inline]
    pub fn file(name: String, size: u64) -> FsResult<Self> {
        Self::new(name, FileType::File, size)
    }

    /// Create a directory entry
    #[inline]
    pub fn directory(name: String) -> FsResult<Self> {
        Self::new(name, FileType::Directory, 0)
    }

    #[inline]
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.file_type, FileType::Directory)
    }
}

/// Loader-style listing line: directories tagged, files with their size
impl fmt::Display for DirEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.file_type {
            FileType::Directory => write!(f, "<DIR>    {:>10} {}", 0, self.name),
            FileType::Symlink => write!(f, "<SYM>    {:>10} {}", self.size, self.name),
            _ => write!(f, "         {:>10} {}", self.size, self.name),
        }
    }
}
