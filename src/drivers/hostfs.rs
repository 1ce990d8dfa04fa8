/*!
 * Host Filesystem Driver
 * Virtual filesystem over a host directory, usable without a block device
 */

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use crate::block::{BlockDeviceHandle, PartitionDescriptor};
use crate::core::{FsError, FsResult};
use crate::fs::{DirEntry, FileType, FsDriver, FsType, Identifier};

/// Resolve `path` under `root`, dropping components that would climb above it
///
/// Works for paths that do not exist yet. Leading `/` is relative to `root`.
pub(crate) fn confine(root: &Path, path: &str) -> PathBuf {
    let mut components = Vec::with_capacity(8);
    for component in Path::new(path).components() {
        match component {
            Component::Normal(name) => components.push(name),
            Component::ParentDir => {
                components.pop();
            }
            _ => {}
        }
    }

    let mut result = root.to_path_buf();
    for component in components {
        result.push(component);
    }
    result
}

/// Host directory driver
///
/// Mounted by a successful probe against a virtual binding (no device);
/// `close` unmounts. Writes at offset 0 replace the file, later offsets
/// extend it in place.
#[derive(Debug, Clone)]
pub struct HostFs {
    root: PathBuf,
    readonly: bool,
    mounted: bool,
}

impl HostFs {
    pub const NAME: &'static str = "hostfs";

    /// Create a driver rooted at `root`
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            readonly: false,
            mounted: false,
        }
    }

    /// Create a driver that refuses writes
    pub fn readonly<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            readonly: true,
            ..Self::new(root)
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> FsResult<PathBuf> {
        if !self.mounted {
            return Err(FsError::NotMounted);
        }
        Ok(confine(&self.root, path))
    }

    fn open_file(&self, path: &str) -> FsResult<(File, u64)> {
        let full_path = self.resolve(path)?;
        let md = fs::metadata(&full_path).map_err(|e| FsError::from_io(e, path))?;
        if md.is_dir() {
            return Err(FsError::IsADirectory(path.to_string()));
        }
        let file = File::open(&full_path).map_err(|e| FsError::from_io(e, format!("open {}", path)))?;
        Ok((file, md.len()))
    }

    fn convert_file_type(ft: fs::FileType) -> FileType {
        if ft.is_dir() {
            FileType::Directory
        } else if ft.is_symlink() {
            FileType::Symlink
        } else if ft.is_file() {
            FileType::File
        } else {
            FileType::Unknown
        }
    }
}

impl FsDriver for HostFs {
    fn fs_type(&self) -> FsType {
        FsType::Host
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn allows_null_device(&self) -> bool {
        true
    }

    fn probe(&mut self, device: Option<&BlockDeviceHandle>, partition: &PartitionDescriptor) -> FsResult<()> {
        if let Some(device) = device {
            return Err(FsError::NotSupported(format!(
                "{} is a block device; hostfs binds virtual interfaces only",
                device.name()
            )));
        }
        if !self.root.is_dir() {
            return Err(FsError::NotFound(format!("host root {}", self.root.display())));
        }

        debug!(root = %self.root.display(), partition = %partition, "Mounted host directory");
        self.mounted = true;
        Ok(())
    }

    fn list(&mut self, dir: &str) -> FsResult<Vec<DirEntry>> {
        let full_path = self.resolve(dir)?;
        if !full_path.is_dir() {
            return Err(FsError::NotADirectory(dir.to_string()));
        }

        let entries = fs::read_dir(&full_path).map_err(|e| FsError::from_io(e, format!("list {}", dir)))?;
        let mut result = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FsError::from_io(e, format!("read dir entry in {}", dir)))?;
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!(dir, name = ?raw, "Skipping entry with non-UTF-8 name");
                    continue;
                }
            };
            let md = entry
                .metadata()
                .map_err(|e| FsError::from_io(e, format!("stat {}", name)))?;
            let file_type = Self::convert_file_type(md.file_type());
            let size = if file_type == FileType::Directory { 0 } else { md.len() };
            match DirEntry::new(name, file_type, size) {
                Ok(entry) => result.push(entry),
                Err(e) => warn!(dir, error = %e, "Skipping entry with unusable name"),
            }
        }

        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    fn exists(&mut self, path: &str) -> bool {
        self.resolve(path).map(|p| p.exists()).unwrap_or(false)
    }

    fn size(&mut self, path: &str) -> FsResult<u64> {
        let full_path = self.resolve(path)?;
        let md = fs::metadata(&full_path).map_err(|e| FsError::from_io(e, path))?;
        if md.is_dir() {
            return Err(FsError::IsADirectory(path.to_string()));
        }
        Ok(md.len())
    }

    fn read(&mut self, path: &str, buf: &mut [u8], offset: u64, len: u64) -> FsResult<u64> {
        let (mut file, size) = self.open_file(path)?;
        if offset > size {
            return Err(FsError::InvalidArgument(format!(
                "offset {} beyond end of {} ({} bytes)",
                offset, path, size
            )));
        }

        let available = size - offset;
        let want = if len == 0 { available } else { len.min(available) };
        let want = want.min(buf.len() as u64) as usize;

        file.seek(SeekFrom::Start(offset))
            .map_err(|e| FsError::from_io(e, format!("seek {}", path)))?;

        let mut done = 0;
        while done < want {
            match file.read(&mut buf[done..want]) {
                Ok(0) => break,
                Ok(n) => done += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(FsError::from_io(e, format!("read {}", path))),
            }
        }
        Ok(done as u64)
    }

    fn write(&mut self, path: &str, data: &[u8], offset: u64) -> FsResult<u64> {
        let full_path = self.resolve(path)?;
        if self.readonly {
            return Err(FsError::NotSupported(format!("write {} on read-only host root", path)));
        }
        if full_path.is_dir() {
            return Err(FsError::IsADirectory(path.to_string()));
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(offset == 0)
            .open(&full_path)
            .map_err(|e| FsError::from_io(e, format!("open {}", path)))?;
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| FsError::from_io(e, format!("seek {}", path)))?;

        let mut written = 0;
        while written < data.len() {
            match file.write(&data[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if written == 0 => return Err(FsError::from_io(e, format!("write {}", path))),
                Err(_) => break,
            }
        }

        if written < data.len() {
            return Err(FsError::ShortWrite {
                path: path.to_string(),
                written: written as u64,
                requested: data.len() as u64,
            });
        }
        Ok(written as u64)
    }

    fn close(&mut self) {
        self.mounted = false;
    }

    fn identifier(&mut self, _id: &mut Identifier) -> FsResult<()> {
        Err(FsError::NotSupported("hostfs has no filesystem identifier".into()))
    }
}
