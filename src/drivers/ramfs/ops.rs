/*!
 * RamFs File Operations
 * Listing, lookup, reads and flushing writes
 */

use std::path::Path;
use tracing::warn;

use super::image::Node;
use super::RamFs;
use crate::core::{FsError, FsResult};
use crate::fs::DirEntry;

impl RamFs {
    pub(super) fn list_impl(&self, dir: &str) -> FsResult<Vec<DirEntry>> {
        let mount = self.mounted()?;
        let dir_path = Self::normalize(dir);

        match mount.nodes.get(&dir_path).map(|n| n.is_dir()) {
            Some(true) => {}
            Some(false) => return Err(FsError::NotADirectory(dir.to_string())),
            None => return Err(FsError::NotFound(dir.to_string())),
        }

        let mut entries = Vec::new();
        for item in mount.nodes.iter() {
            if item.key().parent() != Some(dir_path.as_path()) {
                continue;
            }
            let name = match item.key().file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            let entry = match item.value() {
                Node::File { data } => DirEntry::file(name, data.len() as u64)?,
                Node::Directory => DirEntry::directory(name)?,
            };
            entries.push(entry);
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    pub(super) fn exists_impl(&self, path: &str) -> bool {
        match self.mounted() {
            Ok(mount) => mount.nodes.contains_key(&Self::normalize(path)),
            Err(_) => false,
        }
    }

    pub(super) fn size_impl(&self, path: &str) -> FsResult<u64> {
        let mount = self.mounted()?;
        match mount.nodes.get(&Self::normalize(path)).as_deref() {
            Some(Node::File { data }) => Ok(data.len() as u64),
            Some(Node::Directory) => Err(FsError::IsADirectory(path.to_string())),
            None => Err(FsError::NotFound(path.to_string())),
        }
    }

    pub(super) fn read_impl(&self, path: &str, buf: &mut [u8], offset: u64, len: u64) -> FsResult<u64> {
        let mount = self.mounted()?;
        let node = mount
            .nodes
            .get(&Self::normalize(path))
            .ok_or_else(|| FsError::NotFound(path.to_string()))?;

        let data = match node.value() {
            Node::File { data } => data,
            Node::Directory => return Err(FsError::IsADirectory(path.to_string())),
        };
        if offset > data.len() as u64 {
            return Err(FsError::InvalidArgument(format!(
                "offset {} beyond end of {} ({} bytes)",
                offset,
                path,
                data.len()
            )));
        }

        let start = offset as usize;
        let available = data.len() - start;
        let want = if len == 0 { available } else { available.min(len as usize) };
        let n = want.min(buf.len());
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n as u64)
    }

    pub(super) fn write_impl(&self, path: &str, data: &[u8], offset: u64) -> FsResult<u64> {
        let mount = self.mounted()?;
        let file_path = Self::normalize(path);

        let parent = file_path
            .parent()
            .ok_or_else(|| FsError::InvalidPath(format!("cannot write to {}", path)))?;
        match mount.nodes.get(parent).map(|n| n.is_dir()) {
            Some(true) => {}
            Some(false) => return Err(FsError::NotADirectory(parent.display().to_string())),
            None => return Err(FsError::NotFound(parent.display().to_string())),
        }

        let previous = mount.nodes.get(&file_path).map(|n| n.value().clone());
        let mut contents = match &previous {
            Some(Node::File { data }) => data.clone(),
            Some(Node::Directory) => return Err(FsError::IsADirectory(path.to_string())),
            None => Vec::new(),
        };
        if offset > contents.len() as u64 {
            return Err(FsError::InvalidArgument(format!(
                "offset {} beyond end of {} ({} bytes)",
                offset,
                path,
                contents.len()
            )));
        }

        let start = offset as usize;
        let end = start + data.len();
        if end > contents.len() {
            contents.resize(end, 0);
        }
        contents[start..end].copy_from_slice(data);
        mount.nodes.insert(file_path.clone(), Node::File { data: contents });

        if let Err(e) = Self::flush(mount) {
            warn!(path, error = %e, "Flush failed, reverting");
            revert(mount, &file_path, previous);
            return Err(e);
        }
        Ok(data.len() as u64)
    }
}

fn revert(mount: &super::Mount, path: &Path, previous: Option<Node>) {
    match previous {
        Some(node) => {
            mount.nodes.insert(path.to_path_buf(), node);
        }
        None => {
            mount.nodes.remove(path);
        }
    }
}
