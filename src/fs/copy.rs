/*!
 * File Copy Utility
 * Streams a file from the active driver into an exclusively created sink
 */

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::session::Session;
use crate::core::limits::COPY_CHUNK_SIZE;
use crate::core::{FsError, FsResult};
use crate::drivers::hostfs::confine;

/// Destination factory for the copy utility
///
/// `create_new` must fail with `AlreadyExists` when `path` is taken. The
/// returned writer is closed when dropped.
pub trait SinkProvider {
    fn create_new(&self, path: &str) -> FsResult<Box<dyn Write + '_>>;
}

/// Sinks created as files under a host directory
#[derive(Debug, Clone)]
pub struct HostSinks {
    root: PathBuf,
}

impl HostSinks {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

impl SinkProvider for HostSinks {
    fn create_new(&self, path: &str) -> FsResult<Box<dyn Write + '_>> {
        let full_path = confine(&self.root, path);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full_path)
            .map_err(|e| FsError::from_io(e, format!("create {}", path)))?;
        Ok(Box::new(file))
    }
}

/// Copy `src` from the session's driver into a new sink at `dst`
///
/// Checks, in order: `src` exists, `src` is non-empty, `dst` can be created
/// exclusively. Moves data in `COPY_CHUNK_SIZE` chunks until the file is
/// exhausted or a read returns no bytes. The driver is not closed; the sink
/// is closed on every path. Returns the number of bytes copied.
pub fn copy_file(session: &mut Session<'_>, src: &str, dst: &str, sinks: &dyn SinkProvider) -> FsResult<u64> {
    let driver = session.driver();

    if !driver.exists(src) {
        warn!(src, "{} doesn't exist.", src);
        return Err(FsError::SourceMissing(src.to_string()));
    }

    let file_size = driver.size(src)?;
    if file_size == 0 {
        warn!(src, "{} file size is 0.", src);
        return Err(FsError::EmptySource(src.to_string()));
    }

    let mut sink = sinks.create_new(dst).map_err(|e| match e {
        FsError::AlreadyExists(_) => {
            warn!(dst, "create {} fail.", dst);
            FsError::DestinationConflict(dst.to_string())
        }
        other => other,
    })?;

    let mut buf = vec![0u8; COPY_CHUNK_SIZE];
    let mut offset = 0u64;
    let mut remaining = file_size;

    while remaining > 0 {
        let want = remaining.min(COPY_CHUNK_SIZE as u64);
        let got = driver.read(src, &mut buf[..want as usize], offset, want)?;
        if got == 0 {
            debug!(src, offset, "Source ended before its reported size");
            break;
        }

        sink.write_all(&buf[..got as usize])
            .map_err(|e| FsError::from_io(e, format!("write {}", dst)))?;
        offset += got;
        remaining = remaining.saturating_sub(got);
    }

    sink.flush()
        .map_err(|e| FsError::from_io(e, format!("flush {}", dst)))?;
    drop(sink);

    info!(src, dst, bytes = offset, "Copied file");
    Ok(offset)
}
