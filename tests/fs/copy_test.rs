/*!
 * Copy Utility Tests
 * Preconditions, chunking, sink lifetime and host sinks
 */

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;

use boot_fs::block::{BlockDeviceHandle, PartitionDescriptor};
use boot_fs::core::limits::COPY_CHUNK_SIZE;
use boot_fs::fs::{copy_file, DirEntry, FsDriver, FsType, HostSinks, Identifier, SinkProvider};
use boot_fs::{BootFs, DeviceTable, FsError, FsResult, Registry};

use super::common::*;

/// In-memory sinks recording each write call and each close
#[derive(Default)]
struct MemSinks {
    files: Mutex<HashMap<String, Arc<Mutex<Vec<u8>>>>>,
    writes: Arc<Mutex<Vec<usize>>>,
    closed: Arc<Mutex<usize>>,
}

struct MemSink {
    data: Arc<Mutex<Vec<u8>>>,
    writes: Arc<Mutex<Vec<usize>>>,
    closed: Arc<Mutex<usize>>,
}

impl Write for MemSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.lock().push(buf.len());
        self.data.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for MemSink {
    fn drop(&mut self) {
        *self.closed.lock() += 1;
    }
}

impl SinkProvider for MemSinks {
    fn create_new(&self, path: &str) -> FsResult<Box<dyn Write + '_>> {
        let mut files = self.files.lock();
        if files.contains_key(path) {
            return Err(FsError::AlreadyExists(path.to_string()));
        }
        let data = Arc::new(Mutex::new(Vec::new()));
        files.insert(path.to_string(), data.clone());
        Ok(Box::new(MemSink {
            data,
            writes: self.writes.clone(),
            closed: self.closed.clone(),
        }))
    }
}

impl MemSinks {
    fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().get(path).map(|d| d.lock().clone())
    }

    fn closed(&self) -> usize {
        *self.closed.lock()
    }
}

#[test]
fn test_copy_small_file() {
    let mut rig = rig();
    let sinks = MemSinks::default();
    let mut session = rig.fs.bind_and_probe("mmc", Some("0:1"), FsType::Any).unwrap();

    let copied = copy_file(&mut session, "/boot/vmlinuz", "vmlinuz", &sinks).unwrap();
    assert_eq!(copied, kernel_bytes().len() as u64);
    assert_eq!(sinks.contents("vmlinuz").unwrap(), kernel_bytes());
    assert_eq!(sinks.closed(), 1);

    // Copy leaves the driver mounted
    assert!(session.exists("/boot/vmlinuz"));
}

#[test]
fn test_copy_streams_in_chunks() {
    let mut rig = rig();
    let sinks = MemSinks::default();
    let mut session = rig.fs.bind_and_probe("mmc", Some("0:1"), FsType::Any).unwrap();

    let copied = copy_file(&mut session, "/big", "big", &sinks).unwrap();
    assert_eq!(copied, BIG_LEN as u64);
    assert_eq!(sinks.contents("big").unwrap(), big_bytes());
    assert_eq!(
        *sinks.writes.lock(),
        vec![COPY_CHUNK_SIZE, COPY_CHUNK_SIZE, BIG_LEN - 2 * COPY_CHUNK_SIZE]
    );
}

#[test]
fn test_copy_preconditions() {
    let mut rig = rig();
    let sinks = MemSinks::default();
    let mut session = rig.fs.bind_and_probe("mmc", Some("0:1"), FsType::Any).unwrap();

    assert_eq!(
        copy_file(&mut session, "/missing", "out", &sinks),
        Err(FsError::SourceMissing("/missing".into()))
    );
    assert_eq!(
        copy_file(&mut session, "/empty", "out", &sinks),
        Err(FsError::EmptySource("/empty".into()))
    );
    // Neither precondition failure creates the destination
    assert!(sinks.contents("out").is_none());
    assert_eq!(sinks.closed(), 0);

    copy_file(&mut session, "/hello.txt", "out", &sinks).unwrap();
    assert_eq!(
        copy_file(&mut session, "/hello.txt", "out", &sinks),
        Err(FsError::DestinationConflict("out".into()))
    );
    assert_eq!(sinks.contents("out").unwrap(), HELLO);
    assert_eq!(sinks.closed(), 1);
}

/// Virtual driver reporting `reported` bytes while holding only `available`
///
/// Reads at or past `fail_from` fail with an I/O error.
struct Stubbed {
    reported: u64,
    available: u64,
    fail_from: Option<u64>,
}

impl FsDriver for Stubbed {
    fn fs_type(&self) -> FsType {
        FsType::Fat
    }
    fn name(&self) -> &str {
        "stubbed"
    }
    fn allows_null_device(&self) -> bool {
        true
    }
    fn probe(&mut self, _: Option<&BlockDeviceHandle>, _: &PartitionDescriptor) -> FsResult<()> {
        Ok(())
    }
    fn list(&mut self, _: &str) -> FsResult<Vec<DirEntry>> {
        Ok(Vec::new())
    }
    fn exists(&mut self, _: &str) -> bool {
        true
    }
    fn size(&mut self, _: &str) -> FsResult<u64> {
        Ok(self.reported)
    }
    fn read(&mut self, _: &str, buf: &mut [u8], offset: u64, len: u64) -> FsResult<u64> {
        if self.fail_from.map_or(false, |limit| offset >= limit) {
            return Err(FsError::Io("medium error".into()));
        }
        let n = len.min(self.available.saturating_sub(offset));
        buf[..n as usize].fill(0xEE);
        Ok(n)
    }
    fn write(&mut self, _: &str, _: &[u8], _: u64) -> FsResult<u64> {
        Err(FsError::NotSupported("read-only".into()))
    }
    fn close(&mut self) {}
    fn identifier(&mut self, _: &mut Identifier) -> FsResult<()> {
        Err(FsError::NotSupported("no id".into()))
    }
}

fn stubbed_fs(driver: Stubbed) -> BootFs {
    let mut table = DeviceTable::new();
    table.add_virtual("stub").unwrap();
    let registry = Registry::new().with_driver(Box::new(driver)).unwrap();
    BootFs::new(registry, Box::new(table))
}

#[test]
fn test_copy_aborts_on_read_error_and_closes_sink() {
    let chunk = COPY_CHUNK_SIZE as u64;
    let mut fs = stubbed_fs(Stubbed {
        reported: 3 * chunk,
        available: 3 * chunk,
        fail_from: Some(chunk),
    });
    let sinks = MemSinks::default();

    let mut session = fs.bind_and_probe("stub", None, FsType::Any).unwrap();
    assert_eq!(
        copy_file(&mut session, "/disk.img", "disk.img", &sinks),
        Err(FsError::Io("medium error".into()))
    );
    assert_eq!(sinks.contents("disk.img").unwrap().len(), COPY_CHUNK_SIZE);
    assert_eq!(sinks.closed(), 1);
}

#[test]
fn test_copy_stops_cleanly_at_end_of_stream() {
    let chunk = COPY_CHUNK_SIZE as u64;
    let mut fs = stubbed_fs(Stubbed {
        reported: 3 * chunk,
        available: chunk + 100,
        fail_from: None,
    });
    let sinks = MemSinks::default();

    let mut session = fs.bind_and_probe("stub", None, FsType::Any).unwrap();
    assert_eq!(
        copy_file(&mut session, "/disk.img", "disk.img", &sinks),
        Ok(chunk + 100)
    );
    assert_eq!(sinks.contents("disk.img").unwrap(), vec![0xEE; COPY_CHUNK_SIZE + 100]);
    assert_eq!(*sinks.writes.lock(), vec![COPY_CHUNK_SIZE, 100]);
    assert_eq!(sinks.closed(), 1);
}

#[test]
fn test_copy_to_host_directory() {
    let mut rig = rig();
    let out = tempfile::TempDir::new().unwrap();
    let sinks = HostSinks::new(out.path());
    let mut session = rig.fs.bind_and_probe("mmc", Some("0:1"), FsType::Ram).unwrap();

    copy_file(&mut session, "/boot/vmlinuz", "/vmlinuz", &sinks).unwrap();
    assert_eq!(std::fs::read(out.path().join("vmlinuz")).unwrap(), kernel_bytes());

    assert_eq!(
        copy_file(&mut session, "/boot/vmlinuz", "/vmlinuz", &sinks),
        Err(FsError::DestinationConflict("/vmlinuz".into()))
    );
}
