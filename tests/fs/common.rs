/*!
 * Shared Fixtures
 * Disk rig, scripted drivers and a console for command tests
 */

use parking_lot::Mutex;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use boot_fs::block::{BlockDeviceHandle, PartitionDescriptor, RamDisk};
use boot_fs::commands::{run, split_line, CommandContext, CommandStatus};
use boot_fs::fs::{DirEntry, FsDriver, FsType, Identifier};
use boot_fs::{BootFs, DeviceTable, EnvStore, FsError, FsResult, HostFs, RamFs, RamImage, Registry, SysMem};

pub const HELLO: &[u8] = b"hello world";
pub const BIG_LEN: usize = 40_000;
pub const MEM_BASE: u64 = 0x8000_0000;
pub const MEM_SIZE: u64 = 0x10_0000;

pub fn kernel_bytes() -> Vec<u8> {
    (0..3000u32).map(|i| (i % 251) as u8).collect()
}

pub fn big_bytes() -> Vec<u8> {
    (0..BIG_LEN as u32).map(|i| (i % 253) as u8).collect()
}

/// One disk on `mmc 0`: partition 1 is a formatted ramfs, partition 2 is blank.
/// `hostfs` serves a temporary directory.
pub struct Rig {
    pub fs: BootFs,
    pub disk: Arc<RamDisk>,
    pub uuid: Uuid,
    pub host: TempDir,
}

pub fn partitions() -> Vec<PartitionDescriptor> {
    vec![
        PartitionDescriptor::new(1, 1, 127, 512, "mmc0:1"),
        PartitionDescriptor::new(2, 128, 128, 512, "mmc0:2"),
    ]
}

pub fn rig() -> Rig {
    let disk = Arc::new(RamDisk::new("mmc0", 256));
    let uuid = Uuid::new_v4();
    RamImage::new(uuid)
        .with_dir("/boot")
        .with_file("/boot/vmlinuz", kernel_bytes())
        .with_file("/hello.txt", HELLO.to_vec())
        .with_file("/empty", Vec::new())
        .with_file("/big", big_bytes())
        .write_to(disk.as_ref(), &partitions()[0])
        .unwrap();

    let mut table = DeviceTable::new();
    table.attach("mmc", 0, disk.clone(), partitions()).unwrap();
    table.add_virtual("hostfs").unwrap();

    let host = TempDir::new().unwrap();
    let registry = Registry::new()
        .with_driver(Box::new(RamFs::new()))
        .unwrap()
        .with_driver(Box::new(HostFs::new(host.path())))
        .unwrap();

    Rig {
        fs: BootFs::new(registry, Box::new(table)),
        disk,
        uuid,
        host,
    }
}

/// Driver with a fixed probe verdict that records probes and closes
pub struct Scripted {
    pub fs_type: FsType,
    pub recognizes: bool,
    pub null_ok: bool,
    pub log: Arc<Mutex<Vec<String>>>,
}

impl Scripted {
    pub fn boxed(fs_type: FsType, recognizes: bool, null_ok: bool, log: &Arc<Mutex<Vec<String>>>) -> Box<dyn FsDriver> {
        Box::new(Self {
            fs_type,
            recognizes,
            null_ok,
            log: log.clone(),
        })
    }

    fn record(&self, event: &str) {
        self.log.lock().push(format!("{}:{}", event, self.fs_type));
    }
}

impl FsDriver for Scripted {
    fn fs_type(&self) -> FsType {
        self.fs_type
    }
    fn name(&self) -> &str {
        self.fs_type.as_str()
    }
    fn allows_null_device(&self) -> bool {
        self.null_ok
    }
    fn probe(&mut self, _: Option<&BlockDeviceHandle>, _: &PartitionDescriptor) -> FsResult<()> {
        self.record("probe");
        if self.recognizes {
            Ok(())
        } else {
            Err(FsError::Corrupted("not mine".into()))
        }
    }
    fn list(&mut self, _: &str) -> FsResult<Vec<DirEntry>> {
        Ok(Vec::new())
    }
    fn exists(&mut self, _: &str) -> bool {
        true
    }
    fn size(&mut self, _: &str) -> FsResult<u64> {
        Ok(0)
    }
    fn read(&mut self, _: &str, _: &mut [u8], _: u64, _: u64) -> FsResult<u64> {
        Ok(0)
    }
    fn write(&mut self, _: &str, data: &[u8], _: u64) -> FsResult<u64> {
        Ok(data.len() as u64)
    }
    fn close(&mut self) {
        self.record("close");
    }
    fn identifier(&mut self, id: &mut Identifier) -> FsResult<()> {
        id.set(self.fs_type.as_str())
    }
}

/// Table with `mmc 0` (blank disk) and the virtual `virt` interface
pub fn scripted_table() -> DeviceTable {
    let disk = Arc::new(RamDisk::new("mmc0", 16));
    let mut table = DeviceTable::new();
    table.attach("mmc", 0, disk, Vec::new()).unwrap();
    table.add_virtual("virt").unwrap();
    table
}

/// Memory, environment and captured console output
pub struct Console {
    pub mem: SysMem,
    pub env: EnvStore,
    pub out: Vec<u8>,
}

impl Console {
    pub fn new() -> Self {
        Self {
            mem: SysMem::new(MEM_BASE, MEM_SIZE),
            env: EnvStore::new(),
            out: Vec::new(),
        }
    }

    /// Run one command line, capturing output
    pub fn exec(&mut self, rig: &mut Rig, line: &str) -> CommandStatus {
        let argv = split_line(line);
        let mut ctx = CommandContext::new(&mut rig.fs, &self.mem, &self.env, &mut self.out, MEM_BASE);
        run(&mut ctx, &argv)
    }

    /// Output captured so far, cleared
    pub fn take_output(&mut self) -> String {
        String::from_utf8(std::mem::take(&mut self.out)).unwrap()
    }
}
