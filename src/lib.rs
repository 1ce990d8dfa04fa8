/*!
 * Boot Filesystem Library
 * Partition binding, driver selection and file commands for a boot loader
 */

pub mod binder;
pub mod block;
pub mod commands;
pub mod config;
pub mod core;
pub mod drivers;
pub mod env;
pub mod fs;
pub mod memory;
pub mod monitoring;

// Re-exports
pub use binder::{Binding, DeviceTable, PartitionResolver};
pub use block::{BlockDevice, BlockDeviceHandle, PartitionDescriptor, RamDisk};
pub use commands::{run, CommandContext, CommandStatus};
pub use config::BootConfig;
pub use self::core::{FsError, FsResult};
pub use drivers::{HostFs, RamFs, RamImage};
pub use env::{EnvStore, Environment};
pub use fs::{copy_file, BootFs, FsDriver, FsType, Registry, Session};
pub use memory::{BufferMapper, SysMem};
pub use monitoring::init_tracing;
