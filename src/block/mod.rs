/*!
 * Block Layer
 * Block devices and partition geometry
 */

pub mod device;
pub mod partition;
pub mod ramdisk;

pub use device::{BlockDevice, BlockDeviceHandle};
pub use partition::PartitionDescriptor;
pub use ramdisk::RamDisk;
