/*!
 * Filesystem Drivers
 * Concrete drivers registered with the boot filesystem registry
 */

pub mod hostfs;
pub mod ramfs;

pub use hostfs::HostFs;
pub use ramfs::{RamFs, RamImage};
