/*!
 * Filesystem Dispatch Layer
 * Driver registry, probe-based selection, sessions and file copy
 */

mod context;
mod copy;
mod registry;
mod session;
mod traits;
pub mod types;
mod unsupported;

pub use context::BootFs;
pub use copy::{copy_file, HostSinks, SinkProvider};
pub use registry::Registry;
pub use session::Session;
pub use traits::FsDriver;
pub use types::{DirEntry, FileType, FsType, Identifier, Transfer};
pub use unsupported::Unsupported;
