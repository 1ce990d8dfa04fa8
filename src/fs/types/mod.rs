/*!
 * Filesystem Types
 * Shared types for driver dispatch
 */

mod entry;
mod fs_type;
mod identifier;
mod transfer;

pub use entry::{DirEntry, FileType};
pub use fs_type::FsType;
pub use identifier::Identifier;
pub use transfer::Transfer;
