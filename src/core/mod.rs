/*!
 * Core
 * Shared error types and system-wide constants
 */

pub mod errors;
pub mod limits;

pub use errors::{FsError, FsResult};
