/*!
 * Memory Module
 * Load-address mapping for the command layer
 */

pub mod sysmem;
pub mod traits;

pub use sysmem::SysMem;
pub use traits::{BufferMapper, MappedBuffer};
