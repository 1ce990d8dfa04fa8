/*!
 * Boot Filesystem Limits and Constants
 *
 * Centralized location for sizes, defaults and on-disk magic numbers.
 * Organized by domain so the session layer, the copy utility and the
 * command handlers agree on the same values.
 */

// =============================================================================
// BLOCK LAYER
// =============================================================================

/// Default storage block size (512 bytes)
/// Used for ram disks and as the unit for copy chunking
pub const DEFAULT_BLOCK_SIZE: usize = 512;

// =============================================================================
// COPY UTILITY
// =============================================================================

/// Number of storage blocks moved per copy iteration
pub const COPY_CHUNK_BLOCKS: usize = 32;

/// Copy chunk size in bytes (16KB)
/// [PERF] Large enough to amortize driver lookups, small enough for a stack-sized loader
pub const COPY_CHUNK_SIZE: usize = DEFAULT_BLOCK_SIZE * COPY_CHUNK_BLOCKS;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Maximum identifier length (canonical hyphenated UUID)
pub const IDENTIFIER_MAX_LEN: usize = 36;

/// Identifier buffer size, including the terminating NUL
pub const IDENTIFIER_BUF_LEN: usize = IDENTIFIER_MAX_LEN + 1;

// =============================================================================
// MEMORY
// =============================================================================

/// Base of the simulated physical memory window
pub const DEFAULT_MEMORY_BASE: u64 = 0x0100_0000;

/// Size of the simulated physical memory window (32MB)
pub const DEFAULT_MEMORY_SIZE: u64 = 32 * 1024 * 1024;

/// Load address used when neither the command line nor `loadaddr` supplies one
pub const DEFAULT_LOAD_ADDR: u64 = DEFAULT_MEMORY_BASE;

// =============================================================================
// RAMFS ON-DISK FORMAT
// =============================================================================

/// Superblock magic stored at byte 0 of the partition
pub const RAMFS_MAGIC: [u8; 8] = *b"BOOTRAMF";

/// On-disk format revision
pub const RAMFS_VERSION: u32 = 1;

/// Encoded superblock length (magic + version + uuid + payload length)
pub const RAMFS_SUPERBLOCK_LEN: usize = 8 + 4 + 16 + 8;

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

/// Default load address variable
pub const ENV_LOADADDR: &str = "loadaddr";

/// Default boot file variable
pub const ENV_BOOTFILE: &str = "bootfile";

/// Size of the last file loaded or sized
pub const ENV_FILESIZE: &str = "filesize";

/// Address of the last file loaded
pub const ENV_FILEADDR: &str = "fileaddr";
