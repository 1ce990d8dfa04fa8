/*!
 * Filesystem Identifier
 * Fixed-size, NUL-terminated identifier buffer (UUID-sized)
 */

use std::fmt;

use crate::core::limits::{IDENTIFIER_BUF_LEN, IDENTIFIER_MAX_LEN};
use crate::core::{FsError, FsResult};

/// Identifier buffer handed to drivers
///
/// Always starts zero-filled. A driver that fails leaves it untouched.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Identifier {
    bytes: [u8; IDENTIFIER_BUF_LEN],
}

impl Identifier {
    /// Zero-filled buffer
    pub const fn zeroed() -> Self {
        Self {
            bytes: [0u8; IDENTIFIER_BUF_LEN],
        }
    }

    /// Store `value`, keeping the terminating NUL
    pub fn set(&mut self, value: &str) -> FsResult<()> {
        if value.len() > IDENTIFIER_MAX_LEN {
            return Err(FsError::InvalidArgument(format!(
                "identifier longer than {} bytes",
                IDENTIFIER_MAX_LEN
            )));
        }
        if value.as_bytes().contains(&0) {
            return Err(FsError::InvalidArgument("identifier contains NUL".into()));
        }
        self.bytes = [0u8; IDENTIFIER_BUF_LEN];
        self.bytes[..value.len()].copy_from_slice(value.as_bytes());
        Ok(())
    }

    /// Text up to the first NUL
    pub fn as_str(&self) -> &str {
        let end = self.bytes.iter().position(|b| *b == 0).unwrap_or(IDENTIFIER_MAX_LEN);
        std::str::from_utf8(&self.bytes[..end]).unwrap_or("")
    }

    /// Raw buffer including the terminator
    pub fn as_bytes(&self) -> &[u8; IDENTIFIER_BUF_LEN] {
        &self.bytes
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes[0] == 0
    }

    /// Whether every byte, terminator included, is zero
    pub fn is_zeroed(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }
}

impl Default for Identifier {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Identifier").field(&self.as_str()).finish()
    }
}
