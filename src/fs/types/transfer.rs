/*!
 * Transfer Report
 */

use serde::{Deserialize, Serialize};

/// Outcome of a successful read or write
///
/// A short transfer is not an error: it is reported here and logged by
/// the session, and the call still succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Bytes asked for; 0 means "whole file"
    pub requested: u64,
    /// Bytes actually moved
    pub actual: u64,
}

impl Transfer {
    pub const fn new(requested: u64, actual: u64) -> Self {
        Self { requested, actual }
    }

    /// A specific length was requested and a different amount moved
    #[inline]
    #[must_use]
    pub const fn is_short(&self) -> bool {
        self.requested != 0 && self.actual != self.requested
    }
}
