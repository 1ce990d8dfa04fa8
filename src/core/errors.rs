/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Boot filesystem operation result
///
/// # Must Use
/// Filesystem operations can fail and must be handled to prevent data loss
#[must_use = "filesystem operations can fail and must be handled"]
pub type FsResult<T> = Result<T, FsError>;

/// Errors raised by the binder, the selector, drivers and the copy utility
///
/// All variants carrying a string hold a non-empty context message.
/// Serialization uses the tagged enum pattern for type safety.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(rename_all = "snake_case", tag = "error", content = "details")]
pub enum FsError {
    #[error("Usage: {0}")]
    #[diagnostic(
        code(bootfs::usage),
        help("Check the argument count and hexadecimal formatting of the command.")
    )]
    Usage(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Cannot resolve device: {0}")]
    #[diagnostic(
        code(bootfs::device_resolution),
        help("Use <dev>[:<part>] with a hexadecimal device and a decimal partition.")
    )]
    DeviceResolution(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Unrecognized filesystem type: {0}")]
    #[diagnostic(
        code(bootfs::probe_failure),
        help("No registered driver recognizes the partition. Retry with another type.")
    )]
    ProbeFailure(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Not found: {0}")]
    #[diagnostic(code(bootfs::not_found))]
    NotFound(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Already exists: {0}")]
    #[diagnostic(code(bootfs::already_exists))]
    AlreadyExists(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Not a directory: {0}")]
    #[diagnostic(code(bootfs::not_a_directory))]
    NotADirectory(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Is a directory: {0}")]
    #[diagnostic(code(bootfs::is_a_directory))]
    IsADirectory(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Invalid path: {0}")]
    #[diagnostic(code(bootfs::invalid_path))]
    InvalidPath(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Invalid argument: {0}")]
    #[diagnostic(code(bootfs::invalid_argument))]
    InvalidArgument(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Buffer too small: need {needed} bytes, have {available}")]
    #[diagnostic(
        code(bootfs::buffer_too_small),
        help("Load to a lower address or pass an explicit byte count.")
    )]
    BufferTooSmall { needed: u64, available: u64 },

    #[error("Out of space")]
    #[diagnostic(code(bootfs::out_of_space))]
    OutOfSpace,

    #[error("Not supported: {0}")]
    #[diagnostic(code(bootfs::not_supported))]
    NotSupported(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Filesystem not mounted")]
    #[diagnostic(
        code(bootfs::not_mounted),
        help("The driver was closed. Bind and probe the partition again.")
    )]
    NotMounted,

    #[error("Corrupted filesystem: {0}")]
    #[diagnostic(code(bootfs::corrupted))]
    Corrupted(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("I/O error: {0}")]
    #[diagnostic(code(bootfs::io))]
    Io(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Short write to {path}: {written} of {requested} bytes")]
    #[diagnostic(code(bootfs::short_write))]
    ShortWrite {
        path: String,
        written: u64,
        requested: u64,
    },

    #[error("Unable to write file {0}")]
    #[diagnostic(code(bootfs::write_failed))]
    WriteFailed(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("{0} doesn't exist")]
    #[diagnostic(code(bootfs::source_missing))]
    SourceMissing(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("{0} file size is 0")]
    #[diagnostic(code(bootfs::empty_source))]
    EmptySource(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Create {0} failed: destination exists")]
    #[diagnostic(
        code(bootfs::destination_conflict),
        help("The copy destination is created exclusively. Remove it first.")
    )]
    DestinationConflict(#[serde(deserialize_with = "deserialize_nonempty_string")] String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(bootfs::config))]
    Config(#[serde(deserialize_with = "deserialize_nonempty_string")] String),
}

impl FsError {
    /// Bytes a failing driver call still managed to move
    pub fn bytes_transferred(&self) -> u64 {
        match self {
            FsError::ShortWrite { written, .. } => *written,
            _ => 0,
        }
    }

    /// Map a host I/O error to a filesystem error with context
    pub fn from_io(e: std::io::Error, context: impl Into<String>) -> Self {
        use std::io::ErrorKind;
        match e.kind() {
            ErrorKind::NotFound => FsError::NotFound(context.into()),
            ErrorKind::AlreadyExists => FsError::AlreadyExists(context.into()),
            ErrorKind::InvalidInput => FsError::InvalidArgument(context.into()),
            _ => FsError::Io(format!("{}: {}", context.into(), e)),
        }
    }
}

impl From<std::io::Error> for FsError {
    fn from(e: std::io::Error) -> Self {
        let context = e.kind().to_string();
        FsError::from_io(e, context)
    }
}

/// Deserialize and validate non-empty string for error messages
fn deserialize_nonempty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.is_empty() {
        return Err(serde::de::Error::custom("error message must not be empty"));
    }
    Ok(s)
}
