//! Error types for PCK archive operations.

use std::path::PathBuf;

use thiserror::Error;

/// The error type for everything the library does.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying file read/write failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive file to operate on does not exist.
    #[error("\"{}\" does not exist", .0.display())]
    ArchiveNotFound(PathBuf),

    /// No entry with the requested name is stored in the archive.
    #[error("\"{0}\" is not in the PCK file")]
    EntryNotFound(String),

    /// A read would leave the buffer, or a stored field contradicts the layout.
    #[error("malformed PCK archive: {0}")]
    MalformedArchive(String),

    /// A section tag does not fit the fixed 0x14 byte field.
    #[error("PCK header name is too long: {0}")]
    NameTooLong(String),

    /// An entry name cannot be stored as a null-terminated string.
    #[error("invalid entry name: {0:?}")]
    InvalidName(String),

    /// A count, offset or length does not fit the 32-bit fields of the format.
    #[error("PCK archive too large: {0}")]
    ArchiveTooLarge(String),
}

impl Error {
    /// True for both "not found" kinds: a missing archive file or a missing entry.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ArchiveNotFound(_) | Error::EntryNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
