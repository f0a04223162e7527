//! Error types for archive operations

use thiserror::Error;

/// Archive operation result type
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Error types for archive parsing and entry access
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The container does not start with `RGSSAD\0`
    #[error("Invalid archive magic: expected \"RGSSAD\\0\", got {0:02X?}")]
    InvalidMagic([u8; 7]),

    /// The header version byte names no known archive version
    #[error("Unsupported archive version: {0}")]
    UnsupportedVersion(u8),

    /// The container ended in the middle of the header or file table
    #[error("Truncated archive: unexpected end of data while reading {0}")]
    Truncated(&'static str),

    /// A record points outside the container
    #[error(
        "Entry {path} is out of bounds: {offset} + {size} exceeds container length {container_len}"
    )]
    EntryOutOfBounds {
        /// Entry path as stored in the archive
        path: String,
        /// Payload offset from the record
        offset: u64,
        /// Payload size from the record
        size: u64,
        /// Total length of the container
        container_len: u64,
    },

    /// A record's name is empty or not valid UTF-8 after unmasking
    #[error("Invalid entry name: {0}")]
    InvalidName(String),

    /// Binary read error
    #[error("Binary format error: {0}")]
    BinRead(#[from] binrw::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// Check if the container itself is malformed (as opposed to unreadable)
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::InvalidMagic(_)
                | Self::UnsupportedVersion(_)
                | Self::Truncated(_)
                | Self::EntryOutOfBounds { .. }
                | Self::InvalidName(_)
        )
    }

    /// Map a binrw failure while reading `what`, folding EOF into [`Self::Truncated`]
    pub(crate) fn from_binrw(err: binrw::Error, what: &'static str) -> Self {
        // Derived readers wrap EOF in a backtrace; is_eof looks through it
        if err.is_eof() {
            Self::Truncated(what)
        } else {
            Self::BinRead(err)
        }
    }

    /// Map an I/O failure while reading `what`, folding EOF into [`Self::Truncated`]
    pub(crate) fn from_io(err: std::io::Error, what: &'static str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::Truncated(what)
        } else {
            Self::Io(err)
        }
    }
}
