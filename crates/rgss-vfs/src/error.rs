//! Error types for filesystem operations

use rgss_formats::ArchiveError;
use std::io;
use thiserror::Error;

/// Filesystem operation result type
pub type Result<T> = std::result::Result<T, VfsError>;

/// Errors raised by mounting, cache building and path resolution
#[derive(Debug, Error)]
pub enum VfsError {
    /// Both the native and the stream-wrapped mount attempt failed
    #[error("Failed to mount {path} ({source})")]
    Mount {
        /// Path as given by the caller
        path: String,
        /// Cause reported by the last attempt
        #[source]
        source: Box<VfsError>,
    },

    /// The path is not currently mounted
    #[error("Failed to unmount {path} ({reason})")]
    Unmount {
        /// Path as given by the caller
        path: String,
        /// Why the unmount was refused
        reason: String,
    },

    /// Unrecognized or corrupt archive
    #[error("Archive format error: {0}")]
    Format(#[from] ArchiveError),

    /// Resolution finished without a single matching file
    #[error("No such file: {0}")]
    NoFile(String),

    /// Native read, seek or open failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Path cache build stopped by a termination request
    #[error("Game close requested, path cache enumeration aborted")]
    Aborted,
}

impl VfsError {
    /// Check if the asset is simply absent (usually recoverable by the caller)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoFile(_))
    }

    /// Check if the error comes from a malformed archive, directly or as a mount cause
    pub fn is_corruption(&self) -> bool {
        match self {
            Self::Format(e) => e.is_corruption(),
            Self::Mount { source, .. } => source.is_corruption(),
            _ => false,
        }
    }
}
