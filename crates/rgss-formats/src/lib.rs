//! File format parsers for RGSS encrypted archives
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // Domain-specific naming patterns
//! This crate reads the three generations of the RGSS archive container used by
//! RPG Maker XP, VX and VX Ace games and exposes their contents as a read-only
//! tree of deobfuscating substreams.
//!
//! # Supported Formats
//!
//! - **RGSSAD** (V1): sequential masked file table, payloads inline
//! - **RGSS2A** (V2): same layout as V1, distinguished by file extension
//! - **RGSS3A** (V3): fixed-key file table followed by the payload area
//!
//! # Design Principles
//!
//! - **One pass**: the whole file table is indexed when an archive is opened
//! - **Fail fast**: bad magic, unknown versions and out-of-range records are
//!   format errors, never "file not found"
//! - **Lazy payloads**: entry bytes are only read and unmasked on demand, through
//!   [`archive::EntryReader`]

#![warn(missing_docs)]

/// RGSS archive container parsing and entry access
///
/// See the [`archive`] module for the binary layout and usage examples.
pub mod archive;

pub use archive::{
    ArchiveEntry, ArchiveError, ArchiveHeader, ArchiveIndex, ArchiveResult, EntryReader,
    FormatVersion, NodeKind, TreeNode,
};
