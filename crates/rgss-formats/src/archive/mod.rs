//! RGSS archive container parsing and entry access
//!
//! An RGSS archive is a single file holding many obfuscated entries. Nothing in it
//! is compressed; both the file table and the payloads are XOR-masked with keys
//! from the schedule in [`rgss_crypto`].
//!
//! # Binary Format
//!
//! ```text
//! Header:  "RGSSAD\0"  version:u8          (1 = RGSSAD/RGSS2A, 3 = RGSS3A)
//!
//! V1/V2 records, repeated to the end of the file (table key starts at 0xDEADCAFE
//! and advances once per masked field and once per name byte):
//!   name_len:u32  name:[u8; name_len]  size:u32  payload:[u8; size]
//!
//! V3 table (single key derived from `base`), terminated by a zero offset:
//!   base:u32
//!   { offset:u32 size:u32 seed:u32 name_len:u32 name:[u8; name_len] }*
//!   offset == 0
//! ```
//!
//! Directories are never stored; they are inferred from `\` separators in entry
//! names, which are converted to `/` while indexing.
//!
//! # Usage Examples
//!
//! ```rust
//! use rgss_formats::archive::{ArchiveIndex, ArchiveError};
//! use std::io::Cursor;
//!
//! // A header with an unknown version byte is rejected up front
//! let mut data = Cursor::new(b"RGSSAD\0\x02".to_vec());
//! let result = ArchiveIndex::parse(&mut data, None);
//! assert!(matches!(result, Err(ArchiveError::UnsupportedVersion(2))));
//! ```
//!
//! ```rust,no_run
//! use rgss_formats::archive::ArchiveIndex;
//! use std::fs::File;
//! use std::io::Read;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut file = File::open("Game.rgss3a")?;
//! let index = ArchiveIndex::parse(&mut file, None)?;
//!
//! if let Some(mut reader) = index.open_entry("Data/Scripts.rvdata2", File::open("Game.rgss3a")?) {
//!     let mut scripts = Vec::new();
//!     reader.read_to_end(&mut scripts)?;
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod header;
mod index;
mod reader;
mod tree;

pub use error::{ArchiveError, ArchiveResult};
pub use header::{ARCHIVE_MAGIC, ArchiveHeader, FormatVersion, HEADER_SIZE};
pub use index::{ArchiveEntry, ArchiveIndex};
pub use reader::EntryReader;
pub use tree::{DirTree, NodeKind, TreeNode};
