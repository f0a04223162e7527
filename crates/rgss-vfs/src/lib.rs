//! Case-insensitive virtual filesystem for RPG Maker games
//!
//! Game assets live in loose directories, in RGSS archives, or in both at once
//! (a patch folder next to `Game.rgss3a`). Scripts written on Windows request
//! them with whatever casing the author typed and usually without an extension.
//! This crate mounts every source into one namespace and resolves such requests.
//!
//! # Components
//!
//! - [`stream`]: the [`IoStream`] adapter and the [`GenericStream`] handle
//! - [`source`]: host directories and archives behind one [`MountSource`] interface
//! - [`mount`]: the priority-ordered [`MountTable`] and its union namespace
//! - [`cache`]: the case-folded [`PathCache`] and its [`TerminationFlag`]
//! - [`resolver`]: extension-agnostic lookup driven by an [`OpenHandler`]
//! - [`FileSystem`]: the facade tying them together
//!
//! # Examples
//!
//! ```no_run
//! use rgss_vfs::{FileSystem, FileSystemConfig, MountConfig};
//! use std::io::Read;
//!
//! # fn example() -> rgss_vfs::Result<()> {
//! let config = FileSystemConfig::new()
//!     .with_mount(MountConfig::new("Game.rgss3a"))
//!     .with_mount(MountConfig::new("."));
//! let fs = FileSystem::new(config)?;
//!
//! // Matches Graphics/Titles1/Book.png, whatever the real casing
//! let mut title = fs.open_read("graphics/titles1/book")?;
//! let mut png = Vec::new();
//! title.read_to_end(&mut png)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod cache;
pub mod config;
pub mod error;
pub mod filesystem;
pub mod mount;
pub mod path;
pub mod resolver;
pub mod source;
pub mod stream;

pub use cache::{PathCache, TerminationFlag};
pub use config::{FileSystemConfig, MountConfig};
pub use error::{Result, VfsError};
pub use filesystem::FileSystem;
pub use mount::{MountEntry, MountTable};
pub use resolver::{FirstMatch, OpenHandler};
pub use source::{DirEntry, EntryKind, Metadata, MountSource, Source, SourceKind};
pub use stream::{FileStream, GenericStream, IoStream, MemoryStream};
