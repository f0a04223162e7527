//! Mountable sources
//!
//! A source is either a host directory or an opened archive. Both answer the
//! same three questions about paths relative to their own root: what does a
//! directory contain, can a file be opened, and what kind of node is a path.

mod archive;
mod directory;

pub use archive::ArchiveSource;
pub use directory::DirectorySource;

use crate::config::FileSystemConfig;
use crate::error::{Result, VfsError};
use crate::stream::{FileStream, IoStream};
use rgss_formats::FormatVersion;
use std::fmt;
use std::io;
use std::path::Path;

/// Kind of a namespace node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory (real or implied by archive paths)
    Directory,
}

/// One child returned by directory enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Name without any directory part
    pub name: String,
    /// File or directory
    pub kind: EntryKind,
}

impl DirEntry {
    /// Create an entry
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Result of [`MountSource::stat`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    /// File or directory
    pub kind: EntryKind,
    /// Length in bytes (0 for directories)
    pub size: u64,
}

/// Operations every mounted source supports.
///
/// Paths are normalized logical paths relative to the source root; `""` is the
/// root. Lookups are case-sensitive. Absence is `Ok(None)` or an empty listing,
/// errors are reserved for sources that exist but cannot be read.
pub trait MountSource {
    /// Children of `dir` in the source's native order
    fn enumerate(&self, dir: &str) -> Result<Vec<DirEntry>>;

    /// Open a file for reading
    fn open(&self, path: &str) -> Result<Option<Box<dyn IoStream>>>;

    /// Kind and size of a node
    fn stat(&self, path: &str) -> Result<Option<Metadata>>;
}

/// Closed set of source variants, as reported by [`Source::kind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Host directory
    RealDirectory,
    /// `.rgssad` archive
    ArchiveV1,
    /// `.rgss2a` archive
    ArchiveV2,
    /// `.rgss3a` archive
    ArchiveV3,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RealDirectory => write!(f, "directory"),
            Self::ArchiveV1 => write!(f, "RGSSAD archive"),
            Self::ArchiveV2 => write!(f, "RGSS2A archive"),
            Self::ArchiveV3 => write!(f, "RGSS3A archive"),
        }
    }
}

/// A mounted source
#[derive(Debug)]
pub enum Source {
    /// Host directory
    Directory(DirectorySource),
    /// Opened archive
    Archive(ArchiveSource),
}

impl Source {
    /// Variant and archive version of this source
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Directory(_) => SourceKind::RealDirectory,
            Self::Archive(archive) => match archive.version() {
                FormatVersion::V1 => SourceKind::ArchiveV1,
                FormatVersion::V2 => SourceKind::ArchiveV2,
                FormatVersion::V3 => SourceKind::ArchiveV3,
            },
        }
    }

    /// First mount attempt: a host directory, or a memory-mapped archive when
    /// enabled in `config`.
    pub fn open_native(path: &Path, config: &FileSystemConfig) -> Result<Self> {
        if path.is_dir() {
            return Ok(Self::Directory(DirectorySource::new(
                path,
                config.allow_symlinks,
            )));
        }

        if !config.memory_map_archives {
            return Err(VfsError::Io(io::Error::new(
                io::ErrorKind::Unsupported,
                "native archive mounting requires memory mapping",
            )));
        }

        Ok(Self::Archive(ArchiveSource::open_mapped(path)?))
    }

    /// Fallback mount attempt: the path is wrapped in a [`FileStream`] and
    /// parsed as an archive.
    pub fn open_wrapped(path: &Path) -> Result<Self> {
        let stream = FileStream::open(path)?;
        Ok(Self::Archive(ArchiveSource::from_stream(
            Box::new(stream),
            version_hint(path),
        )?))
    }
}

impl MountSource for Source {
    fn enumerate(&self, dir: &str) -> Result<Vec<DirEntry>> {
        match self {
            Self::Directory(source) => source.enumerate(dir),
            Self::Archive(source) => source.enumerate(dir),
        }
    }

    fn open(&self, path: &str) -> Result<Option<Box<dyn IoStream>>> {
        match self {
            Self::Directory(source) => source.open(path),
            Self::Archive(source) => source.open(path),
        }
    }

    fn stat(&self, path: &str) -> Result<Option<Metadata>> {
        match self {
            Self::Directory(source) => source.stat(path),
            Self::Archive(source) => source.stat(path),
        }
    }
}

/// Archive version implied by a container's extension
pub(crate) fn version_hint(path: &Path) -> Option<FormatVersion> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(FormatVersion::from_extension)
}
