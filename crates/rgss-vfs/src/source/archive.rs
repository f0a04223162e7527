//! Archive source

use super::{DirEntry, EntryKind, Metadata, MountSource, version_hint};
use crate::error::Result;
use crate::stream::{IoStream, MemoryStream};
use bytes::Bytes;
use memmap2::Mmap;
use rgss_formats::{ArchiveIndex, EntryReader, FormatVersion, NodeKind};
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// An archive mounted from a backing stream.
///
/// Every opened entry reads through its own duplicate of the backing stream, so
/// entry handles never share a cursor.
#[derive(Debug)]
pub struct ArchiveSource {
    index: ArchiveIndex,
    backing: Box<dyn IoStream>,
}

impl ArchiveSource {
    /// Parse the file table from `backing`
    pub fn from_stream(
        mut backing: Box<dyn IoStream>,
        hint: Option<FormatVersion>,
    ) -> Result<Self> {
        let index = ArchiveIndex::parse(&mut backing, hint)?;
        Ok(Self { index, backing })
    }

    /// Map the archive at `path` into memory and parse it
    pub fn open_mapped(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // The mapping is read-only and the archive is not expected to change while mounted
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        debug!("Memory-mapped {:?} ({} bytes)", path, mmap.len());

        let stream = MemoryStream::new(Bytes::from_owner(mmap));
        Self::from_stream(Box::new(stream), version_hint(path))
    }

    /// Detected archive version
    pub fn version(&self) -> FormatVersion {
        self.index.version()
    }

    /// Parsed file table
    pub fn index(&self) -> &ArchiveIndex {
        &self.index
    }
}

impl MountSource for ArchiveSource {
    fn enumerate(&self, dir: &str) -> Result<Vec<DirEntry>> {
        Ok(self
            .index
            .children(dir)
            .map(|children| {
                children
                    .iter()
                    .map(|node| {
                        let kind = match node.kind {
                            NodeKind::File => EntryKind::File,
                            NodeKind::Directory => EntryKind::Directory,
                        };
                        DirEntry::new(node.name.clone(), kind)
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn open(&self, path: &str) -> Result<Option<Box<dyn IoStream>>> {
        let Some(entry) = self.index.entry(path) else {
            return Ok(None);
        };
        let container = self.backing.duplicate()?;
        Ok(Some(Box::new(EntryReader::new(container, entry))))
    }

    fn stat(&self, path: &str) -> Result<Option<Metadata>> {
        if let Some(entry) = self.index.entry(path) {
            return Ok(Some(Metadata {
                kind: EntryKind::File,
                size: entry.size,
            }));
        }

        Ok(self.index.is_directory(path).then_some(Metadata {
            kind: EntryKind::Directory,
            size: 0,
        }))
    }
}
