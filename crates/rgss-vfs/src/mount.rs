//! Mount table and the union namespace it exposes

use crate::error::{Result, VfsError};
use crate::path;
use crate::source::{DirEntry, EntryKind, Metadata, MountSource, Source, SourceKind};
use crate::stream::IoStream;
use std::collections::HashSet;
use tracing::info;

/// One mounted source
#[derive(Debug)]
pub struct MountEntry {
    source: Source,
    mount_point: String,
    origin: String,
    priority: u64,
}

/// Where a logical path falls relative to a mount point
enum Placement<'a> {
    /// Inside the mount, at this source-relative path
    Inside(&'a str),
    /// Above the mount point; the next component towards it is a synthesized directory
    Above(&'a str),
}

impl MountEntry {
    /// The mounted source
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Virtual directory the source is mounted at ("" for the root)
    pub fn mount_point(&self) -> &str {
        &self.mount_point
    }

    /// Path the caller mounted, used as the key for unmounting
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Mount sequence number; higher shadows lower
    pub fn priority(&self) -> u64 {
        self.priority
    }

    /// Variant of the mounted source
    pub fn kind(&self) -> SourceKind {
        self.source.kind()
    }

    fn place<'a>(&'a self, path: &'a str) -> Option<Placement<'a>> {
        let mp = self.mount_point.as_str();
        if mp.is_empty() {
            return Some(Placement::Inside(path));
        }
        if path == mp {
            return Some(Placement::Inside(""));
        }
        if let Some(rest) = path.strip_prefix(mp)
            && let Some(rest) = rest.strip_prefix('/')
        {
            return Some(Placement::Inside(rest));
        }

        let below = if path.is_empty() {
            mp
        } else {
            mp.strip_prefix(path)?.strip_prefix('/')?
        };
        below.split('/').next().map(Placement::Above)
    }
}

/// Ordered set of mounted sources.
///
/// Sources mounted later have higher priority: they are consulted first when
/// opening and listed first when enumerating.
#[derive(Debug, Default)]
pub struct MountTable {
    entries: Vec<MountEntry>,
    next_priority: u64,
}

impl MountTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mounted sources
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is mounted
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `origin` is currently mounted
    pub fn contains(&self, origin: &str) -> bool {
        self.entries.iter().any(|e| e.origin == origin)
    }

    /// Add `source` at `mount_point` (a normalized logical path) with the highest priority
    pub fn mount(&mut self, source: Source, origin: impl Into<String>, mount_point: &str) -> u64 {
        let priority = self.next_priority;
        self.next_priority += 1;

        let entry = MountEntry {
            source,
            mount_point: mount_point.to_string(),
            origin: origin.into(),
            priority,
        };
        info!(
            "Mounted {} ({}) at /{} with priority {}",
            entry.origin,
            entry.kind(),
            entry.mount_point,
            priority
        );
        self.entries.push(entry);
        priority
    }

    /// Remove the source mounted as `origin`
    pub fn unmount(&mut self, origin: &str) -> Result<MountEntry> {
        let position = self
            .entries
            .iter()
            .position(|e| e.origin == origin)
            .ok_or_else(|| VfsError::Unmount {
                path: origin.to_string(),
                reason: "not mounted".to_string(),
            })?;

        let entry = self.entries.remove(position);
        info!("Unmounted {} ({})", entry.origin, entry.kind());
        Ok(entry)
    }

    /// Mounted sources, highest priority first
    pub fn iter_by_priority(&self) -> impl Iterator<Item = &MountEntry> {
        self.entries.iter().rev()
    }

    /// Union listing of `dir`: sources in priority order, each exact name kept
    /// once (first occurrence wins)
    pub fn enumerate(&self, dir: &str) -> Result<Vec<DirEntry>> {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();

        for mount in self.iter_by_priority() {
            let listing = match mount.place(dir) {
                Some(Placement::Inside(rel)) => mount.source.enumerate(rel)?,
                Some(Placement::Above(next)) => vec![DirEntry::new(next, EntryKind::Directory)],
                None => continue,
            };

            for entry in listing {
                if seen.insert(entry.name.clone()) {
                    merged.push(entry);
                }
            }
        }

        Ok(merged)
    }

    /// Open `path` from the highest-priority source that has it
    pub fn open(&self, path: &str) -> Result<Option<Box<dyn IoStream>>> {
        for mount in self.iter_by_priority() {
            if let Some(Placement::Inside(rel)) = mount.place(path)
                && let Some(stream) = mount.source.open(rel)?
            {
                return Ok(Some(stream));
            }
        }
        Ok(None)
    }

    /// Kind and size of `path` as seen through the highest-priority source
    pub fn stat(&self, path: &str) -> Result<Option<Metadata>> {
        if path.is_empty() {
            return Ok(Some(Metadata {
                kind: EntryKind::Directory,
                size: 0,
            }));
        }

        for mount in self.iter_by_priority() {
            match mount.place(path) {
                Some(Placement::Inside(rel)) => {
                    if let Some(meta) = mount.source.stat(rel)? {
                        return Ok(Some(meta));
                    }
                }
                Some(Placement::Above(_)) => {
                    return Ok(Some(Metadata {
                        kind: EntryKind::Directory,
                        size: 0,
                    }));
                }
                None => {}
            }
        }
        Ok(None)
    }

    /// Whether `path` exists exactly as spelled
    pub fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.stat(&path::normalize(path))?.is_some())
    }
}
