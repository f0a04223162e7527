//! Host directory source

use super::{DirEntry, EntryKind, Metadata, MountSource};
use crate::error::Result;
use crate::stream::{FileStream, IoStream};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

/// A directory on the host, mounted as-is
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    allow_symlinks: bool,
}

impl DirectorySource {
    /// Mount `root`; symbolic links below it are ignored unless `allow_symlinks`
    pub fn new(root: impl Into<PathBuf>, allow_symlinks: bool) -> Self {
        Self {
            root: root.into(),
            allow_symlinks,
        }
    }

    /// Host directory backing this source
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Host path of a logical path, or `None` when a symbolic link is in the way
    /// and links are not allowed
    fn host_path(&self, path: &str) -> io::Result<Option<PathBuf>> {
        let mut host = self.root.clone();

        for component in path.split('/').filter(|c| !c.is_empty()) {
            host.push(component);
            if self.allow_symlinks {
                continue;
            }
            match fs::symlink_metadata(&host) {
                Ok(meta) if meta.file_type().is_symlink() => {
                    trace!("Refusing symbolic link {:?}", host);
                    return Ok(None);
                }
                Ok(_) => {}
                Err(e) if is_absent(&e) => return Ok(None),
                Err(e) => return Err(e),
            }
        }

        Ok(Some(host))
    }

    fn metadata(&self, path: &str) -> io::Result<Option<fs::Metadata>> {
        let Some(host) = self.host_path(path)? else {
            return Ok(None);
        };
        match fs::metadata(host) {
            Ok(meta) => Ok(Some(meta)),
            Err(e) if is_absent(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn is_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

impl MountSource for DirectorySource {
    fn enumerate(&self, dir: &str) -> Result<Vec<DirEntry>> {
        let Some(host) = self.host_path(dir)? else {
            return Ok(Vec::new());
        };
        let read_dir = match fs::read_dir(&host) {
            Ok(read_dir) => read_dir,
            Err(e) if is_absent(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry?;
            let Ok(name) = entry.file_name().into_string() else {
                warn!("Skipping non-UTF-8 file name in {:?}", host);
                continue;
            };

            let mut file_type = entry.file_type()?;
            if file_type.is_symlink() {
                if !self.allow_symlinks {
                    continue;
                }
                match fs::metadata(entry.path()) {
                    Ok(meta) => file_type = meta.file_type(),
                    // Dangling link
                    Err(_) => continue,
                }
            }

            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                continue;
            };
            entries.push(DirEntry::new(name, kind));
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn open(&self, path: &str) -> Result<Option<Box<dyn IoStream>>> {
        let Some(meta) = self.metadata(path)? else {
            return Ok(None);
        };
        if !meta.is_file() {
            return Ok(None);
        }

        let host = self.root.join(path);
        Ok(Some(Box::new(FileStream::open(host)?)))
    }

    fn stat(&self, path: &str) -> Result<Option<Metadata>> {
        Ok(self.metadata(path)?.and_then(|meta| {
            let kind = if meta.is_dir() {
                EntryKind::Directory
            } else if meta.is_file() {
                EntryKind::File
            } else {
                return None;
            };
            Some(Metadata {
                kind,
                size: if kind == EntryKind::File { meta.len() } else { 0 },
            })
        }))
    }
}
