//! Filesystem facade

use crate::cache::{PathCache, TerminationFlag};
use crate::config::FileSystemConfig;
use crate::error::{Result, VfsError};
use crate::mount::{MountEntry, MountTable};
use crate::path::{self, find_ext, fold_case};
use crate::resolver::{self, FirstMatch, OpenHandler};
use crate::source::{EntryKind, Source};
use crate::stream::GenericStream;
use std::path::Path;
use tracing::{debug, info, warn};

/// Case-insensitive union of mounted directories and archives.
///
/// Mounting, unmounting and cache rebuilds take `&mut self`; resolution takes
/// `&self`, so lookups can run in parallel but never alongside a rebuild.
#[derive(Debug)]
pub struct FileSystem {
    config: FileSystemConfig,
    mounts: MountTable,
    cache: Option<PathCache>,
    termination: TerminationFlag,
}

impl FileSystem {
    /// Create a filesystem, mount `config.mounts` in order and build the path
    /// cache if `config.path_cache` is set.
    pub fn new(config: FileSystemConfig) -> Result<Self> {
        let mounts = config.mounts.clone();
        let mut fs = Self {
            config,
            mounts: MountTable::new(),
            cache: None,
            termination: TerminationFlag::new(),
        };

        for mount in &mounts {
            fs.add_path(&mount.path, mount.mount_point.as_deref(), false)?;
        }
        if fs.config.path_cache {
            fs.create_path_cache()?;
        }

        Ok(fs)
    }

    /// Configuration this filesystem was created with
    pub fn config(&self) -> &FileSystemConfig {
        &self.config
    }

    /// Mount a directory or archive, optionally below `mount_point`.
    ///
    /// The native attempt opens directories directly and memory-maps archives.
    /// If it fails the path is wrapped in a file stream and mounted from that.
    /// Mounting a path that is already mounted does nothing.
    pub fn add_path(
        &mut self,
        path: impl AsRef<Path>,
        mount_point: Option<&str>,
        reload: bool,
    ) -> Result<()> {
        let path = path.as_ref();
        let origin = path.to_string_lossy().into_owned();
        if self.mounts.contains(&origin) {
            debug!("{} is already mounted", origin);
            return Ok(());
        }

        let source = match Source::open_native(path, &self.config) {
            Ok(source) => source,
            Err(native) => {
                warn!(
                    "Native mount of {} failed ({}), retrying through a file stream",
                    origin, native
                );
                Source::open_wrapped(path).map_err(|e| VfsError::Mount {
                    path: origin.clone(),
                    source: Box::new(e),
                })?
            }
        };

        let mount_point = mount_point.map(path::normalize).unwrap_or_default();
        self.mounts.mount(source, origin, &mount_point);

        if reload {
            self.reload_path_cache()?;
        }
        Ok(())
    }

    /// Unmount a path previously passed to [`add_path`](Self::add_path)
    pub fn remove_path(&mut self, path: impl AsRef<Path>, reload: bool) -> Result<()> {
        let origin = path.as_ref().to_string_lossy();
        self.mounts.unmount(&origin)?;

        if reload {
            self.reload_path_cache()?;
        }
        Ok(())
    }

    /// Build the path cache over everything currently mounted.
    ///
    /// On [`VfsError::Aborted`] the previous cache, if any, stays in place.
    pub fn create_path_cache(&mut self) -> Result<()> {
        self.create_path_cache_observed(&mut |_| {})
    }

    fn create_path_cache_observed(&mut self, on_dir: &mut dyn FnMut(&str)) -> Result<()> {
        info!("Loading path cache...");

        match PathCache::build_observed(&self.mounts, &self.termination, on_dir) {
            Ok(cache) => {
                self.cache = Some(cache);
                info!("Path cache completed");
                Ok(())
            }
            Err(e) => {
                warn!("Path cache build failed: {}", e);
                Err(e)
            }
        }
    }

    /// Rebuild the path cache if one exists
    pub fn reload_path_cache(&mut self) -> Result<()> {
        if self.cache.is_none() {
            return Ok(());
        }
        self.create_path_cache()
    }

    /// Whether a path cache is active
    pub fn has_path_cache(&self) -> bool {
        self.cache.is_some()
    }

    /// Handle for requesting termination of cache builds
    pub fn termination_flag(&self) -> TerminationFlag {
        self.termination.clone()
    }

    /// Mounted sources, highest priority first
    pub fn mounts(&self) -> impl Iterator<Item = &MountEntry> {
        self.mounts.iter_by_priority()
    }

    /// Open the first file matching `path` with any extension
    pub fn open_read(&self, path: &str) -> Result<GenericStream> {
        let mut handler = FirstMatch::new();
        self.open_read_with(path, &mut handler)?;
        handler
            .into_stream()
            .ok_or_else(|| VfsError::NoFile(path.to_string()))
    }

    /// Offer every file matching `path` to `handler` until it accepts one.
    ///
    /// Succeeds once at least one candidate was offered, whether or not the
    /// handler accepted it.
    pub fn open_read_with<H: OpenHandler + ?Sized>(
        &self,
        path: &str,
        handler: &mut H,
    ) -> Result<()> {
        resolver::resolve(&self.mounts, self.cache.as_ref(), path, handler)
    }

    /// Open exactly `path` (normalized, case-sensitive)
    pub fn open_read_raw(&self, path: &str) -> Result<GenericStream> {
        let normalized = path::normalize(path);
        self.mounts
            .open(&normalized)?
            .map(|stream| GenericStream::new(stream, normalized))
            .ok_or_else(|| VfsError::NoFile(path.to_string()))
    }

    /// Whether `path` exists as spelled, or case-insensitively when a path cache
    /// is active
    pub fn exists(&self, path: &str) -> bool {
        let normalized = path::normalize(path);
        if matches!(self.mounts.stat(&normalized), Ok(Some(_))) {
            return true;
        }

        self.cache.as_ref().is_some_and(|cache| {
            let folded = fold_case(&normalized);
            cache.translate(&folded).is_some() || cache.contains_dir(&folded)
        })
    }

    /// Real casing of `path` if the path cache knows it, else `path` unchanged
    pub fn desensitize<'a>(&'a self, path: &'a str) -> &'a str {
        self.cache
            .as_ref()
            .and_then(|cache| cache.translate(&fold_case(path)))
            .unwrap_or(path)
    }

    /// Normalize a logical path (see [`path::normalize`])
    pub fn normalize(path: &str) -> String {
        path::normalize(path)
    }

    /// Font files (`.ttf`/`.otf`) inside any root-level directory named `fonts`
    /// in any casing
    pub fn font_paths(&self) -> Result<Vec<String>> {
        let mut fonts = Vec::new();

        for dir in self.mounts.enumerate("")? {
            if dir.kind != EntryKind::Directory || !dir.name.eq_ignore_ascii_case("fonts") {
                continue;
            }
            for file in self.mounts.enumerate(&dir.name)? {
                let is_font = find_ext(&file.name).is_some_and(|ext| {
                    ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf")
                });
                if file.kind == EntryKind::File && is_font {
                    fonts.push(path::join(&dir.name, &file.name));
                }
            }
        }

        debug!("Found {} font files", fonts.len());
        Ok(fonts)
    }
}
