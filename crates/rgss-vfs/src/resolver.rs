//! Extension-agnostic path resolution
//!
//! A request such as `Graphics/Battlers/hero` names a directory and a basename.
//! Every file in that directory whose name is the basename, or the basename
//! followed by `.` and an extension, is a candidate. Candidates are offered to an
//! [`OpenHandler`] in enumeration order until one is accepted.
//!
//! With a [`PathCache`] the request is case-folded and matched against the
//! cached directory listing. Without one, the union directory is enumerated live
//! and compared exactly.

use crate::cache::PathCache;
use crate::error::{Result, VfsError};
use crate::mount::MountTable;
use crate::path::{find_ext, fold_case, join, matches_basename, normalize, split_dir};
use crate::source::EntryKind;
use crate::stream::GenericStream;
use std::io;
use tracing::trace;

/// Receives candidate files during [`FileSystem::open_read_with`](crate::FileSystem::open_read_with).
pub trait OpenHandler {
    /// Inspect one candidate. Returning `true` ends the search; returning `false`
    /// moves on to the next candidate.
    fn try_read(&mut self, stream: GenericStream, extension: Option<&str>) -> bool;
}

impl<F> OpenHandler for F
where
    F: FnMut(GenericStream, Option<&str>) -> bool,
{
    fn try_read(&mut self, stream: GenericStream, extension: Option<&str>) -> bool {
        self(stream, extension)
    }
}

/// Handler that accepts the first candidate
#[derive(Debug, Default)]
pub struct FirstMatch {
    stream: Option<GenericStream>,
}

impl FirstMatch {
    /// Create an empty handler
    pub fn new() -> Self {
        Self::default()
    }

    /// The accepted stream, if any
    pub fn into_stream(self) -> Option<GenericStream> {
        self.stream
    }
}

impl OpenHandler for FirstMatch {
    fn try_read(&mut self, stream: GenericStream, _extension: Option<&str>) -> bool {
        self.stream = Some(stream);
        true
    }
}

/// Progress of one resolution call
pub(crate) struct OpenSearchState<'h, H: ?Sized> {
    handler: &'h mut H,
    basename: String,
    match_count: usize,
    stop: bool,
    error: Option<VfsError>,
}

impl<'h, H: OpenHandler + ?Sized> OpenSearchState<'h, H> {
    fn new(handler: &'h mut H, basename: String) -> Self {
        Self {
            handler,
            basename,
            match_count: 0,
            stop: false,
            error: None,
        }
    }

    /// Open the candidate at `real_path` and hand it to the handler
    fn offer(&mut self, mounts: &MountTable, real_path: &str) {
        let stream = match mounts.open(real_path) {
            Ok(Some(stream)) => stream,
            Ok(None) => {
                self.fail(VfsError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{real_path} is listed but could not be opened"),
                )));
                return;
            }
            Err(e) => {
                self.fail(e);
                return;
            }
        };

        trace!("Offering {} for {}", real_path, self.basename);
        let (_, name) = split_dir(real_path);
        if self
            .handler
            .try_read(GenericStream::new(stream, real_path), find_ext(name))
        {
            self.stop = true;
        }
        self.match_count += 1;
    }

    fn fail(&mut self, error: VfsError) {
        self.error = Some(error);
        self.stop = true;
    }

    fn finish(self, request: &str) -> Result<()> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if self.match_count == 0 {
            return Err(VfsError::NoFile(request.to_string()));
        }
        Ok(())
    }
}

/// Resolve `request` and offer every candidate to `handler`
pub(crate) fn resolve<H: OpenHandler + ?Sized>(
    mounts: &MountTable,
    cache: Option<&PathCache>,
    request: &str,
    handler: &mut H,
) -> Result<()> {
    let normalized = normalize(request);
    if normalized.is_empty() {
        return Err(VfsError::NoFile(request.to_string()));
    }

    match cache {
        Some(cache) => {
            let folded = fold_case(&normalized);
            let (dir, base) = split_dir(&folded);
            let mut state = OpenSearchState::new(handler, base.to_string());

            for name in cache.file_list(dir).unwrap_or_default() {
                if state.stop {
                    break;
                }
                if !matches_basename(name, base) {
                    continue;
                }
                if let Some(real) = cache.translate(&join(dir, name)) {
                    state.offer(mounts, real);
                }
            }
            state.finish(request)
        }
        None => {
            let (dir, base) = split_dir(&normalized);
            let mut state = OpenSearchState::new(handler, base.to_string());

            for entry in mounts.enumerate(dir)? {
                if state.stop {
                    break;
                }
                if entry.kind != EntryKind::File || !matches_basename(&entry.name, base) {
                    continue;
                }
                state.offer(mounts, &join(dir, &entry.name));
            }
            state.finish(request)
        }
    }
}
