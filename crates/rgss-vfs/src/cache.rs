//! Case-insensitive path cache

use crate::error::{Result, VfsError};
use crate::mount::MountTable;
use crate::path::{fold_case, join};
use crate::source::EntryKind;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Shared shutdown request, checked while the path cache is being built.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct TerminationFlag(Arc<AtomicBool>);

impl TerminationFlag {
    /// Create a cleared flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request termination
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Clear a previous request
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Whether termination has been requested
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Snapshot of the union namespace keyed by case-folded paths.
///
/// Keys are produced by [`fold_case`]. Values keep the casing of the
/// highest-priority source that provides the file.
#[derive(Debug, Clone, Default)]
pub struct PathCache {
    /// Folded full file path to its real path
    paths: HashMap<String, String>,
    /// Folded directory path to the folded names of the files it holds
    file_lists: HashMap<String, Vec<String>>,
}

impl PathCache {
    /// Walk every mounted source from the root.
    ///
    /// Fails with [`VfsError::Aborted`] as soon as `termination` is observed; no
    /// partially built cache is ever returned.
    pub fn build(mounts: &MountTable, termination: &TerminationFlag) -> Result<Self> {
        Self::build_observed(mounts, termination, &mut |_| {})
    }

    /// [`build`](Self::build), calling `on_dir` with each directory's real path
    /// before its entries are walked
    pub(crate) fn build_observed(
        mounts: &MountTable,
        termination: &TerminationFlag,
        on_dir: &mut dyn FnMut(&str),
    ) -> Result<Self> {
        let mut cache = Self::default();
        cache.file_lists.insert(String::new(), Vec::new());
        cache.visit(mounts, "", "", termination, on_dir)?;

        debug!(
            "Path cache holds {} files in {} directories",
            cache.paths.len(),
            cache.file_lists.len()
        );
        Ok(cache)
    }

    fn visit(
        &mut self,
        mounts: &MountTable,
        dir: &str,
        folded_dir: &str,
        termination: &TerminationFlag,
        on_dir: &mut dyn FnMut(&str),
    ) -> Result<()> {
        if termination.is_requested() {
            return Err(VfsError::Aborted);
        }
        on_dir(dir);

        for entry in mounts.enumerate(dir)? {
            if termination.is_requested() {
                return Err(VfsError::Aborted);
            }

            let real = join(dir, &entry.name);
            let folded_name = fold_case(&entry.name);
            let folded = join(folded_dir, &folded_name);

            match entry.kind {
                EntryKind::Directory => {
                    self.file_lists.entry(folded.clone()).or_default();
                    self.visit(mounts, &real, &folded, termination, on_dir)?;
                }
                EntryKind::File => {
                    if let Entry::Vacant(slot) = self.paths.entry(folded) {
                        slot.insert(real);
                        self.file_lists
                            .entry(folded_dir.to_string())
                            .or_default()
                            .push(folded_name);
                    }
                }
            }
        }

        Ok(())
    }

    /// Real path of a folded file path
    pub fn translate(&self, folded: &str) -> Option<&str> {
        self.paths.get(folded).map(String::as_str)
    }

    /// Folded file names of a folded directory path, in enumeration order
    pub fn file_list(&self, folded_dir: &str) -> Option<&[String]> {
        self.file_lists.get(folded_dir).map(Vec::as_slice)
    }

    /// Whether a folded directory path is known
    pub fn contains_dir(&self, folded_dir: &str) -> bool {
        self.file_lists.contains_key(folded_dir)
    }

    /// Number of cached files
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether no files are cached
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
