//! Filesystem configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One source mounted when the filesystem is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountConfig {
    /// Directory or archive on the host
    pub path: PathBuf,
    /// Virtual directory to mount at (root when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_point: Option<String>,
}

impl MountConfig {
    /// Mount `path` at the root
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mount_point: None,
        }
    }

    /// Mount at `mount_point` instead of the root
    #[must_use]
    pub fn at(mut self, mount_point: impl Into<String>) -> Self {
        self.mount_point = Some(mount_point.into());
        self
    }
}

/// Configuration for a [`FileSystem`](crate::FileSystem)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSystemConfig {
    /// Follow symbolic links inside mounted directories
    pub allow_symlinks: bool,

    /// Build the case-insensitive path cache on creation
    pub path_cache: bool,

    /// Map archives into memory on the native mount attempt
    pub memory_map_archives: bool,

    /// Sources mounted in order on creation (later entries take priority)
    pub mounts: Vec<MountConfig>,
}

impl Default for FileSystemConfig {
    fn default() -> Self {
        Self {
            allow_symlinks: false,
            path_cache: true,
            memory_map_archives: true,
            mounts: Vec::new(),
        }
    }
}

impl FileSystemConfig {
    /// Create a default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether symbolic links are followed
    #[must_use]
    pub fn with_symlinks(mut self, allow: bool) -> Self {
        self.allow_symlinks = allow;
        self
    }

    /// Set whether the path cache is built on creation
    #[must_use]
    pub fn with_path_cache(mut self, enabled: bool) -> Self {
        self.path_cache = enabled;
        self
    }

    /// Set whether archives are memory-mapped
    #[must_use]
    pub fn with_memory_map(mut self, enabled: bool) -> Self {
        self.memory_map_archives = enabled;
        self
    }

    /// Append a source to mount on creation
    #[must_use]
    pub fn with_mount(mut self, mount: MountConfig) -> Self {
        self.mounts.push(mount);
        self
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = FileSystemConfig::default();
        assert!(!config.allow_symlinks);
        assert!(config.path_cache);
        assert!(config.memory_map_archives);
        assert!(config.mounts.is_empty());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: FileSystemConfig = serde_json::from_str(
            r#"{ "path_cache": false, "mounts": [ { "path": "Game.rgss3a" }, { "path": "Patch", "mount_point": "Graphics" } ] }"#,
        )
        .unwrap();

        assert_eq!(
            config,
            FileSystemConfig::new()
                .with_path_cache(false)
                .with_mount(MountConfig::new("Game.rgss3a"))
                .with_mount(MountConfig::new("Patch").at("Graphics"))
        );
    }
}
