//! Test utilities for rgss-vfs
//!
//! Builds encrypted archive fixtures in memory and on disk, lays out loose game
//! trees, and locates an optional real game installation for smoke tests.

use rgss_crypto::{Keystream, TableCipher, V1_TABLE_SEED, v3_base_key, v3_name_mask};
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable pointing at an installed RPG Maker game directory
pub const GAME_DIR_ENV: &str = "RGSS_GAME_DIR";

/// Stored base key used by V3 fixtures unless overridden
pub const DEFAULT_V3_BASE: u32 = 0x4F2A_91C3;

/// Archive file names probed when validating a game directory
const ARCHIVE_NAMES: &[&str] = &["Game.rgssad", "Game.rgss2a", "Game.rgss3a"];

/// Builds archive images the way the RPG Maker editors write them.
///
/// `header_byte` is the version byte: 1 produces the V1/V2 layout, anything
/// else produces the V3 layout (so unsupported bytes can be written too).
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    header_byte: u8,
    base_key: u32,
    files: Vec<(Vec<u8>, Vec<u8>)>,
}

impl ArchiveBuilder {
    /// Start an empty archive
    pub fn new(header_byte: u8) -> Self {
        Self {
            header_byte,
            base_key: DEFAULT_V3_BASE,
            files: Vec::new(),
        }
    }

    /// Override the stored V3 base key
    #[must_use]
    pub fn with_base_key(mut self, base: u32) -> Self {
        self.base_key = base;
        self
    }

    /// Add a file; `/` separators are stored as `\` like the editors do.
    /// Duplicate paths are written as separate records.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        let name = path.replace('/', "\\").into_bytes();
        self.add_raw_name(&name, data)
    }

    /// Add a file with the name bytes stored verbatim
    #[must_use]
    pub fn add_raw_name(mut self, name: &[u8], data: &[u8]) -> Self {
        self.files.push((name.to_vec(), data.to_vec()));
        self
    }

    /// Encode the archive image
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"RGSSAD\0");
        out.push(self.header_byte);

        if self.header_byte == 1 {
            self.build_sequential(&mut out);
        } else {
            self.build_v3(&mut out);
        }
        out
    }

    fn build_sequential(&self, out: &mut Vec<u8>) {
        let mut cipher = TableCipher::new(V1_TABLE_SEED);

        for (name, data) in &self.files {
            out.extend_from_slice(&cipher.mask_u32(len_u32(name.len())).to_le_bytes());
            let mut masked = name.clone();
            cipher.mask_name(&mut masked);
            out.extend_from_slice(&masked);
            out.extend_from_slice(&cipher.mask_u32(len_u32(data.len())).to_le_bytes());

            let mut payload = data.clone();
            Keystream::new(cipher.key()).apply(&mut payload);
            out.extend_from_slice(&payload);
        }
    }

    fn build_v3(&self, out: &mut Vec<u8>) {
        let key = v3_base_key(self.base_key);
        out.extend_from_slice(&self.base_key.to_le_bytes());

        let table_len: usize = self.files.iter().map(|(name, _)| 16 + name.len()).sum();
        let mut offset = out.len() + table_len + 4;

        for (i, (name, data)) in self.files.iter().enumerate() {
            let seed = fixture_seed(i);
            for word in [len_u32(offset), len_u32(data.len()), seed, len_u32(name.len())] {
                out.extend_from_slice(&(word ^ key).to_le_bytes());
            }
            out.extend(
                name.iter()
                    .enumerate()
                    .map(|(j, byte)| byte ^ v3_name_mask(key, j)),
            );
            offset += data.len();
        }
        out.extend_from_slice(&key.to_le_bytes());

        for (i, (_, data)) in self.files.iter().enumerate() {
            let mut payload = data.clone();
            Keystream::new(fixture_seed(i)).apply(&mut payload);
            out.extend_from_slice(&payload);
        }
    }
}

fn len_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn fixture_seed(index: usize) -> u32 {
    0x9E37_79B9u32.wrapping_mul(len_u32(index) + 1)
}

/// Write `image` to `dir/file_name` and return the full path
pub fn write_archive(dir: &Path, file_name: &str, image: &[u8]) -> io::Result<PathBuf> {
    let path = dir.join(file_name);
    std::fs::write(&path, image)?;
    Ok(path)
}

/// Create loose files below `root`, creating parent directories as needed
pub fn write_tree(root: &Path, files: &[(&str, &[u8])]) -> io::Result<()> {
    for (path, data) in files {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(full, data)?;
    }
    Ok(())
}

/// Check if a directory looks like an installed game (Game.ini or a Game archive)
pub fn is_valid_game_dir(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }

    path.join("Game.ini").is_file() || ARCHIVE_NAMES.iter().any(|n| path.join(n).is_file())
}

/// Locate a real game directory through [`GAME_DIR_ENV`]
pub fn find_game_data() -> Option<PathBuf> {
    let path = PathBuf::from(std::env::var_os(GAME_DIR_ENV)?);
    is_valid_game_dir(&path).then_some(path)
}

/// Print instructions for pointing tests at a game installation
pub fn print_setup_instructions() {
    println!("Game Data Setup Instructions:");
    println!("=============================");
    println!();
    println!("To run tests that need a real RPG Maker game, set:");
    println!();
    println!("  {GAME_DIR_ENV} = /path/to/game");
    println!();
    println!("The directory must contain Game.ini or one of:");
    for name in ARCHIVE_NAMES {
        println!("  {name}");
    }
}

/// Get a game data path or skip the test with a helpful message
#[macro_export]
macro_rules! require_game_data {
    () => {
        match $crate::find_game_data() {
            Some(path) => path,
            None => {
                println!("Skipping test - no game data found");
                $crate::print_setup_instructions();
                return;
            }
        }
    };
}
