//! Smoke test against an installed game, skipped unless RGSS_GAME_DIR is set

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rgss_vfs::{FileSystem, FileSystemConfig, MountConfig};
use test_utils::require_game_data;

const ARCHIVES: &[&str] = &["Game.rgssad", "Game.rgss2a", "Game.rgss3a"];

#[test]
fn test_mount_installed_game() {
    let game_dir = require_game_data!();

    let mut config = FileSystemConfig::new().with_mount(MountConfig::new(&game_dir));
    for name in ARCHIVES {
        let archive = game_dir.join(name);
        if archive.is_file() {
            config = config.with_mount(MountConfig::new(archive));
        }
    }

    let fs = FileSystem::new(config).expect("mount game");
    assert!(fs.has_path_cache());

    // Every RPG Maker project ships its scripts under Data/
    let mut scripts = fs.open_read("data/scripts").expect("scripts");
    let data = scripts.read_remaining().expect("read scripts");
    assert!(!data.is_empty());
    println!(
        "Opened {} ({} bytes) from {} sources",
        scripts.path(),
        data.len(),
        fs.mounts().count()
    );

    for font in fs.font_paths().expect("font listing") {
        let stream = fs.open_read_raw(&font).expect("font file");
        assert!(stream.length().expect("font length") > 0, "{font}");
    }
}
