//! Behaviour of the filesystem facade over real directories and archive files

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use pretty_assertions::assert_eq;
use rgss_vfs::{
    FileSystem, FileSystemConfig, GenericStream, MountConfig, SourceKind, VfsError,
};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use test_utils::{ArchiveBuilder, write_archive, write_tree};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn scripts() -> Vec<u8> {
    (0u8..=255).cycle().take(1031).collect()
}

fn archive(dir: &Path, name: &str, header_byte: u8, files: &[(&str, &[u8])]) -> PathBuf {
    let image = files
        .iter()
        .fold(ArchiveBuilder::new(header_byte), |b, (p, d)| b.add_file(p, d))
        .build();
    write_archive(dir, name, &image).unwrap()
}

fn loose(root: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    write_tree(&dir, files).unwrap();
    dir
}

fn mount_all(config: FileSystemConfig, paths: &[&PathBuf]) -> FileSystem {
    let config = paths
        .iter()
        .fold(config, |c, p| c.with_mount(MountConfig::new((*p).clone())));
    FileSystem::new(config).unwrap()
}

fn contents(fs: &FileSystem, path: &str) -> Vec<u8> {
    fs.open_read(path).unwrap().read_remaining().unwrap()
}

#[test]
fn test_round_trip_all_archive_versions() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let plaintext = scripts();

    for (name, header_byte, kind) in [
        ("Game.rgssad", 1, SourceKind::ArchiveV1),
        ("Game.rgss2a", 1, SourceKind::ArchiveV2),
        ("Game.rgss3a", 3, SourceKind::ArchiveV3),
    ] {
        let path = archive(
            tmp.path(),
            name,
            header_byte,
            &[
                ("Data/Scripts.rxdata", plaintext.as_slice()),
                ("Graphics/Titles/Title.png", b"\x89PNG title"),
            ],
        );
        let fs = mount_all(FileSystemConfig::new(), &[&path]);

        assert_eq!(fs.mounts().next().unwrap().kind(), kind, "{name}");
        assert_eq!(contents(&fs, "Data/Scripts"), plaintext, "{name}");
        assert_eq!(contents(&fs, "graphics/titles/title"), b"\x89PNG title", "{name}");

        let stream = fs.open_read("Data/Scripts").unwrap();
        assert_eq!(stream.length().unwrap(), plaintext.len() as u64);
    }
}

#[test]
fn test_case_insensitive_requests_reach_same_entry() {
    let tmp = TempDir::new().unwrap();
    let path = archive(tmp.path(), "Game.rgss3a", 3, &[("Graphics/hero.png", b"hero")]);
    let fs = mount_all(FileSystemConfig::new(), &[&path]);

    let upper = fs.open_read("GRAPHICS/hero").unwrap();
    let mixed = fs.open_read("graphics/Hero").unwrap();
    assert_eq!(upper.path(), "Graphics/hero.png");
    assert_eq!(mixed.path(), "Graphics/hero.png");
    assert_eq!(contents(&fs, "GRAPHICS\\HERO"), b"hero");
}

#[test]
fn test_extension_agnostic_matching() {
    let tmp = TempDir::new().unwrap();
    let path = archive(
        tmp.path(),
        "Game.rgss3a",
        3,
        &[
            ("Graphics/hero.png", b"png"),
            ("Graphics/hero.jpg", b"jpg"),
            ("Graphics/heroine.png", b"heroine"),
        ],
    );

    for cached in [true, false] {
        let fs = mount_all(FileSystemConfig::new().with_path_cache(cached), &[&path]);

        // First candidate in archive order wins
        assert_eq!(contents(&fs, "Graphics/hero"), b"png");
        assert_eq!(contents(&fs, "Graphics/hero.jpg"), b"jpg");
        assert_eq!(contents(&fs, "Graphics/heroine"), b"heroine");

        let err = fs.open_read("Graphics/villain").unwrap_err();
        assert!(matches!(err, VfsError::NoFile(ref p) if p == "Graphics/villain"));
        assert!(err.is_not_found());
    }
}

#[test]
fn test_uncached_lookup_is_case_sensitive() {
    let tmp = TempDir::new().unwrap();
    let path = archive(tmp.path(), "Game.rgss3a", 3, &[("Graphics/hero.png", b"hero")]);
    let fs = mount_all(FileSystemConfig::new().with_path_cache(false), &[&path]);

    assert!(!fs.has_path_cache());
    assert_eq!(contents(&fs, "Graphics/hero"), b"hero");
    assert!(fs.open_read("graphics/hero").unwrap_err().is_not_found());
}

#[test]
fn test_later_mount_wins() {
    let tmp = TempDir::new().unwrap();
    let a = loose(tmp.path(), "A", &[("Data/Actors.txt", b"from A")]);
    let b = archive(tmp.path(), "B.rgss3a", 3, &[("Data/Actors.txt", b"from B")]);

    for cached in [true, false] {
        let fs = mount_all(FileSystemConfig::new().with_path_cache(cached), &[&a, &b]);
        assert_eq!(contents(&fs, "Data/Actors"), b"from B");
    }

    let fs = mount_all(FileSystemConfig::new(), &[&b, &a]);
    assert_eq!(contents(&fs, "data/actors"), b"from A");
}

#[test]
fn test_unmount_and_reload_drops_paths() {
    let tmp = TempDir::new().unwrap();
    let base = loose(
        tmp.path(),
        "Base",
        &[("Audio/SE/Only.ogg", b"only"), ("Audio/SE/Shared.ogg", b"base")],
    );
    let patch = loose(tmp.path(), "Patch", &[("Audio/SE/Shared.ogg", b"patch")]);

    let mut fs = mount_all(FileSystemConfig::new(), &[&base, &patch]);
    assert_eq!(contents(&fs, "audio/se/only"), b"only");

    fs.remove_path(&base, true).unwrap();
    assert!(fs.open_read("audio/se/only").unwrap_err().is_not_found());
    assert!(!fs.exists("Audio/SE/Only.ogg"));
    assert_eq!(contents(&fs, "audio/se/shared"), b"patch");

    // Deferred reload
    fs.remove_path(&patch, false).unwrap();
    fs.reload_path_cache().unwrap();
    assert!(fs.open_read("audio/se/shared").unwrap_err().is_not_found());

    let err = fs.remove_path(&patch, false).unwrap_err();
    assert!(matches!(err, VfsError::Unmount { .. }));
}

#[test]
fn test_independent_handles_on_same_entry() {
    let tmp = TempDir::new().unwrap();
    let plaintext = scripts();
    let path = archive(
        tmp.path(),
        "Game.rgss3a",
        3,
        &[("Data/Scripts.rvdata2", plaintext.as_slice())],
    );
    let fs = mount_all(FileSystemConfig::new(), &[&path]);

    let mut a = fs.open_read("Data/Scripts").unwrap();
    let mut b = fs.open_read("data/scripts").unwrap();
    a.seek(SeekFrom::Start(500)).unwrap();
    b.seek(SeekFrom::Start(3)).unwrap();

    let mut chunk = [0u8; 10];
    a.read_exact(&mut chunk).unwrap();
    assert_eq!(&chunk, &plaintext[500..510]);
    b.read_exact(&mut chunk).unwrap();
    assert_eq!(&chunk, &plaintext[3..13]);
    assert_eq!(a.tell().unwrap(), 510);

    let mut c = b.duplicate().unwrap();
    let (from_a, from_b) = std::thread::scope(|s| {
        let ta = s.spawn(move || a.read_remaining().unwrap());
        let tb = s.spawn(move || b.read_remaining().unwrap());
        (ta.join().unwrap(), tb.join().unwrap())
    });
    assert_eq!(from_a, &plaintext[510..]);
    assert_eq!(from_b, &plaintext[13..]);
    assert_eq!(c.read_remaining().unwrap(), &plaintext[13..]);
}

#[test]
fn test_aborted_cache_build_keeps_previous_cache() {
    init_logging();
    let tmp = TempDir::new().unwrap();
    let base = archive(tmp.path(), "Game.rgss3a", 3, &[("Graphics/Hero.png", b"hero")]);
    let patch = loose(tmp.path(), "Patch", &[("Graphics/Slime.png", b"slime")]);

    let mut fs = mount_all(FileSystemConfig::new(), &[&base]);
    let flag = fs.termination_flag();
    flag.request();

    let err = fs.add_path(&patch, None, true).unwrap_err();
    assert!(matches!(err, VfsError::Aborted));

    // The old cache is intact and still authoritative
    assert!(fs.has_path_cache());
    assert_eq!(contents(&fs, "graphics/hero"), b"hero");
    assert!(fs.open_read("graphics/slime").unwrap_err().is_not_found());

    flag.reset();
    fs.reload_path_cache().unwrap();
    assert_eq!(contents(&fs, "graphics/slime"), b"slime");
}

#[test]
fn test_handler_rejection_continues_search() {
    let tmp = TempDir::new().unwrap();
    let dir = loose(
        tmp.path(),
        "Game",
        &[("Audio/SE/click.ogg", b"ogg"), ("Audio/SE/click.wav", b"wav")],
    );
    let fs = mount_all(FileSystemConfig::new(), &[&dir]);

    let mut offered = Vec::new();
    let mut accepted = None;
    let mut handler = |stream: GenericStream, ext: Option<&str>| -> bool {
        offered.push(ext.map(str::to_string));
        if ext == Some("wav") {
            accepted = Some(stream);
            true
        } else {
            false
        }
    };
    fs.open_read_with("audio/se/CLICK", &mut handler).unwrap();

    assert_eq!(offered, vec![Some("ogg".to_string()), Some("wav".to_string())]);
    assert_eq!(accepted.unwrap().read_remaining().unwrap(), b"wav");

    // Rejecting everything is still a successful search
    let mut reject = |_: GenericStream, _: Option<&str>| false;
    fs.open_read_with("audio/se/click", &mut reject).unwrap();
    let mut never = |_: GenericStream, _: Option<&str>| true;
    assert!(fs.open_read_with("audio/se/pop", &mut never).unwrap_err().is_not_found());
}

#[test]
fn test_fallback_mount_without_memory_map() {
    let tmp = TempDir::new().unwrap();
    let path = archive(tmp.path(), "Game.rgss2a", 1, &[("Data/Map001.rvdata", b"map")]);

    let fs = mount_all(FileSystemConfig::new().with_memory_map(false), &[&path]);
    let mount = fs.mounts().next().unwrap();
    assert_eq!(mount.kind(), SourceKind::ArchiveV2);
    assert_eq!(mount.origin(), path.to_string_lossy());
    assert_eq!(contents(&fs, "data/map001"), b"map");

    let mut stream = fs.open_read("Data/Map001").unwrap();
    let mut copy = stream.duplicate().unwrap();
    stream.close();
    assert_eq!(copy.read_remaining().unwrap(), b"map");
}

#[test]
fn test_mount_failures_carry_cause() {
    let tmp = TempDir::new().unwrap();
    let mut fs = FileSystem::new(FileSystemConfig::new()).unwrap();

    let missing = tmp.path().join("Missing.rgss3a");
    let err = fs.add_path(&missing, None, false).unwrap_err();
    assert!(matches!(err, VfsError::Mount { .. }));
    assert!(err.to_string().starts_with("Failed to mount "));
    assert!(!err.is_corruption());

    let broken = write_archive(
        tmp.path(),
        "Broken.rgss3a",
        &ArchiveBuilder::new(2).add_file("a.txt", b"a").build(),
    )
    .unwrap();
    let err = fs.add_path(&broken, None, false).unwrap_err();
    assert!(err.is_corruption(), "{err}");
    assert_eq!(
        err.to_string(),
        format!(
            "Failed to mount {} (Archive format error: Unsupported archive version: 2)",
            broken.display()
        )
    );

    let foreign = write_archive(tmp.path(), "notes.txt", b"plain text file").unwrap();
    let err = fs.add_path(&foreign, None, false).unwrap_err();
    assert!(err.is_corruption(), "{err}");
    assert_eq!(fs.mounts().count(), 0);
}

#[test]
fn test_truncated_archive_mount_is_corruption() {
    let tmp = TempDir::new().unwrap();
    let mut fs = FileSystem::new(FileSystemConfig::new()).unwrap();

    let stub = write_archive(tmp.path(), "Game.rgss3a", b"RGSS").unwrap();
    let err = fs.add_path(&stub, None, false).unwrap_err();
    assert!(err.is_corruption(), "{err}");
    assert_eq!(
        err.to_string(),
        format!(
            "Failed to mount {} (Archive format error: Truncated archive: unexpected end of data while reading header)",
            stub.display()
        )
    );
}

#[test]
fn test_mount_point() {
    let tmp = TempDir::new().unwrap();
    let extra = archive(tmp.path(), "Extra.rgss3a", 3, &[("hero.png", b"extra hero")]);

    let mut fs = FileSystem::new(FileSystemConfig::new()).unwrap();
    fs.add_path(&extra, Some("\\Graphics\\Characters\\"), true).unwrap();

    assert_eq!(fs.mounts().next().unwrap().mount_point(), "Graphics/Characters");
    assert_eq!(contents(&fs, "graphics/characters/HERO"), b"extra hero");
    assert!(fs.exists("Graphics/Characters"));
    assert!(fs.exists("graphics"));
    assert!(fs.open_read("hero").unwrap_err().is_not_found());
}

#[test]
fn test_font_discovery() {
    let tmp = TempDir::new().unwrap();
    let dir = loose(
        tmp.path(),
        "Game",
        &[
            ("fonts/Gothic.TTF", b"ttf"),
            ("fonts/readme.txt", b"txt"),
            ("Graphics/fonts/ignored.ttf", b"nested"),
        ],
    );
    let packed = archive(tmp.path(), "Game.rgss3a", 3, &[("Fonts/Mincho.otf", b"otf")]);
    let fs = mount_all(FileSystemConfig::new(), &[&dir, &packed]);

    assert_eq!(
        fs.font_paths().unwrap(),
        vec!["Fonts/Mincho.otf".to_string(), "fonts/Gothic.TTF".to_string()]
    );
}

#[test]
fn test_desensitize_and_exists() {
    let tmp = TempDir::new().unwrap();
    let path = archive(tmp.path(), "Game.rgss3a", 3, &[("Graphics/Battlers/Slime.png", b"s")]);

    let fs = mount_all(FileSystemConfig::new(), &[&path]);
    assert_eq!(
        fs.desensitize("graphics/battlers/SLIME.PNG"),
        "Graphics/Battlers/Slime.png"
    );
    assert_eq!(fs.desensitize("graphics/missing.png"), "graphics/missing.png");
    assert!(fs.exists("Graphics/Battlers/Slime.png"));
    assert!(fs.exists("GRAPHICS/battlers/slime.png"));
    assert!(fs.exists("graphics/BATTLERS"));
    assert!(!fs.exists("Graphics/Battlers/Slime"));

    let uncached = mount_all(FileSystemConfig::new().with_path_cache(false), &[&path]);
    assert_eq!(
        uncached.desensitize("graphics/battlers/slime.png"),
        "graphics/battlers/slime.png"
    );
    assert!(uncached.exists("Graphics/Battlers/Slime.png"));
    assert!(!uncached.exists("graphics/battlers/slime.png"));
}

#[test]
fn test_open_read_raw_requires_exact_path() {
    let tmp = TempDir::new().unwrap();
    let path = archive(tmp.path(), "Game.rgss3a", 3, &[("Data/Tilesets.rvdata2", b"tiles")]);
    let fs = mount_all(FileSystemConfig::new(), &[&path]);

    let mut stream = fs.open_read_raw("Data\\Tilesets.rvdata2").unwrap();
    assert_eq!(stream.path(), "Data/Tilesets.rvdata2");
    assert_eq!(stream.read_remaining().unwrap(), b"tiles");

    assert!(fs.open_read_raw("Data/Tilesets").unwrap_err().is_not_found());
    assert!(fs.open_read_raw("data/tilesets.rvdata2").unwrap_err().is_not_found());
}

#[test]
fn test_stale_cache_entry_is_not_reported_as_missing() {
    let tmp = TempDir::new().unwrap();
    let dir = loose(tmp.path(), "Game", &[("Data/Items.rvdata2", b"items")]);
    let fs = mount_all(FileSystemConfig::new(), &[&dir]);

    std::fs::remove_file(dir.join("Data/Items.rvdata2")).unwrap();

    let err = fs.open_read("data/items").unwrap_err();
    assert!(matches!(err, VfsError::Io(_)), "{err}");
    assert!(!err.is_not_found());
}

#[test]
fn test_config_from_json() {
    let tmp = TempDir::new().unwrap();
    let dir = loose(tmp.path(), "Game", &[("Game.ini", b"[Game]")]);
    let packed = archive(tmp.path(), "Game.rgss3a", 3, &[("Audio/ME/Fanfare.ogg", b"me")]);

    let json = serde_json::json!({
        "mounts": [
            { "path": dir },
            { "path": packed, "mount_point": "Extra" }
        ]
    });
    let config: FileSystemConfig = serde_json::from_value(json).unwrap();
    let mut fs = FileSystem::new(config).unwrap();

    assert!(fs.has_path_cache());
    assert_eq!(contents(&fs, "game"), b"[Game]");
    assert_eq!(contents(&fs, "extra/audio/me/fanfare"), b"me");

    let kinds: Vec<_> = fs.mounts().map(|m| m.kind()).collect();
    assert_eq!(kinds, vec![SourceKind::ArchiveV3, SourceKind::RealDirectory]);

    // Mounting the same path again changes nothing
    fs.add_path(&dir, None, true).unwrap();
    assert_eq!(fs.mounts().count(), 2);
}

#[test]
fn test_normalize() {
    assert_eq!(FileSystem::normalize("\\Graphics//./Titles/../Pictures/"), "Graphics/Pictures");
}
