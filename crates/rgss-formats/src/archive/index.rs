//! File table parsing for all archive versions

use crate::archive::error::{ArchiveError, ArchiveResult};
use crate::archive::header::{ArchiveHeader, FormatVersion};
use crate::archive::reader::EntryReader;
use crate::archive::tree::{DirTree, TreeNode};
use binrw::BinRead;
use rgss_crypto::{TableCipher, V1_TABLE_SEED, v3_base_key, v3_name_mask};
use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom};
use tracing::{debug, warn};

/// One file stored in an archive.
///
/// Entries hold coordinates into the container, never payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path with `/` separators, case preserved as authored
    pub path: String,
    /// Payload offset from the start of the container
    pub offset: u64,
    /// Payload size (equal to the plaintext size)
    pub size: u64,
    /// First key word of the payload keystream
    pub seed: u32,
}

/// Tail of a V3 table record (the offset field is read separately because a zero
/// offset terminates the table)
#[derive(Debug, Clone, Copy, BinRead)]
#[br(little)]
struct RecordTailV3 {
    size: u32,
    seed: u32,
    name_len: u32,
}

/// In-memory index of an archive's file table.
#[derive(Debug, Clone)]
pub struct ArchiveIndex {
    version: FormatVersion,
    entries: Vec<ArchiveEntry>,
    by_path: HashMap<String, usize>,
    tree: DirTree,
    container_len: u64,
}

impl ArchiveIndex {
    /// Parse the header and entire file table of a container.
    ///
    /// `hint` is the version implied by the container's file extension; it only
    /// matters to tell V2 from V1, which share a version byte.
    ///
    /// # Errors
    ///
    /// Returns a format error for bad magic, unknown versions, truncated tables,
    /// undecodable names or records pointing outside the container.
    pub fn parse<R: Read + Seek>(
        reader: &mut R,
        hint: Option<FormatVersion>,
    ) -> ArchiveResult<Self> {
        let container_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let header = ArchiveHeader::read_from(reader)?;
        header.validate()?;
        let version = FormatVersion::detect(header.version, hint)?;

        let records = if version.has_sequential_table() {
            read_sequential_table(reader, container_len)?
        } else {
            read_v3_table(reader, container_len)?
        };

        let mut index = Self {
            version,
            entries: Vec::with_capacity(records.len()),
            by_path: HashMap::with_capacity(records.len()),
            tree: DirTree::new(),
            container_len,
        };
        for entry in records {
            index.insert(entry);
        }

        debug!(
            "Indexed {} archive: {} entries in {} directories ({} bytes)",
            version,
            index.entries.len(),
            index.tree.directory_count(),
            container_len
        );

        Ok(index)
    }

    fn insert(&mut self, entry: ArchiveEntry) {
        if self.by_path.contains_key(&entry.path) {
            warn!(
                "Duplicate archive entry {}, keeping the first record",
                entry.path
            );
            return;
        }

        self.tree.insert_file(&entry.path);
        self.by_path.insert(entry.path.clone(), self.entries.len());
        self.entries.push(entry);
    }

    /// Detected archive version
    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// All entries in file table order
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length of the container the index was parsed from
    pub fn container_len(&self) -> u64 {
        self.container_len
    }

    /// Look up an entry by exact (case-sensitive) path
    pub fn entry(&self, path: &str) -> Option<&ArchiveEntry> {
        self.by_path.get(path).map(|&i| &self.entries[i])
    }

    /// Children of an implied directory ("" for the root)
    pub fn children(&self, dir: &str) -> Option<&[TreeNode]> {
        self.tree.children(dir)
    }

    /// Whether `path` is an implied directory
    pub fn is_directory(&self, path: &str) -> bool {
        self.tree.is_directory(path)
    }

    /// Open a deobfuscating reader for `path` over `reader`, which must read the
    /// same container this index was parsed from.
    pub fn open_entry<R: Read + Seek>(&self, path: &str, reader: R) -> Option<EntryReader<R>> {
        self.entry(path).map(|entry| EntryReader::new(reader, entry))
    }
}

fn read_u32<R: Read + Seek>(reader: &mut R, what: &'static str) -> ArchiveResult<u32> {
    u32::read_le(reader).map_err(|e| ArchiveError::from_binrw(e, what))
}

fn read_name<R: Read>(
    reader: &mut R,
    name_len: u32,
    remaining: u64,
) -> ArchiveResult<Vec<u8>> {
    if u64::from(name_len) > remaining {
        return Err(ArchiveError::Truncated("entry name"));
    }
    let mut name = vec![0u8; name_len as usize];
    reader
        .read_exact(&mut name)
        .map_err(|e| ArchiveError::from_io(e, "entry name"))?;
    Ok(name)
}

/// Turn unmasked name bytes into a `/`-separated path
fn decode_name(mut raw: Vec<u8>) -> ArchiveResult<String> {
    for byte in &mut raw {
        if *byte == b'\\' {
            *byte = b'/';
        }
    }

    let name = String::from_utf8(raw).map_err(|e| {
        ArchiveError::InvalidName(format!(
            "not UTF-8 ({} bytes, error at {})",
            e.as_bytes().len(),
            e.utf8_error().valid_up_to()
        ))
    })?;

    let path = name
        .split('/')
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if path.is_empty() {
        return Err(ArchiveError::InvalidName(format!("{name:?}")));
    }
    Ok(path)
}

fn check_bounds(path: &str, offset: u64, size: u64, container_len: u64) -> ArchiveResult<()> {
    match offset.checked_add(size) {
        Some(end) if end <= container_len => Ok(()),
        _ => Err(ArchiveError::EntryOutOfBounds {
            path: path.to_string(),
            offset,
            size,
            container_len,
        }),
    }
}

/// V1/V2: records run to the end of the container, payloads inline
fn read_sequential_table<R: Read + Seek>(
    reader: &mut R,
    container_len: u64,
) -> ArchiveResult<Vec<ArchiveEntry>> {
    let mut cipher = TableCipher::new(V1_TABLE_SEED);
    let mut entries = Vec::new();

    loop {
        let record_start = reader.stream_position()?;
        if record_start >= container_len {
            break;
        }

        let name_len = cipher.mask_u32(read_u32(reader, "entry name length")?);
        let mut name = read_name(reader, name_len, container_len - record_start - 4)?;
        cipher.mask_name(&mut name);
        let path = decode_name(name)?;

        let size = u64::from(cipher.mask_u32(read_u32(reader, "entry size")?));
        let seed = cipher.key();
        let offset = reader.stream_position()?;
        check_bounds(&path, offset, size, container_len)?;

        entries.push(ArchiveEntry {
            path,
            offset,
            size,
            seed,
        });
        reader.seek(SeekFrom::Start(offset + size))?;
    }

    Ok(entries)
}

/// V3: fixed-key table terminated by a zero offset, payloads addressed absolutely
fn read_v3_table<R: Read + Seek>(
    reader: &mut R,
    container_len: u64,
) -> ArchiveResult<Vec<ArchiveEntry>> {
    let key = v3_base_key(read_u32(reader, "base key")?);
    let mut entries = Vec::new();

    loop {
        let offset = read_u32(reader, "entry offset")? ^ key;
        if offset == 0 {
            break;
        }

        let tail =
            RecordTailV3::read_le(reader).map_err(|e| ArchiveError::from_binrw(e, "entry record"))?;
        let size = u64::from(tail.size ^ key);
        let seed = tail.seed ^ key;
        let name_len = tail.name_len ^ key;

        let position = reader.stream_position()?;
        let mut name = read_name(reader, name_len, container_len.saturating_sub(position))?;
        for (i, byte) in name.iter_mut().enumerate() {
            *byte ^= v3_name_mask(key, i);
        }
        let path = decode_name(name)?;

        let offset = u64::from(offset);
        check_bounds(&path, offset, size, container_len)?;

        entries.push(ArchiveEntry {
            path,
            offset,
            size,
            seed,
        });
    }

    Ok(entries)
}
