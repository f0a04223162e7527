//! Archive header structures and version detection

use crate::archive::error::{ArchiveError, ArchiveResult};
use binrw::{BinRead, BinWrite};
use std::io::{Read, Seek};

/// Magic bytes shared by every archive version
pub const ARCHIVE_MAGIC: [u8; 7] = *b"RGSSAD\0";

/// Size of the fixed header in bytes
pub const HEADER_SIZE: u64 = 8;

/// Fixed archive header (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct ArchiveHeader {
    /// Magic bytes: "RGSSAD\0"
    pub magic: [u8; 7],

    /// Version byte (1 or 3)
    pub version: u8,
}

impl ArchiveHeader {
    /// Create a header for `version`
    pub fn new(version: FormatVersion) -> Self {
        Self {
            magic: ARCHIVE_MAGIC,
            version: version.header_byte(),
        }
    }

    /// Read the header from the current position of `reader`
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> ArchiveResult<Self> {
        Self::read_le(reader).map_err(|e| ArchiveError::from_binrw(e, "header"))
    }

    /// Validate the magic bytes
    pub fn validate(&self) -> ArchiveResult<()> {
        if self.magic != ARCHIVE_MAGIC {
            return Err(ArchiveError::InvalidMagic(self.magic));
        }
        Ok(())
    }
}

/// Archive generations understood by the drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatVersion {
    /// `.rgssad` (RPG Maker XP)
    V1,
    /// `.rgss2a` (RPG Maker VX), same layout as V1
    V2,
    /// `.rgss3a` (RPG Maker VX Ace)
    V3,
}

impl FormatVersion {
    /// Version byte stored in the header
    pub const fn header_byte(self) -> u8 {
        match self {
            Self::V1 | Self::V2 => 1,
            Self::V3 => 3,
        }
    }

    /// Conventional file extension (without the dot)
    pub const fn extension(self) -> &'static str {
        match self {
            Self::V1 => "rgssad",
            Self::V2 => "rgss2a",
            Self::V3 => "rgss3a",
        }
    }

    /// Map a file extension (any case) to the version it conventionally holds
    pub fn from_extension(ext: &str) -> Option<Self> {
        [Self::V1, Self::V2, Self::V3]
            .into_iter()
            .find(|v| v.extension().eq_ignore_ascii_case(ext))
    }

    /// Select the driver for a header version byte.
    ///
    /// V1 and V2 share version byte 1; the extension `hint` decides between them.
    /// Any byte other than 1 or 3 is an error regardless of the hint.
    pub fn detect(header_byte: u8, hint: Option<Self>) -> ArchiveResult<Self> {
        match header_byte {
            1 if hint == Some(Self::V2) => Ok(Self::V2),
            1 => Ok(Self::V1),
            3 => Ok(Self::V3),
            other => Err(ArchiveError::UnsupportedVersion(other)),
        }
    }

    /// Whether the file table is masked with an advancing key (V1/V2)
    pub const fn has_sequential_table(self) -> bool {
        matches!(self, Self::V1 | Self::V2)
    }
}

impl std::fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V1 => write!(f, "RGSSAD"),
            Self::V2 => write!(f, "RGSS2A"),
            Self::V3 => write!(f, "RGSS3A"),
        }
    }
}
