//! Deobfuscating substream over one archive entry

use crate::archive::index::ArchiveEntry;
use rgss_crypto::Keystream;
use std::io::{self, Read, Seek, SeekFrom};

/// Reader over a single entry payload.
///
/// Positions are relative to the start of the entry and [`len`](Self::len) is the
/// declared size. Reads at or past the end return `Ok(0)`. Seeking only moves the
/// cursor; the keystream is re-synchronised to the cursor on the next read, so any
/// seek pattern yields the same bytes as a straight sequential read.
#[derive(Debug, Clone)]
pub struct EntryReader<R> {
    inner: R,
    offset: u64,
    size: u64,
    position: u64,
    keystream: Keystream,
}

impl<R> EntryReader<R> {
    /// Create a reader for `entry` over `inner`, which reads the whole container.
    pub fn new(inner: R, entry: &ArchiveEntry) -> Self {
        Self {
            inner,
            offset: entry.offset,
            size: entry.size,
            position: 0,
            keystream: Keystream::new(entry.seed),
        }
    }

    /// Declared payload size
    pub fn len(&self) -> u64 {
        self.size
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Current position relative to the entry start
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Borrow the container reader
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Recover the container reader
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reader over the same entry and position, backed by another container handle.
    pub fn with_inner<S>(&self, inner: S) -> EntryReader<S> {
        EntryReader {
            inner,
            offset: self.offset,
            size: self.size,
            position: self.position,
            keystream: self.keystream.clone(),
        }
    }
}

impl<R: Read + Seek> Read for EntryReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.position >= self.size || buf.is_empty() {
            return Ok(0);
        }

        let remaining = self.size - self.position;
        let want = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));

        self.inner
            .seek(SeekFrom::Start(self.offset + self.position))?;
        let read = self.inner.read(&mut buf[..want])?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "archive container ended inside an entry payload",
            ));
        }

        self.keystream.seek(self.position);
        self.keystream.apply(&mut buf[..read]);
        self.position += read as u64;

        Ok(read)
    }
}

impl<R: Read + Seek> Seek for EntryReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
            SeekFrom::End(delta) => self.size.checked_add_signed(delta),
        };

        let target = target.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )
        })?;
        self.position = target;
        Ok(target)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position)
    }
}
