//! Stream adapter
//!
//! Every byte source the filesystem hands out (host files, memory-mapped
//! archives, archive entries) implements [`IoStream`], and callers receive it
//! wrapped in a [`GenericStream`].

use crate::error::Result;
use bytes::Bytes;
use rgss_formats::EntryReader;
use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Native byte source with a known length that can be duplicated.
///
/// Reads at or past the end return `Ok(0)`; seeking past the end is allowed and
/// seeking before the start is an `InvalidInput` error.
pub trait IoStream: Read + Seek + Send + Sync + fmt::Debug {
    /// Total length in bytes
    fn length(&self) -> io::Result<u64>;

    /// Independent handle positioned where this one is
    fn duplicate(&self) -> io::Result<Box<dyn IoStream>>;
}

/// Host file opened by path
#[derive(Debug)]
pub struct FileStream {
    path: PathBuf,
    file: File,
}

impl FileStream {
    /// Open `path` for reading
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        Ok(Self { path, file })
    }

    /// Host path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for FileStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl IoStream for FileStream {
    fn length(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn duplicate(&self) -> io::Result<Box<dyn IoStream>> {
        let position = (&self.file).stream_position()?;
        let mut copy = Self::open(&self.path)?;
        copy.file.seek(SeekFrom::Start(position))?;
        Ok(Box::new(copy))
    }
}

/// Shared immutable buffer, used for memory-mapped archives
#[derive(Debug, Clone)]
pub struct MemoryStream {
    cursor: Cursor<Bytes>,
}

impl MemoryStream {
    /// Wrap `data`, positioned at the start
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            cursor: Cursor::new(data.into()),
        }
    }
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for MemoryStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

impl IoStream for MemoryStream {
    fn length(&self) -> io::Result<u64> {
        Ok(self.cursor.get_ref().len() as u64)
    }

    fn duplicate(&self) -> io::Result<Box<dyn IoStream>> {
        Ok(Box::new(self.clone()))
    }
}

impl IoStream for EntryReader<Box<dyn IoStream>> {
    fn length(&self) -> io::Result<u64> {
        Ok(self.len())
    }

    fn duplicate(&self) -> io::Result<Box<dyn IoStream>> {
        let container = self.get_ref().duplicate()?;
        Ok(Box::new(self.with_inner(container)))
    }
}

/// Handle returned to callers for one opened file.
///
/// Owns exactly one native stream, which is released when the handle is closed
/// or dropped. Positioning goes through [`Read`] and [`Seek`].
#[derive(Debug)]
pub struct GenericStream {
    inner: Box<dyn IoStream>,
    path: String,
}

impl GenericStream {
    /// Wrap a native stream opened for `path`
    pub fn new(inner: Box<dyn IoStream>, path: impl Into<String>) -> Self {
        Self {
            inner,
            path: path.into(),
        }
    }

    /// Logical path the stream was opened for, with its real casing
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Current position
    pub fn tell(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    /// Total length of the file
    pub fn length(&self) -> Result<u64> {
        Ok(self.inner.length()?)
    }

    /// Open an independent handle at the same position
    pub fn duplicate(&self) -> Result<Self> {
        Ok(Self {
            inner: self.inner.duplicate()?,
            path: self.path.clone(),
        })
    }

    /// Read the rest of the stream into a new buffer
    pub fn read_remaining(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.inner.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Release the native handle
    pub fn close(self) {
        drop(self.inner);
    }
}

impl Read for GenericStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for GenericStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}
