//! Seekable byte stream abstraction.
//!
//! The codecs are agnostic about where bytes live: a [`Stream`] is any
//! seekable source/sink, and the two provided backings cover the common
//! cases:
//!
//! - [`FileStream`] - a file on disk
//! - [`MemoryStream`] - a growable in-memory buffer
//!
//! Every call may block. Failures are surfaced immediately as
//! [`Error::Io`](crate::Error::Io) and never retried; after a failure the
//! caller simply stops issuing calls.
//!
//! # Example
//!
//! ```
//! use filmio_core::{MemoryStream, Stream};
//! use std::io::SeekFrom;
//!
//! let mut s = MemoryStream::new();
//! s.write_all(b"SDPX").unwrap();
//! s.seek(SeekFrom::Start(0)).unwrap();
//!
//! let mut magic = [0u8; 4];
//! s.read_exact(&mut magic).unwrap();
//! assert_eq!(&magic, b"SDPX");
//! assert!(s.eof().unwrap());
//! ```

use crate::Result;
use std::fs::{File, OpenOptions};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// A seekable byte source/sink.
///
/// Blanket-implemented for anything that is `Read + Write + Seek`, so
/// `std::io` types plug in directly. The codec layers are generic over
/// `S: Stream` and never name a concrete backing.
pub trait Stream {
    /// Reads up to `buf.len()` bytes, returning the count actually read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Reads exactly `buf.len()` bytes or fails.
    ///
    /// A short read is a hard failure; partial data is never returned.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Writes the whole buffer or fails.
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;

    /// Repositions the stream cursor, returning the new absolute offset.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64>;

    /// Returns the current absolute offset.
    fn tell(&mut self) -> Result<u64>;

    /// Flushes buffered writes to the backing.
    fn flush(&mut self) -> Result<()>;

    /// Returns true when the cursor is at (or past) the end of the stream.
    fn eof(&mut self) -> Result<bool>;
}

impl<T: Read + Write + Seek> Stream for T {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(Read::read(self, buf)?)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        Ok(Read::read_exact(self, buf)?)
    }

    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        Ok(Write::write_all(self, buf)?)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        Ok(Seek::seek(self, pos)?)
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(Seek::stream_position(self)?)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(Write::flush(self)?)
    }

    fn eof(&mut self) -> Result<bool> {
        let pos = Seek::stream_position(self)?;
        let end = Seek::seek(self, SeekFrom::End(0))?;
        if pos != end {
            Seek::seek(self, SeekFrom::Start(pos))?;
        }
        Ok(pos >= end)
    }
}

/// File-backed stream.
///
/// Opened read-only via [`open`](FileStream::open) for decoding, or
/// read-write via [`create`](FileStream::create) for encoding. Access is
/// unbuffered: the codecs read and write in line-sized chunks and seek
/// frequently, which defeats a read-ahead buffer.
#[derive(Debug)]
pub struct FileStream {
    inner: File,
}

impl FileStream {
    /// Opens an existing file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self { inner: File::open(path)? })
    }

    /// Creates (or truncates) a file for writing.
    ///
    /// The file is opened read-write: encoders re-seek into the header
    /// region to patch deferred offsets after the pixel data is out.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let inner = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self { inner })
    }
}

// Delegation is spelled through the std::io traits: `File` also satisfies
// the blanket `Stream` bound, so a bare `self.inner.read(..)` would be
// ambiguous between the two traits.
impl Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        Read::read(&mut self.inner, buf)
    }
}

impl Write for FileStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Write::write(&mut self.inner, buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Write::flush(&mut self.inner)
    }
}

impl Seek for FileStream {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        Seek::seek(&mut self.inner, pos)
    }
}

/// Memory-backed stream over a growable `Vec<u8>`.
///
/// Useful for tests and for encoding straight into a buffer that is handed
/// elsewhere (network, archive, ...).
#[derive(Debug, Default)]
pub struct MemoryStream {
    inner: Cursor<Vec<u8>>,
}

impl MemoryStream {
    /// Creates an empty stream positioned at offset 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing buffer, positioned at offset 0.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { inner: Cursor::new(data) }
    }

    /// Borrows the underlying bytes.
    pub fn as_slice(&self) -> &[u8] {
        self.inner.get_ref()
    }

    /// Consumes the stream and returns the underlying buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.inner.into_inner()
    }

    /// Total length of the underlying buffer in bytes.
    pub fn len(&self) -> usize {
        self.inner.get_ref().len()
    }

    /// Returns true when the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.get_ref().is_empty()
    }
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        Read::read(&mut self.inner, buf)
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Write::write(&mut self.inner, buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Write::flush(&mut self.inner)
    }
}

impl Seek for MemoryStream {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        Seek::seek(&mut self.inner, pos)
    }
}
