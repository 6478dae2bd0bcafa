//! Cineon file reading.

use std::io::SeekFrom;
use std::path::Path;

use filmio_core::{Error, FileStream, Result, Sample, Stream};
use tracing::debug;

use crate::codec;
use crate::header::{Header, HEADER_SIZE};

/// Cineon reader over any seekable stream.
pub struct Reader<S: Stream> {
    stream: S,
    header: Header,
    parsed: bool,
}

impl Reader<FileStream> {
    /// Opens a Cineon file read-only and parses its header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut r = Self::new(FileStream::open(path)?);
        r.read_header()?;
        Ok(r)
    }
}

impl<S: Stream> Reader<S> {
    /// Wraps a stream without touching it; call [`read_header`]
    /// before any pixel access.
    ///
    /// [`read_header`]: Reader::read_header
    pub fn new(stream: S) -> Self {
        Self { stream, header: Header::new(), parsed: false }
    }

    /// Parses and validates the header at the start of the stream.
    pub fn read_header(&mut self) -> Result<&Header> {
        self.header.read(&mut self.stream)?;
        self.parsed = true;
        debug!(
            width = ?self.header.width(),
            height = ?self.header.height(),
            channels = self.header.channel_count(),
            byte_order = ?self.header.byte_order,
            "parsed cineon header"
        );
        Ok(&self.header)
    }

    /// The parsed header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    fn check_parsed(&self) -> Result<()> {
        if self.parsed {
            Ok(())
        } else {
            Err(Error::InvalidParameter("header not read yet".into()))
        }
    }

    /// Reads the full image into `out` (`width * height * channels`
    /// samples, scan order, sub-word depths widened to 16 bits).
    pub fn read_image<T: Sample>(&mut self, out: &mut [T]) -> Result<()> {
        self.check_parsed()?;
        codec::read_image(&mut self.stream, &self.header, out)
    }

    /// Reads the user data area, `None` when the header declares none.
    pub fn read_user_data(&mut self) -> Result<Option<Vec<u8>>> {
        self.check_parsed()?;
        let Some(size) = self.header.user_size() else {
            return Ok(None);
        };
        self.stream.seek(SeekFrom::Start(HEADER_SIZE as u64))?;
        let mut data = vec![0u8; size as usize];
        self.stream.read_exact(&mut data)?;
        Ok(Some(data))
    }

    /// Consumes the reader, returning the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}
