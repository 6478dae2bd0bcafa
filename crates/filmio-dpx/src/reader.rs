//! DPX file reading.
//!
//! [`Reader`] wraps a [`Stream`], parses and holds the header, and hands
//! pixel access to the element codec. Elements are independent: they can
//! be read in any order, repeatedly, whole or as rectangular blocks.

use std::io::SeekFrom;
use std::path::Path;

use filmio_core::{Block, Error, FileStream, Result, Sample, Stream};
use tracing::debug;

use crate::codec;
use crate::header::{Header, HEADER_SIZE};

/// DPX reader over any seekable stream.
pub struct Reader<S: Stream> {
    stream: S,
    header: Header,
    parsed: bool,
}

impl Reader<FileStream> {
    /// Opens a DPX file read-only and parses its header.
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
    ///
    /// Byte order is detected from the magic cookie; every later read
    /// from this stream honors it.
    pub fn read_header(&mut self) -> Result<&Header> {
        self.header.read(&mut self.stream)?;
        self.parsed = true;
        debug!(
            width = ?self.header.width(),
            height = ?self.header.height(),
            elements = self.header.element_count(),
            byte_order = ?self.header.byte_order,
            "parsed dpx header"
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

    /// Reads one element's full image into `out` (`width * height *
    /// components` samples, scan order, sub-word depths widened to 16
    /// bits).
    pub fn read_image<T: Sample>(&mut self, element: usize, out: &mut [T]) -> Result<()> {
        self.check_parsed()?;
        codec::read_element(&mut self.stream, &self.header, element, out)
    }

    /// Reads a rectangular block of one element into `out`.
    pub fn read_block<T: Sample>(
        &mut self,
        element: usize,
        block: Block,
        out: &mut [T],
    ) -> Result<()> {
        self.check_parsed()?;
        codec::read_block(&mut self.stream, &self.header, element, block, out)
    }

    /// Reads the user data area, `None` when the header declares none.
    ///
    /// User data sits between the fixed header and the first image byte;
    /// its declared length is trusted as-is.
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::MAGIC;
    use filmio_core::MemoryStream;

    #[test]
    fn test_pixel_access_requires_header() {
        let mut r = Reader::new(MemoryStream::new());
        let mut out = [0u16; 4];
        assert!(matches!(
            r.read_image(0, &mut out),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_bad_magic_reported() {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&0xDEAD_BEEFu32.to_be_bytes());
        let mut r = Reader::new(MemoryStream::from_vec(bytes));
        assert!(matches!(r.read_header(), Err(Error::BadMagic(0xDEAD_BEEF))));
    }

    #[test]
    fn test_truncated_header_is_io_error() {
        let mut r = Reader::new(MemoryStream::from_vec(MAGIC.to_be_bytes().to_vec()));
        assert!(matches!(r.read_header(), Err(Error::Io(_))));
    }
}
