//! Cineon file writing.
//!
//! Same orchestration contract as the DPX writer: build the header,
//! reserve its bytes plus any user data, write the image, then
//! [`finish`] patches the fields only known after encoding.
//!
//! [`finish`]: Writer::finish

use std::io::SeekFrom;
use std::path::Path;

use filmio_core::{Error, FileStream, Result, Sample, Stream};
use tracing::debug;

use crate::codec::{self, ImageLayout};
use crate::header::{ByteOrder, Header, MAX_CHANNELS, UNDEF_U32, HEADER_SIZE};
use crate::types::{ChannelKind, CineonPacking, Depth};

/// Cineon writer over any seekable stream.
pub struct Writer<S: Stream> {
    stream: S,
    header: Header,
    cursor: u64,
    header_written: bool,
    image_written: bool,
}

impl Writer<FileStream> {
    /// Creates (or truncates) a Cineon file for writing.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(FileStream::create(path)?))
    }
}

impl<S: Stream> Writer<S> {
    /// Wraps a stream with a blank big-endian header; the defaults are
    /// 10-bit filled-left pixel interleave, the dominant scan layout.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            header: Header::new(),
            cursor: 0,
            header_written: false,
            image_written: false,
        }
    }

    /// Selects the output byte order (big-endian by default).
    pub fn set_byte_order(&mut self, order: ByteOrder) {
        self.header.byte_order = order;
    }

    /// Declares image geometry and channel layout in one call: every
    /// channel shares the same dimensions and depth.
    pub fn set_image_info(
        &mut self,
        width: u32,
        height: u32,
        kinds: &[ChannelKind],
        depth: Depth,
        packing: CineonPacking,
    ) -> Result<()> {
        if kinds.is_empty() || kinds.len() > MAX_CHANNELS {
            return Err(Error::InvalidParameter(format!(
                "a cineon file holds 1 to {} channels, got {}",
                MAX_CHANNELS,
                kinds.len()
            )));
        }
        self.header.image.orientation = 0;
        self.header.image.channel_count = kinds.len() as u8;
        for (i, kind) in kinds.iter().enumerate() {
            let ch = &mut self.header.image.channels[i];
            ch.designator = [0, kind.code()];
            ch.bits_per_sample = depth.bits();
            ch.pixels_per_line = width;
            ch.lines_per_image = height;
            ch.min_data = 0.0;
            ch.max_data = ((1u32 << depth.bits()) - 1) as f32;
        }
        self.header.format.packing = packing.code();
        Ok(())
    }

    /// Declares the user data length reserved between the fixed header
    /// and the image data.
    pub fn set_user_data_size(&mut self, size: u32) {
        self.header.file.user_size = size;
    }

    /// The header as built so far, for origination and film metadata.
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Writes the header, reserving its bytes plus the declared user
    /// data area and fixing the image data offset.
    pub fn write_header(&mut self) -> Result<()> {
        if self.header.width().is_none() || self.header.height().is_none() {
            return Err(Error::InvalidParameter(
                "image geometry must be set before writing the header".into(),
            ));
        }
        let user = self.header.user_size().unwrap_or(0);
        self.header.file.image_offset = HEADER_SIZE as u32 + user;

        self.header.write(&mut self.stream)?;
        if user > 0 {
            self.stream.write_all(&vec![0u8; user as usize])?;
        }
        self.cursor = HEADER_SIZE as u64 + user as u64;
        self.header_written = true;
        debug!(
            image_offset = self.header.file.image_offset,
            channels = self.header.channel_count(),
            "wrote cineon header"
        );
        Ok(())
    }

    /// Fills the reserved user data area. Must match the declared
    /// length exactly.
    pub fn write_user_data(&mut self, data: &[u8]) -> Result<()> {
        if !self.header_written {
            return Err(Error::InvalidParameter(
                "user data is written after the header".into(),
            ));
        }
        let declared = self.header.user_size().unwrap_or(0) as usize;
        if data.len() != declared {
            return Err(Error::InvalidParameter(format!(
                "user data is {} bytes, header declares {}",
                data.len(),
                declared
            )));
        }
        self.stream.seek(SeekFrom::Start(HEADER_SIZE as u64))?;
        self.stream.write_all(data)?;
        Ok(())
    }

    /// Writes the full image (`width * height * channels` samples, scan
    /// order; 10/12-bit data as replication-widened 16-bit values).
    pub fn write_image<T: Sample>(&mut self, data: &[T]) -> Result<()> {
        if !self.header_written {
            return Err(Error::InvalidParameter(
                "image data is written after the header".into(),
            ));
        }
        if self.image_written {
            return Err(Error::InvalidParameter("image already written".into()));
        }
        codec::write_image(&mut self.stream, &self.header, data)?;
        self.cursor += ImageLayout::from_header(&self.header)?.data_span();
        self.image_written = true;
        Ok(())
    }

    /// Patches the file size into the header and flushes.
    pub fn finish(&mut self) -> Result<()> {
        if !self.header_written {
            return Err(Error::InvalidParameter(
                "nothing to finish: header was never written".into(),
            ));
        }
        self.header.file.file_size = if self.cursor > u64::from(UNDEF_U32) {
            UNDEF_U32
        } else {
            self.cursor as u32
        };
        self.header.patch_offsets(&mut self.stream)?;
        self.stream.flush()?;
        debug!(file_size = self.cursor, "finished cineon file");
        Ok(())
    }

    /// Consumes the writer, returning the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Reader;
    use filmio_core::bits;
    use filmio_core::MemoryStream;

    const RGB: [ChannelKind; 3] = [ChannelKind::Red, ChannelKind::Green, ChannelKind::Blue];

    #[test]
    fn test_header_requires_geometry() {
        let mut w = Writer::new(MemoryStream::new());
        assert!(matches!(w.write_header(), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_write_read_roundtrip() {
        let mut w = Writer::new(MemoryStream::new());
        w.set_image_info(4, 3, &RGB, Depth::D10, CineonPacking::FilledLeft).unwrap();
        w.write_header().unwrap();
        let data: Vec<u16> =
            (0u16..4 * 3 * 3).map(|i| bits::widen10((i * 29) % 1024)).collect();
        w.write_image(&data).unwrap();
        w.finish().unwrap();

        let mut r = Reader::new(w.into_inner());
        let h = r.read_header().unwrap();
        assert_eq!(h.width(), Some(4));
        assert_eq!(h.height(), Some(3));
        assert_eq!(h.channel_count(), 3);
        assert_eq!(h.image_offset(), Some(HEADER_SIZE as u32));
        // 4 px * 3 ch = 12 samples/line -> 4 words -> 16 bytes, 3 lines.
        assert_eq!(h.file_size(), Some(HEADER_SIZE as u32 + 3 * 16));

        let mut back = vec![0u16; data.len()];
        r.read_image(&mut back).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_user_data_area() {
        let mut w = Writer::new(MemoryStream::new());
        w.set_image_info(1, 1, &[ChannelKind::Luma], Depth::D8, CineonPacking::Packed).unwrap();
        w.set_user_data_size(4);
        w.write_header().unwrap();
        w.write_user_data(b"reel").unwrap();
        w.write_image(&[200u8]).unwrap();
        w.finish().unwrap();

        let mut r = Reader::new(w.into_inner());
        let h = r.read_header().unwrap();
        assert_eq!(h.image_offset(), Some(HEADER_SIZE as u32 + 4));
        assert_eq!(r.read_user_data().unwrap().as_deref(), Some(&b"reel"[..]));
        let mut back = [0u8; 1];
        r.read_image(&mut back).unwrap();
        assert_eq!(back, [200]);
    }

    #[test]
    fn test_double_image_write_rejected() {
        let mut w = Writer::new(MemoryStream::new());
        w.set_image_info(1, 1, &[ChannelKind::Luma], Depth::D8, CineonPacking::Packed).unwrap();
        w.write_header().unwrap();
        w.write_image(&[1u8]).unwrap();
        assert!(matches!(
            w.write_image(&[2u8]),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_too_many_channels_rejected() {
        let mut w = Writer::new(MemoryStream::new());
        let kinds = [ChannelKind::Luma; 9];
        assert!(matches!(
            w.set_image_info(1, 1, &kinds, Depth::D10, CineonPacking::FilledLeft),
            Err(Error::InvalidParameter(_))
        ));
    }
}
