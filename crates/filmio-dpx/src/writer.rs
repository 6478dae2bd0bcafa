//! DPX file writing.
//!
//! [`Writer`] builds a header incrementally, reserves the header and user
//! data bytes up front, then appends element data in registration order.
//! Each [`write_element`] call records the running cursor as that
//! element's data offset; [`finish`] patches the file size and the
//! deferred offsets back into the already written header. The expected
//! call order (header, user data, elements, finish) is a documented
//! contract, not a state machine; only the few misuses that would corrupt
//! the file are rejected.
//!
//! [`write_element`]: Writer::write_element
//! [`finish`]: Writer::finish

use std::io::SeekFrom;
use std::path::Path;

use filmio_core::{Error, FileStream, Result, Sample, Stream};
use tracing::{debug, trace};

use crate::codec::{self, ElementLayout};
use crate::header::{
    ByteOrder, FileInfo, Header, ImageElement, GENERIC_SIZE, HEADER_SIZE, INDUSTRY_SIZE,
    MAX_ELEMENTS, UNDEF_U32,
};
use crate::types::{DataSize, Descriptor, Encoding, Orientation, Packing};

/// DPX writer over any seekable stream.
pub struct Writer<S: Stream> {
    stream: S,
    header: Header,
    cursor: u64,
    registered: usize,
    written: usize,
    header_written: bool,
}

impl Writer<FileStream> {
    /// Creates (or truncates) a DPX file for writing.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(FileStream::create(path)?))
    }
}

impl<S: Stream> Writer<S> {
    /// Wraps a stream with a blank big-endian header.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            header: Header::new(),
            cursor: 0,
            registered: 0,
            written: 0,
            header_written: false,
        }
    }

    /// Selects the output byte order (big-endian by default).
    pub fn set_byte_order(&mut self, order: ByteOrder) {
        self.header.byte_order = order;
    }

    /// Replaces the file information block. Size fields, version, and
    /// image offset are owned by the writer and re-asserted on
    /// [`write_header`](Writer::write_header).
    pub fn set_file_info(&mut self, info: FileInfo) {
        self.header.generic.file = info;
    }

    /// Sets the image dimensions, defaulting the orientation to
    /// left-to-right, top-to-bottom when it is still blank.
    pub fn set_image_info(&mut self, width: u32, height: u32) {
        let img = &mut self.header.generic.image;
        img.pixels_per_line = width;
        img.lines_per_element = height;
        if img.orientation == crate::header::UNDEF_U16 {
            img.orientation = Orientation::LeftToRightTopToBottom.code();
        }
    }

    /// Declares the user data length reserved between the fixed header
    /// and the first image byte.
    pub fn set_user_data_size(&mut self, size: u32) {
        self.header.generic.file.user_size = size;
    }

    /// Registers the next image element.
    ///
    /// Returns its index. Element data offsets stay unresolved until the
    /// matching [`write_element`](Writer::write_element) call.
    pub fn add_element(
        &mut self,
        descriptor: Descriptor,
        data_size: DataSize,
        packing: Packing,
    ) -> Result<usize> {
        if self.registered == MAX_ELEMENTS {
            return Err(Error::InvalidParameter(format!(
                "a dpx file holds at most {} elements",
                MAX_ELEMENTS
            )));
        }
        let index = self.registered;
        let el = &mut self.header.generic.image.elements[index];
        el.data_sign = 0;
        el.descriptor = descriptor.code();
        el.bit_size = data_size.bits();
        el.packing = packing.code();
        el.encoding = Encoding::None.code();
        el.eol_padding = 0;
        el.eoi_padding = 0;
        self.registered += 1;
        self.header.generic.image.element_count = self.registered as u16;
        Ok(index)
    }

    /// Mutable access to a registered element record, for transfer and
    /// colorimetric tags, padding, or a description string.
    pub fn element_mut(&mut self, index: usize) -> Option<&mut ImageElement> {
        if index < self.registered {
            Some(&mut self.header.generic.image.elements[index])
        } else {
            None
        }
    }

    /// The header as built so far; industry metadata (film and TV
    /// blocks) is edited here directly.
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Writes the header, reserving its bytes plus the declared user
    /// data area. Deferred fields (file size, element data offsets) stay
    /// at their sentinels until [`finish`](Writer::finish).
    pub fn write_header(&mut self) -> Result<()> {
        if self.header.width().is_none() || self.header.height().is_none() {
            return Err(Error::InvalidParameter(
                "image dimensions must be set before writing the header".into(),
            ));
        }
        let user = self.header.user_size().unwrap_or(0);
        let f = &mut self.header.generic.file;
        f.version = "V2.0".into();
        f.generic_size = GENERIC_SIZE;
        f.industry_size = INDUSTRY_SIZE;
        f.image_offset = HEADER_SIZE as u32 + user;

        self.header.write(&mut self.stream)?;
        if user > 0 {
            // Reserve the user data area so element offsets are final.
            self.stream.write_all(&vec![0u8; user as usize])?;
        }
        self.cursor = HEADER_SIZE as u64 + user as u64;
        self.header_written = true;
        debug!(
            image_offset = self.header.generic.file.image_offset,
            elements = self.registered,
            byte_order = ?self.header.byte_order,
            "wrote dpx header"
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

    /// Writes the next registered element's full image data.
    ///
    /// Elements go out in registration order; the running cursor becomes
    /// this element's data offset and advances by the element's exact
    /// byte span, padding included.
    pub fn write_element<T: Sample>(&mut self, data: &[T]) -> Result<usize> {
        if !self.header_written {
            return Err(Error::InvalidParameter(
                "elements are written after the header".into(),
            ));
        }
        if self.written == self.registered {
            return Err(Error::InvalidParameter(format!(
                "all {} registered elements already written",
                self.registered
            )));
        }
        let index = self.written;
        self.header.generic.image.elements[index].data_offset = offset_to_u32(self.cursor)?;

        codec::write_element(&mut self.stream, &self.header, index, data)?;
        let span = ElementLayout::from_header(&self.header, index)?.data_span();
        trace!(element = index, offset = self.cursor, span, "wrote dpx element");
        self.cursor += span;
        self.written += 1;
        Ok(index)
    }

    /// Patches the deferred header fields (file size, element count,
    /// data offsets) and flushes.
    ///
    /// Elements registered but never written keep the absent-offset
    /// sentinel, which readers reject.
    pub fn finish(&mut self) -> Result<()> {
        if !self.header_written {
            return Err(Error::InvalidParameter(
                "nothing to finish: header was never written".into(),
            ));
        }
        self.header.generic.file.file_size = if self.cursor > u64::from(UNDEF_U32) {
            UNDEF_U32
        } else {
            self.cursor as u32
        };
        self.header.patch_offsets(&mut self.stream)?;
        self.stream.flush()?;
        debug!(file_size = self.cursor, elements = self.written, "finished dpx file");
        Ok(())
    }

    /// Consumes the writer, returning the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

// Element data offsets live in 32-bit header fields; a cursor at or past
// the sentinel cannot be represented, unlike file size which may degrade
// to the sentinel.
fn offset_to_u32(offset: u64) -> Result<u32> {
    if offset >= u64::from(UNDEF_U32) {
        return Err(Error::InvalidParameter(format!(
            "data offset {} exceeds the 32-bit header field",
            offset
        )));
    }
    Ok(offset as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Reader;
    use crate::types::Characteristic;
    use filmio_core::MemoryStream;

    #[test]
    fn test_header_requires_dimensions() {
        let mut w = Writer::new(MemoryStream::new());
        assert!(matches!(w.write_header(), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_offsets_patched_after_finish() {
        let mut w = Writer::new(MemoryStream::new());
        w.set_image_info(2, 2);
        w.add_element(Descriptor::Rgb, DataSize::D16, Packing::Packed).unwrap();
        w.add_element(Descriptor::Luma, DataSize::D8, Packing::Packed).unwrap();
        w.write_header().unwrap();
        let rgb: Vec<u16> = (0..12).map(|i| i * 5000).collect();
        let gray: Vec<u8> = (0..4).collect();
        w.write_element(&rgb).unwrap();
        w.write_element(&gray).unwrap();
        w.finish().unwrap();

        let mut r = Reader::new(w.into_inner());
        let h = r.read_header().unwrap();
        assert_eq!(h.image_offset(), Some(HEADER_SIZE as u32));
        // rgb element: 2x2x3 u16 = 24 bytes per element, line = 12,
        // word-aligned already.
        assert_eq!(h.element(0).unwrap().data_offset, HEADER_SIZE as u32);
        assert_eq!(h.element(1).unwrap().data_offset, HEADER_SIZE as u32 + 24);
        assert_eq!(h.file_size(), Some(HEADER_SIZE as u32 + 24 + 4));
        assert_eq!(h.element_count(), 2);

        let mut back = vec![0u16; 12];
        r.read_image(0, &mut back).unwrap();
        assert_eq!(back, rgb);
        let mut gray_back = vec![0u8; 4];
        r.read_image(1, &mut gray_back).unwrap();
        assert_eq!(gray_back, gray);
    }

    #[test]
    fn test_user_data_reserved_and_written() {
        let mut w = Writer::new(MemoryStream::new());
        w.set_image_info(1, 1);
        w.set_user_data_size(16);
        w.add_element(Descriptor::Luma, DataSize::D8, Packing::Packed).unwrap();
        w.write_header().unwrap();
        w.write_user_data(b"timecode:01:02ab").unwrap();
        w.write_element(&[42u8]).unwrap();
        w.finish().unwrap();

        let mut r = Reader::new(w.into_inner());
        let h = r.read_header().unwrap();
        assert_eq!(h.image_offset(), Some(HEADER_SIZE as u32 + 16));
        assert_eq!(h.element(0).unwrap().data_offset, HEADER_SIZE as u32 + 16);
        assert_eq!(
            r.read_user_data().unwrap().as_deref(),
            Some(&b"timecode:01:02ab"[..])
        );
    }

    #[test]
    fn test_user_data_length_must_match() {
        let mut w = Writer::new(MemoryStream::new());
        w.set_image_info(1, 1);
        w.set_user_data_size(8);
        w.write_header().unwrap();
        assert!(matches!(
            w.write_user_data(b"short"),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_little_endian_file_round_trips() {
        let mut w = Writer::new(MemoryStream::new());
        w.set_byte_order(ByteOrder::Little);
        w.set_image_info(3, 1);
        let e = w.add_element(Descriptor::Rgb, DataSize::D10, Packing::FilledMethodA).unwrap();
        w.element_mut(e).unwrap().transfer = Characteristic::Logarithmic.code();
        w.write_header().unwrap();
        let data: Vec<u16> = (0u16..9).map(|i| filmio_core::bits::widen10((i * 113) % 1024)).collect();
        w.write_element(&data).unwrap();
        w.finish().unwrap();

        let raw = w.into_inner().into_inner();
        assert_eq!(&raw[0..4], b"XPDS");

        let mut r = Reader::new(MemoryStream::from_vec(raw));
        let h = r.read_header().unwrap();
        assert_eq!(h.element(0).unwrap().transfer(), Some(Characteristic::Logarithmic));
        let mut back = vec![0u16; 9];
        r.read_image(0, &mut back).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_element_offset_must_fit_header_field() {
        assert_eq!(offset_to_u32(HEADER_SIZE as u64).unwrap(), HEADER_SIZE as u32);
        assert_eq!(offset_to_u32(u64::from(UNDEF_U32) - 1).unwrap(), UNDEF_U32 - 1);
        assert!(matches!(
            offset_to_u32(u64::from(UNDEF_U32)),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            offset_to_u32(5 << 30),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_write_more_elements_than_registered() {
        let mut w = Writer::new(MemoryStream::new());
        w.set_image_info(1, 1);
        w.add_element(Descriptor::Luma, DataSize::D8, Packing::Packed).unwrap();
        w.write_header().unwrap();
        w.write_element(&[1u8]).unwrap();
        assert!(matches!(
            w.write_element(&[2u8]),
            Err(Error::InvalidParameter(_))
        ));
    }
}
