//! Cineon image data codec.
//!
//! A Cineon file carries one pixel-interleaved image; the codec decodes
//! and encodes full frames line by line using the shared packing
//! primitives. 10-bit samples in filled 32-bit words are the layout
//! virtually every scanner writes and the only filled depth supported;
//! the packed bitstream path covers all four integer depths. Decoded
//! 10/12-bit samples are widened to 16 bits by replication, encoding
//! narrows by the mirror shift.
//!
//! Line and channel interleave are recognized header codes without a
//! decode path; they report [`Error::Unimplemented`] rather than
//! misordered pixels.

use std::io::SeekFrom;

use filmio_core::bits::{self, Sample};
use filmio_core::{Error, Result, Stream};

use crate::header::{ByteOrder, Header};
use crate::types::{CineonPacking, Depth, Interleave};

/// Resolved storage geometry of the image, validated up front.
#[derive(Debug, Clone, Copy)]
pub struct ImageLayout {
    /// Pixels per line.
    pub width: u32,
    /// Lines in the image.
    pub height: u32,
    /// Interleaved channels per pixel.
    pub channels: u32,
    /// Bits per sample.
    pub depth: Depth,
    /// Packing convention.
    pub packing: CineonPacking,
    /// Absolute file offset of the first image data byte.
    pub data_offset: u64,
    /// End-of-line padding in bytes.
    pub eol_padding: u64,
    /// True when the file is big-endian.
    pub big_endian: bool,
}

impl ImageLayout {
    /// Builds a layout from a validated header.
    ///
    /// All populated channels must agree on geometry and depth; mixed
    /// records and non-pixel interleave have no decode path.
    pub fn from_header(header: &Header) -> Result<Self> {
        let channels = header.channel_count() as u32;
        if channels == 0 {
            return Err(Error::InvalidParameter("header declares no channels".into()));
        }
        let width = header
            .width()
            .ok_or(Error::Truncated("channel width unset"))?;
        let height = header
            .height()
            .ok_or(Error::Truncated("channel height unset"))?;
        let first = header.channel(0).ok_or(Error::Truncated("channel 0 missing"))?;
        let depth = first.depth().ok_or(Error::UnsupportedLayout {
            bits: first.bits_per_sample,
            packing: header.format.packing as u16,
        })?;
        for i in 1..channels as usize {
            let ch = header.channel(i).ok_or(Error::Truncated("channel record missing"))?;
            if ch.pixels_per_line != first.pixels_per_line
                || ch.lines_per_image != first.lines_per_image
                || ch.bits_per_sample != first.bits_per_sample
            {
                return Err(Error::InvalidParameter(format!(
                    "channel {} geometry differs from channel 0",
                    i
                )));
            }
        }

        match header.interleave() {
            Some(Interleave::Pixel) => {}
            Some(_) => return Err(Error::Unimplemented("line/channel interleave")),
            None => {
                return Err(Error::InvalidParameter(format!(
                    "unknown interleave code {}",
                    header.format.interleave
                )))
            }
        }
        let packing = header.packing().ok_or(Error::UnsupportedLayout {
            bits: depth.bits(),
            packing: header.format.packing as u16,
        })?;
        let data_offset = header
            .image_offset()
            .ok_or(Error::Truncated("image data offset unset"))?;

        Ok(Self {
            width,
            height,
            channels,
            depth,
            packing,
            data_offset: data_offset as u64,
            eol_padding: header.format.eol_padding as u64,
            big_endian: header.byte_order == ByteOrder::Big,
        })
    }

    /// Stored samples per line across all channels.
    pub fn samples_per_line(&self) -> u64 {
        self.width as u64 * self.channels as u64
    }

    /// Bytes of one stored line before end-of-line padding.
    pub fn bytes_per_line(&self) -> u64 {
        let spl = self.samples_per_line();
        match (self.depth, self.packing) {
            (Depth::D8, _) => spl,
            (Depth::D16, _) => spl * 2,
            (Depth::D10, CineonPacking::FilledLeft | CineonPacking::FilledRight) => {
                (spl + 2) / 3 * 4
            }
            (_, CineonPacking::Packed) => (spl * self.depth.bits() as u64 + 31) / 32 * 4,
            // 12-bit filled has no on-disk convention worth guessing at.
            _ => 0,
        }
    }

    /// Total byte span of the image data area, padding included.
    pub fn data_span(&self) -> u64 {
        (self.bytes_per_line() + self.eol_padding) * self.height as u64
    }

    fn check_supported(&self) -> Result<()> {
        match (self.depth, self.packing) {
            (Depth::D8 | Depth::D16, _) => Ok(()),
            (Depth::D10, _) => Ok(()),
            (Depth::D12, CineonPacking::Packed) => Ok(()),
            _ => Err(Error::UnsupportedLayout {
                bits: self.depth.bits(),
                packing: self.packing.code() as u16,
            }),
        }
    }
}

/// Reads the full image into `out` (`width * height * channels` samples,
/// scan order, 10/12-bit widened to 16).
pub fn read_image<T: Sample, S: Stream>(
    stream: &mut S,
    header: &Header,
    out: &mut [T],
) -> Result<()> {
    let lay = ImageLayout::from_header(header)?;
    lay.check_supported()?;
    let total = lay.samples_per_line() * lay.height as u64;
    if (out.len() as u64) < total {
        return Err(Error::InvalidParameter(format!(
            "output holds {} samples, image needs {}",
            out.len(),
            total
        )));
    }
    let out = &mut out[..total as usize];

    let be = lay.big_endian;
    let spl = lay.samples_per_line() as usize;
    let bpl = lay.bytes_per_line() as usize;
    let stride = lay.bytes_per_line() + lay.eol_padding;
    let mut scratch = vec![0u8; bpl];

    for (row, dst) in out.chunks_mut(spl).enumerate() {
        stream.seek(SeekFrom::Start(lay.data_offset + row as u64 * stride))?;
        stream.read_exact(&mut scratch)?;
        decode_line(&scratch, &lay, be, dst)?;
    }
    Ok(())
}

/// Writes the full image at the layout's data offset, emitting
/// end-of-line padding as zeros.
pub fn write_image<T: Sample, S: Stream>(
    stream: &mut S,
    header: &Header,
    data: &[T],
) -> Result<()> {
    let lay = ImageLayout::from_header(header)?;
    lay.check_supported()?;
    let total = lay.samples_per_line() * lay.height as u64;
    if data.len() as u64 != total {
        return Err(Error::InvalidParameter(format!(
            "image data holds {} samples, image needs {}",
            data.len(),
            total
        )));
    }

    let spl = lay.samples_per_line() as usize;
    let bpl = lay.bytes_per_line() as usize;
    let mut line = vec![0u8; bpl + lay.eol_padding as usize];

    stream.seek(SeekFrom::Start(lay.data_offset))?;
    for src in data.chunks(spl) {
        line.fill(0);
        encode_line(src, &lay, &mut line[..bpl])?;
        stream.write_all(&line)?;
    }
    Ok(())
}

fn decode_line<T: Sample>(raw: &[u8], lay: &ImageLayout, be: bool, dst: &mut [T]) -> Result<()> {
    match (lay.depth, lay.packing) {
        (Depth::D8, _) => {
            for (b, o) in raw.iter().zip(dst.iter_mut()) {
                *o = T::from_raw(*b as u64, 8);
            }
            Ok(())
        }
        (Depth::D16, _) => {
            for (chunk, o) in raw.chunks_exact(2).zip(dst.iter_mut()) {
                *o = T::from_raw(u16::read_bytes(chunk, be) as u64, 16);
            }
            Ok(())
        }
        (Depth::D10, CineonPacking::FilledLeft | CineonPacking::FilledRight) => {
            let right = lay.packing == CineonPacking::FilledRight;
            for (k, o) in dst.iter_mut().enumerate() {
                let word = u32::read_bytes(&raw[k / 3 * 4..k / 3 * 4 + 4], be);
                let v = bits::extract_filled10(word, k % 3, right);
                *o = T::from_raw(bits::widen10(v) as u64, 16);
            }
            Ok(())
        }
        (Depth::D10 | Depth::D12, CineonPacking::Packed) => {
            let nbits = lay.depth.bits() as usize;
            let mut words = vec![0u32; raw.len() / 4];
            for (w, chunk) in words.iter_mut().zip(raw.chunks_exact(4)) {
                *w = u32::read_bytes(chunk, be);
            }
            for (k, o) in dst.iter_mut().enumerate() {
                let v = bits::extract_packed(&words, k * nbits, nbits as u32) as u16;
                let wide = match lay.depth {
                    Depth::D10 => bits::widen10(v),
                    _ => bits::widen12(v),
                };
                *o = T::from_raw(wide as u64, 16);
            }
            Ok(())
        }
        _ => Err(Error::UnsupportedLayout {
            bits: lay.depth.bits(),
            packing: lay.packing.code() as u16,
        }),
    }
}

fn encode_line<T: Sample>(src: &[T], lay: &ImageLayout, dst: &mut [u8]) -> Result<()> {
    let be = lay.big_endian;
    match (lay.depth, lay.packing) {
        (Depth::D8, _) => {
            for (v, b) in src.iter().zip(dst.iter_mut()) {
                *b = v.to_raw(8) as u8;
            }
            Ok(())
        }
        (Depth::D16, _) => {
            for (v, chunk) in src.iter().zip(dst.chunks_exact_mut(2)) {
                (v.to_raw(16) as u16).write_bytes(chunk, be);
            }
            Ok(())
        }
        (Depth::D10, CineonPacking::FilledLeft | CineonPacking::FilledRight) => {
            let right = lay.packing == CineonPacking::FilledRight;
            for (group, chunk) in src.chunks(3).zip(dst.chunks_exact_mut(4)) {
                let mut word = 0u32;
                for (i, v) in group.iter().enumerate() {
                    let n = bits::narrow10(v.to_raw(16) as u16);
                    bits::insert_filled10(&mut word, i, right, n);
                }
                word.write_bytes(chunk, be);
            }
            Ok(())
        }
        (Depth::D10 | Depth::D12, CineonPacking::Packed) => {
            let nbits = lay.depth.bits() as usize;
            let mut words = vec![0u32; dst.len() / 4];
            for (k, v) in src.iter().enumerate() {
                let n = match lay.depth {
                    Depth::D10 => bits::narrow10(v.to_raw(16) as u16),
                    _ => bits::narrow12(v.to_raw(16) as u16),
                };
                bits::insert_packed(&mut words, k * nbits, nbits as u32, n as u32);
            }
            for (w, chunk) in words.iter().zip(dst.chunks_exact_mut(4)) {
                w.write_bytes(chunk, be);
            }
            Ok(())
        }
        _ => Err(Error::UnsupportedLayout {
            bits: lay.depth.bits(),
            packing: lay.packing.code() as u16,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChannelKind;
    use filmio_core::MemoryStream;

    fn header(width: u32, height: u32, depth: Depth, packing: CineonPacking) -> Header {
        let mut h = Header::new();
        h.file.image_offset = 2048;
        h.image.channel_count = 3;
        for (i, kind) in [ChannelKind::Red, ChannelKind::Green, ChannelKind::Blue]
            .into_iter()
            .enumerate()
        {
            let ch = &mut h.image.channels[i];
            ch.designator = [0, kind.code()];
            ch.bits_per_sample = depth.bits();
            ch.pixels_per_line = width;
            ch.lines_per_image = height;
        }
        h.format.packing = packing.code();
        h
    }

    fn gradient(n: usize, max: u16) -> Vec<u16> {
        (0..n).map(|i| ((i * 37) % (max as usize + 1)) as u16).collect()
    }

    fn roundtrip(h: &Header, data: &[u16]) -> Vec<u16> {
        let mut stream = MemoryStream::new();
        write_image(&mut stream, h, data).unwrap();
        let mut back = vec![0u16; data.len()];
        read_image(&mut stream, h, &mut back).unwrap();
        back
    }

    #[test]
    fn test_roundtrip_10bit_filled_left() {
        let h = header(7, 3, Depth::D10, CineonPacking::FilledLeft);
        let data: Vec<u16> = gradient(7 * 3 * 3, 1023).iter().map(|&v| bits::widen10(v)).collect();
        assert_eq!(roundtrip(&h, &data), data);
    }

    #[test]
    fn test_roundtrip_10bit_filled_right() {
        let h = header(5, 2, Depth::D10, CineonPacking::FilledRight);
        let data: Vec<u16> = gradient(5 * 2 * 3, 1023).iter().map(|&v| bits::widen10(v)).collect();
        assert_eq!(roundtrip(&h, &data), data);
    }

    #[test]
    fn test_roundtrip_10bit_packed() {
        let h = header(8, 2, Depth::D10, CineonPacking::Packed);
        let data: Vec<u16> = gradient(8 * 2 * 3, 1023).iter().map(|&v| bits::widen10(v)).collect();
        assert_eq!(roundtrip(&h, &data), data);
    }

    #[test]
    fn test_roundtrip_12bit_packed() {
        let h = header(6, 2, Depth::D12, CineonPacking::Packed);
        let data: Vec<u16> = gradient(6 * 2 * 3, 4095).iter().map(|&v| bits::widen12(v)).collect();
        assert_eq!(roundtrip(&h, &data), data);
    }

    #[test]
    fn test_roundtrip_8_and_16bit() {
        let h8 = header(4, 2, Depth::D8, CineonPacking::FilledLeft);
        let data8: Vec<u16> = gradient(4 * 2 * 3, 255).iter().map(|&v| v << 8 | v).collect();
        assert_eq!(roundtrip(&h8, &data8), data8);

        let h16 = header(4, 2, Depth::D16, CineonPacking::FilledLeft);
        let data16 = gradient(4 * 2 * 3, u16::MAX);
        assert_eq!(roundtrip(&h16, &data16), data16);
    }

    #[test]
    fn test_eol_padding_skipped() {
        let mut h = header(3, 2, Depth::D8, CineonPacking::Packed);
        h.format.eol_padding = 7;
        let data = gradient(3 * 2 * 3, 255).iter().map(|&v| v << 8 | v).collect::<Vec<_>>();

        let mut stream = MemoryStream::new();
        write_image(&mut stream, &h, &data).unwrap();
        // 9 bytes per line + 7 pad, 2 lines, after the 2048-byte offset.
        assert_eq!(stream.as_slice().len(), 2048 + 2 * (9 + 7));

        let mut back = vec![0u16; data.len()];
        read_image(&mut stream, &h, &mut back).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_mismatched_channel_geometry_rejected() {
        let mut h = header(4, 4, Depth::D10, CineonPacking::FilledLeft);
        h.image.channels[2].pixels_per_line = 5;
        assert!(matches!(
            ImageLayout::from_header(&h),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_filled_12bit_rejected() {
        let h = header(4, 4, Depth::D12, CineonPacking::FilledLeft);
        let mut out = vec![0u16; 4 * 4 * 3];
        let mut stream = MemoryStream::new();
        assert!(matches!(
            read_image(&mut stream, &h, &mut out),
            Err(Error::UnsupportedLayout { bits: 12, .. })
        ));
    }

    #[test]
    fn test_line_interleave_unimplemented() {
        let mut h = header(4, 4, Depth::D10, CineonPacking::FilledLeft);
        h.format.interleave = Interleave::Line.code();
        assert!(matches!(
            ImageLayout::from_header(&h),
            Err(Error::Unimplemented(_))
        ));
    }
}
