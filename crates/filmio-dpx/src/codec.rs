//! Per-element block codec.
//!
//! Dispatches block reads and element writes across the (bit depth x
//! packing) matrix:
//!
//! - 8/16-bit integer and 32/64-bit float elements decode per line,
//!   straight into the destination when the sample types match or
//!   through a per-sample conversion otherwise; a full-width block with
//!   no end-of-line padding collapses to a single bulk read.
//! - 10-bit elements decode via the filled method A / method B / packed
//!   paths, 12-bit via packed or the 16-bit-slot filled path; decoded
//!   samples are widened to 16 bits by replication.
//!
//! File byte offset of a sample = element data offset + line offset +
//! accumulated end-of-line padding + column offset. For packed depths the
//! column offset rounds DOWN to the enclosing 32-bit storage word and the
//! unpack step discards the leading bits; packed components are not
//! individually byte-aligned.
//!
//! End-of-line padding bytes are skipped on read and emitted pre-zeroed
//! on write, never interpreted. The write path uses the same shift tables
//! as the read path, so a round trip at the same depth and packing is
//! bit-exact (exact under the widen-by-replication rule for 10/12-bit).
//!
//! Failure modes: short I/O propagates immediately as
//! [`Error::Io`](filmio_core::Error::Io); an unrecognized (depth,
//! packing) pair reports [`Error::UnsupportedLayout`]; RLE elements
//! report [`Error::Unimplemented`] rather than emitting wrong pixels.

use crate::header::{ByteOrder, Header, UNDEF_U32};
use crate::types::{DataSize, Encoding, Packing};
use filmio_core::bits::{self, Sample};
use filmio_core::{Block, Error, Result, Stream};
use std::io::SeekFrom;

/// Resolved storage geometry of one element, validated up front.
///
/// The codec never re-derives header fields mid-loop; everything it
/// needs is captured here once, with contract violations reported before
/// any I/O happens.
#[derive(Debug, Clone, Copy)]
pub struct ElementLayout {
    /// Pixels per line.
    pub width: u32,
    /// Lines in the element.
    pub height: u32,
    /// Stored samples per pixel.
    pub components: u32,
    /// Bits per sample.
    pub data_size: DataSize,
    /// Bit-level layout for sub-word depths.
    pub packing: Packing,
    /// Compression tag.
    pub encoding: Encoding,
    /// Absolute file offset of the element's first data byte.
    pub data_offset: u64,
    /// End-of-line padding in bytes.
    pub eol_padding: u64,
    /// End-of-image padding in bytes.
    pub eoi_padding: u64,
    /// True when the file is big-endian.
    pub big_endian: bool,
}

impl ElementLayout {
    /// Builds a layout from a validated header.
    ///
    /// Elements must be complete before the codec runs; a missing
    /// dimension, unknown descriptor, or unknown (depth, packing) pair is
    /// a caller contract violation reported here.
    pub fn from_header(header: &Header, element: usize) -> Result<Self> {
        let el = header.element(element).ok_or_else(|| {
            Error::InvalidParameter(format!(
                "element {} out of range ({} declared)",
                element,
                header.element_count()
            ))
        })?;
        let width = header
            .width()
            .ok_or_else(|| Error::InvalidParameter("pixels per line not set".into()))?;
        let height = header
            .height()
            .ok_or_else(|| Error::InvalidParameter("lines per element not set".into()))?;
        let descriptor = el
            .descriptor()
            .ok_or(Error::UnsupportedDescriptor(el.descriptor))?;
        let data_size = el.data_size().ok_or(Error::UnsupportedLayout {
            bits: el.bit_size,
            packing: el.packing,
        })?;
        let packing = el.packing().ok_or(Error::UnsupportedLayout {
            bits: el.bit_size,
            packing: el.packing,
        })?;
        let encoding = el.encoding().ok_or_else(|| {
            Error::InvalidParameter(format!("unrecognized encoding code {}", el.encoding))
        })?;
        if el.data_offset == UNDEF_U32 {
            return Err(Error::InvalidParameter(format!(
                "element {} data offset not set",
                element
            )));
        }

        Ok(Self {
            width,
            height,
            components: descriptor.components() as u32,
            data_size,
            packing,
            encoding,
            data_offset: el.data_offset as u64,
            eol_padding: el.eol_padding_bytes() as u64,
            eoi_padding: el.eoi_padding_bytes() as u64,
            big_endian: header.byte_order == ByteOrder::Big,
        })
    }

    /// Stored bytes per line, excluding end-of-line padding.
    ///
    /// Sub-word layouts start every line on a 32-bit word boundary.
    pub fn bytes_per_line(&self) -> u64 {
        let spl = self.width as u64 * self.components as u64;
        match self.data_size {
            DataSize::D8 => spl,
            DataSize::D16 => spl * 2,
            DataSize::D32 => spl * 4,
            DataSize::D64 => spl * 8,
            DataSize::D10 => match self.packing {
                Packing::Packed => packed_line_bytes(spl, 10),
                _ => ((spl + 2) / 3) * 4,
            },
            DataSize::D12 => match self.packing {
                Packing::Packed => packed_line_bytes(spl, 12),
                _ => spl * 2,
            },
        }
    }

    /// Total byte span of the element on disk, per-line and end-of-image
    /// padding included. The writer advances its running cursor by this.
    pub fn data_span(&self) -> u64 {
        (self.bytes_per_line() + self.eol_padding) * self.height as u64 + self.eoi_padding
    }
}

// Bytes of a packed bitstream line: samples * bits rounded up to whole
// 32-bit words.
fn packed_line_bytes(samples: u64, bits: u64) -> u64 {
    ((samples * bits + 31) / 32) * 4
}

/// Reads a rectangular block of one element into `out`.
///
/// `out` receives `block.area() * components` samples in scan order.
/// 10/12-bit sources arrive widened to 16 bits by replication; integer
/// depths widen or narrow to `T` by the same replication rule, floats
/// pass through.
pub fn read_block<T: Sample, S: Stream>(
    stream: &mut S,
    header: &Header,
    element: usize,
    block: Block,
    out: &mut [T],
) -> Result<()> {
    let lay = ElementLayout::from_header(header, element)?;
    if lay.encoding == Encoding::Rle {
        return Err(Error::Unimplemented("RLE decode"));
    }

    let mut blk = block;
    blk.normalize();
    if !blk.fits(lay.width, lay.height) {
        return Err(Error::InvalidParameter(format!(
            "block ({},{})-({},{}) outside {}x{} image",
            blk.x1, blk.y1, blk.x2, blk.y2, lay.width, lay.height
        )));
    }
    let needed = blk.area() * lay.components as u64;
    if (out.len() as u64) < needed {
        return Err(Error::InvalidParameter(format!(
            "output holds {} samples, block needs {}",
            out.len(),
            needed
        )));
    }
    let out = &mut out[..needed as usize];

    match lay.data_size {
        DataSize::D8 => read_scalar(stream, &lay, blk, out, |v: u8| T::from_raw(v as u64, 8)),
        DataSize::D16 => read_scalar(stream, &lay, blk, out, |v: u16| T::from_raw(v as u64, 16)),
        DataSize::D32 => read_scalar(stream, &lay, blk, out, |v: f32| T::from_f64(v as f64)),
        DataSize::D64 => read_scalar(stream, &lay, blk, out, T::from_f64),
        DataSize::D10 | DataSize::D12 => read_subword(stream, &lay, blk, out),
    }
}

/// Reads the full image area of one element (convenience over
/// [`read_block`]).
pub fn read_element<T: Sample, S: Stream>(
    stream: &mut S,
    header: &Header,
    element: usize,
    out: &mut [T],
) -> Result<()> {
    let lay = ElementLayout::from_header(header, element)?;
    read_block(stream, header, element, Block::full(lay.width, lay.height), out)
}

// Scalar path: one stored sample per `N`-typed slot, no bit packing.
fn read_scalar<N: Sample, T: Sample, S: Stream>(
    stream: &mut S,
    lay: &ElementLayout,
    blk: Block,
    out: &mut [T],
    conv: impl Fn(N) -> T,
) -> Result<()> {
    let be = lay.big_endian;
    let c = lay.components as u64;
    let s0 = blk.x1 as u64 * c;
    let line_samples = blk.width() as u64 * c;
    let stride = lay.bytes_per_line() + lay.eol_padding;
    let full_line = blk.x1 == 0 && blk.x2 + 1 == lay.width;

    if full_line && lay.eol_padding == 0 {
        // One contiguous byte range covers the whole block.
        let total = (line_samples * blk.height() as u64) as usize;
        let mut scratch = vec![0u8; total * N::BYTES];
        stream.seek(SeekFrom::Start(lay.data_offset + blk.y1 as u64 * stride))?;
        stream.read_exact(&mut scratch)?;
        for (chunk, o) in scratch.chunks_exact(N::BYTES).zip(out.iter_mut()) {
            *o = conv(N::read_bytes(chunk, be));
        }
        return Ok(());
    }

    let mut scratch = vec![0u8; line_samples as usize * N::BYTES];
    for (row, y) in (blk.y1..=blk.y2).enumerate() {
        let offset = lay.data_offset + y as u64 * stride + s0 * N::BYTES as u64;
        stream.seek(SeekFrom::Start(offset))?;
        stream.read_exact(&mut scratch)?;
        let dst = &mut out[row * line_samples as usize..][..line_samples as usize];
        for (chunk, o) in scratch.chunks_exact(N::BYTES).zip(dst.iter_mut()) {
            *o = conv(N::read_bytes(chunk, be));
        }
    }
    Ok(())
}

// 10/12-bit path: word-oriented unpack, widen to 16 by replication.
fn read_subword<T: Sample, S: Stream>(
    stream: &mut S,
    lay: &ElementLayout,
    blk: Block,
    out: &mut [T],
) -> Result<()> {
    let be = lay.big_endian;
    let bits = lay.data_size.bits() as u64;
    let c = lay.components as u64;
    let stride = lay.bytes_per_line() + lay.eol_padding;
    let s0 = blk.x1 as u64 * c;
    let s1 = (blk.x2 as u64 + 1) * c - 1;
    let line_samples = (s1 - s0 + 1) as usize;

    let widen = |v: u16| -> u16 {
        match lay.data_size {
            DataSize::D10 => bits::widen10(v),
            _ => bits::widen12(v),
        }
    };

    match (lay.data_size, lay.packing) {
        (DataSize::D10, Packing::FilledMethodA) | (DataSize::D10, Packing::FilledMethodB) => {
            let method_b = lay.packing == Packing::FilledMethodB;
            let w0 = s0 / 3;
            let w1 = s1 / 3;
            let nwords = (w1 - w0 + 1) as usize;
            let mut scratch = vec![0u8; nwords * 4];
            let mut words = vec![0u32; nwords];
            for (row, y) in (blk.y1..=blk.y2).enumerate() {
                stream.seek(SeekFrom::Start(lay.data_offset + y as u64 * stride + w0 * 4))?;
                stream.read_exact(&mut scratch)?;
                for (w, chunk) in words.iter_mut().zip(scratch.chunks_exact(4)) {
                    *w = u32::read_bytes(chunk, be);
                }
                let dst = &mut out[row * line_samples..][..line_samples];
                for (k, o) in dst.iter_mut().enumerate() {
                    let s = s0 + k as u64;
                    let word = words[(s / 3 - w0) as usize];
                    let v = bits::extract_filled10(word, (s % 3) as usize, method_b);
                    *o = T::from_raw(bits::widen10(v) as u64, 16);
                }
            }
            Ok(())
        }
        (DataSize::D10, Packing::Packed) | (DataSize::D12, Packing::Packed) => {
            // Round the column offset down to the enclosing storage word;
            // the unpack below discards the leading bits.
            let bit0 = s0 * bits;
            let byte_lo = (bit0 / 32) * 4;
            let byte_hi = ((s1 + 1) * bits).div_ceil(32) * 4;
            let nwords = ((byte_hi - byte_lo) / 4) as usize;
            let mut scratch = vec![0u8; nwords * 4];
            let mut words = vec![0u32; nwords];
            for (row, y) in (blk.y1..=blk.y2).enumerate() {
                stream.seek(SeekFrom::Start(lay.data_offset + y as u64 * stride + byte_lo))?;
                stream.read_exact(&mut scratch)?;
                for (w, chunk) in words.iter_mut().zip(scratch.chunks_exact(4)) {
                    *w = u32::read_bytes(chunk, be);
                }
                let dst = &mut out[row * line_samples..][..line_samples];
                for (k, o) in dst.iter_mut().enumerate() {
                    let bitpos = ((s0 + k as u64) * bits - byte_lo * 8) as usize;
                    let v = bits::extract_packed(&words, bitpos, bits as u32) as u16;
                    *o = T::from_raw(widen(v) as u64, 16);
                }
            }
            Ok(())
        }
        (DataSize::D12, Packing::FilledMethodA) | (DataSize::D12, Packing::FilledMethodB) => {
            let method_b = lay.packing == Packing::FilledMethodB;
            let mut scratch = vec![0u8; line_samples * 2];
            for (row, y) in (blk.y1..=blk.y2).enumerate() {
                stream.seek(SeekFrom::Start(lay.data_offset + y as u64 * stride + s0 * 2))?;
                stream.read_exact(&mut scratch)?;
                let dst = &mut out[row * line_samples..][..line_samples];
                for (chunk, o) in scratch.chunks_exact(2).zip(dst.iter_mut()) {
                    let v = bits::extract_filled12(u16::read_bytes(chunk, be), method_b);
                    *o = T::from_raw(bits::widen12(v) as u64, 16);
                }
            }
            Ok(())
        }
        _ => Err(Error::UnsupportedLayout {
            bits: lay.data_size.bits(),
            packing: lay.packing.code(),
        }),
    }
}

/// Writes one element's full image data at its recorded data offset.
///
/// `data` supplies `width * height * components` samples in scan order;
/// 10/12-bit targets expect replication-widened 16-bit values (the exact
/// mirror of what [`read_block`] produces). Each line is packed into a
/// pre-zeroed buffer that already carries the end-of-line padding; the
/// end-of-image padding is emitted once after the last line.
pub fn write_element<T: Sample, S: Stream>(
    stream: &mut S,
    header: &Header,
    element: usize,
    data: &[T],
) -> Result<()> {
    let lay = ElementLayout::from_header(header, element)?;
    if lay.encoding == Encoding::Rle {
        return Err(Error::Unimplemented("RLE encode"));
    }
    let total = lay.width as u64 * lay.height as u64 * lay.components as u64;
    if data.len() as u64 != total {
        return Err(Error::InvalidParameter(format!(
            "element data holds {} samples, image needs {}",
            data.len(),
            total
        )));
    }

    let line_samples = (lay.width * lay.components) as usize;
    let bpl = lay.bytes_per_line() as usize;
    let mut line = vec![0u8; bpl + lay.eol_padding as usize];

    stream.seek(SeekFrom::Start(lay.data_offset))?;
    for y in 0..lay.height as usize {
        line.fill(0);
        let src = &data[y * line_samples..][..line_samples];
        encode_line(src, &lay, &mut line[..bpl])?;
        stream.write_all(&line)?;
    }
    if lay.eoi_padding > 0 {
        stream.write_all(&vec![0u8; lay.eoi_padding as usize])?;
    }
    Ok(())
}

// Packs one line of samples into `dst` (zeroed, `bytes_per_line` long),
// mirror-image of the unpack paths above.
fn encode_line<T: Sample>(src: &[T], lay: &ElementLayout, dst: &mut [u8]) -> Result<()> {
    let be = lay.big_endian;
    match (lay.data_size, lay.packing) {
        (DataSize::D8, _) => {
            for (v, b) in src.iter().zip(dst.iter_mut()) {
                *b = v.to_raw(8) as u8;
            }
            Ok(())
        }
        (DataSize::D16, _) => {
            for (v, chunk) in src.iter().zip(dst.chunks_exact_mut(2)) {
                (v.to_raw(16) as u16).write_bytes(chunk, be);
            }
            Ok(())
        }
        (DataSize::D32, _) => {
            for (v, chunk) in src.iter().zip(dst.chunks_exact_mut(4)) {
                f32::from_f64(v.to_f64()).write_bytes(chunk, be);
            }
            Ok(())
        }
        (DataSize::D64, _) => {
            for (v, chunk) in src.iter().zip(dst.chunks_exact_mut(8)) {
                v.to_f64().write_bytes(chunk, be);
            }
            Ok(())
        }
        (DataSize::D10, Packing::FilledMethodA) | (DataSize::D10, Packing::FilledMethodB) => {
            let method_b = lay.packing == Packing::FilledMethodB;
            for (group, chunk) in src.chunks(3).zip(dst.chunks_exact_mut(4)) {
                let mut word = 0u32;
                for (i, v) in group.iter().enumerate() {
                    let n = bits::narrow10(v.to_raw(16) as u16);
                    bits::insert_filled10(&mut word, i, method_b, n);
                }
                word.write_bytes(chunk, be);
            }
            Ok(())
        }
        (DataSize::D10, Packing::Packed) | (DataSize::D12, Packing::Packed) => {
            let bits_per = lay.data_size.bits() as usize;
            let mut words = vec![0u32; dst.len() / 4];
            for (i, v) in src.iter().enumerate() {
                let n = match lay.data_size {
                    DataSize::D10 => bits::narrow10(v.to_raw(16) as u16),
                    _ => bits::narrow12(v.to_raw(16) as u16),
                };
                bits::insert_packed(&mut words, i * bits_per, bits_per as u32, n as u32);
            }
            for (w, chunk) in words.iter().zip(dst.chunks_exact_mut(4)) {
                w.write_bytes(chunk, be);
            }
            Ok(())
        }
        (DataSize::D12, Packing::FilledMethodA) | (DataSize::D12, Packing::FilledMethodB) => {
            let method_b = lay.packing == Packing::FilledMethodB;
            for (v, chunk) in src.iter().zip(dst.chunks_exact_mut(2)) {
                let slot = bits::insert_filled12(bits::narrow12(v.to_raw(16) as u16), method_b);
                slot.write_bytes(chunk, be);
            }
            Ok(())
        }
        (DataSize::D10, _) | (DataSize::D12, _) => Err(Error::UnsupportedLayout {
            bits: lay.data_size.bits(),
            packing: lay.packing.code(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Characteristic, Descriptor};
    use filmio_core::MemoryStream;

    fn header_for(
        width: u32,
        height: u32,
        descriptor: Descriptor,
        bits: u8,
        packing: Packing,
        eol_padding: u32,
    ) -> Header {
        let mut h = Header::new();
        h.generic.image.element_count = 1;
        h.generic.image.pixels_per_line = width;
        h.generic.image.lines_per_element = height;
        let el = &mut h.generic.image.elements[0];
        el.descriptor = descriptor.code();
        el.transfer = Characteristic::Linear.code();
        el.colorimetric = Characteristic::Linear.code();
        el.bit_size = bits;
        el.packing = packing.code();
        el.encoding = Encoding::None.code();
        el.data_offset = 0;
        el.eol_padding = eol_padding;
        el.eoi_padding = 0;
        h
    }

    fn gradient(n: usize, max: u64) -> Vec<u16> {
        (0..n).map(|i| ((i as u64 * max) / (n as u64 - 1)) as u16).collect()
    }

    fn roundtrip(header: &Header, samples: &[u16]) -> Vec<u16> {
        let mut s = MemoryStream::new();
        write_element(&mut s, header, 0, samples).unwrap();
        let mut out = vec![0u16; samples.len()];
        read_element(&mut s, header, 0, &mut out).unwrap();
        out
    }

    #[test]
    fn test_roundtrip_10bit_all_packings() {
        for packing in [Packing::Packed, Packing::FilledMethodA, Packing::FilledMethodB] {
            let h = header_for(7, 3, Descriptor::Rgb, 10, packing, 0);
            // Widened 10-bit values, as read_block produces them.
            let samples: Vec<u16> =
                gradient(7 * 3 * 3, 1023).iter().map(|&v| bits::widen10(v)).collect();
            assert_eq!(roundtrip(&h, &samples), samples, "{:?}", packing);
        }
    }

    #[test]
    fn test_roundtrip_12bit_all_packings() {
        for packing in [Packing::Packed, Packing::FilledMethodA, Packing::FilledMethodB] {
            let h = header_for(5, 4, Descriptor::Rgb, 12, packing, 0);
            let samples: Vec<u16> =
                gradient(5 * 4 * 3, 4095).iter().map(|&v| bits::widen12(v)).collect();
            assert_eq!(roundtrip(&h, &samples), samples, "{:?}", packing);
        }
    }

    #[test]
    fn test_roundtrip_8_and_16bit() {
        let h = header_for(9, 2, Descriptor::Rgb, 16, Packing::Packed, 0);
        let samples = gradient(9 * 2 * 3, 65535);
        assert_eq!(roundtrip(&h, &samples), samples);

        let h8 = header_for(9, 2, Descriptor::Luma, 8, Packing::Packed, 0);
        let mut s = MemoryStream::new();
        let bytes: Vec<u8> = (0..9 * 2).map(|i| (i * 13) as u8).collect();
        write_element(&mut s, &h8, 0, &bytes).unwrap();
        let mut out = vec![0u8; bytes.len()];
        read_element(&mut s, &h8, 0, &mut out).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_roundtrip_float() {
        let h = header_for(4, 4, Descriptor::Rgb, 32, Packing::Packed, 0);
        let samples: Vec<f32> = (0..4 * 4 * 3).map(|i| i as f32 * 0.125 - 1.0).collect();
        let mut s = MemoryStream::new();
        write_element(&mut s, &h, 0, &samples).unwrap();
        let mut out = vec![0f32; samples.len()];
        read_element(&mut s, &h, 0, &mut out).unwrap();
        assert_eq!(out, samples);
    }

    #[test]
    fn test_roundtrip_double() {
        let h = header_for(3, 2, Descriptor::Rgb, 64, Packing::Packed, 0);
        let samples: Vec<f64> = (0..3 * 2 * 3).map(|i| i as f64 * 0.0625 - 0.5).collect();
        let mut s = MemoryStream::new();
        write_element(&mut s, &h, 0, &samples).unwrap();
        let mut out = vec![0f64; samples.len()];
        read_element(&mut s, &h, 0, &mut out).unwrap();
        assert_eq!(out, samples);
    }

    #[test]
    fn test_packing_equivalence() {
        // The same logical pixel values decode identically whichever
        // packing stored them.
        let values = gradient(6 * 2 * 3, 1023);
        let widened: Vec<u16> = values.iter().map(|&v| bits::widen10(v)).collect();
        let mut decoded = Vec::new();
        for packing in [Packing::Packed, Packing::FilledMethodA, Packing::FilledMethodB] {
            let h = header_for(6, 2, Descriptor::Rgb, 10, packing, 0);
            decoded.push(roundtrip(&h, &widened));
        }
        assert_eq!(decoded[0], decoded[1]);
        assert_eq!(decoded[1], decoded[2]);
    }

    #[test]
    fn test_block_partition() {
        // Full read equals the union of two complementary blocks.
        let h = header_for(8, 6, Descriptor::Rgb, 10, Packing::Packed, 0);
        let samples: Vec<u16> =
            gradient(8 * 6 * 3, 1023).iter().map(|&v| bits::widen10(v)).collect();
        let mut s = MemoryStream::new();
        write_element(&mut s, &h, 0, &samples).unwrap();

        let mut full = vec![0u16; samples.len()];
        read_block(&mut s, &h, 0, Block::full(8, 6), &mut full).unwrap();
        assert_eq!(full, samples);

        // Left 3 columns and right 5 columns, stitched back together.
        let left_blk = Block::new(0, 0, 2, 5);
        let right_blk = Block::new(3, 0, 7, 5);
        let mut left = vec![0u16; (left_blk.area() * 3) as usize];
        let mut right = vec![0u16; (right_blk.area() * 3) as usize];
        read_block(&mut s, &h, 0, left_blk, &mut left).unwrap();
        read_block(&mut s, &h, 0, right_blk, &mut right).unwrap();

        let mut stitched = vec![0u16; samples.len()];
        for y in 0..6 {
            let row = &mut stitched[y * 8 * 3..][..8 * 3];
            row[..3 * 3].copy_from_slice(&left[y * 3 * 3..][..3 * 3]);
            row[3 * 3..].copy_from_slice(&right[y * 5 * 3..][..5 * 3]);
        }
        assert_eq!(stitched, samples);
    }

    #[test]
    fn test_eol_padding_skipped() {
        let mut h = header_for(3, 3, Descriptor::Rgb, 16, Packing::Packed, 6);
        h.generic.image.elements[0].eoi_padding = 8;
        let samples = gradient(3 * 3 * 3, 65535);

        let mut s = MemoryStream::new();
        write_element(&mut s, &h, 0, &samples).unwrap();
        // 3 lines * (18 data + 6 pad) + 8 end-of-image pad.
        assert_eq!(s.len() as u64, 3 * (18 + 6) + 8);

        let mut out = vec![0u16; samples.len()];
        read_element(&mut s, &h, 0, &mut out).unwrap();
        assert_eq!(out, samples);
    }

    #[test]
    fn test_sample_width_conversion() {
        // A 16-bit element read into u8 narrows, read back into u16
        // through the replication rule.
        let h = header_for(4, 1, Descriptor::Luma, 16, Packing::Packed, 0);
        let samples: Vec<u16> = vec![0, 0x4040, 0x8080, 0xFFFF];
        let mut s = MemoryStream::new();
        write_element(&mut s, &h, 0, &samples).unwrap();

        let mut narrow = vec![0u8; 4];
        read_element(&mut s, &h, 0, &mut narrow).unwrap();
        assert_eq!(narrow, vec![0, 0x40, 0x80, 0xFF]);
    }

    #[test]
    fn test_rle_reports_unimplemented() {
        let mut h = header_for(4, 4, Descriptor::Rgb, 10, Packing::FilledMethodA, 0);
        h.generic.image.elements[0].encoding = Encoding::Rle.code();
        let mut s = MemoryStream::new();
        let mut out = vec![0u16; 4 * 4 * 3];
        match read_element(&mut s, &h, 0, &mut out) {
            Err(Error::Unimplemented(_)) => {}
            other => panic!("expected Unimplemented, got {:?}", other),
        }
        let data = vec![0u16; 4 * 4 * 3];
        assert!(matches!(
            write_element(&mut s, &h, 0, &data),
            Err(Error::Unimplemented(_))
        ));
    }

    #[test]
    fn test_unsupported_depth_is_explicit() {
        let h = header_for(4, 4, Descriptor::Rgb, 14, Packing::Packed, 0);
        let mut s = MemoryStream::new();
        let mut out = vec![0u16; 4 * 4 * 3];
        assert!(matches!(
            read_element(&mut s, &h, 0, &mut out),
            Err(Error::UnsupportedLayout { bits: 14, .. })
        ));
    }

    #[test]
    fn test_block_outside_image_rejected() {
        let h = header_for(4, 4, Descriptor::Rgb, 16, Packing::Packed, 0);
        let mut s = MemoryStream::new();
        let mut out = vec![0u16; 4 * 3];
        assert!(matches!(
            read_block(&mut s, &h, 0, Block::new(0, 0, 4, 0), &mut out),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_short_stream_fails() {
        let h = header_for(4, 4, Descriptor::Rgb, 16, Packing::Packed, 0);
        // 10 bytes cannot hold 4x4x3 u16 samples.
        let mut s = MemoryStream::from_vec(vec![0u8; 10]);
        let mut out = vec![0u16; 4 * 4 * 3];
        assert!(matches!(
            read_element(&mut s, &h, 0, &mut out),
            Err(Error::Io(_))
        ));
    }
}
