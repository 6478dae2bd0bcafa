//! Integration tests for the filmio crates.
//!
//! End-to-end scenarios that cross crate boundaries: full files written
//! to disk, reopened, and verified through the public reader and writer
//! APIs.

#[cfg(test)]
mod tests {
    use filmio_core::bits;
    use filmio_core::Block;
    use filmio_dpx::{DataSize, Descriptor, Packing};
    use tempfile::tempdir;

    fn gradient_10bit(samples: usize) -> Vec<u16> {
        (0..samples).map(|i| bits::widen10(((i * 64) % 1024) as u16)).collect()
    }

    /// 4x4 10-bit packed RGB gradient: write to disk, reopen, verify
    /// every sample survives the packed bitstream.
    #[test]
    fn test_dpx_4x4_10bit_packed_gradient() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gradient.dpx");

        let pixels = gradient_10bit(4 * 4 * 3);
        {
            let mut w = filmio_dpx::Writer::create(&path).unwrap();
            w.set_image_info(4, 4);
            w.add_element(Descriptor::Rgb, DataSize::D10, Packing::Packed).unwrap();
            w.write_header().unwrap();
            w.write_element(&pixels).unwrap();
            w.finish().unwrap();
        }

        let mut r = filmio_dpx::Reader::open(&path).unwrap();
        let h = r.header();
        assert_eq!(h.width(), Some(4));
        assert_eq!(h.height(), Some(4));
        assert_eq!(h.element(0).unwrap().data_size(), Some(DataSize::D10));
        assert_eq!(h.element(0).unwrap().packing(), Some(Packing::Packed));

        let mut back = vec![0u16; pixels.len()];
        r.read_image(0, &mut back).unwrap();
        assert_eq!(back, pixels);
    }

    /// File size and offsets recorded by `finish` must match the bytes
    /// actually on disk.
    #[test]
    fn test_dpx_offset_integrity_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("offsets.dpx");

        let rgb = gradient_10bit(6 * 4 * 3);
        let alpha: Vec<u8> = (0..6 * 4).map(|i| i as u8 * 10).collect();
        {
            let mut w = filmio_dpx::Writer::create(&path).unwrap();
            w.set_image_info(6, 4);
            w.add_element(Descriptor::Rgb, DataSize::D10, Packing::FilledMethodA).unwrap();
            w.add_element(Descriptor::Alpha, DataSize::D8, Packing::Packed).unwrap();
            w.write_header().unwrap();
            w.write_element(&rgb).unwrap();
            w.write_element(&alpha).unwrap();
            w.finish().unwrap();
        }

        let on_disk = std::fs::metadata(&path).unwrap().len();
        let mut r = filmio_dpx::Reader::open(&path).unwrap();
        let h = r.header();
        assert_eq!(h.file_size(), Some(on_disk as u32));

        // Elements are laid out back to back in registration order.
        let e0 = h.element(0).unwrap().data_offset;
        let e1 = h.element(1).unwrap().data_offset;
        assert_eq!(e0, filmio_dpx::HEADER_SIZE as u32);
        // 6 px * 3 ch = 18 samples -> 6 filled words -> 24 bytes, 4 lines.
        assert_eq!(e1, e0 + 4 * 24);
        assert_eq!(on_disk as u32, e1 + 6 * 4);

        let mut a = vec![0u8; alpha.len()];
        r.read_image(1, &mut a).unwrap();
        assert_eq!(a, alpha);
    }

    /// The same pixels written big- and little-endian decode
    /// identically; only the wire bytes differ.
    #[test]
    fn test_dpx_byte_order_invariance_end_to_end() {
        let dir = tempdir().unwrap();
        let pixels = gradient_10bit(5 * 3 * 3);

        let mut decoded = Vec::new();
        for (name, order) in [
            ("be.dpx", filmio_dpx::ByteOrder::Big),
            ("le.dpx", filmio_dpx::ByteOrder::Little),
        ] {
            let path = dir.path().join(name);
            let mut w = filmio_dpx::Writer::create(&path).unwrap();
            w.set_byte_order(order);
            w.set_image_info(5, 3);
            w.add_element(Descriptor::Rgb, DataSize::D10, Packing::FilledMethodB).unwrap();
            w.write_header().unwrap();
            w.write_element(&pixels).unwrap();
            w.finish().unwrap();

            let mut r = filmio_dpx::Reader::open(&path).unwrap();
            let mut back = vec![0u16; pixels.len()];
            r.read_image(0, &mut back).unwrap();
            decoded.push(back);
        }
        assert_eq!(decoded[0], pixels);
        assert_eq!(decoded[0], decoded[1]);

        let be = std::fs::read(dir.path().join("be.dpx")).unwrap();
        let le = std::fs::read(dir.path().join("le.dpx")).unwrap();
        assert_eq!(&be[0..4], b"SDPX");
        assert_eq!(&le[0..4], b"XPDS");
        assert_ne!(be, le);
    }

    /// Block reads against a file on disk stitch back to the full
    /// image.
    #[test]
    fn test_dpx_block_reads_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blocks.dpx");

        let pixels = gradient_10bit(8 * 6 * 3);
        {
            let mut w = filmio_dpx::Writer::create(&path).unwrap();
            w.set_image_info(8, 6);
            w.add_element(Descriptor::Rgb, DataSize::D10, Packing::FilledMethodA).unwrap();
            w.write_header().unwrap();
            w.write_element(&pixels).unwrap();
            w.finish().unwrap();
        }

        let mut r = filmio_dpx::Reader::open(&path).unwrap();
        let mut top = vec![0u16; 8 * 3 * 3];
        let mut bottom = vec![0u16; 8 * 3 * 3];
        r.read_block(0, Block::new(0, 0, 7, 2), &mut top).unwrap();
        r.read_block(0, Block::new(0, 3, 7, 5), &mut bottom).unwrap();

        let mut stitched = top;
        stitched.extend_from_slice(&bottom);
        assert_eq!(stitched, pixels);
    }

    /// YCbCr element decoded from disk and converted to RGB, then back
    /// through the mirror conversion.
    #[test]
    fn test_dpx_ycbcr_color_pipeline() {
        use filmio_dpx::{color, Characteristic};

        let dir = tempdir().unwrap();
        let path = dir.path().join("ycbcr.dpx");

        // Start from RGB, encode to native 4:4:4 YCbCr, store that.
        let rgb: Vec<u16> = (0..4 * 2 * 3u32).map(|i| (i * 4801 % 65536) as u16).collect();
        let mut native = vec![0u16; rgb.len()];
        color::convert_to_native(
            Descriptor::CbYCr444,
            Characteristic::ItuR709,
            &rgb,
            &mut native,
            4 * 2,
        )
        .unwrap();

        {
            let mut w = filmio_dpx::Writer::create(&path).unwrap();
            w.set_image_info(4, 2);
            let e = w.add_element(Descriptor::CbYCr444, DataSize::D16, Packing::Packed).unwrap();
            w.element_mut(e).unwrap().colorimetric = Characteristic::ItuR709.code();
            w.write_header().unwrap();
            w.write_element(&native).unwrap();
            w.finish().unwrap();
        }

        let mut r = filmio_dpx::Reader::open(&path).unwrap();
        let el = r.header().element(0).unwrap();
        assert_eq!(el.descriptor(), Some(Descriptor::CbYCr444));
        let cmetric = el.colorimetric().unwrap();

        let mut stored = vec![0u16; native.len()];
        r.read_image(0, &mut stored).unwrap();
        assert_eq!(stored, native);

        let mut back = vec![0u16; rgb.len()];
        color::convert_to_rgb(Descriptor::CbYCr444, cmetric, &stored, &mut back, 4 * 2).unwrap();
        for (a, b) in rgb.iter().zip(back.iter()) {
            assert!((*a as i32 - *b as i32).abs() <= 4, "{} vs {}", a, b);
        }
    }

    /// Cineon on disk: magic detection, 10-bit filled round trip, file
    /// size integrity.
    #[test]
    fn test_cineon_roundtrip_on_disk() {
        use filmio_cineon::{ChannelKind, CineonPacking, Depth};

        let dir = tempdir().unwrap();
        let path = dir.path().join("scan.cin");

        let pixels = gradient_10bit(6 * 5 * 3);
        {
            let mut w = filmio_cineon::Writer::create(&path).unwrap();
            w.set_image_info(
                6,
                5,
                &[ChannelKind::Red, ChannelKind::Green, ChannelKind::Blue],
                Depth::D10,
                CineonPacking::FilledLeft,
            )
            .unwrap();
            w.header_mut().origination.gamma = 1.7;
            w.write_header().unwrap();
            w.write_image(&pixels).unwrap();
            w.finish().unwrap();
        }

        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[0..4], &filmio_cineon::MAGIC.to_be_bytes());
        assert_eq!(&raw[24..28], b"V4.5");

        let mut r = filmio_cineon::Reader::open(&path).unwrap();
        let h = r.header();
        assert_eq!(h.width(), Some(6));
        assert_eq!(h.channel_count(), 3);
        assert_eq!(h.channel(0).unwrap().kind(), Some(ChannelKind::Red));
        assert_eq!(h.gamma(), Some(1.7));
        assert_eq!(h.file_size(), Some(raw.len() as u32));

        let mut back = vec![0u16; pixels.len()];
        r.read_image(&mut back).unwrap();
        assert_eq!(back, pixels);
    }

    /// A DPX magic is not a Cineon magic and vice versa; each reader
    /// rejects the other's file.
    #[test]
    fn test_format_magics_are_disjoint() {
        let dir = tempdir().unwrap();

        let dpx_path = dir.path().join("a.dpx");
        let mut w = filmio_dpx::Writer::create(&dpx_path).unwrap();
        w.set_image_info(1, 1);
        w.add_element(Descriptor::Luma, DataSize::D8, Packing::Packed).unwrap();
        w.write_header().unwrap();
        w.write_element(&[1u8]).unwrap();
        w.finish().unwrap();

        assert!(matches!(
            filmio_cineon::Reader::open(&dpx_path),
            Err(filmio_core::Error::BadMagic(m)) if m == filmio_dpx::MAGIC
        ));
    }

    /// Identical 10-bit content stored as DPX and Cineon decodes to the
    /// same widened buffer from either codec.
    #[test]
    fn test_dpx_and_cineon_agree_on_10bit_content() {
        use filmio_cineon::{ChannelKind, CineonPacking, Depth};

        let dir = tempdir().unwrap();
        let pixels = gradient_10bit(4 * 4 * 3);

        let dpx_path = dir.path().join("x.dpx");
        let mut w = filmio_dpx::Writer::create(&dpx_path).unwrap();
        w.set_image_info(4, 4);
        w.add_element(Descriptor::Rgb, DataSize::D10, Packing::FilledMethodA).unwrap();
        w.write_header().unwrap();
        w.write_element(&pixels).unwrap();
        w.finish().unwrap();

        let cin_path = dir.path().join("x.cin");
        let mut c = filmio_cineon::Writer::create(&cin_path).unwrap();
        c.set_image_info(
            4,
            4,
            &[ChannelKind::Red, ChannelKind::Green, ChannelKind::Blue],
            Depth::D10,
            CineonPacking::FilledLeft,
        )
        .unwrap();
        c.write_header().unwrap();
        c.write_image(&pixels).unwrap();
        c.finish().unwrap();

        let mut from_dpx = vec![0u16; pixels.len()];
        filmio_dpx::Reader::open(&dpx_path).unwrap().read_image(0, &mut from_dpx).unwrap();
        let mut from_cin = vec![0u16; pixels.len()];
        filmio_cineon::Reader::open(&cin_path).unwrap().read_image(&mut from_cin).unwrap();
        assert_eq!(from_dpx, pixels);
        assert_eq!(from_dpx, from_cin);
    }
}
