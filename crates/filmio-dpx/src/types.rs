//! DPX enumerations.
//!
//! Closed enumerations whose values are wire codes frozen by SMPTE 268M;
//! none of these are free to renumber. Each type round-trips through
//! `code()` / `from_code()`.

/// Channel semantics of an image element.
///
/// The descriptor fixes both the meaning and the per-pixel sample count of
/// an element's data stream. Codes 150-156 are user-defined N-component
/// layouts.
///
/// | Code | Descriptor | Samples/pixel |
/// |------|------------|---------------|
/// | 0 | User defined | 1 |
/// | 1-4 | R, G, B, A | 1 |
/// | 6 | Luma (Y) | 1 |
/// | 7 | Color difference (Cb/Cr) | 1 |
/// | 8 | Depth (Z) | 1 |
/// | 9 | Composite video | 1 |
/// | 50 | RGB | 3 |
/// | 51 | RGBA | 4 |
/// | 52 | ABGR | 4 |
/// | 100 | CbYCrY 4:2:2 | 2 |
/// | 101 | CbYACrYA 4:2:2:4 | 3 |
/// | 102 | CbYCr 4:4:4 | 3 |
/// | 103 | CbYCrA 4:4:4:4 | 4 |
/// | 150-156 | User defined 2-8 comp | 2-8 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Descriptor {
    /// Single user-defined component.
    UserDefined,
    /// Red.
    Red,
    /// Green.
    Green,
    /// Blue.
    Blue,
    /// Alpha.
    Alpha,
    /// Luma (Y).
    Luma,
    /// Color difference (Cb, Cr subsampled together).
    ColorDifference,
    /// Depth (Z).
    Depth,
    /// Composite video.
    CompositeVideo,
    /// Interleaved RGB.
    Rgb,
    /// Interleaved RGBA.
    Rgba,
    /// Interleaved ABGR.
    Abgr,
    /// CbYCrY 4:2:2 (two samples per pixel, chroma shared by pixel pairs).
    CbYCrY422,
    /// CbYACrYA 4:2:2:4.
    CbYACrYA4224,
    /// CbYCr 4:4:4.
    CbYCr444,
    /// CbYCrA 4:4:4:4.
    CbYCrA4444,
    /// User-defined layout with 2 to 8 components.
    UserDefinedNComp(u8),
}

impl Descriptor {
    /// Wire code of the descriptor.
    pub fn code(self) -> u8 {
        match self {
            Descriptor::UserDefined => 0,
            Descriptor::Red => 1,
            Descriptor::Green => 2,
            Descriptor::Blue => 3,
            Descriptor::Alpha => 4,
            Descriptor::Luma => 6,
            Descriptor::ColorDifference => 7,
            Descriptor::Depth => 8,
            Descriptor::CompositeVideo => 9,
            Descriptor::Rgb => 50,
            Descriptor::Rgba => 51,
            Descriptor::Abgr => 52,
            Descriptor::CbYCrY422 => 100,
            Descriptor::CbYACrYA4224 => 101,
            Descriptor::CbYCr444 => 102,
            Descriptor::CbYCrA4444 => 103,
            Descriptor::UserDefinedNComp(n) => 148 + n,
        }
    }

    /// Decodes a wire code; unknown codes return `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Descriptor::UserDefined,
            1 => Descriptor::Red,
            2 => Descriptor::Green,
            3 => Descriptor::Blue,
            4 => Descriptor::Alpha,
            6 => Descriptor::Luma,
            7 => Descriptor::ColorDifference,
            8 => Descriptor::Depth,
            9 => Descriptor::CompositeVideo,
            50 => Descriptor::Rgb,
            51 => Descriptor::Rgba,
            52 => Descriptor::Abgr,
            100 => Descriptor::CbYCrY422,
            101 => Descriptor::CbYACrYA4224,
            102 => Descriptor::CbYCr444,
            103 => Descriptor::CbYCrA4444,
            150..=156 => Descriptor::UserDefinedNComp(code - 148),
            _ => return None,
        })
    }

    /// Samples stored per pixel for this descriptor.
    ///
    /// Subsampled layouts count stored samples, not nominal channels:
    /// CbYCrY 4:2:2 averages 2 per pixel, CbYACrYA 4:2:2:4 averages 3.
    pub fn components(self) -> u8 {
        match self {
            Descriptor::UserDefined
            | Descriptor::Red
            | Descriptor::Green
            | Descriptor::Blue
            | Descriptor::Alpha
            | Descriptor::Luma
            | Descriptor::ColorDifference
            | Descriptor::Depth
            | Descriptor::CompositeVideo => 1,
            Descriptor::CbYCrY422 => 2,
            Descriptor::Rgb | Descriptor::CbYCr444 | Descriptor::CbYACrYA4224 => 3,
            Descriptor::Rgba | Descriptor::Abgr | Descriptor::CbYCrA4444 => 4,
            Descriptor::UserDefinedNComp(n) => n,
        }
    }
}

/// Bits per sample of an element's data stream.
///
/// 32- and 64-bit elements hold IEEE floats; the rest are unsigned
/// integers. Anything outside this set is a caller contract violation:
/// elements must be validated before the codec runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSize {
    /// 8-bit unsigned integer.
    D8,
    /// 10-bit unsigned integer (widened to 16 on decode).
    D10,
    /// 12-bit unsigned integer (widened to 16 on decode).
    D12,
    /// 16-bit unsigned integer.
    D16,
    /// 32-bit IEEE float.
    D32,
    /// 64-bit IEEE float.
    D64,
}

impl DataSize {
    /// Bits per sample as stored in the header.
    pub fn bits(self) -> u8 {
        match self {
            DataSize::D8 => 8,
            DataSize::D10 => 10,
            DataSize::D12 => 12,
            DataSize::D16 => 16,
            DataSize::D32 => 32,
            DataSize::D64 => 64,
        }
    }

    /// Decodes the header's bits-per-sample field.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            8 => Some(DataSize::D8),
            10 => Some(DataSize::D10),
            12 => Some(DataSize::D12),
            16 => Some(DataSize::D16),
            32 => Some(DataSize::D32),
            64 => Some(DataSize::D64),
            _ => None,
        }
    }

    /// Maximum code value for integer depths.
    pub fn max_value(self) -> u32 {
        match self {
            DataSize::D8 => 255,
            DataSize::D10 => 1023,
            DataSize::D12 => 4095,
            DataSize::D16 => 65535,
            DataSize::D32 | DataSize::D64 => u32::MAX,
        }
    }

    /// True for the IEEE float depths.
    pub fn is_float(self) -> bool {
        matches!(self, DataSize::D32 | DataSize::D64)
    }
}

/// Bit-level layout of sub-word-aligned (10/12-bit) samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Packing {
    /// Continuous bitstream, no padding bits.
    Packed,
    /// Word-filled, padding in the low bits. The film-industry default.
    #[default]
    FilledMethodA,
    /// Word-filled, padding in the high bits.
    FilledMethodB,
}

impl Packing {
    /// Wire code of the packing convention.
    pub fn code(self) -> u16 {
        match self {
            Packing::Packed => 0,
            Packing::FilledMethodA => 1,
            Packing::FilledMethodB => 2,
        }
    }

    /// Decodes a wire code; unknown codes return `None`.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Packing::Packed),
            1 => Some(Packing::FilledMethodA),
            2 => Some(Packing::FilledMethodB),
            _ => None,
        }
    }
}

/// Per-element compression tag.
///
/// RLE is a recognized wire code but decode/encode are an explicit
/// unimplemented extension point; see
/// [`Error::Unimplemented`](filmio_core::Error::Unimplemented).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    /// No encoding.
    #[default]
    None,
    /// Run-length encoding.
    Rle,
}

impl Encoding {
    /// Wire code of the encoding.
    pub fn code(self) -> u16 {
        match self {
            Encoding::None => 0,
            Encoding::Rle => 1,
        }
    }

    /// Decodes a wire code; unknown codes return `None`.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Encoding::None),
            1 => Some(Encoding::Rle),
            _ => None,
        }
    }
}

/// Transfer function or colorimetric-matrix tag carried per element.
///
/// The same code space serves both the transfer and the colorimetric
/// header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    /// User defined.
    UserDefined,
    /// Printing density.
    PrintingDensity,
    /// Linear.
    Linear,
    /// Logarithmic.
    Logarithmic,
    /// Unspecified video.
    UnspecifiedVideo,
    /// SMPTE 274M (HD, 709 family).
    Smpte274M,
    /// ITU-R BT.709.
    ItuR709,
    /// ITU-R BT.601, 625-line systems.
    ItuR601,
    /// ITU-R BT.601, 525-line systems.
    ItuR602,
    /// Composite video NTSC.
    CompositeVideoNtsc,
    /// Composite video PAL.
    CompositeVideoPal,
    /// Z-depth, linear.
    ZLinear,
    /// Z-depth, homogeneous.
    ZHomogeneous,
    /// Field not set.
    Undefined,
}

impl Characteristic {
    /// Wire code of the characteristic.
    pub fn code(self) -> u8 {
        match self {
            Characteristic::UserDefined => 0,
            Characteristic::PrintingDensity => 1,
            Characteristic::Linear => 2,
            Characteristic::Logarithmic => 3,
            Characteristic::UnspecifiedVideo => 4,
            Characteristic::Smpte274M => 5,
            Characteristic::ItuR709 => 6,
            Characteristic::ItuR601 => 7,
            Characteristic::ItuR602 => 8,
            Characteristic::CompositeVideoNtsc => 9,
            Characteristic::CompositeVideoPal => 10,
            Characteristic::ZLinear => 11,
            Characteristic::ZHomogeneous => 12,
            Characteristic::Undefined => 0xFF,
        }
    }

    /// Decodes a wire code; unknown codes return `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Characteristic::UserDefined,
            1 => Characteristic::PrintingDensity,
            2 => Characteristic::Linear,
            3 => Characteristic::Logarithmic,
            4 => Characteristic::UnspecifiedVideo,
            5 => Characteristic::Smpte274M,
            6 => Characteristic::ItuR709,
            7 => Characteristic::ItuR601,
            8 => Characteristic::ItuR602,
            9 => Characteristic::CompositeVideoNtsc,
            10 => Characteristic::CompositeVideoPal,
            11 => Characteristic::ZLinear,
            12 => Characteristic::ZHomogeneous,
            0xFF => Characteristic::Undefined,
            _ => return None,
        })
    }

    /// True for tags that select the 601-family color matrix.
    ///
    /// Everything else that is YCbCr-coded uses the 709/274 family.
    pub fn is_601_family(self) -> bool {
        matches!(
            self,
            Characteristic::ItuR601
                | Characteristic::ItuR602
                | Characteristic::CompositeVideoNtsc
                | Characteristic::CompositeVideoPal
        )
    }
}

/// Pixel origin and scan direction of the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Left to right, top to bottom.
    #[default]
    LeftToRightTopToBottom,
    /// Right to left, top to bottom.
    RightToLeftTopToBottom,
    /// Left to right, bottom to top.
    LeftToRightBottomToTop,
    /// Right to left, bottom to top.
    RightToLeftBottomToTop,
    /// Top to bottom, left to right (transposed).
    TopToBottomLeftToRight,
    /// Top to bottom, right to left (transposed).
    TopToBottomRightToLeft,
    /// Bottom to top, left to right (transposed).
    BottomToTopLeftToRight,
    /// Bottom to top, right to left (transposed).
    BottomToTopRightToLeft,
}

impl Orientation {
    /// Wire code of the orientation.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Decodes a wire code; unknown codes return `None`.
    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            0 => Orientation::LeftToRightTopToBottom,
            1 => Orientation::RightToLeftTopToBottom,
            2 => Orientation::LeftToRightBottomToTop,
            3 => Orientation::RightToLeftBottomToTop,
            4 => Orientation::TopToBottomLeftToRight,
            5 => Orientation::TopToBottomRightToLeft,
            6 => Orientation::BottomToTopLeftToRight,
            7 => Orientation::BottomToTopRightToLeft,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_codes_roundtrip() {
        for code in 0u8..=200 {
            if let Some(d) = Descriptor::from_code(code) {
                assert_eq!(d.code(), code, "descriptor code {}", code);
            }
        }
        assert_eq!(Descriptor::Rgb.code(), 50);
        assert_eq!(Descriptor::Abgr.code(), 52);
        assert_eq!(Descriptor::CbYCrY422.code(), 100);
        assert_eq!(Descriptor::from_code(5), None);
        assert_eq!(Descriptor::from_code(157), None);
    }

    #[test]
    fn test_descriptor_components() {
        assert_eq!(Descriptor::Luma.components(), 1);
        assert_eq!(Descriptor::Rgb.components(), 3);
        assert_eq!(Descriptor::Rgba.components(), 4);
        assert_eq!(Descriptor::Abgr.components(), 4);
        assert_eq!(Descriptor::CbYCrY422.components(), 2);
        assert_eq!(Descriptor::CbYACrYA4224.components(), 3);
        assert_eq!(Descriptor::CbYCrA4444.components(), 4);
        assert_eq!(Descriptor::UserDefinedNComp(8).components(), 8);
        assert_eq!(Descriptor::UserDefinedNComp(8).code(), 156);
    }

    #[test]
    fn test_data_size() {
        assert_eq!(DataSize::from_bits(10), Some(DataSize::D10));
        assert_eq!(DataSize::from_bits(14), None);
        assert_eq!(DataSize::D10.max_value(), 1023);
        assert!(DataSize::D32.is_float());
        assert!(!DataSize::D16.is_float());
    }

    #[test]
    fn test_packing_encoding_codes() {
        assert_eq!(Packing::from_code(1), Some(Packing::FilledMethodA));
        assert_eq!(Packing::from_code(3), None);
        assert_eq!(Encoding::Rle.code(), 1);
        assert_eq!(Encoding::from_code(2), None);
    }

    #[test]
    fn test_characteristic_family() {
        assert!(Characteristic::ItuR601.is_601_family());
        assert!(Characteristic::CompositeVideoPal.is_601_family());
        assert!(!Characteristic::ItuR709.is_601_family());
        assert!(!Characteristic::Smpte274M.is_601_family());
        assert_eq!(Characteristic::from_code(0xFF), Some(Characteristic::Undefined));
        assert_eq!(Characteristic::from_code(42), None);
    }

    #[test]
    fn test_orientation_codes() {
        for code in 0u16..8 {
            assert_eq!(Orientation::from_code(code).unwrap().code(), code);
        }
        assert_eq!(Orientation::from_code(8), None);
    }
}
