//! Wire-code enums for the Cineon header.

/// Channel designator, the second byte of the two-byte descriptor pair
/// (the first byte is the metric, 0 for universal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Greyscale / universal.
    Luma,
    /// Red printing density.
    Red,
    /// Green printing density.
    Green,
    /// Blue printing density.
    Blue,
    /// Vendor- or user-defined designator.
    Other(u8),
}

impl ChannelKind {
    /// Wire code of the designator.
    pub fn code(self) -> u8 {
        match self {
            ChannelKind::Luma => 0,
            ChannelKind::Red => 1,
            ChannelKind::Green => 2,
            ChannelKind::Blue => 3,
            ChannelKind::Other(c) => c,
        }
    }

    /// Decodes a wire code; every value maps to a kind.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => ChannelKind::Luma,
            1 => ChannelKind::Red,
            2 => ChannelKind::Green,
            3 => ChannelKind::Blue,
            c => ChannelKind::Other(c),
        }
    }
}

/// Bits per sample of a channel.
///
/// The wire field is a free byte; these are the depths the codec packs
/// and unpacks. 10-bit is the dominant real-world depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Depth {
    /// 8-bit.
    D8,
    /// 10-bit (widened to 16 on decode).
    #[default]
    D10,
    /// 12-bit (widened to 16 on decode).
    D12,
    /// 16-bit.
    D16,
}

impl Depth {
    /// Bits per sample as stored in the header.
    pub fn bits(self) -> u8 {
        match self {
            Depth::D8 => 8,
            Depth::D10 => 10,
            Depth::D12 => 12,
            Depth::D16 => 16,
        }
    }

    /// Decodes the header's bits-per-sample byte.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            8 => Some(Depth::D8),
            10 => Some(Depth::D10),
            12 => Some(Depth::D12),
            16 => Some(Depth::D16),
            _ => None,
        }
    }
}

/// Data packing convention.
///
/// The wire field defines eight codes; the byte- and 16-bit-word
/// variants (codes 1 through 4) never took hold and are rejected as
/// unsupported layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CineonPacking {
    /// Continuous bitstream, no padding bits (code 0).
    Packed,
    /// 32-bit words, samples left-justified, pad in the low bits
    /// (code 5). The dominant layout for 10-bit scans.
    #[default]
    FilledLeft,
    /// 32-bit words, samples right-justified, pad in the high bits
    /// (code 6).
    FilledRight,
}

impl CineonPacking {
    /// Wire code of the packing convention.
    pub fn code(self) -> u8 {
        match self {
            CineonPacking::Packed => 0,
            CineonPacking::FilledLeft => 5,
            CineonPacking::FilledRight => 6,
        }
    }

    /// Decodes a wire code; unsupported codes return `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(CineonPacking::Packed),
            5 => Some(CineonPacking::FilledLeft),
            6 => Some(CineonPacking::FilledRight),
            _ => None,
        }
    }
}

/// Channel interleaving of the image data area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interleave {
    /// Samples interleaved per pixel (RGB RGB ...). The layout every
    /// mainstream producer writes.
    #[default]
    Pixel,
    /// Whole lines per channel.
    Line,
    /// Whole planes per channel.
    Channel,
}

impl Interleave {
    /// Wire code of the interleave.
    pub fn code(self) -> u8 {
        match self {
            Interleave::Pixel => 0,
            Interleave::Line => 1,
            Interleave::Channel => 2,
        }
    }

    /// Decodes a wire code; unknown codes return `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Interleave::Pixel),
            1 => Some(Interleave::Line),
            2 => Some(Interleave::Channel),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_kind_codes() {
        for c in 0..=255u8 {
            assert_eq!(ChannelKind::from_code(c).code(), c);
        }
        assert_eq!(ChannelKind::from_code(2), ChannelKind::Green);
        assert_eq!(ChannelKind::from_code(99), ChannelKind::Other(99));
    }

    #[test]
    fn test_packing_codes() {
        assert_eq!(CineonPacking::from_code(0), Some(CineonPacking::Packed));
        assert_eq!(CineonPacking::from_code(5), Some(CineonPacking::FilledLeft));
        assert_eq!(CineonPacking::from_code(6), Some(CineonPacking::FilledRight));
        // Byte/16-bit-word conventions are recognized as codes but not
        // supported layouts.
        for c in [1u8, 2, 3, 4, 7] {
            assert_eq!(CineonPacking::from_code(c), None);
        }
        assert_eq!(CineonPacking::default(), CineonPacking::FilledLeft);
    }

    #[test]
    fn test_depth_codes() {
        assert_eq!(Depth::from_bits(10), Some(Depth::D10));
        assert_eq!(Depth::from_bits(14), None);
        assert_eq!(Depth::D12.bits(), 12);
    }
}
