//! Byte-order and bit-packing primitives.
//!
//! Everything in this module is branch-light and allocation-free; the
//! element codecs call these helpers from their per-line inner loops.
//!
//! # Packing conventions
//!
//! Sub-word sample depths (10 and 12 bit) are stored one of three ways:
//!
//! | Convention | Layout |
//! |------------|--------|
//! | Packed | Continuous bitstream, no padding. 10-bit repeats every 160 bits (16 samples / 5 words), 12-bit every 96 bits (8 samples / 3 words) |
//! | Filled method A | Fixed-width slot per word, padding in the low bits |
//! | Filled method B | Fixed-width slot per word, padding in the high bits |
//!
//! Packed samples are not individually byte-aligned: within each 32-bit
//! storage word they run LSB-first and spill across word boundaries.
//! [`extract_packed`] and [`insert_packed`] are exact mirrors, so a round
//! trip at the same depth is bit-exact.
//!
//! # Widening
//!
//! Decoded 10/12-bit samples are widened to 16 bits by bit replication,
//! not a naive shift: 10-bit `x` becomes `(x << 6) | (x >> 4)`. Replication
//! maps the top code value to the top of the wider range, which a plain
//! shift does not. Narrowing is the mirror shift, so
//! `narrow10(widen10(x)) == x` for every 10-bit `x`.

/// Whether the host stores multi-byte values big-endian.
///
/// Resolved at compile time. Callers holding native-order buffers compare
/// this against the byte order a file declares when deciding whether
/// [`swap_buffer`] is needed; the codecs themselves decode per sample
/// through [`Sample::read_bytes`] and never consult it.
pub const NATIVE_IS_BIG_ENDIAN: bool = cfg!(target_endian = "big");

/// A raw sample type the codecs can read into or write from.
///
/// Implemented for the six storage types the formats use: `u8`, `u16`,
/// `u32`, `u64` for integer depths and `f32`, `f64` for floating-point
/// elements. Integer conversions between depths go through
/// [`convert_int`]; floats pass through untouched (only a width cast
/// between `f32` and `f64` is defined).
pub trait Sample: Copy + Default + PartialEq + std::fmt::Debug + 'static {
    /// Storage width in bytes.
    const BYTES: usize;
    /// Storage width in bits.
    const BITS: u32;
    /// True for `f32`/`f64`.
    const IS_FLOAT: bool;

    /// Reverses byte order. No-op for single-byte types.
    fn swap_bytes(self) -> Self;

    /// Builds a sample from a raw integer value of `src_bits` significant
    /// bits, widening or narrowing per the replication rule.
    ///
    /// For float types the integer code value is cast numerically; this
    /// path only runs when a caller explicitly asks for an integer element
    /// in a float buffer.
    fn from_raw(v: u64, src_bits: u32) -> Self;

    /// Extracts this sample as a raw integer value of `dst_bits`
    /// significant bits (mirror of [`from_raw`](Sample::from_raw)).
    fn to_raw(self, dst_bits: u32) -> u64;

    /// Numeric value as `f64`, for float pass-through paths.
    fn to_f64(self) -> f64;

    /// Builds a sample from an `f64`, for float pass-through paths.
    fn from_f64(v: f64) -> Self;

    /// Decodes one sample from the first `BYTES` bytes of `buf` in the
    /// given byte order.
    fn read_bytes(buf: &[u8], big_endian: bool) -> Self;

    /// Encodes one sample into the first `BYTES` bytes of `buf` in the
    /// given byte order (mirror of [`read_bytes`](Sample::read_bytes)).
    fn write_bytes(self, buf: &mut [u8], big_endian: bool);
}

macro_rules! int_sample {
    ($t:ty, $bytes:expr) => {
        impl Sample for $t {
            const BYTES: usize = $bytes;
            const BITS: u32 = ($bytes as u32) * 8;
            const IS_FLOAT: bool = false;

            #[inline]
            fn swap_bytes(self) -> Self {
                <$t>::swap_bytes(self)
            }

            #[inline]
            fn from_raw(v: u64, src_bits: u32) -> Self {
                convert_int(v, src_bits, Self::BITS) as $t
            }

            #[inline]
            fn to_raw(self, dst_bits: u32) -> u64 {
                convert_int(self as u64, Self::BITS, dst_bits)
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn read_bytes(buf: &[u8], big_endian: bool) -> Self {
                let mut raw = [0u8; $bytes];
                raw.copy_from_slice(&buf[..$bytes]);
                if big_endian {
                    <$t>::from_be_bytes(raw)
                } else {
                    <$t>::from_le_bytes(raw)
                }
            }

            #[inline]
            fn write_bytes(self, buf: &mut [u8], big_endian: bool) {
                let raw = if big_endian {
                    self.to_be_bytes()
                } else {
                    self.to_le_bytes()
                };
                buf[..$bytes].copy_from_slice(&raw);
            }
        }
    };
}

int_sample!(u8, 1);
int_sample!(u16, 2);
int_sample!(u32, 4);
int_sample!(u64, 8);

impl Sample for f32 {
    const BYTES: usize = 4;
    const BITS: u32 = 32;
    const IS_FLOAT: bool = true;

    #[inline]
    fn swap_bytes(self) -> Self {
        f32::from_bits(self.to_bits().swap_bytes())
    }

    #[inline]
    fn from_raw(v: u64, _src_bits: u32) -> Self {
        v as f32
    }

    #[inline]
    fn to_raw(self, _dst_bits: u32) -> u64 {
        self as u64
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn read_bytes(buf: &[u8], big_endian: bool) -> Self {
        f32::from_bits(u32::read_bytes(buf, big_endian))
    }

    #[inline]
    fn write_bytes(self, buf: &mut [u8], big_endian: bool) {
        self.to_bits().write_bytes(buf, big_endian)
    }
}

impl Sample for f64 {
    const BYTES: usize = 8;
    const BITS: u32 = 64;
    const IS_FLOAT: bool = true;

    #[inline]
    fn swap_bytes(self) -> Self {
        f64::from_bits(self.to_bits().swap_bytes())
    }

    #[inline]
    fn from_raw(v: u64, _src_bits: u32) -> Self {
        v as f64
    }

    #[inline]
    fn to_raw(self, _dst_bits: u32) -> u64 {
        self as u64
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn read_bytes(buf: &[u8], big_endian: bool) -> Self {
        f64::from_bits(u64::read_bytes(buf, big_endian))
    }

    #[inline]
    fn write_bytes(self, buf: &mut [u8], big_endian: bool) {
        self.to_bits().write_bytes(buf, big_endian)
    }
}

/// Reverses the byte order of every element in the buffer.
pub fn swap_buffer<T: Sample>(buf: &mut [T]) {
    if T::BYTES == 1 {
        return;
    }
    for v in buf.iter_mut() {
        *v = v.swap_bytes();
    }
}

/// Converts an integer code value between bit widths.
///
/// Widening replicates the source bits downward so full-scale maps to
/// full-scale (`0x3FF` at 10 bits becomes `0xFFFF` at 16); narrowing keeps
/// the most significant bits. Mirror operations: for `from < to`,
/// `convert_int(convert_int(x, from, to), to, from) == x`.
#[inline]
pub fn convert_int(v: u64, from_bits: u32, to_bits: u32) -> u64 {
    if from_bits == to_bits {
        return v;
    }
    if from_bits > to_bits {
        return v >> (from_bits - to_bits);
    }
    let mut out: u64 = 0;
    let mut shift = to_bits as i64 - from_bits as i64;
    while shift > 0 {
        out |= v << shift;
        shift -= from_bits as i64;
    }
    out | (v >> (-shift) as u32)
}

/// Widens a 10-bit sample to 16 bits by replication.
#[inline]
pub fn widen10(x: u16) -> u16 {
    (x << 6) | (x >> 4)
}

/// Widens a 12-bit sample to 16 bits by replication.
#[inline]
pub fn widen12(x: u16) -> u16 {
    (x << 4) | (x >> 8)
}

/// Narrows a replication-widened 16-bit sample back to 10 bits.
#[inline]
pub fn narrow10(x: u16) -> u16 {
    x >> 6
}

/// Narrows a replication-widened 16-bit sample back to 12 bits.
#[inline]
pub fn narrow12(x: u16) -> u16 {
    x >> 4
}

/// Repeating period of the packed 10-bit layout, in bits.
pub const PACKED_PERIOD_10: usize = 160;
/// Repeating period of the packed 12-bit layout, in bits.
pub const PACKED_PERIOD_12: usize = 96;

/// Extracts `bits` (at most 32) from a continuous LSB-first bitstream
/// stored in native-order `u32` words.
///
/// The value may span a word boundary; the caller guarantees the buffer
/// covers `bit_offset + bits`.
#[inline]
pub fn extract_packed(words: &[u32], bit_offset: usize, bits: u32) -> u32 {
    debug_assert!(bits <= 32);
    let word = bit_offset / 32;
    let shift = (bit_offset % 32) as u32;
    let mask = if bits == 32 { u32::MAX } else { (1u32 << bits) - 1 };

    let mut value = words[word] >> shift;
    if shift + bits > 32 {
        value |= words[word + 1] << (32 - shift);
    }
    value & mask
}

/// Inserts `bits` (at most 32) into a continuous LSB-first bitstream,
/// mirror of [`extract_packed`].
///
/// Target bits must be zero beforehand; the codec packs into pre-zeroed
/// line buffers.
#[inline]
pub fn insert_packed(words: &mut [u32], bit_offset: usize, bits: u32, value: u32) {
    debug_assert!(bits <= 32);
    let word = bit_offset / 32;
    let shift = (bit_offset % 32) as u32;
    let mask = if bits == 32 { u32::MAX } else { (1u32 << bits) - 1 };
    let value = value & mask;

    words[word] |= value << shift;
    if shift + bits > 32 {
        words[word + 1] |= value >> (32 - shift);
    }
}

/// In-word bit positions of the three 10-bit samples under filled
/// method A (padding in bits 1..0).
pub const FILLED_A_SHIFTS_10: [u32; 3] = [22, 12, 2];
/// In-word bit positions of the three 10-bit samples under filled
/// method B (padding in bits 31..30).
pub const FILLED_B_SHIFTS_10: [u32; 3] = [20, 10, 0];

/// Extracts the `index`-th 10-bit sample of a filled 32-bit word.
#[inline]
pub fn extract_filled10(word: u32, index: usize, method_b: bool) -> u16 {
    let shift = if method_b {
        FILLED_B_SHIFTS_10[index]
    } else {
        FILLED_A_SHIFTS_10[index]
    };
    ((word >> shift) & 0x3FF) as u16
}

/// Inserts the `index`-th 10-bit sample into a filled 32-bit word.
#[inline]
pub fn insert_filled10(word: &mut u32, index: usize, method_b: bool, value: u16) {
    let shift = if method_b {
        FILLED_B_SHIFTS_10[index]
    } else {
        FILLED_A_SHIFTS_10[index]
    };
    *word |= ((value as u32) & 0x3FF) << shift;
}

/// Extracts a 12-bit sample from its 16-bit slot.
///
/// Method A left-justifies the datum (padding in bits 3..0), method B
/// right-justifies it (padding in bits 15..12).
#[inline]
pub fn extract_filled12(word: u16, method_b: bool) -> u16 {
    if method_b {
        word & 0x0FFF
    } else {
        word >> 4
    }
}

/// Inserts a 12-bit sample into its 16-bit slot, mirror of
/// [`extract_filled12`].
#[inline]
pub fn insert_filled12(value: u16, method_b: bool) -> u16 {
    if method_b {
        value & 0x0FFF
    } else {
        (value & 0x0FFF) << 4
    }
}
