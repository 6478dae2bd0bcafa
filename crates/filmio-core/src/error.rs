//! Error types for codec operations.
//!
//! Provides unified error handling for header parsing, element I/O and
//! color conversion across the DPX and Cineon codecs.

use std::io;
use thiserror::Error;

/// Codec operation error.
///
/// Stream failures propagate unchanged through the [`Io`](Error::Io)
/// variant; nothing in the engine retries internally. Header problems are
/// reported before any observable state is mutated, so a failed read never
/// leaves a partially valid header behind.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying stream I/O error (short read/write/seek included).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Magic cookie matched neither legal byte-order encoding.
    #[error("bad magic cookie: 0x{0:08X}")]
    BadMagic(u32),

    /// Header or data region shorter than the format requires.
    #[error("truncated {0}")]
    Truncated(&'static str),

    /// A (bit depth, packing) combination the codec does not implement.
    #[error("unsupported layout: {bits}-bit, packing code {packing}")]
    UnsupportedLayout {
        /// Bits per sample as declared by the element.
        bits: u8,
        /// Wire code of the packing convention.
        packing: u16,
    },

    /// Descriptor or characteristic code with no defined conversion.
    #[error("unsupported descriptor: code {0}")]
    UnsupportedDescriptor(u8),

    /// Feature that is a recognized part of the format but has no working
    /// implementation (notably RLE). Never silently emits wrong pixels.
    #[error("unimplemented feature: {0}")]
    Unimplemented(&'static str),

    /// Caller-supplied parameter violates the API contract.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::BadMagic(0x12345678);
        assert_eq!(e.to_string(), "bad magic cookie: 0x12345678");

        let e = Error::UnsupportedLayout { bits: 14, packing: 1 };
        assert_eq!(e.to_string(), "unsupported layout: 14-bit, packing code 1");
    }

    #[test]
    fn test_io_error_from() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "short read");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
    }
}
