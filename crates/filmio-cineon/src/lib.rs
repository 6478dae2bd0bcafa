//! # filmio-cineon
//!
//! Kodak Cineon reading and writing.
//!
//! Cineon is the film-scan format DPX grew out of: a fixed 2048-byte
//! header, up to eight channel records, and one pixel-interleaved image
//! data area, almost always 10-bit printing density filled into 32-bit
//! words.
//!
//! # Architecture
//!
//! - [`Header`] - The full header parsed to native byte order with
//!   `Option` accessors over the absent-field sentinels
//! - [`Reader`] / [`Writer`] - Orchestration over any [`Stream`]:
//!   header, user data, then the image
//! - [`codec`] - Image layout resolution and the pack/unpack paths,
//!   built on the same `filmio-core` primitives the DPX codec uses
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use filmio_cineon::{ChannelKind, CineonPacking, Depth, Reader, Writer};
//!
//! let mut reader = Reader::open("scan.cin")?;
//! let h = reader.header();
//! let samples = (h.width().unwrap() * h.height().unwrap()) as usize
//!     * h.channel_count();
//! let mut pixels = vec![0u16; samples];
//! reader.read_image(&mut pixels)?;
//! ```
//!
//! [`Stream`]: filmio_core::Stream

#![warn(missing_docs)]

pub mod codec;
pub mod header;
pub mod reader;
pub mod types;
pub mod writer;

pub use codec::ImageLayout;
pub use header::{ByteOrder, Channel, Header, HEADER_SIZE, MAGIC};
pub use reader::Reader;
pub use types::{ChannelKind, CineonPacking, Depth, Interleave};
pub use writer::Writer;
