//! # filmio-dpx
//!
//! SMPTE DPX (Digital Picture Exchange) reading and writing.
//!
//! DPX is the interchange format of film scanning and digital
//! intermediate work: a fixed 2048-byte header followed by up to eight
//! independent image elements, most commonly 10-bit log RGB filled into
//! 32-bit words.
//!
//! # Architecture
//!
//! - [`Header`] - The full generic + industry header, parsed to native
//!   byte order with `Option` accessors over the absent-field sentinels
//! - [`Reader`] / [`Writer`] - Orchestration over any [`Stream`]:
//!   header, user data, then per-element pixel access
//! - [`codec`] - Element layout resolution and the per-depth pack/unpack
//!   paths (8/10/12/16-bit integer, 32/64-bit float; packed and both
//!   filled conventions)
//! - [`color`] - Native YCbCr layouts to and from RGB(A)
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use filmio_dpx::{Reader, Writer, Descriptor, DataSize, Packing};
//!
//! // Read the first element of a scan, widened to 16 bits.
//! let mut reader = Reader::open("scan.dpx")?;
//! let h = reader.header();
//! let samples = (h.width().unwrap() * h.height().unwrap() * 3) as usize;
//! let mut pixels = vec![0u16; samples];
//! reader.read_image(0, &mut pixels)?;
//!
//! // Write it back as 10-bit filled RGB.
//! let mut writer = Writer::create("out.dpx")?;
//! writer.set_image_info(h.width().unwrap(), h.height().unwrap());
//! writer.add_element(Descriptor::Rgb, DataSize::D10, Packing::FilledMethodA)?;
//! writer.write_header()?;
//! writer.write_element(&pixels)?;
//! writer.finish()?;
//! ```
//!
//! # Supported Layouts
//!
//! | Depth | Packed | Filled A | Filled B |
//! |-------|--------|----------|----------|
//! | 8-bit | Yes | n/a | n/a |
//! | 10-bit | Yes | Yes | Yes |
//! | 12-bit | Yes | Yes | Yes |
//! | 16-bit | Yes | n/a | n/a |
//! | 32/64-bit float | Yes | n/a | n/a |
//!
//! RLE-encoded elements are detected and rejected with
//! [`Error::Unimplemented`](filmio_core::Error::Unimplemented) rather
//! than decoded incorrectly.
//!
//! [`Stream`]: filmio_core::Stream

#![warn(missing_docs)]

pub mod codec;
pub mod color;
pub mod header;
pub mod reader;
pub mod types;
pub mod writer;

pub use codec::ElementLayout;
pub use header::{ByteOrder, FileInfo, Header, ImageElement, HEADER_SIZE, MAGIC};
pub use reader::Reader;
pub use types::{Characteristic, DataSize, Descriptor, Encoding, Orientation, Packing};
pub use writer::Writer;
