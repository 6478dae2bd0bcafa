//! # filmio-core
//!
//! Core types shared by the digital-intermediate frame codecs.
//!
//! This crate provides the foundational pieces used by `filmio-dpx` and
//! `filmio-cineon`:
//!
//! - [`Error`], [`Result`] - Unified error type for all codec operations
//! - [`Stream`] - Seekable byte source/sink abstraction with file and
//!   memory backings
//! - [`bits`] - Byte-order and bit-packing primitives (packed and filled
//!   10/12-bit layouts, widen-by-replication)
//! - [`Block`] - Rectangular region for partial image reads and writes
//!
//! ## Crate Structure
//!
//! This crate is the leaf of the workspace and has no internal
//! dependencies:
//!
//! ```text
//! filmio-core (this crate)
//!    ^
//!    |
//!    +-- filmio-dpx    (DPX header, codec, reader/writer)
//!    +-- filmio-cineon (Cineon header, reader/writer)
//! ```
//!
//! Everything here is synchronous and single-threaded; a codec instance
//! is owned by one call sequence and never locks.

#![warn(missing_docs)]

pub mod bits;
pub mod block;
pub mod error;
pub mod stream;

pub use bits::Sample;
pub use block::Block;
pub use error::{Error, Result};
pub use stream::{FileStream, MemoryStream, Stream};
