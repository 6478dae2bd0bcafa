//! DPX header model.
//!
//! The DPX header is a 2048-byte fixed-layout region: a generic section
//! (file, image and orientation information, bytes 0..1664) followed by an
//! industry section (film and television information, bytes 1664..2048).
//! Every field sits at a byte position frozen by SMPTE 268M.
//!
//! # Byte order
//!
//! The 4-byte magic cookie at offset 0 has exactly two legal encodings:
//! `SDPX` (big-endian file) and `XPDS` (little-endian file). Parsing
//! normalizes every multi-byte field to native order up front, so
//! accessors never see swapped values; the detected order is kept on the
//! header so a rewrite can reproduce it.
//!
//! # Absent fields
//!
//! A blank header carries all-bits-set sentinels (`0xFF..`, NaN for
//! floats). Accessors convert the sentinel to `None` at the API surface;
//! the raw struct fields keep the wire value so serialization is a
//! straight store. Out-of-range element indices also answer `None` rather
//! than erroring.
//!
//! # Layout tables
//!
//! | Section | Bytes |
//! |------------------|-----------|
//! | File information | 0..768 |
//! | Image information| 768..1408 |
//! | Orientation | 1408..1664|
//! | Film industry | 1664..1920|
//! | Television | 1920..2048|
//!
//! Each of the up to 8 image elements is a 72-byte sub-record starting at
//! byte 780.

use crate::types::{Characteristic, DataSize, Descriptor, Encoding, Orientation, Packing};
use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use filmio_core::{Error, Result, Stream};
use std::io::SeekFrom;

/// Magic cookie of a big-endian DPX file ("SDPX").
pub const MAGIC: u32 = 0x5344_5058;
/// Magic cookie as seen when the file is byte-swapped ("XPDS").
pub const MAGIC_SWAPPED: u32 = 0x5850_4453;
/// Total fixed header size in bytes.
pub const HEADER_SIZE: usize = 2048;
/// Maximum number of image elements a header can carry.
pub const MAX_ELEMENTS: usize = 8;

/// Size of the generic header section (file + image + orientation).
pub const GENERIC_SIZE: u32 = 1664;
/// Size of the industry header section (film + television).
pub const INDUSTRY_SIZE: u32 = 384;

/// Absent-field sentinel for u32 fields.
pub const UNDEF_U32: u32 = u32::MAX;
/// Absent-field sentinel for u16 fields.
pub const UNDEF_U16: u16 = u16::MAX;
/// Absent-field sentinel for u8 fields.
pub const UNDEF_U8: u8 = u8::MAX;

/// Byte order of a DPX file on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Big-endian, magic reads "SDPX". The common order for film work.
    #[default]
    Big,
    /// Little-endian, magic reads "XPDS".
    Little,
}

// Fixed byte positions patched after encoding completes.
const POS_IMAGE_OFFSET: usize = 4;
const POS_FILE_SIZE: usize = 16;
const POS_ELEMENT_COUNT: usize = 770;
const POS_ELEMENTS: usize = 780;
const ELEMENT_RECORD_SIZE: usize = 72;
const ELEMENT_DATA_OFFSET_FIELD: usize = 28;

/// Generic file information, bytes 0..768.
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// Magic cookie (native order once parsed).
    pub magic: u32,
    /// Offset to the first image data byte.
    pub image_offset: u32,
    /// Version string, "V2.0" for SMPTE 268M-2003 files.
    pub version: String,
    /// Total file size in bytes.
    pub file_size: u32,
    /// 1 when the frame duplicates the previous frame's header values.
    pub ditto_key: u32,
    /// Generic header section length.
    pub generic_size: u32,
    /// Industry header section length.
    pub industry_size: u32,
    /// User data length (0 or sentinel when absent).
    pub user_size: u32,
    /// Image file name.
    pub file_name: String,
    /// Creation timestamp, "yyyy:mm:dd:hh:mm:ssLTZ".
    pub creation_time: String,
    /// Creator software.
    pub creator: String,
    /// Project name.
    pub project: String,
    /// Copyright statement.
    pub copyright: String,
    /// Encryption key; all-bits-set means unencrypted.
    pub encrypt_key: u32,
}

impl FileInfo {
    fn blank() -> Self {
        Self {
            magic: MAGIC,
            image_offset: UNDEF_U32,
            version: "V2.0".to_string(),
            file_size: UNDEF_U32,
            ditto_key: 1,
            generic_size: GENERIC_SIZE,
            industry_size: INDUSTRY_SIZE,
            user_size: 0,
            file_name: String::new(),
            creation_time: String::new(),
            creator: String::new(),
            project: String::new(),
            copyright: String::new(),
            encrypt_key: UNDEF_U32,
        }
    }
}

/// One per-element sub-record, 72 bytes at `780 + 72 * index`.
///
/// Raw wire codes are stored as read so unknown values survive a
/// round trip; typed accessors decode them on demand.
#[derive(Debug, Clone)]
pub struct ImageElement {
    /// Data sign: 0 unsigned, 1 signed.
    pub data_sign: u32,
    /// Minimum expected code value.
    pub low_data: u32,
    /// Signal level of the minimum code value.
    pub low_quantity: f32,
    /// Maximum expected code value.
    pub high_data: u32,
    /// Signal level of the maximum code value.
    pub high_quantity: f32,
    /// Descriptor wire code.
    pub descriptor: u8,
    /// Transfer characteristic wire code.
    pub transfer: u8,
    /// Colorimetric specification wire code.
    pub colorimetric: u8,
    /// Bits per sample.
    pub bit_size: u8,
    /// Packing wire code.
    pub packing: u16,
    /// Encoding wire code.
    pub encoding: u16,
    /// Offset to this element's data from the start of the file.
    pub data_offset: u32,
    /// End-of-line padding in bytes.
    pub eol_padding: u32,
    /// End-of-image padding in bytes.
    pub eoi_padding: u32,
    /// Free-form description.
    pub description: String,
}

impl ImageElement {
    fn blank() -> Self {
        Self {
            data_sign: 0,
            low_data: UNDEF_U32,
            low_quantity: f32::NAN,
            high_data: UNDEF_U32,
            high_quantity: f32::NAN,
            descriptor: UNDEF_U8,
            transfer: UNDEF_U8,
            colorimetric: UNDEF_U8,
            bit_size: UNDEF_U8,
            packing: UNDEF_U16,
            encoding: UNDEF_U16,
            data_offset: UNDEF_U32,
            eol_padding: UNDEF_U32,
            eoi_padding: UNDEF_U32,
            description: String::new(),
        }
    }

    /// Typed descriptor, `None` for absent or unknown codes.
    pub fn descriptor(&self) -> Option<Descriptor> {
        Descriptor::from_code(self.descriptor)
    }

    /// Typed transfer characteristic.
    pub fn transfer(&self) -> Option<Characteristic> {
        Characteristic::from_code(self.transfer)
    }

    /// Typed colorimetric characteristic.
    pub fn colorimetric(&self) -> Option<Characteristic> {
        Characteristic::from_code(self.colorimetric)
    }

    /// Typed bit depth.
    pub fn data_size(&self) -> Option<DataSize> {
        DataSize::from_bits(self.bit_size)
    }

    /// Typed packing convention.
    pub fn packing(&self) -> Option<Packing> {
        Packing::from_code(self.packing)
    }

    /// Typed encoding.
    pub fn encoding(&self) -> Option<Encoding> {
        Encoding::from_code(self.encoding)
    }

    /// End-of-line padding, absent sentinel mapped to zero.
    pub fn eol_padding_bytes(&self) -> u32 {
        if self.eol_padding == UNDEF_U32 { 0 } else { self.eol_padding }
    }

    /// End-of-image padding, absent sentinel mapped to zero.
    pub fn eoi_padding_bytes(&self) -> u32 {
        if self.eoi_padding == UNDEF_U32 { 0 } else { self.eoi_padding }
    }
}

/// Generic image information, bytes 768..1408.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Orientation wire code.
    pub orientation: u16,
    /// Number of populated elements.
    pub element_count: u16,
    /// Pixels per line.
    pub pixels_per_line: u32,
    /// Lines per element.
    pub lines_per_element: u32,
    /// The eight element sub-records; records past `element_count` stay
    /// blank.
    pub elements: [ImageElement; MAX_ELEMENTS],
}

impl ImageInfo {
    fn blank() -> Self {
        Self {
            orientation: UNDEF_U16,
            element_count: 0,
            pixels_per_line: UNDEF_U32,
            lines_per_element: UNDEF_U32,
            elements: std::array::from_fn(|_| ImageElement::blank()),
        }
    }
}

/// Image origination / orientation information, bytes 1408..1664.
#[derive(Debug, Clone)]
pub struct OrientInfo {
    /// X offset into the original contiguous image.
    pub x_offset: u32,
    /// Y offset into the original contiguous image.
    pub y_offset: u32,
    /// X image center in pixels.
    pub x_center: f32,
    /// Y image center in pixels.
    pub y_center: f32,
    /// X size of the original image.
    pub x_original_size: u32,
    /// Y size of the original image.
    pub y_original_size: u32,
    /// Source image file name.
    pub file_name: String,
    /// Source image timestamp.
    pub creation_time: String,
    /// Input device name.
    pub input_device: String,
    /// Input device serial number.
    pub input_serial: String,
    /// Border validity: XL, XR, YT, YB.
    pub border: [u16; 4],
    /// Pixel aspect ratio as an integer pair (horizontal, vertical).
    pub aspect_ratio: [u32; 2],
}

impl OrientInfo {
    fn blank() -> Self {
        Self {
            x_offset: UNDEF_U32,
            y_offset: UNDEF_U32,
            x_center: f32::NAN,
            y_center: f32::NAN,
            x_original_size: UNDEF_U32,
            y_original_size: UNDEF_U32,
            file_name: String::new(),
            creation_time: String::new(),
            input_device: String::new(),
            input_serial: String::new(),
            border: [UNDEF_U16; 4],
            aspect_ratio: [UNDEF_U32; 2],
        }
    }
}

/// Motion-picture film industry information, bytes 1664..1920.
#[derive(Debug, Clone)]
pub struct FilmInfo {
    /// Film manufacturer ID code (2 digits from the edge code).
    pub film_mfg_id: String,
    /// Film type (2 digits from the edge code).
    pub film_type: String,
    /// Offset in perfs (2 digits from the edge code).
    pub perfs_offset: String,
    /// Prefix (6 digits from the edge code).
    pub prefix: String,
    /// Count (4 digits from the edge code).
    pub count: String,
    /// Format, e.g. "Academy".
    pub format: String,
    /// Frame position in the sequence.
    pub frame_position: u32,
    /// Sequence length in frames.
    pub sequence_length: u32,
    /// Held count (1 = default).
    pub held_count: u32,
    /// Frame rate of the original in frames per second.
    pub frame_rate: f32,
    /// Shutter angle of the camera in degrees.
    pub shutter_angle: f32,
    /// Frame identification, e.g. keyframe.
    pub frame_id: String,
    /// Slate information.
    pub slate_info: String,
}

impl FilmInfo {
    fn blank() -> Self {
        Self {
            film_mfg_id: String::new(),
            film_type: String::new(),
            perfs_offset: String::new(),
            prefix: String::new(),
            count: String::new(),
            format: String::new(),
            frame_position: UNDEF_U32,
            sequence_length: UNDEF_U32,
            held_count: UNDEF_U32,
            frame_rate: f32::NAN,
            shutter_angle: f32::NAN,
            frame_id: String::new(),
            slate_info: String::new(),
        }
    }
}

/// Television industry information, bytes 1920..2048.
#[derive(Debug, Clone)]
pub struct TvInfo {
    /// SMPTE timecode as packed BCD.
    pub time_code: u32,
    /// SMPTE user bits.
    pub user_bits: u32,
    /// Interlace: 0 non-interlaced, 1 2:1 interlace.
    pub interlace: u8,
    /// Field number.
    pub field_number: u8,
    /// Video signal standard wire code.
    pub video_signal: u8,
    /// Horizontal sampling rate in Hz.
    pub horizontal_sample_rate: f32,
    /// Vertical sampling rate in Hz.
    pub vertical_sample_rate: f32,
    /// Temporal sampling (frame) rate in Hz.
    pub temporal_frame_rate: f32,
    /// Time offset from sync to first pixel, microseconds.
    pub time_offset: f32,
    /// Gamma of the capture device.
    pub gamma: f32,
    /// Black level code value.
    pub black_level: f32,
    /// Black gain.
    pub black_gain: f32,
    /// Breakpoint of the gamma curve.
    pub break_point: f32,
    /// White level code value.
    pub white_level: f32,
    /// Integration time in seconds.
    pub integration_times: f32,
}

impl TvInfo {
    fn blank() -> Self {
        Self {
            time_code: UNDEF_U32,
            user_bits: UNDEF_U32,
            interlace: UNDEF_U8,
            field_number: UNDEF_U8,
            video_signal: UNDEF_U8,
            horizontal_sample_rate: f32::NAN,
            vertical_sample_rate: f32::NAN,
            temporal_frame_rate: f32::NAN,
            time_offset: f32::NAN,
            gamma: f32::NAN,
            black_level: f32::NAN,
            black_gain: f32::NAN,
            break_point: f32::NAN,
            white_level: f32::NAN,
            integration_times: f32::NAN,
        }
    }
}

/// Generic header section: file + image + orientation information.
#[derive(Debug, Clone)]
pub struct GenericHeader {
    /// File information block.
    pub file: FileInfo,
    /// Image information block.
    pub image: ImageInfo,
    /// Orientation block.
    pub orient: OrientInfo,
}

/// Industry header section: film + television information.
#[derive(Debug, Clone)]
pub struct IndustryHeader {
    /// Motion-picture film block.
    pub film: FilmInfo,
    /// Television block.
    pub tv: TvInfo,
}

/// Complete DPX header: generic and industry sections composed by value.
///
/// A header starts blank (all sentinels) and is populated either by
/// [`Header::read`] from a stream or by the setter calls on a
/// [`Writer`](crate::Writer). A header instance is exclusively owned by
/// its reader or writer.
#[derive(Debug, Clone)]
pub struct Header {
    /// Generic section.
    pub generic: GenericHeader,
    /// Industry section.
    pub industry: IndustryHeader,
    /// Byte order the header was read with, or will be written with.
    pub byte_order: ByteOrder,
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

// -- fixed-offset field access ------------------------------------------

fn get_u16(buf: &[u8], off: usize, be: bool) -> u16 {
    if be { BigEndian::read_u16(&buf[off..]) } else { LittleEndian::read_u16(&buf[off..]) }
}

fn get_u32(buf: &[u8], off: usize, be: bool) -> u32 {
    if be { BigEndian::read_u32(&buf[off..]) } else { LittleEndian::read_u32(&buf[off..]) }
}

fn get_f32(buf: &[u8], off: usize, be: bool) -> f32 {
    if be { BigEndian::read_f32(&buf[off..]) } else { LittleEndian::read_f32(&buf[off..]) }
}

fn get_str(buf: &[u8], off: usize, len: usize) -> String {
    let raw = &buf[off..off + len];
    let end = raw.iter().position(|&b| b == 0).unwrap_or(len);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

fn put_u16(buf: &mut [u8], off: usize, v: u16, be: bool) {
    if be { BigEndian::write_u16(&mut buf[off..], v) } else { LittleEndian::write_u16(&mut buf[off..], v) }
}

fn put_u32(buf: &mut [u8], off: usize, v: u32, be: bool) {
    if be { BigEndian::write_u32(&mut buf[off..], v) } else { LittleEndian::write_u32(&mut buf[off..], v) }
}

fn put_f32(buf: &mut [u8], off: usize, v: f32, be: bool) {
    if be { BigEndian::write_f32(&mut buf[off..], v) } else { LittleEndian::write_f32(&mut buf[off..], v) }
}

fn put_str(buf: &mut [u8], off: usize, len: usize, s: &str) {
    let bytes = s.as_bytes();
    let n = bytes.len().min(len.saturating_sub(1));
    buf[off..off + n].copy_from_slice(&bytes[..n]);
    // remainder already zeroed
}

fn undef_u32(v: u32) -> Option<u32> {
    if v == UNDEF_U32 { None } else { Some(v) }
}

fn undef_u16(v: u16) -> Option<u16> {
    if v == UNDEF_U16 { None } else { Some(v) }
}

fn undef_f32(v: f32) -> Option<f32> {
    if v.is_nan() { None } else { Some(v) }
}

impl Header {
    /// Creates a blank header with every field at its absent sentinel.
    pub fn new() -> Self {
        Self {
            generic: GenericHeader {
                file: FileInfo::blank(),
                image: ImageInfo::blank(),
                orient: OrientInfo::blank(),
            },
            industry: IndustryHeader {
                film: FilmInfo::blank(),
                tv: TvInfo::blank(),
            },
            byte_order: ByteOrder::Big,
        }
    }

    /// Reads and validates a header from the start of a stream.
    ///
    /// Rewinds, reads the full 2048-byte generic + industry range as one
    /// block, then validates. On failure `self` is left untouched: the
    /// header parses into a scratch value and commits only on success.
    pub fn read<S: Stream>(&mut self, stream: &mut S) -> Result<()> {
        stream.seek(SeekFrom::Start(0))?;
        let mut buf = [0u8; HEADER_SIZE];
        stream.read_exact(&mut buf)?;
        *self = Self::validate(&buf)?;
        Ok(())
    }

    /// Validates a raw header block and decodes it to native order.
    ///
    /// The magic cookie is checked against its two legal byte-order
    /// encodings; a swapped file decodes every multi-byte field through
    /// the opposite byte order so the resulting header is fully native.
    /// Neither encoding matching is a hard failure.
    pub fn validate(buf: &[u8; HEADER_SIZE]) -> Result<Header> {
        let magic_be = BigEndian::read_u32(&buf[0..4]);
        let be = match magic_be {
            MAGIC => true,
            MAGIC_SWAPPED => false,
            other => return Err(Error::BadMagic(other)),
        };

        let mut h = Header::new();
        h.byte_order = if be { ByteOrder::Big } else { ByteOrder::Little };
        h.generic.file.magic = MAGIC;

        let f = &mut h.generic.file;
        f.image_offset = get_u32(buf, POS_IMAGE_OFFSET, be);
        f.version = get_str(buf, 8, 8);
        f.file_size = get_u32(buf, POS_FILE_SIZE, be);
        f.ditto_key = get_u32(buf, 20, be);
        f.generic_size = get_u32(buf, 24, be);
        f.industry_size = get_u32(buf, 28, be);
        f.user_size = get_u32(buf, 32, be);
        f.file_name = get_str(buf, 36, 100);
        f.creation_time = get_str(buf, 136, 24);
        f.creator = get_str(buf, 160, 100);
        f.project = get_str(buf, 260, 200);
        f.copyright = get_str(buf, 460, 200);
        f.encrypt_key = get_u32(buf, 660, be);

        let img = &mut h.generic.image;
        img.orientation = get_u16(buf, 768, be);
        img.element_count = get_u16(buf, POS_ELEMENT_COUNT, be);
        img.pixels_per_line = get_u32(buf, 772, be);
        img.lines_per_element = get_u32(buf, 776, be);
        for (i, el) in img.elements.iter_mut().enumerate() {
            let base = POS_ELEMENTS + i * ELEMENT_RECORD_SIZE;
            el.data_sign = get_u32(buf, base, be);
            el.low_data = get_u32(buf, base + 4, be);
            el.low_quantity = get_f32(buf, base + 8, be);
            el.high_data = get_u32(buf, base + 12, be);
            el.high_quantity = get_f32(buf, base + 16, be);
            el.descriptor = buf[base + 20];
            el.transfer = buf[base + 21];
            el.colorimetric = buf[base + 22];
            el.bit_size = buf[base + 23];
            el.packing = get_u16(buf, base + 24, be);
            el.encoding = get_u16(buf, base + 26, be);
            el.data_offset = get_u32(buf, base + ELEMENT_DATA_OFFSET_FIELD, be);
            el.eol_padding = get_u32(buf, base + 32, be);
            el.eoi_padding = get_u32(buf, base + 36, be);
            el.description = get_str(buf, base + 40, 32);
        }

        let o = &mut h.generic.orient;
        o.x_offset = get_u32(buf, 1408, be);
        o.y_offset = get_u32(buf, 1412, be);
        o.x_center = get_f32(buf, 1416, be);
        o.y_center = get_f32(buf, 1420, be);
        o.x_original_size = get_u32(buf, 1424, be);
        o.y_original_size = get_u32(buf, 1428, be);
        o.file_name = get_str(buf, 1432, 100);
        o.creation_time = get_str(buf, 1532, 24);
        o.input_device = get_str(buf, 1556, 32);
        o.input_serial = get_str(buf, 1588, 32);
        for (i, b) in o.border.iter_mut().enumerate() {
            *b = get_u16(buf, 1620 + i * 2, be);
        }
        for (i, a) in o.aspect_ratio.iter_mut().enumerate() {
            *a = get_u32(buf, 1628 + i * 4, be);
        }

        let film = &mut h.industry.film;
        film.film_mfg_id = get_str(buf, 1664, 2);
        film.film_type = get_str(buf, 1666, 2);
        film.perfs_offset = get_str(buf, 1668, 2);
        film.prefix = get_str(buf, 1670, 6);
        film.count = get_str(buf, 1676, 4);
        film.format = get_str(buf, 1680, 32);
        film.frame_position = get_u32(buf, 1712, be);
        film.sequence_length = get_u32(buf, 1716, be);
        film.held_count = get_u32(buf, 1720, be);
        film.frame_rate = get_f32(buf, 1724, be);
        film.shutter_angle = get_f32(buf, 1728, be);
        film.frame_id = get_str(buf, 1732, 32);
        film.slate_info = get_str(buf, 1764, 100);

        let tv = &mut h.industry.tv;
        tv.time_code = get_u32(buf, 1920, be);
        tv.user_bits = get_u32(buf, 1924, be);
        tv.interlace = buf[1928];
        tv.field_number = buf[1929];
        tv.video_signal = buf[1930];
        tv.horizontal_sample_rate = get_f32(buf, 1932, be);
        tv.vertical_sample_rate = get_f32(buf, 1936, be);
        tv.temporal_frame_rate = get_f32(buf, 1940, be);
        tv.time_offset = get_f32(buf, 1944, be);
        tv.gamma = get_f32(buf, 1948, be);
        tv.black_level = get_f32(buf, 1952, be);
        tv.black_gain = get_f32(buf, 1956, be);
        tv.break_point = get_f32(buf, 1960, be);
        tv.white_level = get_f32(buf, 1964, be);
        tv.integration_times = get_f32(buf, 1968, be);

        Ok(h)
    }

    /// Serializes the header into its 2048-byte wire form.
    pub fn to_bytes(&self) -> Box<[u8; HEADER_SIZE]> {
        let be = self.byte_order == ByteOrder::Big;
        let mut buf = Box::new([0u8; HEADER_SIZE]);
        let b: &mut [u8] = &mut buf[..];

        let f = &self.generic.file;
        // The magic byte sequence is "SDPX"/"XPDS" depending on order.
        put_u32(b, 0, MAGIC, be);
        put_u32(b, POS_IMAGE_OFFSET, f.image_offset, be);
        put_str(b, 8, 8, &f.version);
        put_u32(b, POS_FILE_SIZE, f.file_size, be);
        put_u32(b, 20, f.ditto_key, be);
        put_u32(b, 24, f.generic_size, be);
        put_u32(b, 28, f.industry_size, be);
        put_u32(b, 32, f.user_size, be);
        put_str(b, 36, 100, &f.file_name);
        put_str(b, 136, 24, &f.creation_time);
        put_str(b, 160, 100, &f.creator);
        put_str(b, 260, 200, &f.project);
        put_str(b, 460, 200, &f.copyright);
        put_u32(b, 660, f.encrypt_key, be);

        let img = &self.generic.image;
        put_u16(b, 768, img.orientation, be);
        put_u16(b, POS_ELEMENT_COUNT, img.element_count, be);
        put_u32(b, 772, img.pixels_per_line, be);
        put_u32(b, 776, img.lines_per_element, be);
        for (i, el) in img.elements.iter().enumerate() {
            let base = POS_ELEMENTS + i * ELEMENT_RECORD_SIZE;
            put_u32(b, base, el.data_sign, be);
            put_u32(b, base + 4, el.low_data, be);
            put_f32(b, base + 8, el.low_quantity, be);
            put_u32(b, base + 12, el.high_data, be);
            put_f32(b, base + 16, el.high_quantity, be);
            b[base + 20] = el.descriptor;
            b[base + 21] = el.transfer;
            b[base + 22] = el.colorimetric;
            b[base + 23] = el.bit_size;
            put_u16(b, base + 24, el.packing, be);
            put_u16(b, base + 26, el.encoding, be);
            put_u32(b, base + ELEMENT_DATA_OFFSET_FIELD, el.data_offset, be);
            put_u32(b, base + 32, el.eol_padding, be);
            put_u32(b, base + 36, el.eoi_padding, be);
            put_str(b, base + 40, 32, &el.description);
        }

        let o = &self.generic.orient;
        put_u32(b, 1408, o.x_offset, be);
        put_u32(b, 1412, o.y_offset, be);
        put_f32(b, 1416, o.x_center, be);
        put_f32(b, 1420, o.y_center, be);
        put_u32(b, 1424, o.x_original_size, be);
        put_u32(b, 1428, o.y_original_size, be);
        put_str(b, 1432, 100, &o.file_name);
        put_str(b, 1532, 24, &o.creation_time);
        put_str(b, 1556, 32, &o.input_device);
        put_str(b, 1588, 32, &o.input_serial);
        for (i, &v) in o.border.iter().enumerate() {
            put_u16(b, 1620 + i * 2, v, be);
        }
        for (i, &v) in o.aspect_ratio.iter().enumerate() {
            put_u32(b, 1628 + i * 4, v, be);
        }

        let film = &self.industry.film;
        put_str(b, 1664, 2, &film.film_mfg_id);
        put_str(b, 1666, 2, &film.film_type);
        put_str(b, 1668, 2, &film.perfs_offset);
        put_str(b, 1670, 6, &film.prefix);
        put_str(b, 1676, 4, &film.count);
        put_str(b, 1680, 32, &film.format);
        put_u32(b, 1712, film.frame_position, be);
        put_u32(b, 1716, film.sequence_length, be);
        put_u32(b, 1720, film.held_count, be);
        put_f32(b, 1724, film.frame_rate, be);
        put_f32(b, 1728, film.shutter_angle, be);
        put_str(b, 1732, 32, &film.frame_id);
        put_str(b, 1764, 100, &film.slate_info);

        let tv = &self.industry.tv;
        put_u32(b, 1920, tv.time_code, be);
        put_u32(b, 1924, tv.user_bits, be);
        b[1928] = tv.interlace;
        b[1929] = tv.field_number;
        b[1930] = tv.video_signal;
        put_f32(b, 1932, tv.horizontal_sample_rate, be);
        put_f32(b, 1936, tv.vertical_sample_rate, be);
        put_f32(b, 1940, tv.temporal_frame_rate, be);
        put_f32(b, 1944, tv.time_offset, be);
        put_f32(b, 1948, tv.gamma, be);
        put_f32(b, 1952, tv.black_level, be);
        put_f32(b, 1956, tv.black_gain, be);
        put_f32(b, 1960, tv.break_point, be);
        put_f32(b, 1964, tv.white_level, be);
        put_f32(b, 1968, tv.integration_times, be);

        buf
    }

    /// Writes the header at the start of a stream in its byte order.
    pub fn write<S: Stream>(&self, stream: &mut S) -> Result<()> {
        stream.seek(SeekFrom::Start(0))?;
        stream.write_all(&self.to_bytes()[..])?;
        Ok(())
    }

    /// Re-seeks into an already written header and overwrites the fields
    /// that are unknown until encoding completes: image offset, file
    /// size, element count, and each populated element's data offset.
    pub fn patch_offsets<S: Stream>(&self, stream: &mut S) -> Result<()> {
        let be = self.byte_order == ByteOrder::Big;
        let mut word = [0u8; 4];

        let mut put = |stream: &mut S, pos: usize, v: u32| -> Result<()> {
            if be { BigEndian::write_u32(&mut word, v) } else { LittleEndian::write_u32(&mut word, v) }
            stream.seek(SeekFrom::Start(pos as u64))?;
            stream.write_all(&word)?;
            Ok(())
        };

        put(stream, POS_IMAGE_OFFSET, self.generic.file.image_offset)?;
        put(stream, POS_FILE_SIZE, self.generic.file.file_size)?;

        let mut half = [0u8; 2];
        if be {
            BigEndian::write_u16(&mut half, self.generic.image.element_count)
        } else {
            LittleEndian::write_u16(&mut half, self.generic.image.element_count)
        }
        stream.seek(SeekFrom::Start(POS_ELEMENT_COUNT as u64))?;
        stream.write_all(&half)?;

        for i in 0..self.generic.image.element_count as usize {
            let pos = POS_ELEMENTS + i * ELEMENT_RECORD_SIZE + ELEMENT_DATA_OFFSET_FIELD;
            put(stream, pos, self.generic.image.elements[i].data_offset)?;
        }
        Ok(())
    }

    // -- accessors -------------------------------------------------------

    /// Image width in pixels, `None` when blank.
    pub fn width(&self) -> Option<u32> {
        undef_u32(self.generic.image.pixels_per_line)
    }

    /// Image height in lines, `None` when blank.
    pub fn height(&self) -> Option<u32> {
        undef_u32(self.generic.image.lines_per_element)
    }

    /// Number of populated image elements.
    pub fn element_count(&self) -> usize {
        let n = self.generic.image.element_count;
        if n == UNDEF_U16 { 0 } else { n as usize }
    }

    /// Total file size, `None` when blank.
    pub fn file_size(&self) -> Option<u32> {
        undef_u32(self.generic.file.file_size)
    }

    /// Offset of the first image data byte, `None` when blank.
    pub fn image_offset(&self) -> Option<u32> {
        undef_u32(self.generic.file.image_offset)
    }

    /// Declared user data length; `None` when blank or zero.
    pub fn user_size(&self) -> Option<u32> {
        match undef_u32(self.generic.file.user_size) {
            Some(0) | None => None,
            some => some,
        }
    }

    /// Typed orientation tag.
    pub fn orientation(&self) -> Option<Orientation> {
        undef_u16(self.generic.image.orientation).and_then(Orientation::from_code)
    }

    /// Borrowed element record; out-of-range indices answer `None`
    /// rather than erroring.
    pub fn element(&self, index: usize) -> Option<&ImageElement> {
        if index < self.element_count() {
            Some(&self.generic.image.elements[index])
        } else {
            None
        }
    }

    /// TV gamma, `None` when blank.
    pub fn gamma(&self) -> Option<f32> {
        undef_f32(self.industry.tv.gamma)
    }

    /// Film frame rate, `None` when blank.
    pub fn frame_rate(&self) -> Option<f32> {
        undef_f32(self.industry.film.frame_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filmio_core::MemoryStream;

    fn populated() -> Header {
        let mut h = Header::new();
        h.generic.file.image_offset = 2048;
        h.generic.file.file_size = 2048 + 64;
        h.generic.file.creator = "filmio".to_string();
        h.generic.image.element_count = 1;
        h.generic.image.orientation = 0;
        h.generic.image.pixels_per_line = 4;
        h.generic.image.lines_per_element = 4;
        let el = &mut h.generic.image.elements[0];
        el.descriptor = Descriptor::Rgb.code();
        el.transfer = Characteristic::Linear.code();
        el.colorimetric = Characteristic::Linear.code();
        el.bit_size = 10;
        el.packing = Packing::FilledMethodA.code();
        el.encoding = Encoding::None.code();
        el.data_offset = 2048;
        el.eol_padding = 0;
        el.eoi_padding = 0;
        h.industry.tv.gamma = 2.2;
        h
    }

    #[test]
    fn test_blank_header_sentinels() {
        let h = Header::new();
        assert_eq!(h.width(), None);
        assert_eq!(h.height(), None);
        assert_eq!(h.file_size(), None);
        assert_eq!(h.element_count(), 0);
        assert!(h.element(0).is_none());
    }

    #[test]
    fn test_roundtrip_big_endian() {
        let h = populated();
        let bytes = h.to_bytes();
        assert_eq!(&bytes[0..4], b"SDPX");

        let parsed = Header::validate(&bytes).unwrap();
        assert_eq!(parsed.byte_order, ByteOrder::Big);
        assert_eq!(parsed.width(), Some(4));
        assert_eq!(parsed.height(), Some(4));
        assert_eq!(parsed.element_count(), 1);
        assert_eq!(parsed.generic.file.creator, "filmio");
        let el = parsed.element(0).unwrap();
        assert_eq!(el.descriptor(), Some(Descriptor::Rgb));
        assert_eq!(el.bit_size, 10);
        assert_eq!(el.packing(), Some(Packing::FilledMethodA));
        assert_eq!(parsed.gamma(), Some(2.2));
    }

    #[test]
    fn test_byte_order_invariance() {
        let mut h = populated();
        h.byte_order = ByteOrder::Little;
        let bytes_le = h.to_bytes();
        assert_eq!(&bytes_le[0..4], b"XPDS");

        h.byte_order = ByteOrder::Big;
        let bytes_be = h.to_bytes();

        // Same field values decode from either encoding.
        let le = Header::validate(&bytes_le).unwrap();
        let be = Header::validate(&bytes_be).unwrap();
        assert_eq!(le.width(), be.width());
        assert_eq!(le.gamma(), be.gamma());
        assert_eq!(le.element(0).unwrap().bit_size, be.element(0).unwrap().bit_size);
        assert_eq!(le.byte_order, ByteOrder::Little);
        assert_eq!(be.byte_order, ByteOrder::Big);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = populated().to_bytes();
        bytes[0..4].copy_from_slice(b"JUNK");
        match Header::validate(&bytes) {
            Err(Error::BadMagic(_)) => {}
            other => panic!("expected BadMagic, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_failed_read_leaves_header_untouched() {
        let mut s = MemoryStream::from_vec(vec![0u8; HEADER_SIZE]);
        let mut h = populated();
        let before_width = h.width();
        assert!(h.read(&mut s).is_err());
        assert_eq!(h.width(), before_width);
    }

    #[test]
    fn test_patch_offsets() {
        let mut s = MemoryStream::new();
        let mut h = populated();
        h.write(&mut s).unwrap();

        // Pretend encoding landed the element elsewhere and grew the file.
        h.generic.file.file_size = 4096;
        h.generic.image.elements[0].data_offset = 2112;
        h.patch_offsets(&mut s).unwrap();

        let mut reread = Header::new();
        reread.read(&mut s).unwrap();
        assert_eq!(reread.file_size(), Some(4096));
        assert_eq!(reread.element(0).unwrap().data_offset, 2112);
        // Untouched fields survive the patch.
        assert_eq!(reread.generic.file.creator, "filmio");
    }

    #[test]
    fn test_string_fields_truncate() {
        let mut h = populated();
        h.generic.file.version = "V2.0-and-then-some".to_string();
        let parsed = Header::validate(&h.to_bytes()).unwrap();
        // 8-byte field keeps 7 chars plus NUL.
        assert_eq!(parsed.generic.file.version, "V2.0-an");
    }
}
