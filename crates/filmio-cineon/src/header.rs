//! Cineon header model.
//!
//! A Cineon file opens with a fixed 2048-byte header: a generic section
//! (file, image, data format, and origination information, 0..1024) and
//! a film industry section (1024.., mostly reserved space). Multi-byte
//! fields follow the byte order announced by the magic cookie.
//!
//! The in-memory [`Header`] always holds native-order values; byte
//! swapping happens only at the [`Header::read`] / [`Header::to_bytes`]
//! boundary. Absent fields carry on-disk sentinels (`0xFFFFFFFF`, `0xFF`,
//! quiet NaN) and surface as `None` through the typed accessors.

use std::io::SeekFrom;

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};
use filmio_core::{Error, Result, Stream};

use crate::types::{ChannelKind, CineonPacking, Depth, Interleave};

/// Big-endian magic cookie.
pub const MAGIC: u32 = 0x802A_5FD7;
/// The magic as seen when the file is little-endian.
pub const MAGIC_SWAPPED: u32 = 0xD75F_2A80;
/// Total fixed header size in bytes.
pub const HEADER_SIZE: usize = 2048;
/// Maximum channel records in the image information section.
pub const MAX_CHANNELS: usize = 8;
/// Generic section length as declared in new files.
pub const GENERIC_SIZE: u32 = 1024;
/// Industry section length as declared in new files.
pub const INDUSTRY_SIZE: u32 = 1024;

/// Absent-field sentinel for u32 fields.
pub const UNDEF_U32: u32 = u32::MAX;
/// Absent-field sentinel for u8 fields.
pub const UNDEF_U8: u8 = u8::MAX;

/// Byte order of a Cineon file on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Big-endian, the order film scanners write.
    #[default]
    Big,
    /// Little-endian.
    Little,
}

// Fixed byte positions patched after encoding completes.
const POS_IMAGE_OFFSET: usize = 4;
const POS_FILE_SIZE: usize = 20;
const POS_CHANNELS: usize = 196;
const CHANNEL_RECORD_SIZE: usize = 28;

/// File information section (bytes 0..192).
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// Magic cookie, always [`MAGIC`] once parsed.
    pub magic: u32,
    /// Offset of the first image data byte.
    pub image_offset: u32,
    /// Generic section length.
    pub generic_size: u32,
    /// Industry section length.
    pub industry_size: u32,
    /// User data length, 0 or sentinel when absent.
    pub user_size: u32,
    /// Total file size in bytes.
    pub file_size: u32,
    /// Version string, "V4.5".
    pub version: String,
    /// Source file name.
    pub file_name: String,
    /// Creation date, "yyyy:mm:dd".
    pub creation_date: String,
    /// Creation time, "hh:mm:ssxxx".
    pub creation_time: String,
}

impl FileInfo {
    fn blank() -> Self {
        Self {
            magic: MAGIC,
            image_offset: UNDEF_U32,
            generic_size: GENERIC_SIZE,
            industry_size: INDUSTRY_SIZE,
            user_size: 0,
            file_size: UNDEF_U32,
            version: "V4.5".into(),
            file_name: String::new(),
            creation_date: String::new(),
            creation_time: String::new(),
        }
    }
}

/// One channel record (28 bytes each, up to 8 per file).
#[derive(Debug, Clone)]
pub struct Channel {
    /// Designator pair: metric byte, then channel-kind byte.
    pub designator: [u8; 2],
    /// Bits per sample.
    pub bits_per_sample: u8,
    /// Pixels per line of this channel.
    pub pixels_per_line: u32,
    /// Lines of this channel.
    pub lines_per_image: u32,
    /// Minimum data value.
    pub min_data: f32,
    /// Quantity represented by the minimum value.
    pub min_quantity: f32,
    /// Maximum data value.
    pub max_data: f32,
    /// Quantity represented by the maximum value.
    pub max_quantity: f32,
}

impl Channel {
    fn blank() -> Self {
        Self {
            designator: [UNDEF_U8; 2],
            bits_per_sample: UNDEF_U8,
            pixels_per_line: UNDEF_U32,
            lines_per_image: UNDEF_U32,
            min_data: f32::NAN,
            min_quantity: f32::NAN,
            max_data: f32::NAN,
            max_quantity: f32::NAN,
        }
    }

    /// Typed channel kind, `None` when the record is blank.
    pub fn kind(&self) -> Option<ChannelKind> {
        undef_u8(self.designator[1]).map(ChannelKind::from_code)
    }

    /// Typed sample depth, `None` when blank or unsupported.
    pub fn depth(&self) -> Option<Depth> {
        undef_u8(self.bits_per_sample).and_then(Depth::from_bits)
    }
}

/// Image information section (bytes 192..680).
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Image orientation code (0 is left-to-right, top-to-bottom).
    pub orientation: u8,
    /// Number of populated channel records.
    pub channel_count: u8,
    /// Channel records; unpopulated slots stay blank.
    pub channels: [Channel; MAX_CHANNELS],
    /// White point chromaticity (x, y).
    pub white_point: [f32; 2],
    /// Red primary chromaticity (x, y).
    pub red_primary: [f32; 2],
    /// Green primary chromaticity (x, y).
    pub green_primary: [f32; 2],
    /// Blue primary chromaticity (x, y).
    pub blue_primary: [f32; 2],
    /// Image label.
    pub label: String,
}

impl ImageInfo {
    fn blank() -> Self {
        Self {
            orientation: UNDEF_U8,
            channel_count: 0,
            channels: std::array::from_fn(|_| Channel::blank()),
            white_point: [f32::NAN; 2],
            red_primary: [f32::NAN; 2],
            green_primary: [f32::NAN; 2],
            blue_primary: [f32::NAN; 2],
            label: String::new(),
        }
    }
}

/// Data format section (bytes 680..712).
#[derive(Debug, Clone)]
pub struct DataFormatInfo {
    /// Channel interleave code.
    pub interleave: u8,
    /// Packing code.
    pub packing: u8,
    /// Data sign, 0 for unsigned.
    pub data_sign: u8,
    /// Image sense, 0 for positive.
    pub sense: u8,
    /// End-of-line padding in bytes.
    pub eol_padding: u32,
    /// End-of-channel padding in bytes.
    pub eoc_padding: u32,
}

impl DataFormatInfo {
    fn blank() -> Self {
        Self {
            interleave: Interleave::Pixel.code(),
            packing: CineonPacking::FilledLeft.code(),
            data_sign: 0,
            sense: 0,
            eol_padding: 0,
            eoc_padding: 0,
        }
    }
}

/// Origination section (bytes 712..1024).
#[derive(Debug, Clone)]
pub struct OriginationInfo {
    /// X offset of the scan within the source frame.
    pub x_offset: i32,
    /// Y offset of the scan within the source frame.
    pub y_offset: i32,
    /// Source file name.
    pub file_name: String,
    /// Scan date.
    pub creation_date: String,
    /// Scan time.
    pub creation_time: String,
    /// Input device name.
    pub input_device: String,
    /// Input device model number.
    pub model_number: String,
    /// Input device serial number.
    pub input_serial: String,
    /// Horizontal sample pitch in microns.
    pub x_pitch: f32,
    /// Vertical sample pitch in microns.
    pub y_pitch: f32,
    /// Gamma of the capture transfer.
    pub gamma: f32,
}

impl OriginationInfo {
    fn blank() -> Self {
        Self {
            x_offset: 0,
            y_offset: 0,
            file_name: String::new(),
            creation_date: String::new(),
            creation_time: String::new(),
            input_device: String::new(),
            model_number: String::new(),
            input_serial: String::new(),
            x_pitch: f32::NAN,
            y_pitch: f32::NAN,
            gamma: f32::NAN,
        }
    }
}

/// Film industry section (bytes 1024..1308; the rest of the header is
/// reserved space).
#[derive(Debug, Clone)]
pub struct FilmInfo {
    /// Film manufacturer id code.
    pub film_mfg_id: u8,
    /// Film type code.
    pub film_type: u8,
    /// Perf offset code.
    pub perfs_offset: u8,
    /// Keycode prefix.
    pub prefix: u32,
    /// Keycode count.
    pub count: u32,
    /// Film format name.
    pub format: String,
    /// Frame position in the sequence.
    pub frame_position: u32,
    /// Frame rate of the original material.
    pub frame_rate: f32,
    /// Frame attribute string.
    pub frame_id: String,
    /// Slate information.
    pub slate_info: String,
}

impl FilmInfo {
    fn blank() -> Self {
        Self {
            film_mfg_id: UNDEF_U8,
            film_type: UNDEF_U8,
            perfs_offset: UNDEF_U8,
            prefix: UNDEF_U32,
            count: UNDEF_U32,
            format: String::new(),
            frame_position: UNDEF_U32,
            frame_rate: f32::NAN,
            frame_id: String::new(),
            slate_info: String::new(),
        }
    }
}

/// Complete Cineon header in native byte order.
///
/// Starts blank (all sentinels) and is populated either by
/// [`Header::read`] or by the setters on a
/// [`Writer`](crate::Writer). Exclusively owned by its reader or writer.
#[derive(Debug, Clone)]
pub struct Header {
    /// File information.
    pub file: FileInfo,
    /// Image information.
    pub image: ImageInfo,
    /// Data format information.
    pub format: DataFormatInfo,
    /// Origination information.
    pub origination: OriginationInfo,
    /// Film industry information.
    pub film: FilmInfo,
    /// Byte order the header was read with, or will be written with.
    pub byte_order: ByteOrder,
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

// -- fixed-offset field access ------------------------------------------

fn get_u32(buf: &[u8], off: usize, be: bool) -> u32 {
    if be { BigEndian::read_u32(&buf[off..]) } else { LittleEndian::read_u32(&buf[off..]) }
}

fn get_i32(buf: &[u8], off: usize, be: bool) -> i32 {
    if be { BigEndian::read_i32(&buf[off..]) } else { LittleEndian::read_i32(&buf[off..]) }
}

fn get_f32(buf: &[u8], off: usize, be: bool) -> f32 {
    if be { BigEndian::read_f32(&buf[off..]) } else { LittleEndian::read_f32(&buf[off..]) }
}

fn get_str(buf: &[u8], off: usize, len: usize) -> String {
    let raw = &buf[off..off + len];
    let end = raw.iter().position(|&b| b == 0).unwrap_or(len);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

fn put_u32(buf: &mut [u8], off: usize, v: u32, be: bool) {
    if be { BigEndian::write_u32(&mut buf[off..], v) } else { LittleEndian::write_u32(&mut buf[off..], v) }
}

fn put_i32(buf: &mut [u8], off: usize, v: i32, be: bool) {
    if be { BigEndian::write_i32(&mut buf[off..], v) } else { LittleEndian::write_i32(&mut buf[off..], v) }
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

fn undef_u8(v: u8) -> Option<u8> {
    if v == UNDEF_U8 { None } else { Some(v) }
}

fn undef_f32(v: f32) -> Option<f32> {
    if v.is_nan() { None } else { Some(v) }
}

impl Header {
    /// Creates a blank header with every field at its absent sentinel.
    pub fn new() -> Self {
        Self {
            file: FileInfo::blank(),
            image: ImageInfo::blank(),
            format: DataFormatInfo::blank(),
            origination: OriginationInfo::blank(),
            film: FilmInfo::blank(),
            byte_order: ByteOrder::Big,
        }
    }

    /// Reads and validates a header from the start of a stream.
    ///
    /// On failure `self` is left untouched: the header parses into a
    /// scratch value and commits only on success.
    pub fn read<S: Stream>(&mut self, stream: &mut S) -> Result<()> {
        stream.seek(SeekFrom::Start(0))?;
        let mut buf = [0u8; HEADER_SIZE];
        stream.read_exact(&mut buf)?;
        *self = Self::validate(&buf)?;
        Ok(())
    }

    /// Validates a raw header block and decodes it to native order.
    ///
    /// The magic cookie is checked against both byte-order encodings; a
    /// swapped file decodes every multi-byte field through the opposite
    /// order so the resulting header is fully native.
    pub fn validate(buf: &[u8; HEADER_SIZE]) -> Result<Header> {
        let magic_be = BigEndian::read_u32(&buf[0..4]);
        let be = match magic_be {
            MAGIC => true,
            MAGIC_SWAPPED => false,
            other => return Err(Error::BadMagic(other)),
        };

        let mut h = Header::new();
        h.byte_order = if be { ByteOrder::Big } else { ByteOrder::Little };
        h.file.magic = MAGIC;

        let f = &mut h.file;
        f.image_offset = get_u32(buf, POS_IMAGE_OFFSET, be);
        f.generic_size = get_u32(buf, 8, be);
        f.industry_size = get_u32(buf, 12, be);
        f.user_size = get_u32(buf, 16, be);
        f.file_size = get_u32(buf, POS_FILE_SIZE, be);
        f.version = get_str(buf, 24, 8);
        f.file_name = get_str(buf, 32, 100);
        f.creation_date = get_str(buf, 132, 12);
        f.creation_time = get_str(buf, 144, 12);

        let img = &mut h.image;
        img.orientation = buf[192];
        img.channel_count = buf[193];
        for (i, ch) in img.channels.iter_mut().enumerate() {
            let base = POS_CHANNELS + i * CHANNEL_RECORD_SIZE;
            ch.designator = [buf[base], buf[base + 1]];
            ch.bits_per_sample = buf[base + 2];
            ch.pixels_per_line = get_u32(buf, base + 4, be);
            ch.lines_per_image = get_u32(buf, base + 8, be);
            ch.min_data = get_f32(buf, base + 12, be);
            ch.min_quantity = get_f32(buf, base + 16, be);
            ch.max_data = get_f32(buf, base + 20, be);
            ch.max_quantity = get_f32(buf, base + 24, be);
        }
        for (i, v) in img.white_point.iter_mut().enumerate() {
            *v = get_f32(buf, 420 + i * 4, be);
        }
        for (i, v) in img.red_primary.iter_mut().enumerate() {
            *v = get_f32(buf, 428 + i * 4, be);
        }
        for (i, v) in img.green_primary.iter_mut().enumerate() {
            *v = get_f32(buf, 436 + i * 4, be);
        }
        for (i, v) in img.blue_primary.iter_mut().enumerate() {
            *v = get_f32(buf, 444 + i * 4, be);
        }
        img.label = get_str(buf, 452, 200);

        let df = &mut h.format;
        df.interleave = buf[680];
        df.packing = buf[681];
        df.data_sign = buf[682];
        df.sense = buf[683];
        df.eol_padding = get_u32(buf, 684, be);
        df.eoc_padding = get_u32(buf, 688, be);

        let o = &mut h.origination;
        o.x_offset = get_i32(buf, 712, be);
        o.y_offset = get_i32(buf, 716, be);
        o.file_name = get_str(buf, 720, 100);
        o.creation_date = get_str(buf, 820, 12);
        o.creation_time = get_str(buf, 832, 12);
        o.input_device = get_str(buf, 844, 64);
        o.model_number = get_str(buf, 908, 32);
        o.input_serial = get_str(buf, 940, 32);
        o.x_pitch = get_f32(buf, 972, be);
        o.y_pitch = get_f32(buf, 976, be);
        o.gamma = get_f32(buf, 980, be);

        let film = &mut h.film;
        film.film_mfg_id = buf[1024];
        film.film_type = buf[1025];
        film.perfs_offset = buf[1026];
        film.prefix = get_u32(buf, 1028, be);
        film.count = get_u32(buf, 1032, be);
        film.format = get_str(buf, 1036, 32);
        film.frame_position = get_u32(buf, 1068, be);
        film.frame_rate = get_f32(buf, 1072, be);
        film.frame_id = get_str(buf, 1076, 32);
        film.slate_info = get_str(buf, 1108, 200);

        Ok(h)
    }

    /// Serializes the header into its 2048-byte wire form.
    pub fn to_bytes(&self) -> Box<[u8; HEADER_SIZE]> {
        let be = self.byte_order == ByteOrder::Big;
        let mut buf = Box::new([0u8; HEADER_SIZE]);
        let b: &mut [u8] = &mut buf[..];

        let f = &self.file;
        put_u32(b, 0, MAGIC, be);
        put_u32(b, POS_IMAGE_OFFSET, f.image_offset, be);
        put_u32(b, 8, f.generic_size, be);
        put_u32(b, 12, f.industry_size, be);
        put_u32(b, 16, f.user_size, be);
        put_u32(b, POS_FILE_SIZE, f.file_size, be);
        put_str(b, 24, 8, &f.version);
        put_str(b, 32, 100, &f.file_name);
        put_str(b, 132, 12, &f.creation_date);
        put_str(b, 144, 12, &f.creation_time);

        let img = &self.image;
        b[192] = img.orientation;
        b[193] = img.channel_count;
        for (i, ch) in img.channels.iter().enumerate() {
            let base = POS_CHANNELS + i * CHANNEL_RECORD_SIZE;
            b[base] = ch.designator[0];
            b[base + 1] = ch.designator[1];
            b[base + 2] = ch.bits_per_sample;
            put_u32(b, base + 4, ch.pixels_per_line, be);
            put_u32(b, base + 8, ch.lines_per_image, be);
            put_f32(b, base + 12, ch.min_data, be);
            put_f32(b, base + 16, ch.min_quantity, be);
            put_f32(b, base + 20, ch.max_data, be);
            put_f32(b, base + 24, ch.max_quantity, be);
        }
        for (i, v) in img.white_point.iter().enumerate() {
            put_f32(b, 420 + i * 4, *v, be);
        }
        for (i, v) in img.red_primary.iter().enumerate() {
            put_f32(b, 428 + i * 4, *v, be);
        }
        for (i, v) in img.green_primary.iter().enumerate() {
            put_f32(b, 436 + i * 4, *v, be);
        }
        for (i, v) in img.blue_primary.iter().enumerate() {
            put_f32(b, 444 + i * 4, *v, be);
        }
        put_str(b, 452, 200, &img.label);

        let df = &self.format;
        b[680] = df.interleave;
        b[681] = df.packing;
        b[682] = df.data_sign;
        b[683] = df.sense;
        put_u32(b, 684, df.eol_padding, be);
        put_u32(b, 688, df.eoc_padding, be);

        let o = &self.origination;
        put_i32(b, 712, o.x_offset, be);
        put_i32(b, 716, o.y_offset, be);
        put_str(b, 720, 100, &o.file_name);
        put_str(b, 820, 12, &o.creation_date);
        put_str(b, 832, 12, &o.creation_time);
        put_str(b, 844, 64, &o.input_device);
        put_str(b, 908, 32, &o.model_number);
        put_str(b, 940, 32, &o.input_serial);
        put_f32(b, 972, o.x_pitch, be);
        put_f32(b, 976, o.y_pitch, be);
        put_f32(b, 980, o.gamma, be);

        let film = &self.film;
        b[1024] = film.film_mfg_id;
        b[1025] = film.film_type;
        b[1026] = film.perfs_offset;
        put_u32(b, 1028, film.prefix, be);
        put_u32(b, 1032, film.count, be);
        put_str(b, 1036, 32, &film.format);
        put_u32(b, 1068, film.frame_position, be);
        put_f32(b, 1072, film.frame_rate, be);
        put_str(b, 1076, 32, &film.frame_id);
        put_str(b, 1108, 200, &film.slate_info);

        buf
    }

    /// Writes the header at the start of a stream in its byte order.
    pub fn write<S: Stream>(&self, stream: &mut S) -> Result<()> {
        stream.seek(SeekFrom::Start(0))?;
        stream.write_all(&self.to_bytes()[..])?;
        Ok(())
    }

    /// Re-seeks into an already written header and overwrites the fields
    /// unknown until encoding completes: image offset and file size.
    pub fn patch_offsets<S: Stream>(&self, stream: &mut S) -> Result<()> {
        let be = self.byte_order == ByteOrder::Big;
        let mut word = [0u8; 4];
        for (pos, v) in [
            (POS_IMAGE_OFFSET, self.file.image_offset),
            (POS_FILE_SIZE, self.file.file_size),
        ] {
            if be { BigEndian::write_u32(&mut word, v) } else { LittleEndian::write_u32(&mut word, v) }
            stream.seek(SeekFrom::Start(pos as u64))?;
            stream.write_all(&word)?;
        }
        Ok(())
    }

    // -- accessors -------------------------------------------------------

    /// Image width in pixels (channel 0 geometry), `None` when blank.
    pub fn width(&self) -> Option<u32> {
        undef_u32(self.image.channels[0].pixels_per_line)
    }

    /// Image height in lines (channel 0 geometry), `None` when blank.
    pub fn height(&self) -> Option<u32> {
        undef_u32(self.image.channels[0].lines_per_image)
    }

    /// Number of populated channel records.
    pub fn channel_count(&self) -> usize {
        let n = self.image.channel_count;
        if n == UNDEF_U8 { 0 } else { n as usize }
    }

    /// Borrowed channel record; out-of-range indices answer `None`.
    pub fn channel(&self, index: usize) -> Option<&Channel> {
        if index < self.channel_count() {
            Some(&self.image.channels[index])
        } else {
            None
        }
    }

    /// Offset of the first image data byte, `None` when blank.
    pub fn image_offset(&self) -> Option<u32> {
        undef_u32(self.file.image_offset)
    }

    /// Total file size, `None` when blank.
    pub fn file_size(&self) -> Option<u32> {
        undef_u32(self.file.file_size)
    }

    /// Declared user data length; `None` when blank or zero.
    pub fn user_size(&self) -> Option<u32> {
        match undef_u32(self.file.user_size) {
            Some(0) | None => None,
            some => some,
        }
    }

    /// Typed packing convention, `None` for unsupported codes.
    pub fn packing(&self) -> Option<CineonPacking> {
        CineonPacking::from_code(self.format.packing)
    }

    /// Typed interleave, `None` for unknown codes.
    pub fn interleave(&self) -> Option<Interleave> {
        Interleave::from_code(self.format.interleave)
    }

    /// Capture gamma, `None` when blank.
    pub fn gamma(&self) -> Option<f32> {
        undef_f32(self.origination.gamma)
    }

    /// Film frame rate, `None` when blank.
    pub fn frame_rate(&self) -> Option<f32> {
        undef_f32(self.film.frame_rate)
    }
}
