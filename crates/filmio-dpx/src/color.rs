//! Colorimetric conversion between native element layouts and RGB(A).
//!
//! Integer buffers are assumed to span their full type range (the element
//! codec widens 10/12-bit samples to 16 bits before they get here); float
//! buffers are nominal 0..1.
//!
//! # Conversions
//!
//! - RGB / RGBA: identity.
//! - ABGR: pure component-order reversal, no arithmetic.
//! - CbYCr 4:4:4 and CbYCrA 4:4:4:4: per-pixel 3x3 matrix multiply. The
//!   matrix is picked by the element's colorimetric tag: the 601 family
//!   (BT.601, NTSC/PAL composite) or the 709/274 family (everything
//!   else). Chroma channels are recentered by half the representable
//!   range before the multiply; luma is not.
//! - CbYCrY 4:2:2 and CbYACrYA 4:2:2:4: chroma is nearest-neighbor
//!   duplicated to 4:4:4 first (both pixels of a pair share the pair's
//!   Cb and Cr; no interpolation filter), then the same matrices apply.
//!   The duplication is an approximation kept for compatibility; a
//!   filtered upsample would be the quality upgrade here.
//!
//! # Channel-order quirk
//!
//! Matrix row `i` writes output index `2 - i`, so the decoded channel
//! order is reversed relative to the matrix rows. This is a historical
//! convention preserved for byte compatibility with existing consumers;
//! the encode direction mirrors it exactly, so round trips close.
//!
//! # Buffer sizing
//!
//! [`query_rgb_size`] / [`query_native_size`] return a signed sample
//! count: negative magnitude means the conversion can run in place over a
//! buffer of `|n|` samples, positive means it expands and needs a
//! separate allocation of `n` samples (4:2:2 upsampling grows storage).
//! Callers must honor the sign to avoid aliased writes.

use crate::types::{Characteristic, Descriptor};
use filmio_core::{Error, Result, Sample};

// Decode rows (R, G, B) against the vector (Cb', Y, Cr'), chroma already
// recentered. 601-family coefficients.
const YCBCR_TO_RGB_601: [[f64; 3]; 3] = [
    [0.0, 1.0, 1.402],
    [-0.344136, 1.0, -0.714136],
    [1.772, 1.0, 0.0],
];

// 709/274-family coefficients.
const YCBCR_TO_RGB_709: [[f64; 3]; 3] = [
    [0.0, 1.0, 1.5748],
    [-0.187324, 1.0, -0.468124],
    [1.8556, 1.0, 0.0],
];

// Encode rows (Y, Cb, Cr) against the vector (R, G, B); exact inverses of
// the decode matrices above.
const RGB_TO_YCBCR_601: [[f64; 3]; 3] = [
    [0.299, 0.587, 0.114],
    [-0.168736, -0.331264, 0.5],
    [0.5, -0.418688, -0.081312],
];

const RGB_TO_YCBCR_709: [[f64; 3]; 3] = [
    [0.2126, 0.7152, 0.0722],
    [-0.114572, -0.385428, 0.5],
    [0.5, -0.454153, -0.045847],
];

fn decode_matrix(cmetric: Characteristic) -> &'static [[f64; 3]; 3] {
    if cmetric.is_601_family() { &YCBCR_TO_RGB_601 } else { &YCBCR_TO_RGB_709 }
}

fn encode_matrix(cmetric: Characteristic) -> &'static [[f64; 3]; 3] {
    if cmetric.is_601_family() { &RGB_TO_YCBCR_601 } else { &RGB_TO_YCBCR_709 }
}

fn full_scale<T: Sample>() -> f64 {
    if T::IS_FLOAT {
        1.0
    } else {
        (2f64).powi(T::BITS as i32) - 1.0
    }
}

fn half_scale<T: Sample>() -> f64 {
    if T::IS_FLOAT {
        0.5
    } else {
        (2f64).powi(T::BITS as i32 - 1)
    }
}

fn store<T: Sample>(v: f64) -> T {
    if T::IS_FLOAT {
        T::from_f64(v)
    } else {
        T::from_f64(v.round().clamp(0.0, full_scale::<T>()))
    }
}

/// Signed RGB(A) buffer size for decoding `pixels` of `descriptor`.
///
/// Negative: conversion fits in place over `|n|` samples. Positive: the
/// conversion expands and needs a separate `n`-sample buffer. Zero: no
/// conversion is defined for the descriptor.
pub fn query_rgb_size(descriptor: Descriptor, pixels: u64) -> i64 {
    match descriptor {
        Descriptor::Rgb | Descriptor::CbYCr444 => -((pixels * 3) as i64),
        Descriptor::Rgba | Descriptor::Abgr | Descriptor::CbYCrA4444 => -((pixels * 4) as i64),
        Descriptor::CbYCrY422 => (pixels * 3) as i64,
        Descriptor::CbYACrYA4224 => (pixels * 4) as i64,
        _ => 0,
    }
}

/// Signed native buffer size for encoding `pixels` into `descriptor`
/// (mirror of [`query_rgb_size`]; subsampled layouts shrink, so they are
/// in-place capable on the encode side).
pub fn query_native_size(descriptor: Descriptor, pixels: u64) -> i64 {
    match descriptor {
        Descriptor::Rgb | Descriptor::CbYCr444 => -((pixels * 3) as i64),
        Descriptor::Rgba | Descriptor::Abgr | Descriptor::CbYCrA4444 => -((pixels * 4) as i64),
        Descriptor::CbYCrY422 => -((pixels * 2) as i64),
        Descriptor::CbYACrYA4224 => -((pixels * 3) as i64),
        _ => 0,
    }
}

// One pixel through the decode matrix, writing the reversed channel
// order (row i -> output 2-i).
fn decode_pixel<T: Sample>(m: &[[f64; 3]; 3], cb: f64, y: f64, cr: f64, out: &mut [T]) {
    let half = half_scale::<T>();
    let v = [cb - half, y, cr - half];
    for (i, row) in m.iter().enumerate() {
        out[2 - i] = store(row[0] * v[0] + row[1] * v[1] + row[2] * v[2]);
    }
}

// One pixel through the encode matrix; reads the reversed channel order
// so it is the exact mirror of decode_pixel.
fn encode_pixel<T: Sample>(m: &[[f64; 3]; 3], rgb: &[T]) -> (f64, f64, f64) {
    let half = half_scale::<T>();
    let v = [rgb[2].to_f64(), rgb[1].to_f64(), rgb[0].to_f64()];
    let y = m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2];
    let cb = m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2] + half;
    let cr = m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2] + half;
    (y, cb, cr)
}

/// Converts `pixels` of a native-layout buffer to RGB(A).
///
/// Returns the number of output samples written. Buffer lengths must
/// cover the descriptor's stored sample count on the input side and the
/// magnitude reported by [`query_rgb_size`] on the output side.
pub fn convert_to_rgb<T: Sample>(
    descriptor: Descriptor,
    cmetric: Characteristic,
    input: &[T],
    output: &mut [T],
    pixels: u64,
) -> Result<usize> {
    let n = pixels as usize;
    let needed_in = n * descriptor.components() as usize;
    if input.len() < needed_in {
        return Err(Error::InvalidParameter(format!(
            "native buffer holds {} samples, {} pixels need {}",
            input.len(),
            pixels,
            needed_in
        )));
    }
    let needed_out = query_rgb_size(descriptor, pixels).unsigned_abs() as usize;
    if output.len() < needed_out {
        return Err(Error::InvalidParameter(format!(
            "rgb buffer holds {} samples, {} pixels need {}",
            output.len(),
            pixels,
            needed_out
        )));
    }
    let m = decode_matrix(cmetric);

    match descriptor {
        Descriptor::Rgb => {
            output[..n * 3].copy_from_slice(&input[..n * 3]);
            Ok(n * 3)
        }
        Descriptor::Rgba => {
            output[..n * 4].copy_from_slice(&input[..n * 4]);
            Ok(n * 4)
        }
        Descriptor::Abgr => {
            for (src, dst) in input[..n * 4].chunks_exact(4).zip(output.chunks_exact_mut(4)) {
                dst[0] = src[3];
                dst[1] = src[2];
                dst[2] = src[1];
                dst[3] = src[0];
            }
            Ok(n * 4)
        }
        Descriptor::CbYCr444 => {
            for (src, dst) in input[..n * 3].chunks_exact(3).zip(output.chunks_exact_mut(3)) {
                decode_pixel(m, src[0].to_f64(), src[1].to_f64(), src[2].to_f64(), dst);
            }
            Ok(n * 3)
        }
        Descriptor::CbYCrA4444 => {
            for (src, dst) in input[..n * 4].chunks_exact(4).zip(output.chunks_exact_mut(4)) {
                decode_pixel(m, src[0].to_f64(), src[1].to_f64(), src[2].to_f64(), dst);
                dst[3] = src[3];
            }
            Ok(n * 4)
        }
        Descriptor::CbYCrY422 => {
            // Cb Y0 Cr Y1 per pixel pair; both pixels reuse the pair's
            // chroma (nearest neighbor, no filter).
            let half = half_scale::<T>();
            let mut px = 0usize;
            let mut si = 0usize;
            while px < n {
                let cb = input[si].to_f64();
                let y0 = input[si + 1].to_f64();
                let (cr, y1) = if px + 1 < n {
                    (input[si + 2].to_f64(), Some(input[si + 3].to_f64()))
                } else {
                    // Lone trailing pixel stores only Cb Y; neutral Cr.
                    (half, None)
                };
                decode_pixel(m, cb, y0, cr, &mut output[px * 3..]);
                if let Some(y1) = y1 {
                    decode_pixel(m, cb, y1, cr, &mut output[(px + 1) * 3..]);
                }
                px += 2;
                si += 4;
            }
            Ok(n * 3)
        }
        Descriptor::CbYACrYA4224 => {
            // Cb Y0 A0 Cr Y1 A1 per pixel pair.
            let half = half_scale::<T>();
            let mut px = 0usize;
            let mut si = 0usize;
            while px < n {
                let cb = input[si].to_f64();
                let y0 = input[si + 1].to_f64();
                let a0 = input[si + 2];
                let (cr, rest) = if px + 1 < n {
                    (input[si + 3].to_f64(), Some((input[si + 4].to_f64(), input[si + 5])))
                } else {
                    (half, None)
                };
                decode_pixel(m, cb, y0, cr, &mut output[px * 4..]);
                output[px * 4 + 3] = a0;
                if let Some((y1, a1)) = rest {
                    decode_pixel(m, cb, y1, cr, &mut output[(px + 1) * 4..]);
                    output[(px + 1) * 4 + 3] = a1;
                }
                px += 2;
                si += 6;
            }
            Ok(n * 4)
        }
        other => Err(Error::UnsupportedDescriptor(other.code())),
    }
}

/// Converts `pixels` of an RGB(A) buffer back to the native layout
/// (mirror of [`convert_to_rgb`]): inverse matrices, chroma downsampled
/// by selecting the even pixel's values rather than averaging.
pub fn convert_to_native<T: Sample>(
    descriptor: Descriptor,
    cmetric: Characteristic,
    input: &[T],
    output: &mut [T],
    pixels: u64,
) -> Result<usize> {
    let n = pixels as usize;
    let rgb_stride = match descriptor {
        Descriptor::Rgb | Descriptor::CbYCr444 | Descriptor::CbYCrY422 => 3,
        Descriptor::Rgba
        | Descriptor::Abgr
        | Descriptor::CbYCrA4444
        | Descriptor::CbYACrYA4224 => 4,
        other => return Err(Error::UnsupportedDescriptor(other.code())),
    };
    if input.len() < n * rgb_stride {
        return Err(Error::InvalidParameter(format!(
            "rgb buffer holds {} samples, {} pixels need {}",
            input.len(),
            pixels,
            n * rgb_stride
        )));
    }
    let needed_out = query_native_size(descriptor, pixels).unsigned_abs() as usize;
    if output.len() < needed_out {
        return Err(Error::InvalidParameter(format!(
            "native buffer holds {} samples, {} pixels need {}",
            output.len(),
            pixels,
            needed_out
        )));
    }
    let m = encode_matrix(cmetric);

    match descriptor {
        Descriptor::Rgb => {
            output[..n * 3].copy_from_slice(&input[..n * 3]);
            Ok(n * 3)
        }
        Descriptor::Rgba => {
            output[..n * 4].copy_from_slice(&input[..n * 4]);
            Ok(n * 4)
        }
        Descriptor::Abgr => {
            for (src, dst) in input[..n * 4].chunks_exact(4).zip(output.chunks_exact_mut(4)) {
                dst[0] = src[3];
                dst[1] = src[2];
                dst[2] = src[1];
                dst[3] = src[0];
            }
            Ok(n * 4)
        }
        Descriptor::CbYCr444 => {
            for (src, dst) in input[..n * 3].chunks_exact(3).zip(output.chunks_exact_mut(3)) {
                let (y, cb, cr) = encode_pixel(m, src);
                dst[0] = store(cb);
                dst[1] = store(y);
                dst[2] = store(cr);
            }
            Ok(n * 3)
        }
        Descriptor::CbYCrA4444 => {
            for (src, dst) in input[..n * 4].chunks_exact(4).zip(output.chunks_exact_mut(4)) {
                let (y, cb, cr) = encode_pixel(m, src);
                dst[0] = store(cb);
                dst[1] = store(y);
                dst[2] = store(cr);
                dst[3] = src[3];
            }
            Ok(n * 4)
        }
        Descriptor::CbYCrY422 => {
            let mut px = 0usize;
            let mut si = 0usize;
            while px < n {
                let (y0, cb, cr) = encode_pixel(m, &input[px * 3..]);
                output[si] = store(cb);
                output[si + 1] = store(y0);
                if px + 1 < n {
                    let (y1, _, _) = encode_pixel(m, &input[(px + 1) * 3..]);
                    output[si + 2] = store(cr);
                    output[si + 3] = store(y1);
                }
                px += 2;
                si += 4;
            }
            Ok(n * 2)
        }
        Descriptor::CbYACrYA4224 => {
            let mut px = 0usize;
            let mut si = 0usize;
            while px < n {
                let (y0, cb, cr) = encode_pixel(m, &input[px * 4..]);
                output[si] = store(cb);
                output[si + 1] = store(y0);
                output[si + 2] = input[px * 4 + 3];
                if px + 1 < n {
                    let (y1, _, _) = encode_pixel(m, &input[(px + 1) * 4..]);
                    output[si + 3] = store(cr);
                    output[si + 4] = store(y1);
                    output[si + 5] = input[(px + 1) * 4 + 3];
                }
                px += 2;
                si += 6;
            }
            Ok(n * 3)
        }
        other => Err(Error::UnsupportedDescriptor(other.code())),
    }
}
