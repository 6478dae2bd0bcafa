//! Rectangular pixel region for partial reads and writes.
//!
//! A [`Block`] names an inclusive rectangle inside an element's image
//! area. Callers hand blocks to the element codecs to decode or encode a
//! region of interest without touching the rest of the image.
//!
//! # Coordinate System
//!
//! Standard image convention: origin (0, 0) at the top-left corner, X
//! increases to the right, Y increases downward. Both corners are
//! inclusive, so a full 1920x1080 image is `Block::new(0, 0, 1919, 1079)`.

/// An inclusive rectangle `{x1, y1, x2, y2}` in pixel coordinates.
///
/// Transient value type with no ownership concerns; [`normalize`]
/// (Block::normalize) restores the `x1 <= x2, y1 <= y2` invariant when a
/// caller supplied swapped corners.
///
/// # Example
///
/// ```
/// use filmio_core::Block;
///
/// let mut b = Block::new(7, 3, 0, 0);
/// b.normalize();
/// assert_eq!(b, Block::new(0, 0, 7, 3));
/// assert_eq!(b.width(), 8);
/// assert_eq!(b.height(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Block {
    /// X coordinate of the left edge (inclusive).
    pub x1: u32,
    /// Y coordinate of the top edge (inclusive).
    pub y1: u32,
    /// X coordinate of the right edge (inclusive).
    pub x2: u32,
    /// Y coordinate of the bottom edge (inclusive).
    pub y2: u32,
}

impl Block {
    /// Creates a block from two corners.
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Full-image block for the given dimensions.
    ///
    /// Width and height must be non-zero.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width.saturating_sub(1), height.saturating_sub(1))
    }

    /// Exchanges corners as needed so `x1 <= x2` and `y1 <= y2`.
    pub fn normalize(&mut self) {
        if self.x1 > self.x2 {
            std::mem::swap(&mut self.x1, &mut self.x2);
        }
        if self.y1 > self.y2 {
            std::mem::swap(&mut self.y1, &mut self.y2);
        }
    }

    /// Width in pixels (inclusive bounds).
    pub fn width(&self) -> u32 {
        self.x2 - self.x1 + 1
    }

    /// Height in pixels (inclusive bounds).
    pub fn height(&self) -> u32 {
        self.y2 - self.y1 + 1
    }

    /// Pixel count covered by the block.
    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// True when the block lies entirely inside an image of the given
    /// dimensions.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.x2 < width && self.y2 < height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_swapped_corners() {
        let mut b = Block::new(10, 20, 3, 5);
        b.normalize();
        assert_eq!(b, Block::new(3, 5, 10, 20));

        // Already normalized blocks are untouched.
        let mut ok = Block::new(1, 2, 3, 4);
        ok.normalize();
        assert_eq!(ok, Block::new(1, 2, 3, 4));
    }

    #[test]
    fn test_dimensions() {
        let b = Block::full(1920, 1080);
        assert_eq!(b.width(), 1920);
        assert_eq!(b.height(), 1080);
        assert_eq!(b.area(), 1920 * 1080);
        assert!(b.fits(1920, 1080));
        assert!(!b.fits(1919, 1080));
    }

    #[test]
    fn test_single_pixel() {
        let b = Block::new(5, 5, 5, 5);
        assert_eq!(b.width(), 1);
        assert_eq!(b.height(), 1);
        assert_eq!(b.area(), 1);
    }
}
