//! Rectangle type for block and crop geometry.
//!
//! [`Rect`] describes every axis-aligned region this workspace works with:
//! - Corruption blocks sampled by the patch dropper
//! - Crop windows reported by the resized-crop transform
//! - Source regions for self-copy and donor copy
//!
//! # Coordinate System
//!
//! All coordinates use the standard image convention:
//! - Origin (0, 0) is at the **top-left** corner
//! - X (column) increases to the right
//! - Y (row) increases downward
//!
//! ```text
//! (0,0) ────────► X (col)
//!   │
//!   │   ┌──────────┐
//!   │   │  Block   │
//!   │   └──────────┘
//!   ▼
//!   Y (row)
//! ```
//!
//! A block written as `(row_offset, col_offset, height, width)` is
//! [`Rect::from_block`].
//!
//! # Usage
//!
//! ```rust
//! use gmml_core::Rect;
//!
//! let rect = Rect::from_block(16, 32, 48, 64);
//! assert_eq!(rect.x, 32);
//! assert_eq!(rect.y, 16);
//! assert!(rect.fits_in(224, 224));
//! ```

/// A rectangle defined by origin (x, y) and dimensions (width, height).
///
/// All values are in pixels, with (0, 0) at the top-left corner.
/// A rectangle with zero width or height is considered empty.
///
/// # Example
///
/// ```rust
/// use gmml_core::Rect;
///
/// let rect = Rect::new(10, 20, 100, 50);
/// assert_eq!(rect.right(), 110);
/// assert_eq!(rect.bottom(), 70);
/// assert_eq!(rect.area(), 5000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Column of the left edge (inclusive)
    pub x: usize,
    /// Row of the top edge (inclusive)
    pub y: usize,
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
}

impl Rect {
    /// Creates a new rectangle with the given origin and dimensions.
    #[inline]
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from block notation `(row, col, height, width)`.
    #[inline]
    pub const fn from_block(row: usize, col: usize, height: usize, width: usize) -> Self {
        Self::new(col, row, width, height)
    }

    /// Creates a rectangle from origin (0, 0) with given dimensions.
    ///
    /// ```rust
    /// use gmml_core::Rect;
    ///
    /// let rect = Rect::from_size(224, 96);
    /// assert_eq!((rect.x, rect.y), (0, 0));
    /// ```
    #[inline]
    pub const fn from_size(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Returns the column of the right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> usize {
        self.x + self.width
    }

    /// Returns the row of the bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> usize {
        self.y + self.height
    }

    /// Returns the area of the rectangle in pixels.
    #[inline]
    pub const fn area(&self) -> usize {
        self.width * self.height
    }

    /// Returns `true` if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if the pixel at (`col`, `row`) is inside this rectangle.
    ///
    /// Inclusive on the left/top edges, exclusive on the right/bottom edges.
    ///
    /// ```rust
    /// use gmml_core::Rect;
    ///
    /// let rect = Rect::new(10, 10, 100, 100);
    /// assert!(rect.contains(10, 10));
    /// assert!(rect.contains(109, 109));
    /// assert!(!rect.contains(110, 110));
    /// ```
    #[inline]
    pub const fn contains(&self, col: usize, row: usize) -> bool {
        col >= self.x && col < self.right() && row >= self.y && row < self.bottom()
    }

    /// Returns `true` if the rectangle lies within a `height` x `width` grid.
    #[inline]
    pub const fn fits_in(&self, height: usize, width: usize) -> bool {
        self.right() <= width && self.bottom() <= height
    }

    /// Returns this rectangle moved so its origin is (`x`, `y`).
    #[inline]
    pub const fn with_origin(&self, x: usize, y: usize) -> Rect {
        Rect::new(x, y, self.width, self.height)
    }

    /// Returns an iterator over all (col, row) coordinates in this rectangle.
    ///
    /// Iterates row by row, left to right, top to bottom.
    #[inline]
    pub fn iter_coords(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.y..self.bottom()).flat_map(move |y| (self.x..self.right()).map(move |x| (x, y)))
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Rect({}, {}, {}x{})",
            self.x, self.y, self.width, self.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_block_notation() {
        let r = Rect::from_block(10, 20, 30, 40);
        assert_eq!(r, Rect::new(20, 10, 40, 30));
    }

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10, 20, 100, 50);
        assert_eq!(r.right(), 110);
        assert_eq!(r.bottom(), 70);
        assert_eq!(r.area(), 5000);
    }

    #[test]
    fn test_rect_contains() {
        let r = Rect::new(10, 10, 100, 100);
        assert!(r.contains(10, 10));
        assert!(r.contains(50, 50));
        assert!(r.contains(109, 109));
        assert!(!r.contains(110, 110));
        assert!(!r.contains(5, 50));
    }

    #[test]
    fn test_rect_fits_in() {
        assert!(Rect::new(0, 0, 32, 32).fits_in(32, 32));
        assert!(!Rect::new(16, 0, 32, 32).fits_in(32, 32));
        assert!(!Rect::new(0, 1, 32, 32).fits_in(32, 32));
    }

    #[test]
    fn test_rect_iter_coords() {
        let r = Rect::new(0, 0, 2, 2);
        let coords: Vec<_> = r.iter_coords().collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }
}
