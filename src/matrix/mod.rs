//! Owned 2D numeric grids.
//!
//! `Matrix2D` stores its cells in one contiguous row-major buffer with
//! `stride == width`. `x` indexes columns (horizontal) and `y` indexes rows
//! (vertical) throughout the crate. A matrix may be *null* (0x0, unallocated),
//! which is distinct from any allocated size and is checked explicitly by the
//! algorithms that consume matrices.

use std::ops::{Index, IndexMut};

use crate::util::{DiscFindError, DiscFindResult};

#[cfg(feature = "image-io")]
pub mod io;
pub mod resample;

/// Width and height of a matrix in cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    /// Creates a size from its components.
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Returns `true` when either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the shorter side.
    pub fn min_side(&self) -> usize {
        self.width.min(self.height)
    }

    /// Returns the number of cells.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Returns `true` when both sides are no larger than `other`'s.
    pub fn fits_within(&self, other: Size) -> bool {
        self.width <= other.width && self.height <= other.height
    }
}

/// Owned rectangular grid of `T`.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix2D<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> Default for Matrix2D<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> Matrix2D<T> {
    /// Creates a null (unallocated) matrix.
    pub const fn null() -> Self {
        Self {
            data: Vec::new(),
            width: 0,
            height: 0,
        }
    }

    /// Wraps a row-major buffer of exactly `width * height` cells.
    pub fn from_vec(data: Vec<T>, width: usize, height: usize) -> DiscFindResult<Self> {
        let needed = checked_area(width, height)?;
        if data.len() != needed {
            return Err(DiscFindError::BufferMismatch {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns `true` when the matrix holds no cells.
    pub fn is_null(&self) -> bool {
        self.data.is_empty()
    }

    /// Releases the storage and returns to the null state.
    pub fn clear(&mut self) {
        self.data = Vec::new();
        self.width = 0;
        self.height = 0;
    }

    /// Returns the matrix size (0x0 when null).
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns the number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the backing row-major slice.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Returns the backing row-major slice mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Returns the cell at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x)
    }

    /// Returns the cell at `(x, y)` mutably if it is within bounds.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get_mut(y * self.width + x)
    }

    /// Returns row `y` as a slice of length `width`.
    pub fn row(&self, y: usize) -> Option<&[T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get(start..start + self.width)
    }

    /// Returns row `y` mutably.
    pub fn row_mut(&mut self, y: usize) -> Option<&mut [T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get_mut(start..start + self.width)
    }

    /// Iterates over rows from top to bottom.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, T> {
        // `chunks_exact(0)` panics, so a null matrix iterates a dummy stride.
        self.data.chunks_exact(self.width.max(1))
    }
}

impl<T: Clone + Default> Matrix2D<T> {
    /// Allocates a `width x height` matrix filled with `T::default()`.
    pub fn new(width: usize, height: usize) -> DiscFindResult<Self> {
        Self::filled(width, height, T::default())
    }

    /// Allocates a `width x height` matrix filled with `value`.
    pub fn filled(width: usize, height: usize, value: T) -> DiscFindResult<Self> {
        let needed = checked_area(width, height)?;
        Ok(Self {
            data: vec![value; needed],
            width,
            height,
        })
    }

    /// Builds a matrix by evaluating `f(x, y)` for every cell.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> DiscFindResult<Self>
    where
        F: FnMut(usize, usize) -> T,
    {
        let needed = checked_area(width, height)?;
        let mut data = Vec::with_capacity(needed);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Reallocates to `width x height`; previous contents are dropped.
    ///
    /// On invalid dimensions the matrix is left untouched.
    pub fn resize(&mut self, width: usize, height: usize) -> DiscFindResult<()> {
        let needed = checked_area(width, height)?;
        self.data = vec![T::default(); needed];
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Writes `value` at `(x, y)`; returns `false` when out of bounds.
    pub fn set(&mut self, x: usize, y: usize, value: T) -> bool {
        match self.get_mut(x, y) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }
}

impl<T> Index<(usize, usize)> for Matrix2D<T> {
    type Output = T;

    fn index(&self, (x, y): (usize, usize)) -> &T {
        assert!(
            x < self.width && y < self.height,
            "index ({x}, {y}) out of bounds for {}x{} matrix",
            self.width,
            self.height
        );
        &self.data[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix2D<T> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        assert!(
            x < self.width && y < self.height,
            "index ({x}, {y}) out of bounds for {}x{} matrix",
            self.width,
            self.height
        );
        &mut self.data[y * self.width + x]
    }
}

fn checked_area(width: usize, height: usize) -> DiscFindResult<usize> {
    if width == 0 || height == 0 {
        return Err(DiscFindError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(DiscFindError::InvalidDimensions { width, height })
}

#[cfg(test)]
mod tests {
    use super::{Matrix2D, Size};
    use crate::util::DiscFindError;

    #[test]
    fn null_matrix_reports_empty_size() {
        let m: Matrix2D<i32> = Matrix2D::default();
        assert!(m.is_null());
        assert_eq!(m.size(), Size::new(0, 0));
        assert!(m.get(0, 0).is_none());
        assert_eq!(m.rows().count(), 0);
    }

    #[test]
    fn resize_drops_contents_and_keeps_state_on_error() {
        let mut m = Matrix2D::filled(2, 2, 7i32).unwrap();
        m.resize(3, 1).unwrap();
        assert_eq!(m.size(), Size::new(3, 1));
        assert_eq!(m.as_slice(), &[0, 0, 0]);

        let err = m.resize(0, 4).unwrap_err();
        assert_eq!(
            err,
            DiscFindError::InvalidDimensions {
                width: 0,
                height: 4
            }
        );
        assert_eq!(m.size(), Size::new(3, 1));
    }

    #[test]
    fn rows_are_row_major() {
        let m = Matrix2D::from_fn(3, 2, |x, y| (y * 10 + x) as i32).unwrap();
        assert_eq!(m.row(1).unwrap(), &[10, 11, 12]);
        assert_eq!(m[(2, 0)], 2);
        let rows: Vec<&[i32]> = m.rows().collect();
        assert_eq!(rows, vec![&[0, 1, 2][..], &[10, 11, 12][..]]);
    }

    #[test]
    fn clear_returns_to_null() {
        let mut m = Matrix2D::filled(4, 4, 1u8).unwrap();
        m.clear();
        assert!(m.is_null());
        assert_eq!(m.width(), 0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn index_out_of_bounds_panics() {
        let m = Matrix2D::filled(2, 2, 0i32).unwrap();
        let _ = m[(2, 0)];
    }
}
