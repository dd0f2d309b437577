//! Convolution of wavelet kernels against data matrices.
//!
//! The engine computes a discrete correlation centered on each data cell of a
//! region, substituting a constant for samples that fall outside the data.
//! Arithmetic is integer with an `i64` accumulator; see [`convolve`] for the
//! magnitude precondition.

pub mod scalar;

pub use scalar::convolve;

/// Inclusive rectangle of data cells to evaluate, in `(x, y)` cell indices.
///
/// Corners may lie outside the matrix; they are clamped into range before use
/// and an inverted rectangle collapses onto its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub top_left: (isize, isize),
    pub bottom_right: (isize, isize),
}

impl Region {
    /// Creates a region from its inclusive corners.
    pub const fn new(top_left: (isize, isize), bottom_right: (isize, isize)) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    /// Clamps the region into a `width x height` matrix.
    ///
    /// Returns inclusive `(left, top, right, bottom)` indices. Both sizes must be non-zero.
    pub(crate) fn clamp_to(&self, width: usize, height: usize) -> (usize, usize, usize, usize) {
        let clamp = |v: isize, len: usize| v.clamp(0, len as isize - 1) as usize;
        let left = clamp(self.top_left.0, width);
        let top = clamp(self.top_left.1, height);
        let right = clamp(self.bottom_right.0, width).max(left);
        let bottom = clamp(self.bottom_right.1, height).max(top);
        (left, top, right, bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::Region;

    #[test]
    fn clamp_keeps_inner_region() {
        let r = Region::new((1, 2), (3, 4));
        assert_eq!(r.clamp_to(10, 10), (1, 2, 3, 4));
    }

    #[test]
    fn clamp_limits_outer_corners() {
        let r = Region::new((-5, -1), (50, 7));
        assert_eq!(r.clamp_to(10, 6), (0, 0, 9, 5));
    }

    #[test]
    fn inverted_region_collapses_to_top_left() {
        let r = Region::new((6, 5), (2, 1));
        assert_eq!(r.clamp_to(10, 10), (6, 5, 6, 5));
    }
}
