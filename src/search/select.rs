//! Working-resolution selection under a convolution cost budget.
//!
//! Convolving a `k x k` kernel over a `w x h` matrix costs roughly
//! `k^2 * w * h` multiply-adds. For a given relative diameter the kernel side
//! scales with the matrix, so the selector shrinks the matrix (keeping its
//! aspect ratio) until the cost fits `performance_criterion^4`, never going
//! below `min_matrix_side` on either axis.

use crate::matrix::Size;

/// Default cost criterion; the budget is its fourth power.
pub const DEFAULT_PERFORMANCE_CRITERION: u32 = 64;
/// Default floor for either side of a working matrix.
pub const DEFAULT_MIN_MATRIX_SIDE: usize = 16;

/// Working matrix size and kernel radius chosen for one candidate diameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeSelection {
    /// Kernel radius; the kernel side is `2 * kernel_radius + 1`.
    pub kernel_radius: usize,
    /// Size the input should be resampled to before convolving.
    pub working_size: Size,
}

/// Cost/resolution trade-off policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeSelector {
    pub performance_criterion: u32,
    pub min_matrix_side: usize,
    /// Kernel side divided by the matched disc diameter.
    pub footprint_ratio: f64,
}

impl Default for SizeSelector {
    fn default() -> Self {
        Self {
            performance_criterion: DEFAULT_PERFORMANCE_CRITERION,
            min_matrix_side: DEFAULT_MIN_MATRIX_SIDE,
            footprint_ratio: 3f64.sqrt(),
        }
    }
}

impl SizeSelector {
    /// Picks the working size and kernel radius for `relative_diameter`.
    ///
    /// Returns `None` when the candidate must be skipped: the input is already
    /// below the side floor, or the kernel would shrink to a single cell.
    pub fn select(&self, full: Size, relative_diameter: f32) -> Option<SizeSelection> {
        let floor = self.min_matrix_side.max(1);
        if full.width < floor || full.height < floor {
            return None;
        }

        let budget = f64::from(self.performance_criterion).powi(4);
        let aspect = full.width as f64 / full.height as f64;
        let rel = f64::from(relative_diameter);

        let mut size = full;
        let kernel_side = loop {
            let kernel_side = rel * size.min_side() as f64 * self.footprint_ratio;
            let cost = kernel_side * kernel_side * size.area() as f64;
            if cost <= budget {
                break kernel_side;
            }
            let next_width = size.width - 1;
            let next_height = (next_width as f64 / aspect) as usize;
            if next_width < floor || next_height < floor {
                break kernel_side;
            }
            size = Size::new(next_width, next_height);
        };

        let radius = ((kernel_side - 1.0) / 2.0).floor();
        if radius.is_nan() || radius < 1.0 {
            return None;
        }
        Some(SizeSelection {
            kernel_radius: radius as usize,
            working_size: size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::SizeSelector;
    use crate::matrix::Size;

    #[test]
    fn small_kernels_keep_full_resolution() {
        let sel = SizeSelector::default();
        let out = sel.select(Size::new(100, 80), 0.2).unwrap();
        assert_eq!(out.working_size, Size::new(100, 80));
        // 0.2 * 80 * sqrt(3) = 27.7 -> radius 13
        assert_eq!(out.kernel_radius, 13);
    }

    #[test]
    fn large_inputs_shrink_under_budget_and_keep_aspect() {
        let sel = SizeSelector::default();
        let out = sel.select(Size::new(512, 256), 0.3).unwrap();
        let w = out.working_size.width as f64;
        let h = out.working_size.height as f64;
        assert!(out.working_size.width < 512);
        assert!((w / h - 2.0).abs() < 0.05);
        let k = 0.3 * h * 3f64.sqrt();
        assert!(k * k * w * h <= 64f64.powi(4));
    }

    #[test]
    fn floor_stops_shrinking() {
        let sel = SizeSelector {
            performance_criterion: 1,
            ..SizeSelector::default()
        };
        let out = sel.select(Size::new(40, 20), 0.5).unwrap();
        assert!(out.working_size.height >= 16);
        assert!(out.working_size.width >= 16);
    }

    #[test]
    fn below_floor_is_skipped() {
        let sel = SizeSelector::default();
        assert!(sel.select(Size::new(15, 100), 0.3).is_none());
    }

    #[test]
    fn tiny_kernel_is_skipped() {
        let sel = SizeSelector::default();
        // 0.05 * 20 * sqrt(3) = 1.7 -> radius 0
        assert!(sel.select(Size::new(20, 20), 0.05).is_none());
    }
}
