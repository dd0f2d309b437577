//! Scalar reference convolution.

use crate::kernel::Region;
use crate::matrix::Matrix2D;
use crate::util::{DiscFindError, DiscFindResult};

/// Correlates `kernel` against `data`, centered on every cell of `region`.
///
/// Each output cell is `sum(kernel * sample) / kernel_cells`, truncated toward
/// zero, where samples outside `data` read as `outside_value`. The output has
/// the size of the clamped region, or of `data` when `region` is `None`.
///
/// Precondition: `max|data| * max|kernel|` (including `outside_value`) must fit
/// in `i32`. Sums are accumulated in `i64`, so the precondition bounds only the
/// averaged result, which saturates if it is violated.
pub fn convolve(
    data: &Matrix2D<i32>,
    kernel: &Matrix2D<i32>,
    outside_value: i32,
    region: Option<Region>,
) -> DiscFindResult<Matrix2D<i32>> {
    if data.is_null() {
        return Err(DiscFindError::NullMatrix {
            context: "convolve data",
        });
    }
    if kernel.is_null() {
        return Err(DiscFindError::NullMatrix {
            context: "convolve kernel",
        });
    }
    debug_assert!(
        magnitude_fits(data, kernel, outside_value),
        "convolution magnitudes exceed the i32 product bound"
    );

    let data_w = data.width();
    let data_h = data.height();
    let (left, top, right, bottom) = match region {
        Some(region) => region.clamp_to(data_w, data_h),
        None => (0, 0, data_w - 1, data_h - 1),
    };

    let k_w = kernel.width();
    let k_h = kernel.height();
    let k_cx = (k_w / 2) as isize;
    let k_cy = (k_h / 2) as isize;
    let k_count = (k_w * k_h) as i64;

    // Per-row prefix sums let out-of-bounds kernel cells be charged in one step.
    let prefix: Vec<Vec<i64>> = kernel
        .rows()
        .map(|row| {
            let mut acc = Vec::with_capacity(row.len() + 1);
            acc.push(0i64);
            let mut s = 0i64;
            for v in row {
                s += i64::from(*v);
                acc.push(s);
            }
            acc
        })
        .collect();
    let outside = i64::from(outside_value);

    let out_w = right - left + 1;
    let out_h = bottom - top + 1;
    let mut out = Matrix2D::new(out_w, out_h)?;

    for (oy, y) in (top..=bottom).enumerate() {
        let y0 = y as isize - k_cy;
        for (ox, x) in (left..=right).enumerate() {
            let x0 = x as isize - k_cx;
            // Kernel columns whose sample lies inside the data, as `kx_lo..kx_hi`.
            let kx_lo = (-x0).clamp(0, k_w as isize) as usize;
            let kx_hi = (data_w as isize - x0).clamp(kx_lo as isize, k_w as isize) as usize;

            let mut sum = 0i64;
            for (ky, k_row) in kernel.rows().enumerate() {
                let row_prefix = &prefix[ky];
                let row_total = row_prefix[k_w];
                let dy = y0 + ky as isize;
                if dy < 0 || dy >= data_h as isize {
                    sum += outside * row_total;
                    continue;
                }
                let inside_weight = row_prefix[kx_hi] - row_prefix[kx_lo];
                sum += outside * (row_total - inside_weight);
                if kx_lo == kx_hi {
                    continue;
                }

                let d_row = data.row(dy as usize).ok_or(DiscFindError::NullMatrix {
                    context: "convolve data row",
                })?;
                let d_start = (x0 + kx_lo as isize) as usize;
                let samples = &d_row[d_start..d_start + (kx_hi - kx_lo)];
                let mut dot = 0i64;
                for (w, v) in k_row[kx_lo..kx_hi].iter().zip(samples) {
                    dot += i64::from(*w) * i64::from(*v);
                }
                sum += dot;
            }

            let value = (sum / k_count).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
            out[(ox, oy)] = value;
        }
    }

    Ok(out)
}

fn magnitude_fits(data: &Matrix2D<i32>, kernel: &Matrix2D<i32>, outside_value: i32) -> bool {
    let max_abs = |m: &Matrix2D<i32>| {
        m.as_slice()
            .iter()
            .map(|v| i64::from(*v).abs())
            .max()
            .unwrap_or(0)
    };
    let data_max = max_abs(data).max(i64::from(outside_value).abs());
    data_max * max_abs(kernel) <= i64::from(i32::MAX)
}
