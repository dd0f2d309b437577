//! Area-weighted downscaling of integer matrices.
//!
//! Every output cell covers a `scale_x x scale_y` footprint in input
//! coordinates, where each input cell is a unit square. The output value is
//! `sum(overlap_area * input) / (scale_x * scale_y)`, truncated toward zero, so
//! intensity mass is preserved instead of point-sampled. Equal input and output
//! sizes reproduce the input exactly.

use crate::matrix::{Matrix2D, Size};
use crate::util::{DiscFindError, DiscFindResult};

/// Overlap of the input cells `[first, last]` with the footprint `[lo, hi)` on one axis.
struct AxisSpan {
    first: usize,
    weights: Vec<f64>,
}

/// Downscales `input` to `output_size` with area weighting.
///
/// `output_size` must be non-empty and no larger than the input on either axis.
pub fn scale_down(input: &Matrix2D<i32>, output_size: Size) -> DiscFindResult<Matrix2D<i32>> {
    if input.is_null() {
        return Err(DiscFindError::NullMatrix {
            context: "scale_down input",
        });
    }
    if output_size.is_empty() {
        return Err(DiscFindError::InvalidDimensions {
            width: output_size.width,
            height: output_size.height,
        });
    }
    let in_size = input.size();
    if !output_size.fits_within(in_size) {
        return Err(DiscFindError::OutputLargerThanInput {
            in_width: in_size.width,
            in_height: in_size.height,
            out_width: output_size.width,
            out_height: output_size.height,
        });
    }
    if output_size == in_size {
        return Ok(input.clone());
    }

    let scale_x = in_size.width as f64 / output_size.width as f64;
    let scale_y = in_size.height as f64 / output_size.height as f64;
    let footprint = scale_x * scale_y;

    // Horizontal spans are shared by every output row.
    let x_spans: Vec<AxisSpan> = (0..output_size.width)
        .map(|i| axis_span(i, scale_x, in_size.width))
        .collect();

    let mut out = Matrix2D::new(output_size.width, output_size.height)?;
    for j in 0..output_size.height {
        let y_span = axis_span(j, scale_y, in_size.height);
        let out_row = out
            .row_mut(j)
            .ok_or(DiscFindError::NullMatrix {
                context: "scale_down output row",
            })?;
        for (cell, x_span) in out_row.iter_mut().zip(&x_spans) {
            let mut sum = 0.0f64;
            for (dy, wy) in y_span.weights.iter().enumerate() {
                let row = input.row(y_span.first + dy).ok_or(DiscFindError::NullMatrix {
                    context: "scale_down input row",
                })?;
                let src = &row[x_span.first..x_span.first + x_span.weights.len()];
                let mut row_sum = 0.0f64;
                for (value, wx) in src.iter().zip(&x_span.weights) {
                    row_sum += wx * f64::from(*value);
                }
                sum += wy * row_sum;
            }
            *cell = (sum / footprint) as i32;
        }
    }

    Ok(out)
}

fn axis_span(index: usize, scale: f64, len: usize) -> AxisSpan {
    let lo = index as f64 * scale;
    let hi = (index + 1) as f64 * scale;
    let first = (lo as usize).min(len - 1);
    let last = (hi as usize).min(len - 1);
    let weights = (first..=last)
        .map(|k| {
            let cell_lo = k as f64;
            let cell_hi = cell_lo + 1.0;
            (hi.min(cell_hi) - lo.max(cell_lo)).max(0.0)
        })
        .collect();
    AxisSpan { first, weights }
}

#[cfg(test)]
mod tests {
    use super::scale_down;
    use crate::matrix::{Matrix2D, Size};
    use crate::util::DiscFindError;

    #[test]
    fn halving_averages_blocks() {
        let input = Matrix2D::from_vec((0..16).collect(), 4, 4).unwrap();
        let out = scale_down(&input, Size::new(2, 2)).unwrap();
        // (0 + 1 + 4 + 5) / 4 = 2.5 -> 2, (2 + 3 + 6 + 7) / 4 = 4.5 -> 4
        assert_eq!(out.as_slice(), &[2, 4, 10, 12]);
    }

    #[test]
    fn fractional_scale_preserves_mass_of_constant() {
        let input = Matrix2D::filled(7, 5, 100).unwrap();
        let out = scale_down(&input, Size::new(3, 2)).unwrap();
        assert!(out.as_slice().iter().all(|v| (99..=100).contains(v)));
    }

    #[test]
    fn fractional_scale_splits_boundary_cells() {
        // One row of three cells reduced to two: each output covers 1.5 cells.
        let input = Matrix2D::from_vec(vec![0, 30, 60], 3, 1).unwrap();
        let out = scale_down(&input, Size::new(2, 1)).unwrap();
        // (0 * 1 + 30 * 0.5) / 1.5 = 10, (30 * 0.5 + 60 * 1) / 1.5 = 50
        assert_eq!(out.as_slice(), &[10, 50]);
    }

    #[test]
    fn rejects_upscaling() {
        let input = Matrix2D::filled(4, 4, 1).unwrap();
        let err = scale_down(&input, Size::new(5, 4)).unwrap_err();
        assert_eq!(
            err,
            DiscFindError::OutputLargerThanInput {
                in_width: 4,
                in_height: 4,
                out_width: 5,
                out_height: 4,
            }
        );
    }

    #[test]
    fn rejects_null_input() {
        let input: Matrix2D<i32> = Matrix2D::null();
        assert!(matches!(
            scale_down(&input, Size::new(1, 1)),
            Err(DiscFindError::NullMatrix { .. })
        ));
    }
}
