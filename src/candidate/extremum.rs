//! Extremum records produced for each candidate diameter.

use crate::matrix::Matrix2D;
use crate::util::math::cell_center_norm;

/// Point in normalized `[0, 1] x [0, 1]` matrix coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NormPoint {
    pub x: f32,
    pub y: f32,
}

/// Strongest positive and negative responses for one candidate diameter.
///
/// `diameter` is relative to the shorter side of the full-resolution matrix;
/// [`Extremum::INVALID_DIAMETER`] marks a candidate that was skipped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extremum {
    pub diameter: f32,
    pub max_point: NormPoint,
    pub max_value: i32,
    pub min_point: NormPoint,
    pub min_value: i32,
}

impl Extremum {
    /// Sentinel diameter of a skipped candidate.
    pub const INVALID_DIAMETER: f32 = -1.0;

    /// Returns a record for a candidate that was not computed.
    pub fn invalid() -> Self {
        Self {
            diameter: Self::INVALID_DIAMETER,
            max_point: NormPoint::default(),
            max_value: 0,
            min_point: NormPoint::default(),
            min_value: 0,
        }
    }

    /// Returns `false` for the skipped-candidate sentinel.
    pub fn is_valid(&self) -> bool {
        self.diameter > 0.0
    }
}

/// Scans `response` for its maximum and minimum cells.
///
/// The first cell in row-major order wins ties. Returns `None` for a null matrix.
pub fn find_extrema(response: &Matrix2D<i32>, diameter: f32) -> Option<Extremum> {
    let width = response.width();
    let height = response.height();
    let first = *response.get(0, 0)?;

    let (mut max_idx, mut max_value) = (0usize, first);
    let (mut min_idx, mut min_value) = (0usize, first);
    for (idx, value) in response.as_slice().iter().copied().enumerate().skip(1) {
        if value > max_value {
            max_value = value;
            max_idx = idx;
        }
        if value < min_value {
            min_value = value;
            min_idx = idx;
        }
    }

    let to_point = |idx: usize| NormPoint {
        x: cell_center_norm(idx % width, width),
        y: cell_center_norm(idx / width, height),
    };
    Some(Extremum {
        diameter,
        max_point: to_point(max_idx),
        max_value,
        min_point: to_point(min_idx),
        min_value,
    })
}

/// Returns the index of the valid record with the largest `max_value`.
///
/// Earlier records win ties; invalid records are ignored.
pub(crate) fn best_index(records: &[Extremum]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, record) in records.iter().enumerate() {
        if !record.is_valid() {
            continue;
        }
        match best {
            Some(b) if records[b].max_value >= record.max_value => {}
            _ => best = Some(idx),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::{best_index, find_extrema, Extremum};
    use crate::matrix::Matrix2D;

    fn record(diameter: f32, max_value: i32) -> Extremum {
        Extremum {
            diameter,
            max_value,
            ..Extremum::invalid()
        }
    }

    #[test]
    fn finds_first_max_and_min() {
        let m = Matrix2D::from_vec(vec![1, 9, 3, -4, 9, -4], 3, 2).unwrap();
        let ex = find_extrema(&m, 0.2).unwrap();
        assert_eq!(ex.max_value, 9);
        assert_eq!(ex.min_value, -4);
        assert!((ex.max_point.x - 0.5).abs() < 1e-6);
        assert!((ex.max_point.y - 0.25).abs() < 1e-6);
        assert!((ex.min_point.x - 1.0 / 6.0).abs() < 1e-6);
        assert!((ex.min_point.y - 0.75).abs() < 1e-6);
    }

    #[test]
    fn null_response_has_no_extrema() {
        assert!(find_extrema(&Matrix2D::null(), 0.1).is_none());
    }

    #[test]
    fn best_skips_invalid_and_prefers_first_on_ties() {
        let records = [
            Extremum::invalid(),
            record(0.1, 5),
            record(0.2, 8),
            record(0.3, 8),
        ];
        assert_eq!(best_index(&records), Some(2));
        assert_eq!(best_index(&[Extremum::invalid()]), None);
    }

    #[test]
    fn best_accepts_negative_responses() {
        let records = [record(0.1, -7), record(0.2, -3)];
        assert_eq!(best_index(&records), Some(1));
    }
}
