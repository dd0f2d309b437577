//! Numeric helpers shared by the search stages.

/// Splits `[lo, hi]` into `intervals` equal steps and returns the left edge of
/// every step followed by the exact right edge (`intervals + 1` values).
pub(crate) fn partition_interval(lo: f32, hi: f32, intervals: usize) -> Vec<f32> {
    let intervals = intervals.max(1);
    let step = (hi - lo) / intervals as f32;
    let mut out = Vec::with_capacity(intervals + 1);
    for k in 0..intervals {
        out.push(lo + step * k as f32);
    }
    out.push(hi);
    out
}

/// Normalized coordinate of the center of cell `index` on an axis of `len` cells.
pub(crate) fn cell_center_norm(index: usize, len: usize) -> f32 {
    (index as f32 + 0.5) / len as f32
}

/// Maps a normalized coordinate back to pixel-index units on an axis of `len` cells.
pub(crate) fn norm_to_pixel(norm: f32, len: usize) -> f32 {
    norm * len as f32 - 0.5
}
