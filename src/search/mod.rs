//! Iterative multi-resolution diameter search.
//!
//! Each iteration evaluates a set of candidate diameters (in parallel on a
//! worker pool), picks the one with the strongest positive response and
//! narrows the diameter interval around it. Diameters are relative to the
//! shorter side of the input; coordinates are normalized to `[0, 1]` until the
//! final result is converted back to pixels.

pub(crate) mod engine;
pub(crate) mod evaluate;
pub(crate) mod machine;
pub(crate) mod select;

pub use engine::{
    ChannelObserver, NoopObserver, SearchEngine, SearchEvent, SearchHandle, SearchObserver,
};
pub use evaluate::{evaluate_candidate, response_map, ResponseMap};
pub use machine::{SearchMachine, SearchState, Step};
pub use select::{
    SizeSelection, SizeSelector, DEFAULT_MIN_MATRIX_SIDE, DEFAULT_PERFORMANCE_CRITERION,
};

use crate::matrix::Size;
use crate::util::{DiscFindError, DiscFindResult};
use crate::wavelet::Profile;

/// Configuration for the diameter search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchConfig {
    /// Equal steps per interval; each batch evaluates `intervals + 1` diameters.
    pub intervals: usize,
    /// Number of batches before the result is published.
    pub iterations: usize,
    /// Cost criterion for [`SizeSelector`]; the budget is its fourth power.
    pub performance_criterion: u32,
    /// Smallest side a working matrix may be reduced to.
    pub min_matrix_side: usize,
    /// Smallest disc diameter searched for, in full-resolution pixels.
    pub min_diameter_px: f32,
    /// Scale applied to profile values when synthesizing kernels.
    pub kernel_ratio: f32,
    /// Sample value used where a kernel extends past the matrix.
    pub outside_value: i32,
    /// Radial profile of the detection kernel.
    pub profile: Profile,
    /// Evaluate candidates of a batch on the worker pool.
    pub parallel: bool,
    /// Worker pool size; `0` uses the rayon default.
    pub threads: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            intervals: 5,
            iterations: 5,
            performance_criterion: DEFAULT_PERFORMANCE_CRITERION,
            min_matrix_side: DEFAULT_MIN_MATRIX_SIDE,
            min_diameter_px: 16.0,
            kernel_ratio: 10_000.0,
            outside_value: 255,
            profile: Profile::Fhat2d,
            parallel: true,
            threads: 0,
        }
    }
}

impl SearchConfig {
    /// Checks that every tunable is in range.
    pub fn validate(&self) -> DiscFindResult<()> {
        if self.intervals == 0 {
            return Err(DiscFindError::InvalidConfig("intervals must be at least 1"));
        }
        if self.iterations == 0 {
            return Err(DiscFindError::InvalidConfig("iterations must be at least 1"));
        }
        if self.performance_criterion == 0 {
            return Err(DiscFindError::InvalidConfig(
                "performance_criterion must be at least 1",
            ));
        }
        if self.min_matrix_side == 0 {
            return Err(DiscFindError::InvalidConfig("min_matrix_side must be at least 1"));
        }
        if !(self.min_diameter_px.is_finite() && self.min_diameter_px > 0.0) {
            return Err(DiscFindError::InvalidConfig("min_diameter_px must be positive"));
        }
        if !(self.kernel_ratio.is_finite() && self.kernel_ratio > 0.0) {
            return Err(DiscFindError::InvalidConfig("kernel_ratio must be positive"));
        }
        Ok(())
    }

    /// Size selector matching this configuration's budget and profile.
    pub fn size_selector(&self) -> SizeSelector {
        SizeSelector {
            performance_criterion: self.performance_criterion,
            min_matrix_side: self.min_matrix_side,
            footprint_ratio: self.profile.footprint_ratio(),
        }
    }

    /// Initial `[min, max]` relative diameter interval for an input of `size`.
    ///
    /// The lower bound is clamped to the upper bound for inputs too small to
    /// hold a minimum-diameter disc.
    pub fn diameter_bounds(&self, size: Size) -> (f32, f32) {
        let max = self.profile.max_relative_diameter();
        let min = self.min_diameter_px / size.min_side().max(1) as f32;
        (min.min(max), max)
    }
}

/// Final search result in full-resolution pixel units.
///
/// Pixel `i` is centered on coordinate `i`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchResult {
    pub center_x: f32,
    pub center_y: f32,
    /// Estimated disc diameter in pixels.
    pub diameter: f32,
    /// Diameter relative to the shorter side of the input.
    pub relative_diameter: f32,
    /// Convolution response of the winning candidate.
    pub response: i32,
}
