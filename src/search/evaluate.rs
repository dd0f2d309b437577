//! Evaluation of a single candidate diameter.

use std::borrow::Cow;

use crate::candidate::{find_extrema, Extremum};
use crate::kernel::convolve;
use crate::matrix::resample::scale_down;
use crate::matrix::Matrix2D;
use crate::search::select::SizeSelection;
use crate::search::SearchConfig;
use crate::trace::{trace_event, trace_span};
use crate::util::{DiscFindError, DiscFindResult};
use crate::wavelet::profile_kernel;

/// Convolution response of one candidate diameter at its working resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseMap {
    pub selection: SizeSelection,
    pub response: Matrix2D<i32>,
}

/// Computes the working-resolution response for `relative_diameter`.
///
/// Returns `Ok(None)` when the size selector skips the diameter.
pub fn response_map(
    matrix: &Matrix2D<i32>,
    relative_diameter: f32,
    cfg: &SearchConfig,
) -> DiscFindResult<Option<ResponseMap>> {
    if matrix.is_null() {
        return Err(DiscFindError::NullMatrix {
            context: "response_map input",
        });
    }
    let selection = match cfg.size_selector().select(matrix.size(), relative_diameter) {
        Some(selection) => selection,
        None => return Ok(None),
    };

    let working: Cow<'_, Matrix2D<i32>> = if selection.working_size == matrix.size() {
        Cow::Borrowed(matrix)
    } else {
        Cow::Owned(scale_down(matrix, selection.working_size)?)
    };
    let kernel = profile_kernel(cfg.profile, selection.kernel_radius, cfg.kernel_ratio)?;
    let response = convolve(&working, &kernel, cfg.outside_value, None)?;

    Ok(Some(ResponseMap {
        selection,
        response,
    }))
}

/// Evaluates one candidate diameter and returns its extremum record.
///
/// Skipped diameters yield [`Extremum::invalid`].
pub fn evaluate_candidate(
    matrix: &Matrix2D<i32>,
    relative_diameter: f32,
    cfg: &SearchConfig,
) -> DiscFindResult<Extremum> {
    let _span = trace_span!("evaluate_candidate", diameter = relative_diameter).entered();

    let map = match response_map(matrix, relative_diameter, cfg)? {
        Some(map) => map,
        None => {
            trace_event!("candidate_skipped", diameter = relative_diameter);
            return Ok(Extremum::invalid());
        }
    };
    let extremum = find_extrema(&map.response, relative_diameter).ok_or(
        DiscFindError::NullMatrix {
            context: "candidate response",
        },
    )?;

    trace_event!(
        "candidate_evaluated",
        diameter = relative_diameter,
        kernel_radius = map.selection.kernel_radius,
        working_width = map.selection.working_size.width,
        working_height = map.selection.working_size.height,
        max_value = extremum.max_value,
    );
    Ok(extremum)
}
