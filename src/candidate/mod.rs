//! Per-diameter extremum records and best-candidate selection.

pub(crate) mod extremum;

pub use extremum::{find_extrema, Extremum, NormPoint};
