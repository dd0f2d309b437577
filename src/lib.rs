//! discfind locates a bright, roughly circular structure of unknown size on a
//! grayscale field.
//!
//! The input is correlated with a radially symmetric "French hat" wavelet at a
//! series of candidate diameters. Each candidate is evaluated at a working
//! resolution chosen to bound the convolution cost, candidates of one batch run
//! in parallel on a rayon pool, and the diameter interval is narrowed around
//! the strongest response for a fixed number of iterations.
//!
//! Image decoding lives behind the `image-io` feature; tracing spans and
//! events behind the `tracing` feature.

mod candidate;
pub mod kernel;
pub mod matrix;
pub mod search;
pub(crate) mod trace;
pub mod util;
pub mod wavelet;

pub use candidate::{find_extrema, Extremum, NormPoint};
pub use kernel::{convolve, Region};
pub use matrix::resample::scale_down;
pub use matrix::{Matrix2D, Size};
pub use search::{
    evaluate_candidate, response_map, ChannelObserver, NoopObserver, ResponseMap, SearchConfig,
    SearchEngine, SearchEvent, SearchHandle, SearchMachine, SearchObserver, SearchResult,
    SearchState, SizeSelection, SizeSelector, Step,
};
pub use util::{DiscFindError, DiscFindResult};
pub use wavelet::{profile_kernel, synthesize_kernel, Profile};

#[cfg(feature = "image-io")]
pub use matrix::io;
