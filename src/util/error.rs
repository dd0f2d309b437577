//! Error types for discfind.

use thiserror::Error;

/// Result alias for discfind operations.
pub type Result<T> = std::result::Result<T, DiscFindError>;

/// Errors that can occur when running discfind algorithms.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DiscFindError {
    /// A matrix dimension is zero.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The backing buffer does not match `width * height`.
    #[error("buffer length mismatch: needed {needed}, got {got}")]
    BufferMismatch { needed: usize, got: usize },
    /// The operation requires an allocated matrix.
    #[error("matrix is null: {context}")]
    NullMatrix { context: &'static str },
    /// Downscaling was asked to produce a larger matrix.
    #[error("cannot scale {in_width}x{in_height} down to {out_width}x{out_height}")]
    OutputLargerThanInput {
        in_width: usize,
        in_height: usize,
        out_width: usize,
        out_height: usize,
    },
    /// The matrix is below the minimum side accepted by the search.
    #[error("matrix {width}x{height} is smaller than the minimum side {min_side}")]
    MatrixTooSmall {
        width: usize,
        height: usize,
        min_side: usize,
    },
    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// A search is already running on this engine.
    #[error("search already active")]
    SearchActive,
    /// An event arrived that the current search state does not accept.
    #[error("unexpected search event: {0}")]
    UnexpectedEvent(&'static str),
    /// Every candidate diameter in a batch was skipped.
    #[error("no valid candidates in iteration {iteration}")]
    NoValidCandidates { iteration: usize },
    /// The worker pool could not be built or a worker panicked.
    #[error("worker pool failure: {reason}")]
    WorkerPool { reason: String },
    /// Image decoding or encoding failed.
    #[error("image i/o failed: {reason}")]
    ImageIo { reason: String },
}
