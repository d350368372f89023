//! Error type shared by the archive, objectives, and the memetic runner.
//!
//! Only malformed input is reported as an error. Search outcomes such as a
//! rejected archive insert or a budget that runs out mid-phase are regular
//! return values.

use thiserror::Error;

/// Errors raised when collaborator input violates a precondition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// A vector of indices is not a bijection of `0..len`.
    #[error("not a permutation of 0..{len}: {reason}")]
    NotAPermutation {
        /// Length of the rejected vector.
        len: usize,
        /// What broke the bijection.
        reason: String,
    },

    /// An objective vector does not match the archive's dimension.
    #[error("objective vector has {found} dimensions, expected {expected}")]
    DimensionMismatch {
        /// Dimension fixed at archive construction.
        expected: usize,
        /// Dimension of the offending vector.
        found: usize,
    },

    /// Objectives disagree on the permutation size.
    #[error("objective expects permutations of size {found}, expected {expected}")]
    SizeMismatch {
        /// Size of the first objective.
        expected: usize,
        /// Size of the offending objective.
        found: usize,
    },

    /// An objective returned NaN or an infinite value.
    #[error("objective vector contains a non-finite value")]
    NonFiniteObjective,

    /// Region masks are stored in a `u64`, so at most 64 objectives are supported.
    #[error("{0} objectives requested, between 1 and 64 are supported")]
    UnsupportedDimensions(usize),

    /// The runner was called without any objective.
    #[error("at least one objective is required")]
    NoObjectives,

    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An instance file could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SearchError>;
