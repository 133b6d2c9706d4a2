//! Configuration error types.

use std::error::Error;
use std::fmt;

/// Errors detected while validating grid dimensions or physics constants.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// One of the grid dimensions is zero.
    ///
    /// `n` must be at least 1 because the mesh width is `domain_length / n`.
    InvalidDimensions {
        /// Requested row parameter.
        n: usize,
        /// Requested column parameter.
        m: usize,
    },
    /// The grid (or the file holding two grids) does not fit in `usize`.
    SizeOverflow {
        /// Requested row parameter.
        n: usize,
        /// Requested column parameter.
        m: usize,
    },
    /// A physics constant is NaN or infinite.
    NonFinite {
        /// Name of the offending constant.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },
    /// A physics constant is finite but outside its admissible range.
    OutOfRange {
        /// Name of the offending constant.
        name: &'static str,
        /// The invalid value.
        value: f64,
        /// Description of the admissible range.
        expected: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { n, m } => {
                write!(f, "grid dimensions must be at least 1x1, got {n}x{m}")
            }
            Self::SizeOverflow { n, m } => {
                write!(f, "grid of {n}x{m} intervals exceeds addressable memory")
            }
            Self::NonFinite { name, value } => {
                write!(f, "{name} must be finite, got {value}")
            }
            Self::OutOfRange {
                name,
                value,
                expected,
            } => {
                write!(f, "{name} must be {expected}, got {value}")
            }
        }
    }
}

impl Error for ConfigError {}
