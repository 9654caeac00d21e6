//! Shape validation errors.

use std::error::Error;
use std::fmt;

/// Errors produced while validating tensor shapes and axes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShapeError {
    /// Requested rank is outside `1..=MAX_DIMS`.
    InvalidRank {
        /// The rank that was requested.
        rank: usize,
    },
    /// A dimension is zero, or the element count overflows `usize`.
    InvalidShape {
        /// Zero-based position of the offending dimension.
        position: usize,
        /// The offending dimension value.
        dim: usize,
    },
    /// A reduction or transform axis does not exist for this rank.
    AxisOutOfRange {
        /// The axis as given by the caller (may be negative).
        axis: isize,
        /// Rank of the tensor.
        rank: usize,
    },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRank { rank } => {
                write!(f, "invalid rank {rank}: expected 1 to 4 dimensions")
            }
            Self::InvalidShape { position, dim } => {
                write!(f, "invalid dimension {dim} at position {position}")
            }
            Self::AxisOutOfRange { axis, rank } => {
                write!(f, "axis {axis} is out of range for rank {rank}")
            }
        }
    }
}

impl Error for ShapeError {}
