//! Operation-level error types.

use std::error::Error;
use std::fmt;

use strata_arena::ArenaError;
use strata_core::{DType, Shape, ShapeError};

/// Errors returned by [`Runtime`](crate::Runtime) operations.
///
/// Every failure is synchronous and leaves both region offsets where
/// they were before the call.
#[derive(Clone, Debug, PartialEq)]
pub enum OpError {
    /// Allocation or descriptor validation failed.
    Arena(ArenaError),
    /// Operand or output dtype does not match what the operation needs.
    DtypeMismatch {
        /// The dtype the operation required.
        expected: DType,
        /// The dtype it was given.
        found: DType,
    },
    /// Operand shapes do not broadcast, or an output has the wrong shape.
    ShapeMismatch {
        /// The shape the operation required (or the left operand's shape).
        expected: Shape,
        /// The shape it was given (or the right operand's shape).
        found: Shape,
    },
    /// No kernel is registered for this operation and dtype.
    UnsupportedOperation {
        /// Operation name.
        op: &'static str,
        /// Operand dtype.
        dtype: DType,
    },
    /// A host dtype name or code that has no tensor dtype.
    UnsupportedDtype {
        /// The rejected name or code.
        name: String,
    },
    /// An argument is out of range or otherwise invalid.
    InvalidArgument {
        /// Human-readable reason.
        reason: String,
    },
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arena(e) => write!(f, "{e}"),
            Self::DtypeMismatch { expected, found } => {
                write!(f, "dtype mismatch: expected {expected}, found {found}")
            }
            Self::ShapeMismatch { expected, found } => {
                write!(f, "shape mismatch: expected {expected}, found {found}")
            }
            Self::UnsupportedOperation { op, dtype } => {
                write!(f, "operation '{op}' is not supported for {dtype}")
            }
            Self::UnsupportedDtype { name } => write!(f, "unsupported dtype '{name}'"),
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
        }
    }
}

impl Error for OpError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ArenaError> for OpError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

impl From<ShapeError> for OpError {
    fn from(e: ShapeError) -> Self {
        Self::Arena(ArenaError::Shape(e))
    }
}
