//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use strata_core::{ContextId, DType, ShapeError};

use crate::region::RegionKind;
use crate::tensor::Span;

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// A region has too little remaining capacity for an allocation.
    ///
    /// The region's cursor is left unchanged.
    OutOfArena {
        /// Which region was exhausted.
        region: RegionKind,
        /// Number of bytes requested (after alignment padding).
        requested: usize,
        /// Bytes left in the region before the request.
        remaining: usize,
    },
    /// The context has been torn down.
    TornDown,
    /// A descriptor from a generation that has since been cleared.
    StaleTensor {
        /// The generation recorded in the descriptor.
        tensor_generation: u32,
        /// The context's current generation.
        current: u32,
    },
    /// A descriptor carved by a different context.
    ForeignTensor {
        /// Context recorded in the descriptor.
        tensor_context: ContextId,
        /// Context it was presented to.
        context: ContextId,
    },
    /// A typed view was requested with the wrong element type.
    DtypeMismatch {
        /// The dtype the caller asked for.
        expected: DType,
        /// The descriptor's dtype.
        found: DType,
    },
    /// A span lies outside the allocated part of its region.
    InvalidSpan {
        /// The offending span.
        span: Span,
        /// Which region it was resolved against.
        region: RegionKind,
    },
    /// A read span overlaps the span being written in the same call.
    Aliased {
        /// The span requested for reading.
        read: Span,
        /// The span requested for writing.
        write: Span,
    },
    /// Configuration rejected at context creation.
    InvalidConfig {
        /// Human-readable reason.
        reason: String,
    },
    /// Descriptor shape validation failed.
    Shape(ShapeError),
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfArena {
                region,
                requested,
                remaining,
            } => write!(
                f,
                "{region} region exhausted: requested {requested} bytes, {remaining} bytes remaining"
            ),
            Self::TornDown => write!(f, "context has been torn down"),
            Self::StaleTensor {
                tensor_generation,
                current,
            } => write!(
                f,
                "stale tensor: generation {tensor_generation}, context is at generation {current}"
            ),
            Self::ForeignTensor {
                tensor_context,
                context,
            } => write!(f, "tensor belongs to {tensor_context}, not {context}"),
            Self::DtypeMismatch { expected, found } => {
                write!(f, "dtype mismatch: expected {expected}, found {found}")
            }
            Self::InvalidSpan { span, region } => {
                write!(f, "span {span} is outside the allocated {region} region")
            }
            Self::Aliased { read, write } => {
                write!(f, "read span {read} overlaps write span {write}")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
            Self::Shape(e) => write!(f, "{e}"),
        }
    }
}

impl Error for ArenaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Shape(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShapeError> for ArenaError {
    fn from(e: ShapeError) -> Self {
        Self::Shape(e)
    }
}
