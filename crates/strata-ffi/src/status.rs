//! C-compatible status codes.
//!
//! [`StrataStatus`] is a `repr(i32)` enum covering every error condition
//! the runtime can report. Conversions from the Rust error types
//! (`OpError`, `ArenaError`, `ShapeError`) are provided.

use strata_arena::ArenaError;
use strata_core::ShapeError;
use strata_ops::OpError;

/// C-compatible status code returned by all FFI functions.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrataStatus {
    /// Success.
    Ok = 0,
    /// Context handle is invalid or no context is live.
    InvalidHandle = -1,
    /// A context is already live in this process.
    AlreadyInitialized = -2,
    /// A region lacks capacity for the requested allocation.
    OutOfArena = -3,
    /// Tensor rank is outside `1..=4`.
    InvalidRank = -4,
    /// A dimension is zero or the element count overflows.
    InvalidShape = -5,
    /// Unknown dtype code or host type.
    UnsupportedDtype = -6,
    /// No kernel is registered for the operation and dtype.
    UnsupportedOperation = -7,
    /// Operand or output dtypes are incompatible.
    DtypeMismatch = -8,
    /// Operand or output shapes are incompatible.
    ShapeMismatch = -9,
    /// Tensor record is from an earlier generation or another context.
    StaleTensor = -10,
    /// The context has been torn down.
    TornDown = -11,
    /// An argument is null, out of range, or otherwise invalid.
    InvalidArgument = -12,
    /// Caller-provided buffer is too small.
    BufferTooSmall = -13,
    /// An output record overlaps an input the kernel reads.
    AliasedTensors = -14,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -20,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&ShapeError> for StrataStatus {
    fn from(e: &ShapeError) -> Self {
        match e {
            ShapeError::InvalidRank { .. } => StrataStatus::InvalidRank,
            ShapeError::InvalidShape { .. } => StrataStatus::InvalidShape,
            ShapeError::AxisOutOfRange { .. } => StrataStatus::InvalidArgument,
        }
    }
}

impl From<&ArenaError> for StrataStatus {
    fn from(e: &ArenaError) -> Self {
        match e {
            ArenaError::OutOfArena { .. } => StrataStatus::OutOfArena,
            ArenaError::TornDown => StrataStatus::TornDown,
            ArenaError::StaleTensor { .. } | ArenaError::ForeignTensor { .. } => {
                StrataStatus::StaleTensor
            }
            ArenaError::DtypeMismatch { .. } => StrataStatus::DtypeMismatch,
            ArenaError::InvalidSpan { .. } | ArenaError::InvalidConfig { .. } => {
                StrataStatus::InvalidArgument
            }
            ArenaError::Aliased { .. } => StrataStatus::AliasedTensors,
            ArenaError::Shape(e) => StrataStatus::from(e),
        }
    }
}

impl From<&OpError> for StrataStatus {
    fn from(e: &OpError) -> Self {
        match e {
            OpError::Arena(e) => StrataStatus::from(e),
            OpError::DtypeMismatch { .. } => StrataStatus::DtypeMismatch,
            OpError::ShapeMismatch { .. } => StrataStatus::ShapeMismatch,
            OpError::UnsupportedOperation { .. } => StrataStatus::UnsupportedOperation,
            OpError::UnsupportedDtype { .. } => StrataStatus::UnsupportedDtype,
            OpError::InvalidArgument { .. } => StrataStatus::InvalidArgument,
        }
    }
}

impl From<ArenaError> for StrataStatus {
    fn from(e: ArenaError) -> Self {
        StrataStatus::from(&e)
    }
}

impl From<OpError> for StrataStatus {
    fn from(e: OpError) -> Self {
        StrataStatus::from(&e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_arena::{RegionKind, Span};
    use strata_core::{ContextId, DType, Shape};

    #[test]
    fn status_code_values_are_stable() {
        assert_eq!(StrataStatus::Ok as i32, 0);
        assert_eq!(StrataStatus::InvalidHandle as i32, -1);
        assert_eq!(StrataStatus::AlreadyInitialized as i32, -2);
        assert_eq!(StrataStatus::OutOfArena as i32, -3);
        assert_eq!(StrataStatus::InvalidRank as i32, -4);
        assert_eq!(StrataStatus::InvalidShape as i32, -5);
        assert_eq!(StrataStatus::UnsupportedDtype as i32, -6);
        assert_eq!(StrataStatus::UnsupportedOperation as i32, -7);
        assert_eq!(StrataStatus::DtypeMismatch as i32, -8);
        assert_eq!(StrataStatus::ShapeMismatch as i32, -9);
        assert_eq!(StrataStatus::StaleTensor as i32, -10);
        assert_eq!(StrataStatus::TornDown as i32, -11);
        assert_eq!(StrataStatus::InvalidArgument as i32, -12);
        assert_eq!(StrataStatus::BufferTooSmall as i32, -13);
        assert_eq!(StrataStatus::AliasedTensors as i32, -14);
        assert_eq!(StrataStatus::InternalError as i32, -20);
        assert_eq!(StrataStatus::Panicked as i32, -128);
    }

    #[test]
    fn shape_error_to_status() {
        assert_eq!(
            StrataStatus::from(&ShapeError::InvalidRank { rank: 5 }),
            StrataStatus::InvalidRank
        );
        assert_eq!(
            StrataStatus::from(&ShapeError::InvalidShape { position: 0, dim: 0 }),
            StrataStatus::InvalidShape
        );
        assert_eq!(
            StrataStatus::from(&ShapeError::AxisOutOfRange { axis: 3, rank: 1 }),
            StrataStatus::InvalidArgument
        );
    }

    #[test]
    fn arena_error_to_status() {
        assert_eq!(
            StrataStatus::from(&ArenaError::OutOfArena {
                region: RegionKind::Scratch,
                requested: 64,
                remaining: 0,
            }),
            StrataStatus::OutOfArena
        );
        assert_eq!(
            StrataStatus::from(&ArenaError::TornDown),
            StrataStatus::TornDown
        );
        assert_eq!(
            StrataStatus::from(&ArenaError::ForeignTensor {
                tensor_context: ContextId::from_raw(1),
                context: ContextId::from_raw(2),
            }),
            StrataStatus::StaleTensor
        );
        assert_eq!(
            StrataStatus::from(&ArenaError::Aliased {
                read: Span::new(0, 16),
                write: Span::new(0, 16),
            }),
            StrataStatus::AliasedTensors
        );
    }

    #[test]
    fn op_error_to_status() {
        let shape = Shape::new(&[2]).unwrap();
        assert_eq!(
            StrataStatus::from(&OpError::ShapeMismatch {
                expected: shape,
                found: Shape::unit(),
            }),
            StrataStatus::ShapeMismatch
        );
        assert_eq!(
            StrataStatus::from(&OpError::UnsupportedOperation {
                op: "max",
                dtype: DType::Complex128,
            }),
            StrataStatus::UnsupportedOperation
        );
        assert_eq!(
            StrataStatus::from(OpError::UnsupportedDtype { name: "<i4".into() }),
            StrataStatus::UnsupportedDtype
        );
        assert_eq!(
            StrataStatus::from(&OpError::Arena(ArenaError::Shape(ShapeError::InvalidRank {
                rank: 0
            }))),
            StrataStatus::InvalidRank
        );
    }
}
