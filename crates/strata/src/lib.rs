//! Strata: an arena-backed tensor runtime with dtype-polymorphic dispatch
//! and cached FFT plans.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Strata sub-crates. For most Rust users, adding `strata` as a single
//! dependency is sufficient; hosts in other languages link `strata-ffi`.
//!
//! # Quick start
//!
//! ```rust
//! use strata::prelude::*;
//!
//! # fn main() -> Result<(), OpError> {
//! let mut rt = Runtime::with_capacity(1 << 20, 1 << 16)?;
//!
//! let x = rt.arange(4, DType::Float64)?;
//! let y = rt.add(&x, &x)?;
//! assert_eq!(rt.data::<f64>(&y)?, &[0.0, 2.0, 4.0, 6.0]);
//!
//! // A complex scalar promotes the real tensor.
//! let z = rt.mul(&y, Complex::new(0.0, 1.0))?;
//! assert_eq!(z.dtype(), DType::Complex128);
//!
//! let spectrum = rt.fft(&z, None)?;
//! let back = rt.ifft(&spectrum, None)?;
//! assert_eq!(back.dims(), &[4]);
//!
//! // Clearing recycles both regions; old descriptors are rejected.
//! rt.clear()?;
//! assert!(rt.data::<f64>(&y).is_err());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strata-core` | Dtypes, shapes, scalars, context ids |
//! | [`arena`] | `strata-arena` | Regions, frames, tensor descriptors, the context |
//! | [`ops`] | `strata-ops` | Kernel table, runtime dispatch, FFT plans, host interop |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Dtypes, shapes and scalars (`strata-core`).
pub use strata_core as types;

/// Arena regions and tensor descriptors (`strata-arena`).
///
/// [`arena::Context`] owns the two bump regions; [`arena::Tensor`] is the
/// plain-data descriptor every operation accepts and returns.
pub use strata_arena as arena;

/// Operation dispatch and FFT (`strata-ops`).
///
/// [`ops::Runtime`] pairs a context with the kernel table and plan cache.
pub use strata_ops as ops;

/// Common imports for typical Strata usage.
///
/// ```rust
/// use strata::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use strata_core::{DType, Element, Scalar, Shape, MAX_DIMS};

    // Arena
    pub use strata_arena::{ArenaConfig, ArenaUsage, Tensor};

    // Runtime and operations
    pub use strata_ops::{BinaryOp, FftKind, ReduceOp, Runtime, RuntimeConfig, UnaryOp};

    // Errors
    pub use strata_arena::ArenaError;
    pub use strata_core::ShapeError;
    pub use strata_ops::OpError;

    // Complex element type
    pub use num_complex::Complex;
}
