//! Core types and traits for the Strata tensor runtime.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by the rest of the workspace: element types
//! ([`DType`], [`Element`]), the fixed four-slot [`Shape`], scalar
//! operands, context identifiers, and shape validation errors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dtype;
pub mod error;
pub mod id;
pub mod scalar;
pub mod shape;

pub use dtype::{DType, Element, RealElement};
pub use error::ShapeError;
pub use id::ContextId;
pub use scalar::Scalar;
pub use shape::{Shape, MAX_DIMS};

