//! Operation dispatch for the Strata tensor runtime.
//!
//! A [`Runtime`] owns one [`Context`](strata_arena::Context) and resolves
//! every operation against a [`KernelTable`] built once at startup.
//!
//! # Architecture
//!
//! ```text
//! Runtime
//! ├── Context        (main + scratch regions, generation)
//! ├── KernelTable    (op × dtype → fn pointer, exhaustive matches)
//! │   ├── binary     add sub mul div pow, broadcasting
//! │   ├── unary      sin cos tan sinc ln log2 log10 exp sqrt abs angle conj real imag
//! │   ├── reduce     sum mean max min along one axis
//! │   ├── cast       every dtype pair
//! │   └── fft        fft ifft rfft irfft
//! ├── PlanCache      ((size, dtype) → FftPlan, generation-tagged, bounded)
//! └── ChaCha8Rng     (seeded, for randn)
//! ```
//!
//! Operations validate descriptors, dtypes and any caller-supplied
//! output before they allocate, then run inside a
//! [`Frame`](strata_arena::Frame) so a failure part-way through leaves
//! the context unchanged.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod fft;
pub mod interop;
pub mod kernels;
pub mod layout;
pub mod op;
pub mod registry;
pub mod runtime;

pub use config::RuntimeConfig;
pub use error::OpError;
pub use fft::{FftJob, FftPlan, PlanCache};
pub use interop::{dtype_from_typestr, typestr, HostView};
pub use op::{BinaryOp, FftKind, ReduceOp, UnaryOp};
pub use registry::KernelTable;
pub use runtime::{Operand, Runtime};
