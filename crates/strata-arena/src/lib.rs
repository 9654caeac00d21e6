//! Bump-allocated memory context and tensor descriptors for Strata.
//!
//! A [`Context`] owns two fixed-capacity regions carved by bump
//! allocation. Tensor data lives in the main region for the lifetime of
//! the context generation; the scratch region holds transient buffers
//! that only survive one operation.
//!
//! # Architecture
//!
//! ```text
//! Context (owned, one per runtime)
//! ├── Region "main"    (fixed Vec<u64>, bump cursor, 16-byte aligned spans)
//! ├── Region "scratch" (same allocator, rewound after every Frame)
//! ├── ContextId        (process-unique, stamped on every Tensor)
//! └── generation: u32  (bumped by clear/teardown, stamped on every Tensor)
//!
//! Frame<'ctx> (one per operation)
//! ├── marks both cursors on open
//! ├── always rewinds scratch on drop
//! └── rewinds main on drop unless committed
//! ```
//!
//! # Descriptor validity
//!
//! [`Tensor`] descriptors are plain `Copy` records. They are never
//! freed individually; instead every access goes through the context,
//! which rejects descriptors from another context ([`ArenaError::ForeignTensor`]),
//! from an earlier generation ([`ArenaError::StaleTensor`]) or after
//! teardown ([`ArenaError::TornDown`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod error;
pub mod frame;
pub mod region;
pub mod tensor;

// Public re-exports for the primary API surface.
pub use config::ArenaConfig;
pub use context::{ArenaUsage, Context};
pub use error::ArenaError;
pub use frame::{Frame, Io, Source};
pub use region::{Region, RegionKind};
pub use tensor::{Label, Span, Tensor, LABEL_CAPACITY};
