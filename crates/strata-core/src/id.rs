//! Context identity.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`ContextId`] allocation.
static CONTEXT_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a memory context.
///
/// Every tensor descriptor records the id of the context that carved it,
/// so a descriptor presented to a different context is rejected instead
/// of silently aliasing unrelated memory. Ids are never reused within a
/// process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    /// Allocate a fresh, unique context id. Thread-safe.
    pub fn next() -> Self {
        Self(CONTEXT_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Reconstruct an id from its raw value (e.g. one that crossed the
    /// C boundary). The result is only meaningful if `raw` came from
    /// [`ContextId::raw`].
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}
