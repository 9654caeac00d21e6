//! C FFI bindings for the Strata tensor runtime.
//!
//! Exposes a C-compatible API for language bindings. This is the only
//! crate in the workspace that contains `unsafe` code, all of it raw
//! pointer access to caller-provided arguments.
//!
//! # Conventions
//!
//! ```text
//! strata_ctx_init ──► u64 handle ──► strata_tensor_* / strata_binary / strata_fft ...
//!                                          │
//!                                          └─► StrataTensor records (plain data)
//! ```
//!
//! - Every function returns an `i32` [`StrataStatus`]; results are written
//!   through out-pointers, which are left untouched on failure.
//! - At most one context is live per process. A second init fails with
//!   [`StrataStatus::AlreadyInitialized`]; after teardown a new context
//!   may be created.
//! - Panics never cross the boundary; they are reported as
//!   [`StrataStatus::Panicked`].
//! - The C header is generated by `cbindgen` at build time into
//!   `include/strata.h`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run an FFI body, converting a panic into [`StrataStatus::Panicked`].
macro_rules! ffi_guard {
    ($body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| -> i32 { $body })) {
            Ok(status) => status,
            Err(_) => $crate::status::StrataStatus::Panicked as i32,
        }
    };
}

/// Lock a mutex, returning `InternalError` from the enclosing body if it
/// was poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::StrataStatus::InternalError as i32,
        }
    };
}

/// Unwrap a result, returning its status from the enclosing body on error.
macro_rules! ffi_try {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => return $crate::status::StrataStatus::from(e) as i32,
        }
    };
}

pub mod context;
mod handle;
pub mod ops;
pub mod status;
pub mod tensor;
pub mod types;

pub use status::StrataStatus;
pub use types::{StrataConfig, StrataTensor, StrataUsage, STRATA_LABEL_BYTES, STRATA_MAX_DIMS};

#[cfg(test)]
mod tests {
    use super::*;

    fn panicking() -> i32 {
        ffi_guard!({
            if STRATA_MAX_DIMS == 4 {
                panic!("boom");
            }
            StrataStatus::Ok as i32
        })
    }

    fn failing() -> i32 {
        ffi_guard!({
            let value: i32 = ffi_try!(Err::<i32, _>(StrataStatus::OutOfArena));
            value
        })
    }

    #[test]
    fn panic_is_reported_not_propagated() {
        assert_eq!(panicking(), StrataStatus::Panicked as i32);
    }

    #[test]
    fn error_returns_its_status() {
        assert_eq!(failing(), StrataStatus::OutOfArena as i32);
    }

    #[test]
    fn poisoned_lock_is_internal_error() {
        let mutex = std::sync::Mutex::new(0);
        let _ = std::panic::catch_unwind(|| {
            let _guard = mutex.lock().unwrap();
            panic!("poison");
        });
        let status = ffi_guard!({
            let _guard = ffi_lock!(mutex);
            StrataStatus::Ok as i32
        });
        assert_eq!(status, StrataStatus::InternalError as i32);
    }
}
