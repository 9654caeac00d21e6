//! Context lifecycle: init, default bootstrap, clear, teardown, usage.
//!
//! The process holds at most one live runtime. Its handle stays valid
//! after teardown so that later calls report `TornDown`; the next init
//! drops the torn-down runtime and makes that old handle invalid.

use std::sync::{Mutex, Once};

use strata_arena::ArenaConfig;
use strata_ops::{Runtime, RuntimeConfig};
use tracing::{info, warn};

use crate::handle::HandleTable;
use crate::status::StrataStatus;
use crate::types::{StrataConfig, StrataUsage};

/// The process context slot.
pub(crate) struct Registry {
    runtimes: HandleTable<Runtime>,
    live: Option<u64>,
    retired: Option<u64>,
}

impl Registry {
    const fn new() -> Self {
        Self {
            runtimes: HandleTable::new(),
            live: None,
            retired: None,
        }
    }

    /// The runtime behind `handle`, live or torn down.
    pub(crate) fn runtime(&mut self, handle: u64) -> Result<&mut Runtime, StrataStatus> {
        self.runtimes
            .get_mut(handle)
            .ok_or(StrataStatus::InvalidHandle)
    }

    /// Build and register a runtime unless one is already live.
    fn install(&mut self, config: RuntimeConfig) -> Result<u64, StrataStatus> {
        if self.live.is_some() {
            return Err(StrataStatus::AlreadyInitialized);
        }
        let runtime = Runtime::new(config)?;
        if let Some(old) = self.retired.take() {
            self.runtimes.remove(old);
        }
        let handle = self.runtimes.insert(runtime);
        self.live = Some(handle);
        Ok(handle)
    }

    fn teardown(&mut self, handle: u64) -> Result<(), StrataStatus> {
        self.runtime(handle)?.teardown()?;
        self.live = None;
        self.retired = Some(handle);
        info!(handle, "context slot released");
        Ok(())
    }
}

static REGISTRY: Mutex<Registry> = Mutex::new(Registry::new());

static DEFAULT_NOTICE: Once = Once::new();

pub(crate) fn registry() -> &'static Mutex<Registry> {
    &REGISTRY
}

/// Create the process context with explicit region capacities.
///
/// Fails with `AlreadyInitialized` if a context is live; the existing
/// context is left untouched. Resizing is not supported: tear down and
/// init again.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_ctx_init(main_bytes: usize, scratch_bytes: usize, handle_out: *mut u64) -> i32 {
    ffi_guard!({
        if handle_out.is_null() {
            return StrataStatus::InvalidArgument as i32;
        }
        let config = RuntimeConfig::new(ArenaConfig::new(main_bytes, scratch_bytes));
        let handle = ffi_try!(ffi_lock!(REGISTRY).install(config));
        // SAFETY: handle_out is non-null and valid for writes per caller contract.
        unsafe { *handle_out = handle };
        StrataStatus::Ok as i32
    })
}

/// Create the process context from a full configuration record.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_ctx_init_config(config: *const StrataConfig, handle_out: *mut u64) -> i32 {
    ffi_guard!({
        if config.is_null() || handle_out.is_null() {
            return StrataStatus::InvalidArgument as i32;
        }
        // SAFETY: config is non-null and points to a valid StrataConfig.
        let config = RuntimeConfig::from(unsafe { &*config });
        let handle = ffi_try!(ffi_lock!(REGISTRY).install(config));
        // SAFETY: handle_out is non-null and valid for writes per caller contract.
        unsafe { *handle_out = handle };
        StrataStatus::Ok as i32
    })
}

/// Handle of the live context, bootstrapping one if none exists.
///
/// The bootstrap sizes each region at a tenth of system memory and logs
/// a one-time advisory; explicit sizing with [`strata_ctx_init`] is
/// preferred. A context created by an earlier explicit init is returned
/// as is.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_ctx_default(handle_out: *mut u64) -> i32 {
    ffi_guard!({
        if handle_out.is_null() {
            return StrataStatus::InvalidArgument as i32;
        }
        let mut registry = ffi_lock!(REGISTRY);
        let handle = match registry.live {
            Some(handle) => handle,
            None => {
                let arena = ArenaConfig::from_system_memory();
                DEFAULT_NOTICE.call_once(|| {
                    warn!(
                        main_bytes = arena.main_bytes,
                        scratch_bytes = arena.scratch_bytes,
                        "no context was initialised; sizing from system memory. \
                         Call strata_ctx_init to choose capacities explicitly"
                    );
                });
                ffi_try!(registry.install(RuntimeConfig::new(arena)))
            }
        };
        // SAFETY: handle_out is non-null and valid for writes per caller contract.
        unsafe { *handle_out = handle };
        StrataStatus::Ok as i32
    })
}

/// Handle of the live context, or `InvalidHandle` if there is none.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_ctx_current(handle_out: *mut u64) -> i32 {
    ffi_guard!({
        if handle_out.is_null() {
            return StrataStatus::InvalidArgument as i32;
        }
        let Some(handle) = ffi_lock!(REGISTRY).live else {
            return StrataStatus::InvalidHandle as i32;
        };
        // SAFETY: handle_out is non-null and valid for writes per caller contract.
        unsafe { *handle_out = handle };
        StrataStatus::Ok as i32
    })
}

/// Reset both regions. Every tensor record becomes stale.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_ctx_clear(handle: u64) -> i32 {
    ffi_guard!({
        let mut registry = ffi_lock!(REGISTRY);
        let runtime = ffi_try!(registry.runtime(handle));
        ffi_try!(runtime.clear());
        StrataStatus::Ok as i32
    })
}

/// Release the context's memory.
///
/// Later calls with `handle` return `TornDown`, including a second
/// teardown.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_ctx_teardown(handle: u64) -> i32 {
    ffi_guard!({
        ffi_try!(ffi_lock!(REGISTRY).teardown(handle));
        StrataStatus::Ok as i32
    })
}

/// Current region usage.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_ctx_usage(handle: u64, usage_out: *mut StrataUsage) -> i32 {
    ffi_guard!({
        if usage_out.is_null() {
            return StrataStatus::InvalidArgument as i32;
        }
        let mut registry = ffi_lock!(REGISTRY);
        let usage = StrataUsage::from(ffi_try!(registry.runtime(handle)).usage());
        // SAFETY: usage_out is non-null and valid for writes per caller contract.
        unsafe { *usage_out = usage };
        StrataStatus::Ok as i32
    })
}
