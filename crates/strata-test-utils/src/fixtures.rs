//! Reusable runtime fixtures.
//!
//! - [`runtime`]: a small single-threaded runtime (1 MiB main, 256 KiB scratch).
//! - [`runtime_with`]: explicit region capacities.
//! - [`threaded_runtime`]: FFT lanes split across worker threads.
//! - [`filled`]: a tensor initialised from a host slice.

use num_complex::Complex;
use strata_arena::{ArenaConfig, Tensor};
use strata_core::Element;
use strata_ops::{Runtime, RuntimeConfig};

/// Default main-region size for test runtimes.
pub const TEST_MAIN_BYTES: usize = 1 << 20;

/// Default scratch-region size for test runtimes.
pub const TEST_SCRATCH_BYTES: usize = 1 << 18;

/// A single-threaded runtime with test-sized regions.
pub fn runtime() -> Runtime {
    runtime_with(TEST_MAIN_BYTES, TEST_SCRATCH_BYTES)
}

/// A runtime with explicit region capacities.
pub fn runtime_with(main_bytes: usize, scratch_bytes: usize) -> Runtime {
    Runtime::with_capacity(main_bytes, scratch_bytes).expect("test runtime")
}

/// A runtime whose transforms use `workers` threads.
pub fn threaded_runtime(workers: usize, main_bytes: usize, scratch_bytes: usize) -> Runtime {
    let config = RuntimeConfig {
        fft_workers: Some(workers),
        ..RuntimeConfig::new(ArenaConfig::new(main_bytes, scratch_bytes))
    };
    Runtime::new(config).expect("threaded test runtime")
}

/// Allocate a tensor of `dims` and copy `values` into it.
pub fn filled<T: Element>(rt: &mut Runtime, dims: &[usize], values: &[T]) -> Tensor {
    let t = rt.tensor(T::DTYPE, dims, "fixture").expect("fixture tensor");
    rt.data_mut::<T>(&t)
        .expect("fixture data")
        .copy_from_slice(values);
    t
}

/// A deterministic non-trivial complex signal of length `n`.
pub fn signal(n: usize) -> Vec<Complex<f64>> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            Complex::new((0.37 * t).sin() + 0.5, (0.11 * t).cos() - 0.25)
        })
        .collect()
}
