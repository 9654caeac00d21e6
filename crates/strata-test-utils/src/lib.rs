//! Test utilities for Strata development.
//!
//! Provides runtime fixtures sized for tests, helpers that fill tensors
//! from host slices, and tolerance-based assertions for floating-point
//! and complex results.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{filled, runtime, runtime_with, signal, threaded_runtime};

use num_complex::Complex;

/// Largest elementwise distance between two real sequences.
pub fn max_abs_diff(actual: &[f64], expected: &[f64]) -> f64 {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    actual
        .iter()
        .zip(expected)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}

/// Assert two real sequences agree within `tol`.
#[track_caller]
pub fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
    let diff = max_abs_diff(actual, expected);
    assert!(
        diff <= tol,
        "max difference {diff} exceeds {tol}\n  actual:   {actual:?}\n  expected: {expected:?}"
    );
}

/// Assert two complex sequences agree within `tol` (by modulus).
#[track_caller]
pub fn assert_close_complex(actual: &[Complex<f64>], expected: &[Complex<f64>], tol: f64) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, b)) in actual.iter().zip(expected).enumerate() {
        let diff = (a - b).norm();
        assert!(diff <= tol, "element {i}: {a} vs {b} (difference {diff} exceeds {tol})");
    }
}
