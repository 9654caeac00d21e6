//! The reference compute engine.
//!
//! Kernels are plain functions over byte slices, monomorphised per
//! element type and stored as function pointers in the
//! [`KernelTable`](crate::registry::KernelTable). Each kernel casts its
//! slices to the element type it was instantiated for; the arena
//! guarantees the alignment that makes those casts valid.

use crate::fft::FftJob;
use crate::layout::{AxisLayout, BinaryLayout};

/// `out[i] = lhs[a] op rhs[b]` under a broadcast layout.
pub type BinaryKernel = fn(&BinaryLayout, &[u8], &[u8], &mut [u8]);

/// `out[i] = f(input[i])`.
pub type UnaryKernel = fn(&[u8], &mut [u8]);

/// Fold every lane of an axis layout into one output element.
pub type ReduceKernel = fn(&AxisLayout, &[u8], &mut [u8]);

/// Elementwise dtype conversion.
pub type CastKernel = fn(&[u8], &mut [u8]);

/// One transform over every lane: `(job, input, twiddles, work, out)`.
pub type FftKernel = fn(&FftJob<'_>, &[u8], &[u8], &mut [u8], &mut [u8]);

/// Run `$body` with `$t` bound to the Rust element type of `$dtype`.
macro_rules! with_element {
    ($dtype:expr, $t:ident => $body:expr) => {
        match $dtype {
            ::strata_core::DType::Float32 => {
                type $t = f32;
                $body
            }
            ::strata_core::DType::Float64 => {
                type $t = f64;
                $body
            }
            ::strata_core::DType::Complex64 => {
                type $t = ::num_complex::Complex<f32>;
                $body
            }
            ::strata_core::DType::Complex128 => {
                type $t = ::num_complex::Complex<f64>;
                $body
            }
        }
    };
}

pub(crate) use with_element;

pub(crate) mod binary;
pub(crate) mod cast;
pub(crate) mod fill;
pub(crate) mod math;
pub(crate) mod reduce;
pub(crate) mod unary;
