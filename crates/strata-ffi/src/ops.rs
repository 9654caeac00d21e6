//! Operation entry points.
//!
//! Operation codes follow the declaration order of the Rust enums:
//!
//! | family | codes |
//! |--------|-------|
//! | binary | add 0, sub 1, mul 2, div 3, pow 4 |
//! | unary  | sin 0, cos 1, tan 2, sinc 3, ln 4, log2 5, log10 6, exp 7, sqrt 8, abs 9, angle 10, conj 11, real 12, imag 13 |
//! | reduce | sum 0, mean 1, max 2, min 3 |
//! | fft    | fft 0, ifft 1, rfft 2, irfft 3 |
//!
//! An unknown code is `InvalidArgument`. Every `out` argument may be
//! null, in which case the result is allocated; otherwise it must match
//! the result dtype and shape and receives the result in place.

use num_complex::Complex;
use strata_core::Scalar;
use strata_ops::{BinaryOp, FftKind, ReduceOp, UnaryOp};

use crate::context::registry;
use crate::status::StrataStatus;
use crate::tensor::{dtype_arg, optional_tensor_arg, tensor_arg, write_tensor};
use crate::types::StrataTensor;

fn op_arg<T>(decoded: Option<T>) -> Result<T, StrataStatus> {
    decoded.ok_or(StrataStatus::InvalidArgument)
}

/// `lhs op rhs` for two tensors, broadcasting slot by slot.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_binary(
    handle: u64,
    op: i32,
    lhs: *const StrataTensor,
    rhs: *const StrataTensor,
    out: *const StrataTensor,
    result_out: *mut StrataTensor,
) -> i32 {
    ffi_guard!({
        if result_out.is_null() {
            return StrataStatus::InvalidArgument as i32;
        }
        let op = ffi_try!(op_arg(BinaryOp::from_code(op)));
        let lhs = ffi_try!(tensor_arg(lhs));
        let rhs = ffi_try!(tensor_arg(rhs));
        let out = ffi_try!(optional_tensor_arg(out));
        let mut registry = ffi_lock!(registry());
        let runtime = ffi_try!(registry.runtime(handle));
        let t = ffi_try!(runtime.binary(op, &lhs, &rhs, out.as_ref()));
        write_tensor(result_out, &t);
        StrataStatus::Ok as i32
    })
}

/// `lhs op (re + i im)`.
///
/// With `complex == 0` the scalar is real and `im` is ignored; a real
/// tensor keeps its dtype. A complex scalar promotes a real tensor to the
/// complex dtype of the same precision.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_binary_scalar(
    handle: u64,
    op: i32,
    lhs: *const StrataTensor,
    re: f64,
    im: f64,
    complex: u8,
    out: *const StrataTensor,
    result_out: *mut StrataTensor,
) -> i32 {
    ffi_guard!({
        if result_out.is_null() {
            return StrataStatus::InvalidArgument as i32;
        }
        let op = ffi_try!(op_arg(BinaryOp::from_code(op)));
        let lhs = ffi_try!(tensor_arg(lhs));
        let out = ffi_try!(optional_tensor_arg(out));
        let scalar = if complex != 0 {
            Scalar::Complex(Complex::new(re, im))
        } else {
            Scalar::Real(re)
        };
        let mut registry = ffi_lock!(registry());
        let runtime = ffi_try!(registry.runtime(handle));
        let t = ffi_try!(runtime.binary(op, &lhs, scalar, out.as_ref()));
        write_tensor(result_out, &t);
        StrataStatus::Ok as i32
    })
}

/// Elementwise `op(x)`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_unary(
    handle: u64,
    op: i32,
    x: *const StrataTensor,
    out: *const StrataTensor,
    result_out: *mut StrataTensor,
) -> i32 {
    ffi_guard!({
        if result_out.is_null() {
            return StrataStatus::InvalidArgument as i32;
        }
        let op = ffi_try!(op_arg(UnaryOp::from_code(op)));
        let x = ffi_try!(tensor_arg(x));
        let out = ffi_try!(optional_tensor_arg(out));
        let mut registry = ffi_lock!(registry());
        let runtime = ffi_try!(registry.runtime(handle));
        let t = ffi_try!(runtime.unary(op, &x, out.as_ref()));
        write_tensor(result_out, &t);
        StrataStatus::Ok as i32
    })
}

/// Reduce `x` along `axis` (negative counts from the end).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_reduce(
    handle: u64,
    op: i32,
    x: *const StrataTensor,
    axis: isize,
    keep_dims: u8,
    out: *const StrataTensor,
    result_out: *mut StrataTensor,
) -> i32 {
    ffi_guard!({
        if result_out.is_null() {
            return StrataStatus::InvalidArgument as i32;
        }
        let op = ffi_try!(op_arg(ReduceOp::from_code(op)));
        let x = ffi_try!(tensor_arg(x));
        let out = ffi_try!(optional_tensor_arg(out));
        let mut registry = ffi_lock!(registry());
        let runtime = ffi_try!(registry.runtime(handle));
        let t = ffi_try!(runtime.reduce(op, &x, axis, keep_dims != 0, out.as_ref()));
        write_tensor(result_out, &t);
        StrataStatus::Ok as i32
    })
}

/// Build and cache the FFT plan for length `n` at the precision of
/// `dtype`.
///
/// `factors_out` may be null; otherwise it receives up to `factors_cap`
/// radices and `n_factors_out` the full count.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_plan_fft(
    handle: u64,
    n: usize,
    dtype: i32,
    factors_out: *mut usize,
    factors_cap: usize,
    n_factors_out: *mut usize,
) -> i32 {
    ffi_guard!({
        let dtype = ffi_try!(dtype_arg(dtype));
        let mut registry = ffi_lock!(registry());
        let runtime = ffi_try!(registry.runtime(handle));
        let plan = ffi_try!(runtime.plan_fft(n, dtype));
        let factors = plan.factors();
        if !n_factors_out.is_null() {
            // SAFETY: n_factors_out is non-null and valid for writes.
            unsafe { *n_factors_out = factors.len() };
        }
        if !factors_out.is_null() {
            let count = factors.len().min(factors_cap);
            // SAFETY: factors_out holds factors_cap writable entries per
            // caller contract and count <= factors_cap.
            unsafe { std::ptr::copy_nonoverlapping(factors.as_ptr(), factors_out, count) };
            if count < factors.len() {
                return StrataStatus::BufferTooSmall as i32;
            }
        }
        StrataStatus::Ok as i32
    })
}

/// One transform of `x` along `axis`.
///
/// `n == 0` uses the axis length (`2 (m - 1)` for irfft); any other `n`
/// pads the axis with zeros or crops it.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_fft(
    handle: u64,
    kind: i32,
    x: *const StrataTensor,
    n: usize,
    axis: isize,
    out: *const StrataTensor,
    result_out: *mut StrataTensor,
) -> i32 {
    ffi_guard!({
        if result_out.is_null() {
            return StrataStatus::InvalidArgument as i32;
        }
        let kind = ffi_try!(op_arg(FftKind::from_code(kind)));
        let x = ffi_try!(tensor_arg(x));
        let out = ffi_try!(optional_tensor_arg(out));
        let n = (n > 0).then_some(n);
        let mut registry = ffi_lock!(registry());
        let runtime = ffi_try!(registry.runtime(handle));
        let t = ffi_try!(runtime.fft_with(kind, &x, n, axis, out.as_ref()));
        write_tensor(result_out, &t);
        StrataStatus::Ok as i32
    })
}

/// Bin frequencies for an `n`-point transform with sample spacing `d`.
///
/// With `real != 0` only the `n/2 + 1` non-negative bins are produced.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_fftfreq(
    handle: u64,
    n: usize,
    d: f64,
    dtype: i32,
    real: u8,
    result_out: *mut StrataTensor,
) -> i32 {
    ffi_guard!({
        if result_out.is_null() {
            return StrataStatus::InvalidArgument as i32;
        }
        let dtype = ffi_try!(dtype_arg(dtype));
        let mut registry = ffi_lock!(registry());
        let runtime = ffi_try!(registry.runtime(handle));
        let t = if real != 0 {
            ffi_try!(runtime.rfftfreq(n, d, dtype))
        } else {
            ffi_try!(runtime.fftfreq(n, d, dtype))
        };
        write_tensor(result_out, &t);
        StrataStatus::Ok as i32
    })
}
