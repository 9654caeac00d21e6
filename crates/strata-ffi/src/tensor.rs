//! Tensor creation, fills, casts and byte exchange.

use strata_arena::Tensor;
use strata_core::DType;

use crate::context::registry;
use crate::status::StrataStatus;
use crate::types::StrataTensor;

/// Decode an ABI dtype code.
pub(crate) fn dtype_arg(code: i32) -> Result<DType, StrataStatus> {
    DType::from_code(code).ok_or(StrataStatus::UnsupportedDtype)
}

/// Rebuild a required tensor argument.
#[allow(unsafe_code)]
pub(crate) fn tensor_arg(ptr: *const StrataTensor) -> Result<Tensor, StrataStatus> {
    if ptr.is_null() {
        return Err(StrataStatus::InvalidArgument);
    }
    // SAFETY: ptr is non-null and points to a valid StrataTensor per caller contract.
    unsafe { &*ptr }.to_tensor()
}

/// Rebuild an optional tensor argument; null means "none".
pub(crate) fn optional_tensor_arg(ptr: *const StrataTensor) -> Result<Option<Tensor>, StrataStatus> {
    if ptr.is_null() {
        Ok(None)
    } else {
        tensor_arg(ptr).map(Some)
    }
}

/// Borrow `n_dim` dimensions from the caller.
#[allow(unsafe_code)]
pub(crate) fn dims_arg<'a>(n_dim: usize, dims: *const usize) -> Result<&'a [usize], StrataStatus> {
    if n_dim == 0 {
        return Ok(&[]);
    }
    if dims.is_null() {
        return Err(StrataStatus::InvalidArgument);
    }
    // SAFETY: dims points to n_dim readable usize values per caller contract.
    Ok(unsafe { std::slice::from_raw_parts(dims, n_dim) })
}

/// Write a result record.
#[allow(unsafe_code)]
pub(crate) fn write_tensor(out: *mut StrataTensor, tensor: &Tensor) {
    // SAFETY: callers check out for null before doing any work; it is
    // valid for writes per caller contract.
    unsafe { *out = StrataTensor::from(tensor) };
}

/// Allocate a zero-filled tensor of `n_dim` dimensions.
///
/// `n_dim` must be 1 to 4 (`InvalidRank`) and every dimension non-zero
/// (`InvalidShape`).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_tensor_new(
    handle: u64,
    dtype: i32,
    n_dim: usize,
    dims: *const usize,
    tensor_out: *mut StrataTensor,
) -> i32 {
    ffi_guard!({
        if tensor_out.is_null() {
            return StrataStatus::InvalidArgument as i32;
        }
        let dtype = ffi_try!(dtype_arg(dtype));
        let dims = ffi_try!(dims_arg(n_dim, dims));
        let mut registry = ffi_lock!(registry());
        let runtime = ffi_try!(registry.runtime(handle));
        let t = ffi_try!(runtime.tensor(dtype, dims, ""));
        write_tensor(tensor_out, &t);
        StrataStatus::Ok as i32
    })
}

/// Allocate a rank-1 tensor.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_tensor_1d(handle: u64, dtype: i32, n0: usize, tensor_out: *mut StrataTensor) -> i32 {
    strata_tensor_new(handle, dtype, 1, [n0].as_ptr(), tensor_out)
}

/// Allocate a rank-2 tensor.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_tensor_2d(
    handle: u64,
    dtype: i32,
    n0: usize,
    n1: usize,
    tensor_out: *mut StrataTensor,
) -> i32 {
    strata_tensor_new(handle, dtype, 2, [n0, n1].as_ptr(), tensor_out)
}

/// Allocate a rank-3 tensor.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_tensor_3d(
    handle: u64,
    dtype: i32,
    n0: usize,
    n1: usize,
    n2: usize,
    tensor_out: *mut StrataTensor,
) -> i32 {
    strata_tensor_new(handle, dtype, 3, [n0, n1, n2].as_ptr(), tensor_out)
}

/// Allocate a rank-4 tensor.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_tensor_4d(
    handle: u64,
    dtype: i32,
    n0: usize,
    n1: usize,
    n2: usize,
    n3: usize,
    tensor_out: *mut StrataTensor,
) -> i32 {
    strata_tensor_new(handle, dtype, 4, [n0, n1, n2, n3].as_ptr(), tensor_out)
}

/// `[0, 1, ..., n-1]`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_arange(handle: u64, n: usize, dtype: i32, tensor_out: *mut StrataTensor) -> i32 {
    ffi_guard!({
        if tensor_out.is_null() {
            return StrataStatus::InvalidArgument as i32;
        }
        let dtype = ffi_try!(dtype_arg(dtype));
        let mut registry = ffi_lock!(registry());
        let runtime = ffi_try!(registry.runtime(handle));
        let t = ffi_try!(runtime.arange(n, dtype));
        write_tensor(tensor_out, &t);
        StrataStatus::Ok as i32
    })
}

/// Standard normal samples from the context's seeded stream.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_randn(
    handle: u64,
    dtype: i32,
    n_dim: usize,
    dims: *const usize,
    tensor_out: *mut StrataTensor,
) -> i32 {
    ffi_guard!({
        if tensor_out.is_null() {
            return StrataStatus::InvalidArgument as i32;
        }
        let dtype = ffi_try!(dtype_arg(dtype));
        let dims = ffi_try!(dims_arg(n_dim, dims));
        let mut registry = ffi_lock!(registry());
        let runtime = ffi_try!(registry.runtime(handle));
        let t = ffi_try!(runtime.randn(dtype, dims));
        write_tensor(tensor_out, &t);
        StrataStatus::Ok as i32
    })
}

/// Convert `x` to `dtype`. Returns `x` itself when the dtype already
/// matches.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_cast(
    handle: u64,
    x: *const StrataTensor,
    dtype: i32,
    tensor_out: *mut StrataTensor,
) -> i32 {
    ffi_guard!({
        if tensor_out.is_null() {
            return StrataStatus::InvalidArgument as i32;
        }
        let x = ffi_try!(tensor_arg(x));
        let dtype = ffi_try!(dtype_arg(dtype));
        let mut registry = ffi_lock!(registry());
        let runtime = ffi_try!(registry.runtime(handle));
        let t = ffi_try!(runtime.cast(&x, dtype));
        write_tensor(tensor_out, &t);
        StrataStatus::Ok as i32
    })
}

/// Copy `nbytes` host bytes into a new tensor.
///
/// `nbytes` must equal the element count times the dtype size
/// (`InvalidArgument`).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_tensor_from_bytes(
    handle: u64,
    dtype: i32,
    n_dim: usize,
    dims: *const usize,
    bytes: *const u8,
    nbytes: usize,
    tensor_out: *mut StrataTensor,
) -> i32 {
    ffi_guard!({
        if tensor_out.is_null() || (bytes.is_null() && nbytes > 0) {
            return StrataStatus::InvalidArgument as i32;
        }
        let dtype = ffi_try!(dtype_arg(dtype));
        let dims = ffi_try!(dims_arg(n_dim, dims));
        let bytes: &[u8] = if nbytes == 0 {
            &[]
        } else {
            // SAFETY: bytes points to nbytes readable bytes per caller contract.
            unsafe { std::slice::from_raw_parts(bytes, nbytes) }
        };
        let mut registry = ffi_lock!(registry());
        let runtime = ffi_try!(registry.runtime(handle));
        let t = ffi_try!(runtime.import_bytes(dtype, dims, bytes));
        write_tensor(tensor_out, &t);
        StrataStatus::Ok as i32
    })
}

/// Pointer to a tensor's bytes, without copying.
///
/// The pointer is valid until the next `strata_ctx_clear` or
/// `strata_ctx_teardown`; reading through it afterwards is undefined
/// behaviour on the host side.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_tensor_data(
    handle: u64,
    tensor: *const StrataTensor,
    data_out: *mut *mut u8,
    len_out: *mut usize,
) -> i32 {
    ffi_guard!({
        if data_out.is_null() || len_out.is_null() {
            return StrataStatus::InvalidArgument as i32;
        }
        let t = ffi_try!(tensor_arg(tensor));
        let mut registry = ffi_lock!(registry());
        let runtime = ffi_try!(registry.runtime(handle));
        let ptr = ffi_try!(runtime.context_mut().data_ptr(&t));
        // SAFETY: both out-pointers are non-null and valid for writes per
        // caller contract.
        unsafe {
            *data_out = ptr;
            *len_out = t.byte_len();
        }
        StrataStatus::Ok as i32
    })
}

/// Copy a tensor's bytes into a caller buffer of `capacity` bytes.
///
/// Fails with `BufferTooSmall` if the buffer cannot hold the tensor;
/// `len_out` then receives the required size.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_tensor_copy_out(
    handle: u64,
    tensor: *const StrataTensor,
    buf: *mut u8,
    capacity: usize,
    len_out: *mut usize,
) -> i32 {
    ffi_guard!({
        if len_out.is_null() || (buf.is_null() && capacity > 0) {
            return StrataStatus::InvalidArgument as i32;
        }
        let t = ffi_try!(tensor_arg(tensor));
        let mut registry = ffi_lock!(registry());
        let runtime = ffi_try!(registry.runtime(handle));
        let view = ffi_try!(runtime.export_view(&t));
        // SAFETY: len_out is non-null and valid for writes per caller contract.
        unsafe { *len_out = view.bytes.len() };
        if view.bytes.len() > capacity {
            return StrataStatus::BufferTooSmall as i32;
        }
        if !view.bytes.is_empty() {
            // SAFETY: buf holds at least capacity >= view.bytes.len() writable
            // bytes and cannot overlap context memory owned by the registry.
            unsafe { std::ptr::copy_nonoverlapping(view.bytes.as_ptr(), buf, view.bytes.len()) };
        }
        StrataStatus::Ok as i32
    })
}

/// Resolve an array-interface typestr (`"<f8"`) or dtype name
/// (`"complex64"`) to a dtype code.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn strata_dtype_from_typestr(typestr: *const std::ffi::c_char, dtype_out: *mut i32) -> i32 {
    ffi_guard!({
        if typestr.is_null() || dtype_out.is_null() {
            return StrataStatus::InvalidArgument as i32;
        }
        // SAFETY: typestr is a non-null, NUL-terminated string per caller contract.
        let name = unsafe { std::ffi::CStr::from_ptr(typestr) };
        let Ok(name) = name.to_str() else {
            return StrataStatus::UnsupportedDtype as i32;
        };
        let dtype = ffi_try!(strata_ops::dtype_from_typestr(name));
        // SAFETY: dtype_out is non-null and valid for writes per caller contract.
        unsafe { *dtype_out = dtype.code() };
        StrataStatus::Ok as i32
    })
}
