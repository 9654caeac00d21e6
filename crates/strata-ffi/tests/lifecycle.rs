//! Context lifecycle and tensor exchange through the C ABI.
//!
//! The process holds one context slot, so every test runs under a shared
//! lock and starts by tearing down whatever an earlier test left live.

use std::ffi::CString;
use std::sync::{Mutex, MutexGuard};

use strata_ffi::context::{
    strata_ctx_clear, strata_ctx_current, strata_ctx_default, strata_ctx_init,
    strata_ctx_init_config, strata_ctx_teardown, strata_ctx_usage,
};
use strata_ffi::tensor::{
    strata_arange, strata_cast, strata_dtype_from_typestr, strata_randn, strata_tensor_1d,
    strata_tensor_3d, strata_tensor_copy_out, strata_tensor_data, strata_tensor_from_bytes,
    strata_tensor_new,
};
use strata_ffi::{StrataConfig, StrataStatus, StrataTensor, StrataUsage};

static TEST_LOCK: Mutex<()> = Mutex::new(());

const OK: i32 = StrataStatus::Ok as i32;

const F32: i32 = 0;
const F64: i32 = 1;
const C64: i32 = 2;

fn serial() -> MutexGuard<'static, ()> {
    let guard = TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let mut live = 0;
    if strata_ctx_current(&mut live) == OK {
        assert_eq!(strata_ctx_teardown(live), OK);
    }
    guard
}

fn init(main_bytes: usize, scratch_bytes: usize) -> u64 {
    let mut handle = 0;
    assert_eq!(strata_ctx_init(main_bytes, scratch_bytes, &mut handle), OK);
    handle
}

fn usage(handle: u64) -> StrataUsage {
    let mut u = StrataUsage::default();
    assert_eq!(strata_ctx_usage(handle, &mut u), OK);
    u
}

fn f64_values(handle: u64, t: &StrataTensor, n: usize) -> Vec<f64> {
    let mut buf = vec![0.0f64; n];
    let mut len = 0;
    let status = strata_tensor_copy_out(handle, t, buf.as_mut_ptr().cast(), n * 8, &mut len);
    assert_eq!(status, OK);
    assert_eq!(len, n * 8);
    buf
}

#[test]
fn second_init_fails_and_keeps_first() {
    let _guard = serial();
    let handle = init(1 << 16, 1 << 12);
    let mut t = StrataTensor::default();
    assert_eq!(strata_tensor_1d(handle, F32, 8, &mut t), OK);

    let mut other = 0;
    assert_eq!(
        strata_ctx_init(1 << 20, 1 << 12, &mut other),
        StrataStatus::AlreadyInitialized as i32
    );
    assert_eq!(other, 0);

    let u = usage(handle);
    assert_eq!(u.main_capacity, 1 << 16);
    assert_eq!(u.main_used, 32);
    assert_eq!(strata_ctx_teardown(handle), OK);
}

#[test]
fn default_returns_live_context() {
    let _guard = serial();
    let handle = init(1 << 16, 1 << 12);
    let mut default = 0;
    assert_eq!(strata_ctx_default(&mut default), OK);
    assert_eq!(default, handle);
    assert_eq!(usage(default).main_capacity, 1 << 16);
    assert_eq!(strata_ctx_teardown(handle), OK);
}

#[test]
fn teardown_then_reinit() {
    let _guard = serial();
    let handle = init(1 << 16, 1 << 12);
    assert_eq!(strata_ctx_teardown(handle), OK);
    assert_eq!(strata_ctx_teardown(handle), StrataStatus::TornDown as i32);

    let mut t = StrataTensor::default();
    assert_eq!(strata_tensor_1d(handle, F32, 4, &mut t), StrataStatus::TornDown as i32);
    assert_eq!(strata_ctx_clear(handle), StrataStatus::TornDown as i32);

    let mut live = 0;
    assert_eq!(strata_ctx_current(&mut live), StrataStatus::InvalidHandle as i32);

    let fresh = init(1 << 12, 1 << 10);
    assert_ne!(fresh, handle);
    assert_eq!(strata_ctx_teardown(handle), StrataStatus::InvalidHandle as i32);
    assert_eq!(usage(fresh).main_capacity, 1 << 12);
    assert_eq!(strata_ctx_teardown(fresh), OK);
}

#[test]
fn init_from_config_record() {
    let _guard = serial();
    let config = StrataConfig {
        main_bytes: 1 << 14,
        scratch_bytes: 1 << 10,
        max_fft_plans: 4,
        seed: 7,
        ..StrataConfig::default()
    };
    let mut handle = 0;
    assert_eq!(strata_ctx_init_config(&config, &mut handle), OK);
    let u = usage(handle);
    assert_eq!(u.main_capacity, 1 << 14);
    assert_eq!(u.scratch_capacity, 1 << 10);
    assert_eq!(strata_ctx_teardown(handle), OK);

    let bad = StrataConfig {
        max_fft_plans: 0,
        ..config
    };
    assert_eq!(
        strata_ctx_init_config(&bad, &mut handle),
        StrataStatus::InvalidArgument as i32
    );
    assert_eq!(strata_ctx_init(0, 64, &mut handle), StrataStatus::InvalidArgument as i32);
}

#[test]
fn null_arguments_rejected() {
    let _guard = serial();
    assert_eq!(
        strata_ctx_init(1 << 12, 1 << 10, std::ptr::null_mut()),
        StrataStatus::InvalidArgument as i32
    );
    let handle = init(1 << 12, 1 << 10);
    assert_eq!(
        strata_tensor_1d(handle, F32, 4, std::ptr::null_mut()),
        StrataStatus::InvalidArgument as i32
    );
    let mut data = std::ptr::null_mut();
    let mut len = 0;
    assert_eq!(
        strata_tensor_data(handle, std::ptr::null(), &mut data, &mut len),
        StrataStatus::InvalidArgument as i32
    );
    let mut t = StrataTensor::default();
    assert_eq!(
        strata_tensor_new(handle, F32, 2, std::ptr::null(), &mut t),
        StrataStatus::InvalidArgument as i32
    );
    assert_eq!(usage(handle).main_used, 0);
    assert_eq!(strata_ctx_teardown(handle), OK);
}

#[test]
fn bad_shapes_allocate_nothing() {
    let _guard = serial();
    let handle = init(1 << 12, 1 << 10);
    let mut t = StrataTensor::default();
    let five = [2usize; 5];
    assert_eq!(
        strata_tensor_new(handle, F32, 5, five.as_ptr(), &mut t),
        StrataStatus::InvalidRank as i32
    );
    assert_eq!(
        strata_tensor_new(handle, F32, 0, std::ptr::null(), &mut t),
        StrataStatus::InvalidRank as i32
    );
    assert_eq!(
        strata_tensor_3d(handle, F32, 2, 0, 2, &mut t),
        StrataStatus::InvalidShape as i32
    );
    assert_eq!(
        strata_tensor_1d(handle, 42, 4, &mut t),
        StrataStatus::UnsupportedDtype as i32
    );
    assert_eq!(
        strata_tensor_1d(handle, F32, 1 << 20, &mut t),
        StrataStatus::OutOfArena as i32
    );
    assert_eq!(t, StrataTensor::default());
    assert_eq!(usage(handle).main_used, 0);
    assert_eq!(strata_ctx_teardown(handle), OK);
}

#[test]
fn clear_makes_records_stale() {
    let _guard = serial();
    let handle = init(1 << 12, 1 << 10);
    let mut t = StrataTensor::default();
    assert_eq!(strata_tensor_1d(handle, F64, 4, &mut t), OK);
    assert_eq!(strata_ctx_clear(handle), OK);
    assert_eq!(usage(handle).generation, t.generation + 1);

    let mut data = std::ptr::null_mut();
    let mut len = 0;
    assert_eq!(
        strata_tensor_data(handle, &t, &mut data, &mut len),
        StrataStatus::StaleTensor as i32
    );
    assert!(data.is_null());
    assert_eq!(strata_ctx_teardown(handle), OK);
}

#[test]
fn bytes_in_and_out() {
    let _guard = serial();
    let handle = init(1 << 12, 1 << 10);
    let values = [1.0f64, 2.0, 3.0];
    let dims = [3usize];
    let mut t = StrataTensor::default();
    assert_eq!(
        strata_tensor_from_bytes(handle, F64, 1, dims.as_ptr(), values.as_ptr().cast(), 24, &mut t),
        OK
    );
    assert_eq!(t.byte_len, 24);
    assert_eq!(f64_values(handle, &t, 3), values);

    let mut small = [0u8; 16];
    let mut len = 0;
    assert_eq!(
        strata_tensor_copy_out(handle, &t, small.as_mut_ptr(), small.len(), &mut len),
        StrataStatus::BufferTooSmall as i32
    );
    assert_eq!(len, 24);
    assert_eq!(small, [0u8; 16]);

    let mut data = std::ptr::null_mut();
    assert_eq!(strata_tensor_data(handle, &t, &mut data, &mut len), OK);
    assert_eq!(len, 24);
    assert!(!data.is_null());

    let used = usage(handle).main_used;
    let mut rejected = StrataTensor::default();
    assert_eq!(
        strata_tensor_from_bytes(handle, F64, 1, dims.as_ptr(), values.as_ptr().cast(), 16, &mut rejected),
        StrataStatus::InvalidArgument as i32
    );
    assert_eq!(usage(handle).main_used, used);
    assert_eq!(strata_ctx_teardown(handle), OK);
}

#[test]
fn fills_and_casts() {
    let _guard = serial();
    let handle = init(1 << 14, 1 << 12);
    let mut t = StrataTensor::default();
    assert_eq!(strata_arange(handle, 5, F64, &mut t), OK);
    assert_eq!(f64_values(handle, &t, 5), [0.0, 1.0, 2.0, 3.0, 4.0]);

    let mut c = StrataTensor::default();
    assert_eq!(strata_cast(handle, &t, C64, &mut c), OK);
    assert_eq!(c.dtype, C64);
    assert_eq!(c.byte_len, 5 * 8);

    let mut same = StrataTensor::default();
    assert_eq!(strata_cast(handle, &t, F64, &mut same), OK);
    assert_eq!(same, t);

    let dims = [2usize, 3];
    let mut r = StrataTensor::default();
    assert_eq!(strata_randn(handle, F32, 2, dims.as_ptr(), &mut r), OK);
    assert_eq!(r.dims, [2, 3, 0, 0]);
    assert_eq!(strata_ctx_teardown(handle), OK);
}

#[test]
fn typestr_lookup() {
    let _guard = serial();
    let cases = [("<f4", 0), ("<f8", 1), ("<c8", 2), ("<c16", 3), ("complex64", 2)];
    for (name, code) in cases {
        let name = CString::new(name).unwrap();
        let mut dtype = -1;
        assert_eq!(strata_dtype_from_typestr(name.as_ptr(), &mut dtype), OK);
        assert_eq!(dtype, code);
    }
    let name = CString::new("<i8").unwrap();
    let mut dtype = -1;
    assert_eq!(
        strata_dtype_from_typestr(name.as_ptr(), &mut dtype),
        StrataStatus::UnsupportedDtype as i32
    );
    assert_eq!(dtype, -1);
}
