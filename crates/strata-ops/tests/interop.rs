//! Host exchange: typestr resolution, import and zero-copy export.

use num_complex::Complex;
use strata_core::DType;
use strata_ops::{dtype_from_typestr, OpError};
use strata_test_utils::{filled, runtime};

#[test]
fn import_then_export_preserves_bytes() {
    let mut rt = runtime();
    let host = [Complex::new(1.0f32, -1.0), Complex::new(0.5, 2.0), Complex::new(3.0, 0.0)];
    let dtype = dtype_from_typestr("<c8").unwrap();
    let t = rt
        .import_bytes(dtype, &[3, 1], bytemuck::cast_slice(&host))
        .unwrap();
    assert_eq!(t.label(), "import");

    let view = rt.export_view(&t).unwrap();
    assert_eq!(view.typestr, "<c8");
    assert_eq!(view.dims, &[3, 1]);
    assert_eq!(view.byte_strides(), vec![8, 8]);
    assert_eq!(view.bytes, bytemuck::cast_slice::<_, u8>(&host));
}

#[test]
fn export_borrows_context_memory() {
    let mut rt = runtime();
    let t = filled(&mut rt, &[2], &[4.0f64, 5.0]);
    let ptr = rt.context_mut().data_ptr(&t).unwrap() as *const u8;
    let view = rt.export_view(&t).unwrap();
    assert_eq!(view.bytes.as_ptr(), ptr);
    assert_eq!(view.dtype, DType::Float64);
}

#[test]
fn import_rejects_wrong_length_without_allocating() {
    let mut rt = runtime();
    let before = rt.usage();
    let err = rt
        .import_bytes(DType::Float64, &[4], &[0u8; 24])
        .unwrap_err();
    assert!(matches!(err, OpError::InvalidArgument { .. }));
    assert_eq!(rt.usage(), before);
}

#[test]
fn imported_tensor_feeds_operations() {
    let mut rt = runtime();
    let host = [1.0f64, 4.0, 9.0];
    let t = rt
        .import_bytes(DType::Float64, &[3], bytemuck::cast_slice(&host))
        .unwrap();
    let r = rt.sqrt(&t).unwrap();
    let view = rt.export_view(&r).unwrap();
    assert_eq!(bytemuck::cast_slice::<u8, f64>(view.bytes), &[1.0, 2.0, 3.0]);
}

#[test]
fn export_of_stale_descriptor_fails() {
    let mut rt = runtime();
    let t = rt.tensor_1d(DType::Float32, 2).unwrap();
    rt.clear().unwrap();
    assert!(rt.export_view(&t).is_err());
}

#[test]
fn unsupported_host_types() {
    assert_eq!(
        dtype_from_typestr("<i8"),
        Err(OpError::UnsupportedDtype { name: "<i8".into() })
    );
}

#[test]
fn import_of_unaddressable_shape_is_an_error() {
    let mut rt = runtime();
    let before = rt.usage();
    assert!(matches!(
        rt.import_bytes(DType::Complex128, &[usize::MAX / 8], &[]),
        Err(OpError::Arena(strata_arena::ArenaError::Shape(_)))
    ));
    assert!(matches!(
        rt.import_bytes(DType::Float64, &[4, usize::MAX / 16], &[]),
        Err(OpError::Arena(strata_arena::ArenaError::Shape(_)))
    ));
    assert_eq!(rt.usage(), before);
}
