//! Axis reductions.
//!
//! Each output element folds one lane of the input along the reduced
//! axis. The output is laid out as the input with the axis collapsed to
//! length 1, which is the same memory order whether or not the caller
//! keeps the axis.

use strata_core::{DType, RealElement};

use crate::kernels::math::Numeric;
use crate::kernels::ReduceKernel;
use crate::layout::AxisLayout;
use crate::op::ReduceOp;

fn sum<T: Numeric>(layout: &AxisLayout, input: &[u8], out: &mut [u8]) {
    let input: &[T] = bytemuck::cast_slice(input);
    let out: &mut [T] = bytemuck::cast_slice_mut(out);
    for (lane, o) in out.iter_mut().enumerate().take(layout.lanes()) {
        *o = (0..layout.len).fold(T::zero(), |acc, k| acc + input[layout.index(lane, k)]);
    }
}

fn mean<T: Numeric>(layout: &AxisLayout, input: &[u8], out: &mut [u8]) {
    sum::<T>(layout, input, out);
    let count = T::from_parts(layout.len as f64, 0.0);
    for o in bytemuck::cast_slice_mut::<u8, T>(out) {
        *o = *o / count;
    }
}

/// Max or min with NaN propagation: a lane containing NaN yields NaN.
fn extreme<T: RealElement, const MAX: bool>(layout: &AxisLayout, input: &[u8], out: &mut [u8]) {
    let input: &[T] = bytemuck::cast_slice(input);
    let out: &mut [T] = bytemuck::cast_slice_mut(out);
    for (lane, o) in out.iter_mut().enumerate().take(layout.lanes()) {
        let mut acc = input[layout.index(lane, 0)];
        for k in 1..layout.len {
            let x = input[layout.index(lane, k)];
            if acc.is_nan() {
                break;
            }
            if x.is_nan() || (MAX && x > acc) || (!MAX && x < acc) {
                acc = x;
            }
        }
        *o = acc;
    }
}

fn extreme_kernel<const MAX: bool>(dtype: DType) -> Option<ReduceKernel> {
    match dtype {
        DType::Float32 => Some(extreme::<f32, MAX> as ReduceKernel),
        DType::Float64 => Some(extreme::<f64, MAX> as ReduceKernel),
        DType::Complex64 | DType::Complex128 => None,
    }
}

/// Kernel for `op` on input of `dtype`, if the pair is supported.
///
/// Complex values have no ordering, so `max` and `min` are absent for
/// complex dtypes.
pub(crate) fn kernel(op: ReduceOp, dtype: DType) -> Option<ReduceKernel> {
    match op {
        ReduceOp::Sum => Some(super::with_element!(dtype, T => sum::<T> as ReduceKernel)),
        ReduceOp::Mean => Some(super::with_element!(dtype, T => mean::<T> as ReduceKernel)),
        ReduceOp::Max => extreme_kernel::<true>(dtype),
        ReduceOp::Min => extreme_kernel::<false>(dtype),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;
    use strata_core::Shape;

    fn layout(dims: &[usize], axis: isize) -> AxisLayout {
        let shape = Shape::new(dims).unwrap();
        AxisLayout::new(&shape, shape.axis_slot(axis).unwrap())
    }

    #[test]
    fn sum_rows_and_columns() {
        let input = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0];
        let kernel = kernel(ReduceOp::Sum, DType::Float64).unwrap();

        let mut cols = [0.0f64; 3];
        kernel(
            &layout(&[2, 3], 0),
            bytemuck::cast_slice(&input),
            bytemuck::cast_slice_mut(&mut cols),
        );
        assert_eq!(cols, [5.0, 7.0, 9.0]);

        let mut rows = [0.0f64; 2];
        kernel(
            &layout(&[2, 3], 1),
            bytemuck::cast_slice(&input),
            bytemuck::cast_slice_mut(&mut rows),
        );
        assert_eq!(rows, [6.0, 15.0]);
    }

    #[test]
    fn mean_of_complex() {
        let input = [Complex::new(1.0f32, 2.0), Complex::new(3.0, -2.0)];
        let mut out = [Complex::new(0.0f32, 0.0)];
        kernel(ReduceOp::Mean, DType::Complex64).unwrap()(
            &layout(&[2], 0),
            bytemuck::cast_slice(&input),
            bytemuck::cast_slice_mut(&mut out),
        );
        assert_eq!(out, [Complex::new(2.0, 0.0)]);
    }

    #[test]
    fn max_min_propagate_nan() {
        let input = [1.0f32, f32::NAN, 3.0, 4.0, -1.0, 2.0];
        let mut max = [0.0f32; 2];
        kernel(ReduceOp::Max, DType::Float32).unwrap()(
            &layout(&[2, 3], 1),
            bytemuck::cast_slice(&input),
            bytemuck::cast_slice_mut(&mut max),
        );
        assert!(max[0].is_nan());
        assert_eq!(max[1], 4.0);

        let mut min = [0.0f32; 2];
        kernel(ReduceOp::Min, DType::Float32).unwrap()(
            &layout(&[2, 3], 1),
            bytemuck::cast_slice(&input),
            bytemuck::cast_slice_mut(&mut min),
        );
        assert!(min[0].is_nan());
        assert_eq!(min[1], -1.0);
    }

    #[test]
    fn ordering_reductions_absent_for_complex() {
        assert!(kernel(ReduceOp::Max, DType::Complex64).is_none());
        assert!(kernel(ReduceOp::Min, DType::Complex128).is_none());
        assert!(kernel(ReduceOp::Sum, DType::Complex128).is_some());
    }
}
