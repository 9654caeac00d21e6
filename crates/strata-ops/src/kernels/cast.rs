//! Dtype conversion.
//!
//! Values pass through `f64` components: real to complex sets the
//! imaginary part to zero, complex to real keeps the real part.

use strata_core::{DType, Element};

use crate::kernels::CastKernel;

fn cast<S: Element, D: Element>(input: &[u8], out: &mut [u8]) {
    let input: &[S] = bytemuck::cast_slice(input);
    let out: &mut [D] = bytemuck::cast_slice_mut(out);
    for (o, &x) in out.iter_mut().zip(input) {
        *o = D::from_parts(x.re(), x.im());
    }
}

fn from_source<S: Element>(to: DType) -> CastKernel {
    super::with_element!(to, D => cast::<S, D> as CastKernel)
}

/// Kernel converting `from` elements to `to` elements.
pub(crate) fn kernel(from: DType, to: DType) -> CastKernel {
    super::with_element!(from, S => from_source::<S>(to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;

    #[test]
    fn real_to_complex_zeroes_imaginary() {
        let input = [1.5f32, -2.0];
        let mut out = [Complex::new(9.0f64, 9.0); 2];
        kernel(DType::Float32, DType::Complex128)(
            bytemuck::cast_slice(&input),
            bytemuck::cast_slice_mut(&mut out),
        );
        assert_eq!(out, [Complex::new(1.5, 0.0), Complex::new(-2.0, 0.0)]);
    }

    #[test]
    fn complex_to_real_keeps_real_part() {
        let input = [Complex::new(0.25f64, 8.0)];
        let mut out = [0.0f32];
        kernel(DType::Complex128, DType::Float32)(
            bytemuck::cast_slice(&input),
            bytemuck::cast_slice_mut(&mut out),
        );
        assert_eq!(out, [0.25]);
    }

    #[test]
    fn narrowing_rounds_to_nearest() {
        let input = [0.1f64];
        let mut out = [0.0f32];
        kernel(DType::Float64, DType::Float32)(
            bytemuck::cast_slice(&input),
            bytemuck::cast_slice_mut(&mut out),
        );
        assert_eq!(out, [0.1f32]);
    }
}
