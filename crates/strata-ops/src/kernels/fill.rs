//! Generators that write a whole tensor from its index.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use strata_core::{DType, Element, Scalar};

fn fill_with<T: Element>(out: &mut [u8], mut f: impl FnMut(usize) -> (f64, f64)) {
    let out: &mut [T] = bytemuck::cast_slice_mut(out);
    for (i, o) in out.iter_mut().enumerate() {
        let (re, im) = f(i);
        *o = T::from_parts(re, im);
    }
}

fn fill(dtype: DType, out: &mut [u8], f: impl FnMut(usize) -> (f64, f64)) {
    super::with_element!(dtype, T => fill_with::<T>(out, f))
}

/// Broadcast one scalar over `out`. Real dtypes drop the imaginary part.
pub(crate) fn constant(dtype: DType, value: Scalar, out: &mut [u8]) {
    let parts = value.parts();
    fill(dtype, out, |_| parts);
}

/// `out[i] = start + i * step`.
pub(crate) fn arange(dtype: DType, start: f64, step: f64, out: &mut [u8]) {
    fill(dtype, out, |i| (start + i as f64 * step, 0.0));
}

/// Sample frequencies of an `n`-point transform with spacing `d`:
/// `[0, 1, ..., (n-1)/2, -(n/2), ..., -1] / (d n)`.
pub(crate) fn fftfreq(dtype: DType, n: usize, d: f64, out: &mut [u8]) {
    let scale = 1.0 / (d * n as f64);
    let positive = n.div_ceil(2);
    fill(dtype, out, |i| {
        let k = if i < positive {
            i as f64
        } else {
            i as f64 - n as f64
        };
        (k * scale, 0.0)
    });
}

/// Non-negative frequencies of a real `n`-point transform:
/// `[0, 1, ..., n/2] / (d n)`.
pub(crate) fn rfftfreq(dtype: DType, n: usize, d: f64, out: &mut [u8]) {
    let scale = 1.0 / (d * n as f64);
    fill(dtype, out, |i| (i as f64 * scale, 0.0));
}

/// FFT twiddle factors `exp(-2 pi i k / n)` for `k in 0..n`.
///
/// Evaluated in `f64` and narrowed to the element precision.
pub(crate) fn twiddles(dtype: DType, n: usize, out: &mut [u8]) {
    let step = -2.0 * std::f64::consts::PI / n as f64;
    fill(dtype, out, |k| {
        let (sin, cos) = (step * k as f64).sin_cos();
        (cos, sin)
    });
}

/// Standard normal sample by the Box-Muller transform.
fn box_muller(rng: &mut ChaCha8Rng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-300); // avoid ln(0)
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Fill with independent standard normal samples.
///
/// Complex dtypes draw the real and imaginary parts independently.
pub(crate) fn normal(dtype: DType, rng: &mut ChaCha8Rng, out: &mut [u8]) {
    let complex = dtype.is_complex();
    fill(dtype, out, |_| {
        let re = box_muller(rng);
        let im = if complex { box_muller(rng) } else { 0.0 };
        (re, im)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;
    use rand::SeedableRng;

    #[test]
    fn fftfreq_even_and_odd() {
        let mut even = [0.0f64; 4];
        fftfreq(DType::Float64, 4, 1.0, bytemuck::cast_slice_mut(&mut even));
        assert_eq!(even, [0.0, 0.25, -0.5, -0.25]);

        let mut odd = [0.0f64; 5];
        fftfreq(DType::Float64, 5, 0.1, bytemuck::cast_slice_mut(&mut odd));
        let expected = [0.0, 2.0, 4.0, -4.0, -2.0];
        for (a, b) in odd.iter().zip(expected) {
            assert!((a - b).abs() < 1e-12, "{a} vs {b}");
        }
    }

    #[test]
    fn rfftfreq_is_non_negative() {
        let mut out = [0.0f32; 5];
        rfftfreq(DType::Float32, 8, 1.0, bytemuck::cast_slice_mut(&mut out));
        assert_eq!(out, [0.0, 0.125, 0.25, 0.375, 0.5]);
    }

    #[test]
    fn arange_complex_has_zero_imaginary() {
        let mut out = [Complex::new(1.0f32, 1.0); 3];
        arange(DType::Complex64, 1.0, 0.5, bytemuck::cast_slice_mut(&mut out));
        assert_eq!(
            out,
            [
                Complex::new(1.0, 0.0),
                Complex::new(1.5, 0.0),
                Complex::new(2.0, 0.0)
            ]
        );
    }

    #[test]
    fn constant_fills_every_element() {
        let mut out = [0.0f64; 3];
        constant(DType::Float64, Scalar::from(2.5), bytemuck::cast_slice_mut(&mut out));
        assert_eq!(out, [2.5; 3]);
    }

    #[test]
    fn twiddles_walk_the_unit_circle() {
        let mut out = [Complex::new(0.0f64, 0.0); 4];
        twiddles(DType::Complex128, 4, bytemuck::cast_slice_mut(&mut out));
        let expected = [(1.0, 0.0), (0.0, -1.0), (-1.0, 0.0), (0.0, 1.0)];
        for (w, (re, im)) in out.iter().zip(expected) {
            assert!((w.re - re).abs() < 1e-15 && (w.im - im).abs() < 1e-15, "{w}");
        }
    }

    #[test]
    fn normal_is_seeded_and_roughly_standard() {
        let mut a = vec![0.0f64; 4096];
        let mut b = vec![0.0f64; 4096];
        normal(
            DType::Float64,
            &mut ChaCha8Rng::seed_from_u64(7),
            bytemuck::cast_slice_mut(&mut a),
        );
        normal(
            DType::Float64,
            &mut ChaCha8Rng::seed_from_u64(7),
            bytemuck::cast_slice_mut(&mut b),
        );
        assert_eq!(a, b);
        let mean = a.iter().sum::<f64>() / a.len() as f64;
        let var = a.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / a.len() as f64;
        assert!(mean.abs() < 0.1, "mean {mean}");
        assert!((var - 1.0).abs() < 0.1, "variance {var}");
    }

    #[test]
    fn normal_complex_parts_are_independent() {
        let mut out = vec![Complex::new(0.0f32, 0.0); 2048];
        normal(
            DType::Complex64,
            &mut ChaCha8Rng::seed_from_u64(11),
            bytemuck::cast_slice_mut(&mut out),
        );
        assert!(out.iter().all(|z| z.re.is_finite() && z.im.is_finite()));
        assert!(out.iter().all(|z| z.re != z.im));
        let n = out.len() as f32;
        let cov = out.iter().map(|z| z.re * z.im).sum::<f32>() / n;
        assert!(cov.abs() < 0.1, "covariance {cov}");
    }
}
