//! Mixed-radix transform kernels.

use num_complex::Complex;
use num_traits::Zero;
use smallvec::SmallVec;
use strata_core::{DType, Element, RealElement};

use crate::fft::FftJob;
use crate::kernels::{with_element, FftKernel};
use crate::op::FftKind;

/// Decimation-in-time DFT of `output.len()` points read from `input` at
/// `stride`.
///
/// `twiddles` holds the factors of the top-level length; `tw_step` maps
/// this level's exponents onto it.
fn recurse<F: RealElement>(
    input: &[Complex<F>],
    stride: usize,
    output: &mut [Complex<F>],
    factors: &[usize],
    twiddles: &[Complex<F>],
    tw_step: usize,
    inverse: bool,
) {
    let Some((&p, rest)) = factors.split_first() else {
        output[0] = input[0];
        return;
    };
    let m = output.len() / p;
    for (q, sub) in output.chunks_mut(m).enumerate() {
        recurse(
            &input[q * stride..],
            stride * p,
            sub,
            rest,
            twiddles,
            tw_step * p,
            inverse,
        );
    }

    let w = |e: usize| {
        let t = twiddles[e];
        if inverse {
            t.conj()
        } else {
            t
        }
    };

    if p == 2 {
        for k in 0..m {
            let a = output[k];
            let b = output[k + m] * w(k * tw_step);
            output[k] = a + b;
            output[k + m] = a - b;
        }
        return;
    }

    let mut rotated: SmallVec<[Complex<F>; 8]> = SmallVec::with_capacity(p);
    for k in 0..m {
        rotated.clear();
        rotated.extend((0..p).map(|q| output[q * m + k] * w(q * k * tw_step)));
        for t in 0..p {
            output[t * m + k] = rotated
                .iter()
                .enumerate()
                .fold(Complex::zero(), |acc, (q, &y)| {
                    acc + y * w((q * t) % p * m * tw_step)
                });
        }
    }
}

/// Transform `input` into `output` (both length `n`).
pub(crate) fn transform<F: RealElement>(
    input: &[Complex<F>],
    output: &mut [Complex<F>],
    factors: &[usize],
    twiddles: &[Complex<F>],
    inverse: bool,
) {
    recurse(input, 1, output, factors, twiddles, 1, inverse);
}

type Work<S> = Complex<<S as Element>::Real>;

type LaneFn<S, D> = fn(&FftJob<'_>, &[S], &[Work<S>], &mut [Work<S>], &mut [D]);

/// Complex output of every lane; inverse results are scaled by `1/n`.
///
/// Output lanes shorter than `n` keep the leading bins (the real forward
/// transform keeps `n/2 + 1`).
fn complex_lanes<S: Element, const INVERSE: bool>(
    job: &FftJob<'_>,
    input: &[S],
    twiddles: &[Work<S>],
    work: &mut [Work<S>],
    out: &mut [Work<S>],
) {
    let n = job.n;
    let (a, b) = work[..2 * n].split_at_mut(n);
    let avail = job.input.len.min(n);
    let scale = <S::Real as RealElement>::from_f64(1.0 / n as f64);
    for lane in 0..job.input.lanes() {
        for (k, slot) in a.iter_mut().enumerate() {
            *slot = if k < avail {
                input[job.input.index(lane, k)].to_complex()
            } else {
                Complex::zero()
            };
        }
        transform(a, b, job.factors, twiddles, INVERSE);
        for (k, &v) in b.iter().enumerate().take(job.output.len) {
            out[job.output.index(lane, k)] = if INVERSE { v.scale(scale) } else { v };
        }
    }
}

/// Real output of every lane from the non-negative half of a Hermitian
/// spectrum.
///
/// The missing half is mirrored from the conjugate; imaginary parts of
/// the zero and Nyquist bins do not contribute.
fn real_lanes<S: Element>(
    job: &FftJob<'_>,
    input: &[S],
    twiddles: &[Work<S>],
    work: &mut [Work<S>],
    out: &mut [S::Real],
) {
    let n = job.n;
    let half = n / 2;
    let (a, b) = work[..2 * n].split_at_mut(n);
    let avail = job.input.len.min(half + 1);
    let scale = <S::Real as RealElement>::from_f64(1.0 / n as f64);
    for lane in 0..job.input.lanes() {
        for (k, slot) in a.iter_mut().enumerate().take(half + 1) {
            *slot = if k < avail {
                input[job.input.index(lane, k)].to_complex()
            } else {
                Complex::zero()
            };
        }
        for k in half + 1..n {
            a[k] = a[n - k].conj();
        }
        transform(a, b, job.factors, twiddles, true);
        for (k, v) in b.iter().enumerate().take(job.output.len) {
            out[job.output.index(lane, k)] = v.re * scale;
        }
    }
}

/// Run `lanes` over the whole tensor, splitting contiguous lanes across
/// worker threads when the transform axis is innermost.
fn run_lanes<S: Element, D: bytemuck::Pod + Send>(
    job: &FftJob<'_>,
    input: &[S],
    twiddles: &[Work<S>],
    work: &mut [Work<S>],
    out: &mut [D],
    lanes: LaneFn<S, D>,
) {
    let count = job.input.lanes();
    let workers = job.workers.min(count);
    if workers <= 1 || job.input.inner != 1 {
        lanes(job, input, twiddles, work, out);
        return;
    }
    let per = count.div_ceil(workers);
    std::thread::scope(|scope| {
        let chunks = input
            .chunks(per * job.input.len)
            .zip(out.chunks_mut(per * job.output.len))
            .zip(work.chunks_mut(2 * job.n));
        for ((input, out), work) in chunks {
            let mut sub = *job;
            sub.input.outer = input.len() / job.input.len;
            sub.output.outer = sub.input.outer;
            sub.workers = 1;
            scope.spawn(move || lanes(&sub, input, twiddles, work, out));
        }
    });
}

fn complex_kernel<S: Element, const INVERSE: bool>(
    job: &FftJob<'_>,
    input: &[u8],
    twiddles: &[u8],
    work: &mut [u8],
    out: &mut [u8],
) {
    run_lanes::<S, Work<S>>(
        job,
        bytemuck::cast_slice(input),
        bytemuck::cast_slice(twiddles),
        bytemuck::cast_slice_mut(work),
        bytemuck::cast_slice_mut(out),
        complex_lanes::<S, INVERSE>,
    );
}

fn real_kernel<S: Element>(
    job: &FftJob<'_>,
    input: &[u8],
    twiddles: &[u8],
    work: &mut [u8],
    out: &mut [u8],
) {
    run_lanes::<S, S::Real>(
        job,
        bytemuck::cast_slice(input),
        bytemuck::cast_slice(twiddles),
        bytemuck::cast_slice_mut(work),
        bytemuck::cast_slice_mut(out),
        real_lanes::<S>,
    );
}

/// Kernel for `kind` on input of `dtype`, if the pair is supported.
///
/// The real forward transform takes only real input and its inverse
/// only complex input.
pub(crate) fn kernel(kind: FftKind, dtype: DType) -> Option<FftKernel> {
    match (kind, dtype.is_complex()) {
        (FftKind::Forward, _) | (FftKind::RealForward, false) => Some(with_element!(
            dtype,
            T => complex_kernel::<T, false> as FftKernel
        )),
        (FftKind::Inverse, _) => Some(with_element!(
            dtype,
            T => complex_kernel::<T, true> as FftKernel
        )),
        (FftKind::RealInverse, true) => Some(with_element!(dtype, T => real_kernel::<T> as FftKernel)),
        (FftKind::RealForward, true) | (FftKind::RealInverse, false) => None,
    }
}
