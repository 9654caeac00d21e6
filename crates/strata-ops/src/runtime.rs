//! The operation dispatcher.
//!
//! Every operation follows the same sequence:
//!
//! 1. validate operand descriptors against the context;
//! 2. resolve the result dtype and shape and look up the kernel;
//! 3. validate a caller-supplied output, or plan to allocate one;
//! 4. open a [`Frame`], allocate, stage inputs that the output
//!    overwrites, run the kernel, commit.
//!
//! Steps 1-3 allocate nothing, so a rejected call leaves both regions
//! exactly as they were. Failures in step 4 are rolled back by the frame.

use num_complex::Complex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use strata_arena::{ArenaUsage, Context, Frame, Source, Tensor};
use strata_core::{DType, Element, Scalar, Shape};
use tracing::debug;

use crate::config::RuntimeConfig;
use crate::error::OpError;
use crate::fft::{FftJob, FftPlan, PlanCache};
use crate::kernels::fill;
use crate::layout::{AxisLayout, BinaryLayout};
use crate::op::{BinaryOp, FftKind, ReduceOp, UnaryOp};
use crate::registry::KernelTable;

/// Right-hand side of a binary operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Operand {
    /// Another tensor in the same context.
    Tensor(Tensor),
    /// A host scalar broadcast over the left operand.
    Scalar(Scalar),
}

impl From<Tensor> for Operand {
    fn from(t: Tensor) -> Self {
        Operand::Tensor(t)
    }
}

impl From<&Tensor> for Operand {
    fn from(t: &Tensor) -> Self {
        Operand::Tensor(*t)
    }
}

impl From<Scalar> for Operand {
    fn from(s: Scalar) -> Self {
        Operand::Scalar(s)
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Scalar(v.into())
    }
}

impl From<f32> for Operand {
    fn from(v: f32) -> Self {
        Operand::Scalar(v.into())
    }
}

impl From<Complex<f64>> for Operand {
    fn from(v: Complex<f64>) -> Self {
        Operand::Scalar(v.into())
    }
}

impl From<Complex<f32>> for Operand {
    fn from(v: Complex<f32>) -> Self {
        Operand::Scalar(v.into())
    }
}

/// A context together with its kernels, FFT plans and random stream.
pub struct Runtime {
    context: Context,
    kernels: KernelTable,
    plans: PlanCache,
    rng: ChaCha8Rng,
    config: RuntimeConfig,
    workers: usize,
}

impl Runtime {
    /// Validate `config`, allocate the context and build the kernel table.
    pub fn new(config: RuntimeConfig) -> Result<Self, OpError> {
        config.validate()?;
        let context = Context::new(config.arena.clone())?;
        let kernels = KernelTable::new();
        let workers = config.resolved_fft_workers();
        debug!(
            context = %context.id(),
            fft_workers = workers,
            unsupported = ?kernels.missing(),
            "runtime ready"
        );
        Ok(Self {
            context,
            kernels,
            plans: PlanCache::new(config.max_fft_plans),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            workers,
        })
    }

    /// Runtime with the given region capacities and default settings.
    pub fn with_capacity(main_bytes: usize, scratch_bytes: usize) -> Result<Self, OpError> {
        let mut config = RuntimeConfig::default();
        config.arena.main_bytes = main_bytes;
        config.arena.scratch_bytes = scratch_bytes;
        Self::new(config)
    }

    /// The owned context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Mutable access to the owned context.
    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// The configuration this runtime was built with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The kernel table.
    pub fn kernels(&self) -> &KernelTable {
        &self.kernels
    }

    /// The FFT plan cache.
    pub fn plans(&self) -> &PlanCache {
        &self.plans
    }

    /// Reset both regions and drop every FFT plan.
    ///
    /// All existing descriptors become stale.
    pub fn clear(&mut self) -> Result<(), OpError> {
        self.context.clear()?;
        self.plans.clear();
        Ok(())
    }

    /// Release the context's memory. Every later call fails with
    /// [`ArenaError::TornDown`](strata_arena::ArenaError::TornDown).
    pub fn teardown(&mut self) -> Result<(), OpError> {
        self.context.teardown()?;
        self.plans.clear();
        Ok(())
    }

    /// Current region usage.
    pub fn usage(&self) -> ArenaUsage {
        self.context.usage()
    }

    // ── Tensors ────────────────────────────────────────────────

    /// Allocate a zero-filled tensor.
    pub fn tensor(&mut self, dtype: DType, dims: &[usize], label: &str) -> Result<Tensor, OpError> {
        Ok(self.context.tensor(dtype, dims, label)?)
    }

    /// Allocate a rank-1 tensor.
    pub fn tensor_1d(&mut self, dtype: DType, n0: usize) -> Result<Tensor, OpError> {
        Ok(self.context.tensor_1d(dtype, n0)?)
    }

    /// Allocate a rank-2 tensor.
    pub fn tensor_2d(&mut self, dtype: DType, n0: usize, n1: usize) -> Result<Tensor, OpError> {
        Ok(self.context.tensor_2d(dtype, n0, n1)?)
    }

    /// Allocate a rank-3 tensor.
    pub fn tensor_3d(
        &mut self,
        dtype: DType,
        n0: usize,
        n1: usize,
        n2: usize,
    ) -> Result<Tensor, OpError> {
        Ok(self.context.tensor_3d(dtype, n0, n1, n2)?)
    }

    /// Allocate a rank-4 tensor.
    pub fn tensor_4d(
        &mut self,
        dtype: DType,
        n0: usize,
        n1: usize,
        n2: usize,
        n3: usize,
    ) -> Result<Tensor, OpError> {
        Ok(self.context.tensor_4d(dtype, n0, n1, n2, n3)?)
    }

    /// Typed view of a tensor's elements.
    pub fn data<T: Element>(&self, tensor: &Tensor) -> Result<&[T], OpError> {
        Ok(self.context.data(tensor)?)
    }

    /// Mutable typed view of a tensor's elements.
    pub fn data_mut<T: Element>(&mut self, tensor: &Tensor) -> Result<&mut [T], OpError> {
        Ok(self.context.data_mut(tensor)?)
    }

    /// `[0, 1, ..., n-1]` as a rank-1 tensor.
    pub fn arange(&mut self, n: usize, dtype: DType) -> Result<Tensor, OpError> {
        let shape = Shape::new(&[n])?;
        self.generate(dtype, shape, "arange", |out| fill::arange(dtype, 0.0, 1.0, out))
    }

    /// Standard normal samples from the runtime's seeded stream.
    pub fn randn(&mut self, dtype: DType, dims: &[usize]) -> Result<Tensor, OpError> {
        let shape = Shape::new(dims)?;
        let mut frame = self.context.frame()?;
        let out = frame.alloc_tensor(dtype, shape, "randn")?;
        let io = frame.io([], Some(out.span()), None)?;
        fill::normal(dtype, &mut self.rng, io.main);
        frame.commit();
        Ok(out)
    }

    /// Convert to another dtype. Returns `x` itself if it already has
    /// `dtype`.
    pub fn cast(&mut self, x: &Tensor, dtype: DType) -> Result<Tensor, OpError> {
        self.context.check(x)?;
        if x.dtype() == dtype {
            return Ok(*x);
        }
        let kernel = self.kernels.cast(x.dtype(), dtype)?;
        let mut frame = self.context.frame()?;
        let out = frame.alloc_tensor(dtype, *x.shape(), x.label())?;
        let io = frame.io([Source::from(x)], Some(out.span()), None)?;
        kernel(io.reads[0], io.main);
        frame.commit();
        Ok(out)
    }

    // ── Binary ─────────────────────────────────────────────────

    /// `lhs op rhs` with broadcasting or scalar promotion.
    ///
    /// Tensor operands must share a dtype and broadcast slot by slot. A
    /// complex scalar promotes a real `lhs` to its complex counterpart; a
    /// real scalar against a complex tensor becomes `(re, 0)`. When `out`
    /// is given it must already have the result dtype and shape; the
    /// result is written there and the same descriptor is returned.
    pub fn binary(
        &mut self,
        op: BinaryOp,
        lhs: &Tensor,
        rhs: impl Into<Operand>,
        out: Option<&Tensor>,
    ) -> Result<Tensor, OpError> {
        self.context.check(lhs)?;
        let rhs = rhs.into();
        let (dtype, shape, rhs_shape) = match rhs {
            Operand::Tensor(r) => {
                self.context.check(&r)?;
                if r.dtype() != lhs.dtype() {
                    return Err(OpError::DtypeMismatch {
                        expected: lhs.dtype(),
                        found: r.dtype(),
                    });
                }
                let shape = lhs.shape().broadcast(r.shape()).ok_or(OpError::ShapeMismatch {
                    expected: *lhs.shape(),
                    found: *r.shape(),
                })?;
                (lhs.dtype(), shape, *r.shape())
            }
            Operand::Scalar(s) if s.is_complex() => (lhs.dtype().to_complex(), *lhs.shape(), Shape::unit()),
            Operand::Scalar(_) => (lhs.dtype(), *lhs.shape(), Shape::unit()),
        };
        let kernel = self.kernels.binary(op, dtype)?;
        let promote = if dtype != lhs.dtype() {
            Some(self.kernels.cast(lhs.dtype(), dtype)?)
        } else {
            None
        };
        check_output(&self.context, out, dtype, shape)?;

        let mut frame = self.context.frame()?;
        let out = output(&mut frame, out, dtype, shape, op.name())?;
        let lhs_src = match promote {
            Some(cast) => {
                let span = frame.alloc_scratch(lhs.shape().byte_len(dtype.size_of())?)?;
                let io = frame.io([Source::from(lhs)], None, Some(span))?;
                cast(io.reads[0], io.scratch);
                Source::Scratch(span)
            }
            None => input(&mut frame, lhs, &out)?,
        };
        let rhs_src = match rhs {
            Operand::Tensor(r) => input(&mut frame, &r, &out)?,
            Operand::Scalar(s) => {
                let span = frame.alloc_scratch(dtype.size_of())?;
                let io = frame.io([], None, Some(span))?;
                fill::constant(dtype, s, io.scratch);
                Source::Scratch(span)
            }
        };
        let layout = BinaryLayout::new(&shape, lhs.shape(), &rhs_shape);
        let io = frame.io([lhs_src, rhs_src], Some(out.span()), None)?;
        kernel(&layout, io.reads[0], io.reads[1], io.main);
        frame.commit();
        Ok(out)
    }

    /// `lhs + rhs`.
    pub fn add(&mut self, lhs: &Tensor, rhs: impl Into<Operand>) -> Result<Tensor, OpError> {
        self.binary(BinaryOp::Add, lhs, rhs, None)
    }

    /// `lhs - rhs`.
    pub fn sub(&mut self, lhs: &Tensor, rhs: impl Into<Operand>) -> Result<Tensor, OpError> {
        self.binary(BinaryOp::Sub, lhs, rhs, None)
    }

    /// `lhs * rhs`.
    pub fn mul(&mut self, lhs: &Tensor, rhs: impl Into<Operand>) -> Result<Tensor, OpError> {
        self.binary(BinaryOp::Mul, lhs, rhs, None)
    }

    /// `lhs / rhs`.
    pub fn div(&mut self, lhs: &Tensor, rhs: impl Into<Operand>) -> Result<Tensor, OpError> {
        self.binary(BinaryOp::Div, lhs, rhs, None)
    }

    /// `lhs ^ rhs`.
    pub fn pow(&mut self, lhs: &Tensor, rhs: impl Into<Operand>) -> Result<Tensor, OpError> {
        self.binary(BinaryOp::Pow, lhs, rhs, None)
    }

    // ── Unary ──────────────────────────────────────────────────

    /// Apply `op` elementwise.
    ///
    /// `abs`, `angle`, `real` and `imag` produce the real dtype of `x`.
    pub fn unary(&mut self, op: UnaryOp, x: &Tensor, out: Option<&Tensor>) -> Result<Tensor, OpError> {
        self.context.check(x)?;
        let kernel = self.kernels.unary(op, x.dtype())?;
        let dtype = op.output_dtype(x.dtype());
        check_output(&self.context, out, dtype, *x.shape())?;

        let mut frame = self.context.frame()?;
        let out = output(&mut frame, out, dtype, *x.shape(), op.name())?;
        let src = input(&mut frame, x, &out)?;
        let io = frame.io([src], Some(out.span()), None)?;
        kernel(io.reads[0], io.main);
        frame.commit();
        Ok(out)
    }

    /// Elementwise sine.
    pub fn sin(&mut self, x: &Tensor) -> Result<Tensor, OpError> {
        self.unary(UnaryOp::Sin, x, None)
    }

    /// Elementwise cosine.
    pub fn cos(&mut self, x: &Tensor) -> Result<Tensor, OpError> {
        self.unary(UnaryOp::Cos, x, None)
    }

    /// Elementwise tangent.
    pub fn tan(&mut self, x: &Tensor) -> Result<Tensor, OpError> {
        self.unary(UnaryOp::Tan, x, None)
    }

    /// Elementwise normalised sinc.
    pub fn sinc(&mut self, x: &Tensor) -> Result<Tensor, OpError> {
        self.unary(UnaryOp::Sinc, x, None)
    }

    /// Elementwise natural logarithm.
    pub fn ln(&mut self, x: &Tensor) -> Result<Tensor, OpError> {
        self.unary(UnaryOp::Ln, x, None)
    }

    /// Elementwise base-2 logarithm.
    pub fn log2(&mut self, x: &Tensor) -> Result<Tensor, OpError> {
        self.unary(UnaryOp::Log2, x, None)
    }

    /// Elementwise base-10 logarithm.
    pub fn log10(&mut self, x: &Tensor) -> Result<Tensor, OpError> {
        self.unary(UnaryOp::Log10, x, None)
    }

    /// Elementwise exponential.
    pub fn exp(&mut self, x: &Tensor) -> Result<Tensor, OpError> {
        self.unary(UnaryOp::Exp, x, None)
    }

    /// Elementwise square root.
    pub fn sqrt(&mut self, x: &Tensor) -> Result<Tensor, OpError> {
        self.unary(UnaryOp::Sqrt, x, None)
    }

    /// Elementwise magnitude.
    pub fn abs(&mut self, x: &Tensor) -> Result<Tensor, OpError> {
        self.unary(UnaryOp::Abs, x, None)
    }

    /// Elementwise phase angle.
    pub fn angle(&mut self, x: &Tensor) -> Result<Tensor, OpError> {
        self.unary(UnaryOp::Angle, x, None)
    }

    /// Elementwise complex conjugate.
    pub fn conj(&mut self, x: &Tensor) -> Result<Tensor, OpError> {
        self.unary(UnaryOp::Conj, x, None)
    }

    /// Real part.
    pub fn real(&mut self, x: &Tensor) -> Result<Tensor, OpError> {
        self.unary(UnaryOp::Real, x, None)
    }

    /// Imaginary part.
    pub fn imag(&mut self, x: &Tensor) -> Result<Tensor, OpError> {
        self.unary(UnaryOp::Imag, x, None)
    }

    // ── Reductions ─────────────────────────────────────────────

    /// Reduce along `axis` (negative counts from the end).
    ///
    /// With `keep_dims` the axis stays with length 1; otherwise it is
    /// removed, except that a rank-1 input reduces to shape `[1]`.
    pub fn reduce(
        &mut self,
        op: ReduceOp,
        x: &Tensor,
        axis: isize,
        keep_dims: bool,
        out: Option<&Tensor>,
    ) -> Result<Tensor, OpError> {
        self.context.check(x)?;
        let kernel = self.kernels.reduce(op, x.dtype())?;
        let slot = x.shape().axis_slot(axis)?;
        let shape = x.shape().reduced(axis, keep_dims)?;
        check_output(&self.context, out, x.dtype(), shape)?;
        let layout = AxisLayout::new(x.shape(), slot);

        let mut frame = self.context.frame()?;
        let out = output(&mut frame, out, x.dtype(), shape, op.name())?;
        let src = input(&mut frame, x, &out)?;
        let io = frame.io([src], Some(out.span()), None)?;
        kernel(&layout, io.reads[0], io.main);
        frame.commit();
        Ok(out)
    }

    /// Sum along `axis`.
    pub fn sum(&mut self, x: &Tensor, axis: isize, keep_dims: bool) -> Result<Tensor, OpError> {
        self.reduce(ReduceOp::Sum, x, axis, keep_dims, None)
    }

    /// Mean along `axis`.
    pub fn mean(&mut self, x: &Tensor, axis: isize, keep_dims: bool) -> Result<Tensor, OpError> {
        self.reduce(ReduceOp::Mean, x, axis, keep_dims, None)
    }

    /// Maximum along `axis` (real dtypes only).
    pub fn max(&mut self, x: &Tensor, axis: isize, keep_dims: bool) -> Result<Tensor, OpError> {
        self.reduce(ReduceOp::Max, x, axis, keep_dims, None)
    }

    /// Minimum along `axis` (real dtypes only).
    pub fn min(&mut self, x: &Tensor, axis: isize, keep_dims: bool) -> Result<Tensor, OpError> {
        self.reduce(ReduceOp::Min, x, axis, keep_dims, None)
    }

    // ── FFT ────────────────────────────────────────────────────

    /// Cached plan for length `n` at the precision of `dtype`, building
    /// and caching it on a miss.
    ///
    /// The twiddle table is committed to the main region and outlives a
    /// transform that later fails.
    pub fn plan_fft(&mut self, n: usize, dtype: DType) -> Result<FftPlan, OpError> {
        if n == 0 {
            return Err(OpError::InvalidArgument {
                reason: "fft length must be at least 1".into(),
            });
        }
        let key = dtype.to_complex();
        let generation = self.context.generation();
        if let Some(plan) = self.plans.get(n, key, generation) {
            debug!(size = n, dtype = %key, "reusing fft plan");
            return Ok(plan.clone());
        }

        let bytes = n.checked_mul(key.size_of()).ok_or_else(|| OpError::InvalidArgument {
            reason: format!("fft length {n} exceeds addressable memory"),
        })?;
        let mut frame = self.context.frame()?;
        let span = frame.alloc_main(bytes)?;
        let io = frame.io([], Some(span), None)?;
        fill::twiddles(key, n, io.main);
        frame.commit();

        let plan = FftPlan::new(n, key, span, generation);
        debug!(size = n, dtype = %key, factors = ?plan.factors(), "created fft plan");
        self.plans.insert(plan.clone());
        Ok(plan)
    }

    /// Run one transform of `x` along `axis`.
    ///
    /// `n` pads the axis with zeros or crops it; it defaults to the axis
    /// length (or `2 (m - 1)` for [`FftKind::RealInverse`]).
    pub fn fft_with(
        &mut self,
        kind: FftKind,
        x: &Tensor,
        n: Option<usize>,
        axis: isize,
        out: Option<&Tensor>,
    ) -> Result<Tensor, OpError> {
        self.context.check(x)?;
        let kernel = self.kernels.fft(kind, x.dtype())?;
        let slot = x.shape().axis_slot(axis)?;
        let n = n.unwrap_or_else(|| kind.default_len(x.shape().padded()[slot]));
        if n == 0 {
            return Err(OpError::InvalidArgument {
                reason: format!("{kind} length must be at least 1"),
            });
        }
        let dtype = kind.output_dtype(x.dtype());
        let shape = x.shape().with_slot(slot, kind.output_len(n))?;
        shape.byte_len(dtype.size_of())?;
        check_output(&self.context, out, dtype, shape)?;

        let plan = self.plan_fft(n, x.dtype())?;
        let workers = self.workers;
        let work_bytes = FftJob::work_elements(n, workers)
            .and_then(|elements| elements.checked_mul(plan.dtype().size_of()))
            .ok_or_else(|| OpError::InvalidArgument {
                reason: format!("{kind} work buffer for length {n} exceeds addressable memory"),
            })?;
        let job = FftJob {
            input: AxisLayout::new(x.shape(), slot),
            output: AxisLayout::new(&shape, slot),
            n,
            factors: plan.factors(),
            workers,
        };

        let mut frame = self.context.frame()?;
        let out = output(&mut frame, out, dtype, shape, kind.name())?;
        let src = input(&mut frame, x, &out)?;
        let work = frame.alloc_scratch(work_bytes)?;
        let io = frame.io(
            [src, Source::Main(plan.twiddles())],
            Some(out.span()),
            Some(work),
        )?;
        kernel(&job, io.reads[0], io.reads[1], io.scratch, io.main);
        frame.commit();
        Ok(out)
    }

    /// Forward complex transform along the last axis.
    pub fn fft(&mut self, x: &Tensor, n: Option<usize>) -> Result<Tensor, OpError> {
        self.fft_with(FftKind::Forward, x, n, -1, None)
    }

    /// Inverse complex transform along the last axis, scaled by `1/n`.
    pub fn ifft(&mut self, x: &Tensor, n: Option<usize>) -> Result<Tensor, OpError> {
        self.fft_with(FftKind::Inverse, x, n, -1, None)
    }

    /// Forward transform of real input along the last axis.
    pub fn rfft(&mut self, x: &Tensor, n: Option<usize>) -> Result<Tensor, OpError> {
        self.fft_with(FftKind::RealForward, x, n, -1, None)
    }

    /// Inverse of [`Runtime::rfft`] along the last axis.
    pub fn irfft(&mut self, x: &Tensor, n: Option<usize>) -> Result<Tensor, OpError> {
        self.fft_with(FftKind::RealInverse, x, n, -1, None)
    }

    /// Bin frequencies of an `n`-point transform with sample spacing `d`.
    pub fn fftfreq(&mut self, n: usize, d: f64, dtype: DType) -> Result<Tensor, OpError> {
        check_spacing(n, d)?;
        let shape = Shape::new(&[n])?;
        self.generate(dtype, shape, "fftfreq", |out| fill::fftfreq(dtype, n, d, out))
    }

    /// The `n/2 + 1` non-negative bin frequencies of a real transform.
    pub fn rfftfreq(&mut self, n: usize, d: f64, dtype: DType) -> Result<Tensor, OpError> {
        check_spacing(n, d)?;
        let shape = Shape::new(&[n / 2 + 1])?;
        self.generate(dtype, shape, "rfftfreq", |out| fill::rfftfreq(dtype, n, d, out))
    }

    fn generate(
        &mut self,
        dtype: DType,
        shape: Shape,
        label: &str,
        write: impl FnOnce(&mut [u8]),
    ) -> Result<Tensor, OpError> {
        let mut frame = self.context.frame()?;
        let out = frame.alloc_tensor(dtype, shape, label)?;
        let io = frame.io([], Some(out.span()), None)?;
        write(io.main);
        frame.commit();
        Ok(out)
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("context", &self.context)
            .field("plans", &self.plans.len())
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

fn check_spacing(n: usize, d: f64) -> Result<(), OpError> {
    if n == 0 {
        return Err(OpError::InvalidArgument {
            reason: "frequency count must be at least 1".into(),
        });
    }
    if !d.is_finite() || d == 0.0 {
        return Err(OpError::InvalidArgument {
            reason: format!("sample spacing must be finite and non-zero, got {d}"),
        });
    }
    Ok(())
}

/// Eagerly validate a caller-supplied output descriptor.
fn check_output(
    context: &Context,
    out: Option<&Tensor>,
    dtype: DType,
    shape: Shape,
) -> Result<(), OpError> {
    let Some(out) = out else {
        return Ok(());
    };
    context.check(out)?;
    if out.dtype() != dtype {
        return Err(OpError::DtypeMismatch {
            expected: dtype,
            found: out.dtype(),
        });
    }
    if *out.shape() != shape {
        return Err(OpError::ShapeMismatch {
            expected: shape,
            found: *out.shape(),
        });
    }
    Ok(())
}

/// The caller's output, or a fresh allocation labelled after the op.
fn output(
    frame: &mut Frame<'_>,
    out: Option<&Tensor>,
    dtype: DType,
    shape: Shape,
    label: &str,
) -> Result<Tensor, OpError> {
    match out {
        Some(out) => Ok(*out),
        None => Ok(frame.alloc_tensor(dtype, shape, label)?),
    }
}

/// Where a kernel reads `x` from: in place, or from a scratch copy when
/// the output overwrites it.
fn input(frame: &mut Frame<'_>, x: &Tensor, out: &Tensor) -> Result<Source, OpError> {
    if x.span().overlaps(&out.span()) {
        Ok(Source::Scratch(frame.stage(x.span())?))
    } else {
        Ok(Source::from(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_arena::ArenaError;

    fn runtime() -> Runtime {
        Runtime::with_capacity(1 << 16, 1 << 14).unwrap()
    }

    #[test]
    fn binary_allocates_with_op_label() {
        let mut rt = runtime();
        let x = rt.arange(3, DType::Float32).unwrap();
        let y = rt.add(&x, &x).unwrap();
        assert_eq!(y.label(), "add");
        assert_eq!(rt.data::<f32>(&y).unwrap(), &[0.0, 2.0, 4.0]);
    }

    #[test]
    fn scalar_only_touches_scratch() {
        let mut rt = runtime();
        let x = rt.arange(4, DType::Float64).unwrap();
        let out = rt.tensor_1d(DType::Float64, 4).unwrap();
        let before = rt.usage();
        let y = rt.binary(BinaryOp::Mul, &x, 2.0, Some(&out)).unwrap();
        assert_eq!(y, out);
        assert_eq!(rt.usage(), before);
        assert_eq!(rt.data::<f64>(&y).unwrap(), &[0.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn rejected_output_allocates_nothing() {
        let mut rt = runtime();
        let x = rt.tensor_2d(DType::Float32, 2, 2).unwrap();
        let wrong = rt.tensor_1d(DType::Float32, 4).unwrap();
        let before = rt.usage();
        let err = rt.unary(UnaryOp::Exp, &x, Some(&wrong)).unwrap_err();
        assert!(matches!(err, OpError::ShapeMismatch { .. }));
        assert_eq!(rt.usage(), before);
    }

    #[test]
    fn cast_to_same_dtype_is_identity() {
        let mut rt = runtime();
        let x = rt.tensor_1d(DType::Complex64, 2).unwrap();
        assert_eq!(rt.cast(&x, DType::Complex64).unwrap(), x);
    }

    #[test]
    fn plan_is_reused_and_dropped_on_clear() {
        let mut rt = runtime();
        let a = rt.plan_fft(8, DType::Float64).unwrap();
        let b = rt.plan_fft(8, DType::Complex128).unwrap();
        assert_eq!(a, b);
        assert_eq!(rt.plans().hits(), 1);
        rt.clear().unwrap();
        assert!(rt.plans().is_empty());
        let c = rt.plan_fft(8, DType::Complex128).unwrap();
        assert_eq!(c.generation(), 1);
    }

    #[test]
    fn zero_length_transforms_rejected() {
        let mut rt = runtime();
        assert!(matches!(
            rt.plan_fft(0, DType::Float32),
            Err(OpError::InvalidArgument { .. })
        ));
        let x = rt.tensor_1d(DType::Complex64, 1).unwrap();
        assert!(matches!(
            rt.irfft(&x, None),
            Err(OpError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn torn_down_runtime_rejects_everything() {
        let mut rt = runtime();
        let x = rt.tensor_1d(DType::Float32, 1).unwrap();
        rt.teardown().unwrap();
        assert_eq!(rt.sin(&x).unwrap_err(), OpError::Arena(ArenaError::TornDown));
        assert!(matches!(
            rt.arange(2, DType::Float32),
            Err(OpError::Arena(ArenaError::TornDown))
        ));
        assert_eq!(rt.teardown(), Err(OpError::Arena(ArenaError::TornDown)));
    }
}
