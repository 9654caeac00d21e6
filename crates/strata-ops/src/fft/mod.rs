//! Discrete Fourier transforms.
//!
//! ```text
//!   plan_fft(n, dtype) ──► PlanCache ──hit──► FftPlan { factors, twiddles }
//!                              │
//!                              └─miss──► factorize(n), twiddles in main region
//!
//!   fft(x) ──► plan ──► FftJob ──► kernel: per lane
//!                                    gather (pad/crop) ─► mixed-radix ─► scatter
//! ```
//!
//! Transforms are exact for every length: `n` is split into small
//! factors and each level of the recursion combines `p` sub-transforms
//! of length `n / p`. Lanes along the transform axis are independent and
//! may be split across worker threads.

mod plan;
mod transform;

pub use plan::{FftPlan, PlanCache};

pub(crate) use transform::kernel;

use crate::layout::AxisLayout;

/// Geometry of one transform call, shared by every lane.
#[derive(Clone, Copy, Debug)]
pub struct FftJob<'a> {
    /// Input tensor split around the transform axis.
    pub(crate) input: AxisLayout,
    /// Output tensor split around the transform axis.
    pub(crate) output: AxisLayout,
    /// Transform length.
    pub(crate) n: usize,
    /// Radix sequence from the plan.
    pub(crate) factors: &'a [usize],
    /// Worker threads allowed for this call.
    pub(crate) workers: usize,
}

impl FftJob<'_> {
    /// Complex work elements a kernel needs: two length-`n` buffers per
    /// worker. `None` if the count overflows.
    pub fn work_elements(n: usize, workers: usize) -> Option<usize> {
        n.checked_mul(2)?.checked_mul(workers.max(1))
    }
}
