//! `repr(C)` records exchanged across the boundary.

use strata_arena::{ArenaConfig, ArenaUsage, Label, Span, Tensor, LABEL_CAPACITY};
use strata_core::{ContextId, DType, Shape, MAX_DIMS};
use strata_ops::RuntimeConfig;

use crate::status::StrataStatus;

/// Maximum tensor rank.
pub const STRATA_MAX_DIMS: usize = 4;

/// Bytes reserved for a tensor label, including the terminating NUL.
pub const STRATA_LABEL_BYTES: usize = 32;

const _: () = assert!(STRATA_MAX_DIMS == MAX_DIMS);
const _: () = assert!(STRATA_LABEL_BYTES == LABEL_CAPACITY);

/// A tensor descriptor as plain data.
///
/// Hosts treat the record as opaque apart from `dtype`, `rank` and
/// `dims`. Every call validates it against the live context, so a record
/// kept across `strata_ctx_clear` is reported as
/// [`StrataStatus::StaleTensor`] rather than reading reused memory.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StrataTensor {
    /// Id of the context that allocated the tensor.
    pub context: u64,
    /// Context generation at allocation time.
    pub generation: u32,
    /// Dtype code (0 = float32, 1 = float64, 2 = complex64, 3 = complex128).
    pub dtype: i32,
    /// Number of dimensions.
    pub rank: u32,
    /// Dimensions; the first `rank` entries are meaningful.
    pub dims: [usize; STRATA_MAX_DIMS],
    /// Byte offset of the data in the context's main region.
    pub offset: usize,
    /// Length of the data in bytes.
    pub byte_len: usize,
    /// NUL-terminated diagnostic label.
    pub label: [u8; STRATA_LABEL_BYTES],
}

impl From<&Tensor> for StrataTensor {
    fn from(t: &Tensor) -> Self {
        let mut dims = [0; STRATA_MAX_DIMS];
        dims[..t.rank()].copy_from_slice(t.dims());
        let mut label = [0; STRATA_LABEL_BYTES];
        label[..t.label().len()].copy_from_slice(t.label().as_bytes());
        Self {
            context: t.context().raw(),
            generation: t.generation(),
            dtype: t.dtype().code(),
            rank: t.rank() as u32,
            dims,
            offset: t.span().offset,
            byte_len: t.byte_len(),
            label,
        }
    }
}

impl StrataTensor {
    /// Rebuild the descriptor.
    ///
    /// Fails on an unknown dtype code, a malformed rank or shape, or a
    /// misaligned offset. Span and generation are checked later, against
    /// the context.
    pub fn to_tensor(&self) -> Result<Tensor, StrataStatus> {
        let dtype = DType::from_code(self.dtype).ok_or(StrataStatus::UnsupportedDtype)?;
        if self.offset % ArenaConfig::ALIGNMENT != 0 {
            return Err(StrataStatus::InvalidArgument);
        }
        let rank = self.rank as usize;
        if rank == 0 || rank > STRATA_MAX_DIMS {
            return Err(StrataStatus::InvalidRank);
        }
        let shape = Shape::new(&self.dims[..rank]).map_err(|e| StrataStatus::from(&e))?;
        let end = self
            .label
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(STRATA_LABEL_BYTES);
        let label = Label::new(&String::from_utf8_lossy(&self.label[..end]));
        Ok(Tensor::from_raw_parts(
            ContextId::from_raw(self.context),
            self.generation,
            Span::new(self.offset, self.byte_len),
            shape,
            dtype,
            label,
        ))
    }
}

/// Region usage of a context.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StrataUsage {
    /// Bytes allocated in the main region.
    pub main_used: usize,
    /// Main region capacity.
    pub main_capacity: usize,
    /// Bytes allocated in the scratch region.
    pub scratch_used: usize,
    /// Scratch region capacity.
    pub scratch_capacity: usize,
    /// Number of clears (plus one after teardown).
    pub generation: u32,
}

impl From<ArenaUsage> for StrataUsage {
    fn from(u: ArenaUsage) -> Self {
        Self {
            main_used: u.main_used,
            main_capacity: u.main_capacity,
            scratch_used: u.scratch_used,
            scratch_capacity: u.scratch_capacity,
            generation: u.generation,
        }
    }
}

/// Full runtime configuration for `strata_ctx_init_config`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrataConfig {
    /// Main region capacity in bytes.
    pub main_bytes: usize,
    /// Scratch region capacity in bytes.
    pub scratch_bytes: usize,
    /// FFT worker threads; 0 picks the number of CPUs.
    pub fft_workers: u32,
    /// Maximum cached FFT plans.
    pub max_fft_plans: usize,
    /// Seed for `strata_randn`.
    pub seed: u64,
}

impl Default for StrataConfig {
    fn default() -> Self {
        let config = RuntimeConfig::default();
        Self {
            main_bytes: config.arena.main_bytes,
            scratch_bytes: config.arena.scratch_bytes,
            fft_workers: 1,
            max_fft_plans: config.max_fft_plans,
            seed: config.seed,
        }
    }
}

impl From<&StrataConfig> for RuntimeConfig {
    fn from(c: &StrataConfig) -> Self {
        let mut config = RuntimeConfig::default();
        config.arena.main_bytes = c.main_bytes;
        config.arena.scratch_bytes = c.scratch_bytes;
        config.fft_workers = Some(c.fft_workers as usize);
        config.max_fft_plans = c.max_fft_plans;
        config.seed = c.seed;
        config
    }
}
