//! Runtime configuration.

use strata_arena::{ArenaConfig, ArenaError};

/// Configuration for a [`Runtime`](crate::Runtime).
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeConfig {
    /// Region capacities.
    pub arena: ArenaConfig,
    /// Threads used to transform independent lanes of one FFT.
    ///
    /// `None` runs transforms on the calling thread. `Some(0)` picks the
    /// number of available CPUs. Other values are clamped to `1..=64`.
    pub fft_workers: Option<usize>,
    /// Maximum number of cached FFT plans before the oldest is evicted.
    pub max_fft_plans: usize,
    /// Seed for the random-normal fill.
    pub seed: u64,
}

impl RuntimeConfig {
    /// Default plan cache capacity.
    pub const DEFAULT_MAX_FFT_PLANS: usize = 16;

    /// Default RNG seed.
    pub const DEFAULT_SEED: u64 = 0;

    /// Upper bound on FFT worker threads.
    pub const MAX_FFT_WORKERS: usize = 64;

    /// Config with the given arena and defaults for everything else.
    pub fn new(arena: ArenaConfig) -> Self {
        Self {
            arena,
            fft_workers: None,
            max_fft_plans: Self::DEFAULT_MAX_FFT_PLANS,
            seed: Self::DEFAULT_SEED,
        }
    }

    /// Effective FFT worker count.
    pub fn resolved_fft_workers(&self) -> usize {
        match self.fft_workers {
            None => 1,
            Some(0) => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .clamp(1, Self::MAX_FFT_WORKERS),
            Some(n) => n.clamp(1, Self::MAX_FFT_WORKERS),
        }
    }

    /// Validate the arena and plan-cache settings.
    pub fn validate(&self) -> Result<(), ArenaError> {
        self.arena.validate()?;
        if self.max_fft_plans == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "max_fft_plans must be at least 1".into(),
            });
        }
        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(ArenaConfig::default())
    }
}
