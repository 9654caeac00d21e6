//! FFT plans and their cache.

use indexmap::IndexMap;
use smallvec::SmallVec;
use strata_arena::Span;
use strata_core::DType;
use tracing::debug;

/// Precomputed data for transforms of one length and precision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FftPlan {
    size: usize,
    dtype: DType,
    twiddles: Span,
    factors: SmallVec<[usize; 16]>,
    generation: u32,
}

impl FftPlan {
    pub(crate) fn new(size: usize, dtype: DType, twiddles: Span, generation: u32) -> Self {
        Self {
            size,
            dtype,
            twiddles,
            factors: factorize(size),
            generation,
        }
    }

    /// Transform length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Complex dtype of the twiddle table.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Location of the `size` twiddle factors in the main region.
    pub fn twiddles(&self) -> Span {
        self.twiddles
    }

    /// Radix of each recursion level, outermost first.
    pub fn factors(&self) -> &[usize] {
        &self.factors
    }

    /// Context generation the twiddles were written in.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Split `n` into radices: fours, then twos, then odd primes.
///
/// Returns an empty list for `n <= 1`.
pub(crate) fn factorize(mut n: usize) -> SmallVec<[usize; 16]> {
    let mut factors = SmallVec::new();
    for radix in [4, 2] {
        while n > 1 && n % radix == 0 {
            factors.push(radix);
            n /= radix;
        }
    }
    let mut p = 3;
    while p * p <= n {
        while n % p == 0 {
            factors.push(p);
            n /= p;
        }
        p += 2;
    }
    if n > 1 {
        factors.push(n);
    }
    factors
}

/// Bounded, insertion-ordered cache of [`FftPlan`]s keyed by
/// `(size, twiddle dtype)`.
///
/// Plans remember the context generation they were built in; a lookup
/// that finds a plan from an older generation drops it and misses.
/// Twiddle storage of an evicted plan is reclaimed only when the context
/// is cleared.
#[derive(Debug)]
pub struct PlanCache {
    plans: IndexMap<(usize, DType), FftPlan>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl PlanCache {
    /// An empty cache holding at most `capacity` plans.
    pub fn new(capacity: usize) -> Self {
        Self {
            plans: IndexMap::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a live plan.
    pub fn get(&mut self, size: usize, dtype: DType, generation: u32) -> Option<&FftPlan> {
        match self.plans.get_index_of(&(size, dtype)) {
            Some(i) if self.plans[i].generation == generation => {
                self.hits += 1;
                self.plans.get_index(i).map(|(_, plan)| plan)
            }
            Some(i) => {
                self.plans.shift_remove_index(i);
                self.misses += 1;
                debug!(size, %dtype, generation, "dropped stale fft plan");
                None
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Insert a plan, evicting the oldest if the cache is full.
    pub fn insert(&mut self, plan: FftPlan) {
        let key = (plan.size, plan.dtype);
        if !self.plans.contains_key(&key) && self.plans.len() >= self.capacity {
            if let Some((_, old)) = self.plans.shift_remove_index(0) {
                debug!(size = old.size, dtype = %old.dtype, "evicted fft plan");
            }
        }
        self.plans.insert(key, plan);
    }

    /// Drop every plan.
    pub fn clear(&mut self) {
        self.plans.clear();
    }

    /// Number of cached plans.
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// Whether no plans are cached.
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Maximum number of plans.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lookups that found a live plan.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that found nothing or a stale plan.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}
