//! Arena configuration parameters.

use crate::error::ArenaError;

/// Capacities of the two context regions.
///
/// Validated at context creation; immutable afterwards. Resizing a live
/// context is not supported: tear it down and create a new one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Main region capacity in bytes (tensor storage and FFT twiddles).
    ///
    /// Default: 64 MiB.
    pub main_bytes: usize,

    /// Scratch region capacity in bytes (per-operation transient buffers).
    ///
    /// Default: 16 MiB.
    pub scratch_bytes: usize,
}

impl ArenaConfig {
    /// Default main region capacity.
    pub const DEFAULT_MAIN_BYTES: usize = 64 * 1024 * 1024;

    /// Default scratch region capacity.
    pub const DEFAULT_SCRATCH_BYTES: usize = 16 * 1024 * 1024;

    /// Alignment of every span handed out by a region.
    pub const ALIGNMENT: usize = 16;

    /// Fraction of total system memory given to each region by
    /// [`ArenaConfig::from_system_memory`].
    pub const SYSTEM_MEMORY_FRACTION: f64 = 0.1;

    /// Assumed total memory when the system total cannot be read.
    pub const FALLBACK_SYSTEM_MEMORY: usize = 1024 * 1024 * 1024;

    /// Create a config with explicit capacities.
    pub fn new(main_bytes: usize, scratch_bytes: usize) -> Self {
        Self {
            main_bytes,
            scratch_bytes,
        }
    }

    /// Size both regions at [`Self::SYSTEM_MEMORY_FRACTION`] of total
    /// system memory.
    pub fn from_system_memory() -> Self {
        let total = system_memory_bytes().unwrap_or(Self::FALLBACK_SYSTEM_MEMORY);
        let share = (total as f64 * Self::SYSTEM_MEMORY_FRACTION) as usize;
        Self::new(share, share)
    }

    /// Combined capacity of both regions.
    pub fn total_bytes(&self) -> usize {
        self.main_bytes.saturating_add(self.scratch_bytes)
    }

    /// Check that both regions have non-zero capacity.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.main_bytes == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "main region capacity must be non-zero".into(),
            });
        }
        if self.scratch_bytes == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "scratch region capacity must be non-zero".into(),
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAIN_BYTES, Self::DEFAULT_SCRATCH_BYTES)
    }
}

/// Total physical memory in bytes, read from `/proc/meminfo`.
///
/// Returns `None` on platforms without procfs or if the file is
/// malformed.
pub fn system_memory_bytes() -> Option<usize> {
    let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
    parse_mem_total(&meminfo)
}

fn parse_mem_total(meminfo: &str) -> Option<usize> {
    let line = meminfo.lines().find(|l| l.starts_with("MemTotal:"))?;
    let kib: usize = line.split_whitespace().nth(1)?.parse().ok()?;
    kib.checked_mul(1024)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_regions_are_nonzero() {
        let config = ArenaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.main_bytes, 64 * 1024 * 1024);
    }

    #[test]
    fn zero_capacity_rejected() {
        assert!(matches!(
            ArenaConfig::new(0, 1024).validate(),
            Err(ArenaError::InvalidConfig { .. })
        ));
        assert!(matches!(
            ArenaConfig::new(1024, 0).validate(),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn mem_total_parsed_from_kib() {
        let sample = "MemTotal:       16384 kB\nMemFree:        1024 kB\n";
        assert_eq!(parse_mem_total(sample), Some(16384 * 1024));
        assert_eq!(parse_mem_total("MemFree: 1 kB"), None);
    }

    #[test]
    fn system_sizing_uses_a_tenth() {
        let config = ArenaConfig::from_system_memory();
        assert_eq!(config.main_bytes, config.scratch_bytes);
        let total = system_memory_bytes().unwrap_or(ArenaConfig::FALLBACK_SYSTEM_MEMORY);
        assert!(config.main_bytes <= total / 10 + 1);
    }
}
