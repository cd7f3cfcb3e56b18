//! Runtime configuration for the built-in natives
//!
//! Thread counts and read-pool sizes arrive from the host as plain integers.
//! `NativeConfig` holds the limits they are normalized against.

use crate::io::compression::{MMAP_THRESHOLD, PARALLEL_BLOCK_COUNT};
use std::num::NonZeroUsize;

/// Environment variable capping worker threads
pub const ENV_MAX_THREADS: &str = "SPLICEWIZ_MAX_THREADS";

/// Environment variable overriding the default read pool (blocks per batch)
pub const ENV_READ_POOL: &str = "SPLICEWIZ_READ_POOL";

/// Limits applied to host-supplied thread and pool arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeConfig {
    /// Upper bound on worker threads for any single call
    pub max_threads: usize,
    /// Blocks per decompression batch when the host passes a non-positive pool
    pub read_pool: usize,
    /// Files at or above this size are memory-mapped
    pub mmap_threshold: u64,
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            max_threads: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            read_pool: PARALLEL_BLOCK_COUNT,
            mmap_threshold: MMAP_THRESHOLD,
        }
    }
}

impl NativeConfig {
    /// Defaults, overridden by `SPLICEWIZ_MAX_THREADS` and `SPLICEWIZ_READ_POOL`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(n) = positive_env(ENV_MAX_THREADS) {
            config.max_threads = n;
        }
        if let Some(n) = positive_env(ENV_READ_POOL) {
            config.read_pool = n;
        }
        config
    }

    /// Clamp a host thread count into `1..=max_threads`
    pub fn threads(&self, requested: i32) -> usize {
        if requested < 1 {
            log::warn!("n_threads = {} is not positive, using 1 thread", requested);
            return 1;
        }
        let requested = requested as usize;
        if requested > self.max_threads {
            log::warn!(
                "n_threads = {} exceeds the {} available, using {}",
                requested,
                self.max_threads,
                self.max_threads
            );
            return self.max_threads.max(1);
        }
        requested
    }

    /// Host read-pool size, falling back to the configured default
    pub fn read_pool(&self, requested: i32) -> usize {
        if requested < 1 {
            self.read_pool.max(1)
        } else {
            requested as usize
        }
    }
}

fn positive_env(key: &str) -> Option<usize> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            log::warn!("ignoring {}={:?}: expected a positive integer", key, raw);
            None
        }
    }
}
