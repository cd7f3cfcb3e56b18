//! Parallelism availability and self-test

use crate::config::NativeConfig;
use crate::error::{Result, SpliceWizError};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Iterations in the self-test loop
pub const SELF_TEST_ITERATIONS: u64 = 1_000_000;

/// Build a dedicated pool with `threads` workers
pub fn build_pool(threads: usize) -> Result<Arc<ThreadPool>> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|i| format!("splicewiz-worker-{}", i))
        .build()
        .map(Arc::new)
        .map_err(|e| SpliceWizError::ThreadPool(e.to_string()))
}

/// Worker threads in the global pool
pub fn available_threads() -> usize {
    rayon::current_num_threads()
}

/// Outcome of [`self_test`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfTestReport {
    /// Threads in the pool the loop ran on
    pub pool_threads: usize,
    /// Distinct worker threads that executed at least one iteration
    pub threads_observed: usize,
    /// Sum computed by the parallel loop
    pub sum: u64,
    /// Closed-form expected sum
    pub expected: u64,
}

impl SelfTestReport {
    /// True if the parallel sum matches the closed form
    pub fn passed(&self) -> bool {
        self.sum == self.expected
    }
}

/// Sum `0..iterations` on a pool of `config.max_threads` workers
pub fn self_test(config: &NativeConfig, iterations: u64) -> Result<SelfTestReport> {
    let pool = build_pool(config.max_threads)?;

    let (sum, workers) = pool.install(|| {
        (0..iterations)
            .into_par_iter()
            .fold(
                || (0u64, BTreeSet::new()),
                |(sum, mut workers), i| {
                    if let Some(idx) = rayon::current_thread_index() {
                        workers.insert(idx);
                    }
                    (sum + i, workers)
                },
            )
            .reduce(
                || (0u64, BTreeSet::new()),
                |(a, mut wa), (b, wb)| {
                    wa.extend(wb);
                    (a + b, wa)
                },
            )
    });

    let expected = iterations.saturating_sub(1) * iterations / 2;
    Ok(SelfTestReport {
        pool_threads: pool.current_num_threads(),
        threads_observed: workers.len(),
        sum,
        expected,
    })
}
