//! Miner configuration.

use std::time::Duration;

/// CPU miner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinerConfig {
    /// Number of workers, including the calling thread (0 = all logical cores).
    pub threads: usize,
    /// Interval between progress reports of the bench supervisor.
    pub report_interval: Duration,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            report_interval: Duration::from_secs(1),
        }
    }
}

impl MinerConfig {
    /// Config using `threads` workers.
    pub fn with_threads(threads: usize) -> Self {
        Self {
            threads,
            ..Self::default()
        }
    }

    /// Number of workers to start.
    pub fn resolved_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}
