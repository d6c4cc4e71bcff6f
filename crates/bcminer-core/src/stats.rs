//! Hash counting statistics.

use alloc::format;
use alloc::string::String;
use core::fmt;

/// Lower bound on the elapsed time used for rates.
const MIN_ELAPSED_SECS: f64 = 1e-8;

/// Snapshot of the work done by a search.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MinerStats {
    /// Total hashes computed across all workers.
    pub total_hashes: u64,
    /// Seconds the snapshot refers to.
    pub elapsed_secs: f64,
    /// Hashes per second.
    pub hash_rate: f64,
}

impl MinerStats {
    /// Stats for `total_hashes` computed in `elapsed_secs`.
    pub fn new(total_hashes: u64, elapsed_secs: f64) -> Self {
        MinerStats {
            total_hashes,
            elapsed_secs,
            hash_rate: total_hashes as f64 / elapsed_secs.max(MIN_ELAPSED_SECS),
        }
    }

    /// Sum per-worker counters.
    pub fn from_counts<I>(counts: I, elapsed_secs: f64) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        Self::new(counts.into_iter().sum(), elapsed_secs)
    }

    /// Format hash rate for display.
    pub fn format_hash_rate(&self) -> String {
        if self.hash_rate >= 1_000_000_000.0 {
            format!("{:.2} GH/s", self.hash_rate / 1_000_000_000.0)
        } else if self.hash_rate >= 1_000_000.0 {
            format!("{:.2} MH/s", self.hash_rate / 1_000_000.0)
        } else if self.hash_rate >= 1_000.0 {
            format!("{:.2} KH/s", self.hash_rate / 1_000.0)
        } else {
            format!("{:.2} H/s", self.hash_rate)
        }
    }
}

impl fmt::Display for MinerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Hashed {:.2} million: {:.2} million hash/s",
            self.total_hashes as f64 * 1e-6,
            self.hash_rate * 1e-6
        )
    }
}
