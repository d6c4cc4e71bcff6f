//! Benchmark supervisor: run a search while reporting progress.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;
use crate::error::{Error, Result};
use crate::header::BlockHeader;
use crate::miner::Miner;
use crate::stats::MinerStats;

/// Outcome of [`run_bench`].
#[derive(Debug, Clone, PartialEq)]
pub struct BenchReport {
    /// Matching nonce, if any.
    pub nonce: Option<u32>,
    /// Work done over the whole run.
    pub stats: MinerStats,
    /// Wall time of the run.
    pub elapsed: Duration,
}

/// Start nonce placing the header's recorded nonce `lead` trials ahead.
///
/// A `lead` of 0 searches from the beginning of the nonce space.
pub fn bench_start_nonce(header: &BlockHeader, lead: u32) -> u32 {
    if lead == 0 {
        0
    } else {
        header.nonce().wrapping_sub(lead)
    }
}

/// Search from `start_nonce` on a background thread, logging the miner's
/// stats every `report_interval` until the search ends.
pub fn run_bench(
    miner: &Miner,
    header: &BlockHeader,
    start_nonce: u32,
    report_interval: Duration,
) -> Result<BenchReport> {
    let started = Instant::now();
    let (done_tx, done_rx) = mpsc::channel::<()>();

    let nonce = thread::scope(|scope| -> Result<Option<u32>> {
        let handle = thread::Builder::new()
            .name("bcminer-search".to_string())
            .spawn_scoped(scope, move || {
                let result = miner.search(header, start_nonce);
                let _ = done_tx.send(());
                result
            })
            .map_err(|e| Error::Spawn(e.to_string()))?;

        loop {
            match done_rx.recv_timeout(report_interval) {
                Err(RecvTimeoutError::Timeout) => {
                    info!("{}", miner.stats(started.elapsed().as_secs_f64()));
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        handle.join().unwrap_or_else(|_| {
            Err(Error::WorkerPanicked {
                worker: miner.concurrency() - 1,
                message: "search thread panicked".to_string(),
            })
        })
    })?;

    let elapsed = started.elapsed();
    let stats = miner.stats(elapsed.as_secs_f64());
    match nonce {
        Some(nonce) => info!("Matched nonce {} in {:.3} s: {}", nonce, elapsed.as_secs_f64(), stats),
        None => info!("No nonce found in {:.3} s: {}", elapsed.as_secs_f64(), stats),
    }

    Ok(BenchReport {
        nonce,
        stats,
        elapsed,
    })
}
