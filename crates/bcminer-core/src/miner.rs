//! Multi-threaded nonce search.
//!
//! A search runs a fixed pool of workers: `concurrency - 1` scoped threads
//! plus the calling thread. Workers share the search context and two atomics:
//! the result cell (first compare-and-set wins) and the stop signal, checked
//! once per nonce. Two workers may match concurrently near the target
//! boundary; either nonce is a valid proof of work.
//!
//! Hash counters are written by their owning worker and read without
//! synchronization by [`Miner::stats`], possibly while a search runs.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use tracing::{debug, info, warn};
use crate::config::MinerConfig;
use crate::error::{Error, Result};
use crate::header::BlockHeader;
use crate::sha256d::digest_words;
use crate::stats::MinerStats;
use crate::worker::{NonceWorker, SearchContext, WorkerStatus};

const NO_NONCE: u64 = u64::MAX;

/// Write-once result cell.
#[derive(Debug)]
struct ResultCell(AtomicU64);

impl ResultCell {
    fn new() -> Self {
        ResultCell(AtomicU64::new(NO_NONCE))
    }

    /// Returns false if another worker published first.
    fn publish(&self, nonce: u32) -> bool {
        self.0
            .compare_exchange(NO_NONCE, nonce as u64, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn get(&self) -> Option<u32> {
        match self.0.load(Ordering::Acquire) {
            NO_NONCE => None,
            nonce => Some(nonce as u32),
        }
    }
}

/// State shared by the workers of one search.
struct Round<'a> {
    ctx: &'a SearchContext,
    start_nonce: u32,
    result: ResultCell,
    stop: AtomicBool,
}

/// Raises the stop signal when the owning worker unwinds.
struct StopOnPanic<'a>(&'a AtomicBool);

impl Drop for StopOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(true, Ordering::Release);
        }
    }
}

/// Clears the running flag when a search ends.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// CPU miner with a fixed number of workers.
#[derive(Debug)]
pub struct Miner {
    concurrency: usize,
    /// Hashes computed by each worker during the current or last search.
    counters: Box<[AtomicU64]>,
    running: AtomicBool,
}

impl Miner {
    /// Create a miner running `concurrency` workers, the caller included.
    pub fn new(concurrency: usize) -> Result<Self> {
        if concurrency == 0 || concurrency > u32::MAX as usize {
            return Err(Error::InvalidConcurrency(concurrency));
        }

        Ok(Miner {
            concurrency,
            counters: (0..concurrency).map(|_| AtomicU64::new(0)).collect(),
            running: AtomicBool::new(false),
        })
    }

    /// Create a miner from configuration.
    pub fn from_config(config: &MinerConfig) -> Result<Self> {
        Self::new(config.resolved_threads())
    }

    /// Number of workers.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Whether a search is in progress.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Search `[start_nonce, 0xFFFFFFFF]` for a nonce meeting the header's target.
    ///
    /// Blocks until a worker finds one (`Some`) or the range is exhausted
    /// (`None`). A worker panic stops the pool and is returned as
    /// [`Error::WorkerPanicked`].
    pub fn search(&self, header: &BlockHeader, start_nonce: u32) -> Result<Option<u32>> {
        self.search_with(header, start_nonce, Self::run_worker)
    }

    /// [`Miner::search`] running `work` as the body of every worker.
    fn search_with<W>(&self, header: &BlockHeader, start_nonce: u32, work: W) -> Result<Option<u32>>
    where
        W: Fn(&Self, &Round<'_>, usize) + Sync,
    {
        let ctx = SearchContext::new(header)?;

        if self.running.swap(true, Ordering::AcqRel) {
            return Err(Error::AlreadyMining);
        }
        let _running = RunningGuard(&self.running);

        for counter in self.counters.iter() {
            counter.store(0, Ordering::Relaxed);
        }

        info!(
            "Starting search from nonce {:#010x} with {} workers, {} zero bytes required",
            start_nonce,
            self.concurrency,
            ctx.predicate.zero_bytes()
        );

        let round = Round {
            ctx: &ctx,
            start_nonce,
            result: ResultCell::new(),
            stop: AtomicBool::new(false),
        };

        if let Some(err) = self.run_pool(&round, &work) {
            warn!("Search aborted: {}", err);
            return Err(err);
        }

        let total_hashes = self.stats(0.0).total_hashes;
        match round.result.get() {
            Some(nonce) => {
                let solved = header.with_nonce(nonce);
                if !ctx.predicate.test(&digest_words(&solved.block_hash())) {
                    warn!("Nonce {} does not verify against the reference hash", nonce);
                }
                info!(
                    "Found nonce {} after {} hashes, block hash {}",
                    nonce,
                    total_hashes,
                    solved.block_hash_display()
                );
                Ok(Some(nonce))
            }
            None => {
                info!(
                    "Nonce space exhausted from {:#010x} after {} hashes",
                    start_nonce, total_hashes
                );
                Ok(None)
            }
        }
    }

    /// Start the pool, run the last worker on this thread and join the rest.
    ///
    /// Returns the first failure observed.
    fn run_pool<W>(&self, round: &Round<'_>, work: &W) -> Option<Error>
    where
        W: Fn(&Self, &Round<'_>, usize) + Sync,
    {
        let last = self.concurrency - 1;

        thread::scope(|scope| {
            let mut failure = None;
            let mut handles = Vec::with_capacity(last);

            for index in 0..last {
                let spawned = thread::Builder::new()
                    .name(format!("bcminer-{}", index))
                    .spawn_scoped(scope, move || {
                        let _guard = StopOnPanic(&round.stop);
                        work(self, round, index)
                    });
                match spawned {
                    Ok(handle) => handles.push((index, handle)),
                    Err(e) => {
                        round.stop.store(true, Ordering::Release);
                        failure = Some(Error::Spawn(e.to_string()));
                        break;
                    }
                }
            }

            if failure.is_none() {
                let own = panic::catch_unwind(AssertUnwindSafe(|| {
                    let _guard = StopOnPanic(&round.stop);
                    work(self, round, last)
                }));
                if let Err(payload) = own {
                    failure = Some(Error::WorkerPanicked {
                        worker: last,
                        message: panic_message(payload.as_ref()),
                    });
                }
            }

            for (index, handle) in handles {
                if let Err(payload) = handle.join() {
                    failure.get_or_insert_with(|| Error::WorkerPanicked {
                        worker: index,
                        message: panic_message(payload.as_ref()),
                    });
                }
            }

            failure
        })
    }

    fn run_worker(&self, round: &Round<'_>, index: usize) {
        let counter = &self.counters[index];
        let mut worker = NonceWorker::new(round.start_nonce, index as u32, self.concurrency as u32);

        let status = worker.mine(round.ctx, u64::MAX, |hashes| {
            counter.store(hashes, Ordering::Relaxed);
            !round.stop.load(Ordering::Relaxed)
        });
        counter.store(worker.hashes(), Ordering::Relaxed);

        match status {
            WorkerStatus::Found(nonce) => {
                if round.result.publish(nonce) {
                    debug!("Worker {} matched nonce {} after {} hashes", index, nonce, worker.hashes());
                } else {
                    debug!("Worker {} matched nonce {} after another worker", index, nonce);
                }
                round.stop.store(true, Ordering::Release);
            }
            WorkerStatus::Exhausted => {
                debug!("Worker {} exhausted its nonces after {} hashes", index, worker.hashes());
            }
            WorkerStatus::Stopped => {
                debug!("Worker {} stopped after {} hashes", index, worker.hashes());
            }
        }
    }

    /// Snapshot of the hash counters over `elapsed_secs`.
    ///
    /// Safe to call while a search runs; the counts may be slightly stale.
    pub fn stats(&self, elapsed_secs: f64) -> MinerStats {
        MinerStats::from_counts(
            self.counters.iter().map(|counter| counter.load(Ordering::Relaxed)),
            elapsed_secs,
        )
    }

    /// Hashes computed by each worker.
    pub fn worker_hashes(&self) -> Vec<u64> {
        self.counters
            .iter()
            .map(|counter| counter.load(Ordering::Relaxed))
            .collect()
    }
}

/// Search `[start_nonce, 0xFFFFFFFF]` with a fresh miner of `concurrency` workers.
pub fn search(header: &BlockHeader, start_nonce: u32, concurrency: usize) -> Result<Option<u32>> {
    Miner::new(concurrency)?.search(header, start_nonce)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
