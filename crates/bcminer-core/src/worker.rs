//! One worker's walk through the nonce space.
//!
//! Worker `index` of `concurrency` tries `start + index`,
//! `start + index + concurrency`, ... up to and including `0xFFFFFFFF`.
//! The walk never wraps: together the workers cover `[start, 0xFFFFFFFF]`
//! exactly once.

use crate::error::Result;
use crate::header::{BlockHeader, TailWords};
use crate::predicate::HashPredicate;
use crate::sha256d::{compute_midstate, double_hash_into, Midstate, Scratch};

const LAST_NONCE: u64 = u32::MAX as u64;

/// Everything derived once per header, shared read-only by all workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchContext {
    /// First-block chaining value.
    pub midstate: Midstate,
    /// Second-block header words.
    pub tail: TailWords,
    /// Target test.
    pub predicate: HashPredicate,
}

impl SearchContext {
    /// Derive the predicate and midstate of `header`.
    pub fn new(header: &BlockHeader) -> Result<Self> {
        Ok(SearchContext {
            predicate: header.hash_predicate()?,
            midstate: compute_midstate(header),
            tail: header.tail(),
        })
    }

    /// Whether `nonce` satisfies the target.
    pub fn check(&self, nonce: u32) -> bool {
        let mut scratch = Scratch::new();
        self.predicate
            .test(double_hash_into(&mut scratch, &self.midstate, &self.tail, nonce))
    }
}

/// Why [`NonceWorker::mine`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    /// The nonce satisfies the target.
    Found(u32),
    /// Every nonce of this worker was tried.
    Exhausted,
    /// The caller asked to stop or the budget ran out; the walk can resume.
    Stopped,
}

/// Private state of one worker.
#[derive(Debug, Clone)]
pub struct NonceWorker {
    next: u64,
    step: u64,
    hashes: u64,
    scratch: Scratch,
}

impl NonceWorker {
    /// Worker `index` of `concurrency` starting from `start_nonce`.
    pub fn new(start_nonce: u32, index: u32, concurrency: u32) -> Self {
        NonceWorker {
            next: start_nonce as u64 + index as u64,
            step: concurrency.max(1) as u64,
            hashes: 0,
            scratch: Scratch::new(),
        }
    }

    /// Hashes computed so far.
    pub fn hashes(&self) -> u64 {
        self.hashes
    }

    /// Next nonce to try, `None` once the walk is past `0xFFFFFFFF`.
    pub fn next_nonce(&self) -> Option<u32> {
        (self.next <= LAST_NONCE).then_some(self.next as u32)
    }

    /// Whether every nonce of this worker was tried.
    pub fn is_exhausted(&self) -> bool {
        self.next > LAST_NONCE
    }

    /// Try at most `budget` nonces.
    ///
    /// `keep_going` is called once before every trial with the hash count so
    /// far; returning `false` stops the walk. The found nonce is consumed:
    /// calling `mine` again resumes after it.
    #[inline]
    pub fn mine<F>(&mut self, ctx: &SearchContext, budget: u64, mut keep_going: F) -> WorkerStatus
    where
        F: FnMut(u64) -> bool,
    {
        let mut remaining = budget;
        while self.next <= LAST_NONCE {
            if remaining == 0 || !keep_going(self.hashes) {
                return WorkerStatus::Stopped;
            }
            remaining -= 1;

            let nonce = self.next as u32;
            self.next += self.step;
            self.hashes += 1;

            let digest = double_hash_into(&mut self.scratch, &ctx.midstate, &ctx.tail, nonce);
            if ctx.predicate.test(digest) {
                return WorkerStatus::Found(nonce);
            }
        }
        WorkerStatus::Exhausted
    }
}
