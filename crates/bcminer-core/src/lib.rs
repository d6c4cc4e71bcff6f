//! Proof-of-work nonce search for Bitcoin-style block headers.
//!
//! This crate provides:
//! - Hex text to 32-bit word conversion
//! - Block header parsing, serialization and field accessors
//! - The leading-zero-bytes predicate derived from the compact target
//! - SHA256d over a header with the first block precomputed (midstate)
//! - A multi-threaded nonce search with hash-rate statistics (`std` feature)
//!
//! Without the `std` feature the crate is `no_std` + `alloc`; the
//! single-worker [`NonceWorker`] is then the search entry point.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod codec;
pub mod error;
pub mod header;
pub mod predicate;
pub mod sha256d;
pub mod stats;
pub mod worker;

#[cfg(feature = "std")]
pub mod bench;
#[cfg(feature = "std")]
pub mod config;
#[cfg(feature = "std")]
pub mod miner;

#[cfg(test)]
mod fixtures;

pub use codec::{parse_hex, print_words, reverse_byte_order};
pub use error::{Error, Result};
pub use header::{BlockHeader, HeaderFields, TailWords, HEADER_HEX_LEN, HEADER_WORDS};
pub use predicate::HashPredicate;
pub use sha256d::{compute_midstate, double_hash, double_sha256, Midstate};
pub use stats::MinerStats;
pub use worker::{NonceWorker, SearchContext, WorkerStatus};

#[cfg(feature = "std")]
pub use bench::{bench_start_nonce, run_bench, BenchReport};
#[cfg(feature = "std")]
pub use config::MinerConfig;
#[cfg(feature = "std")]
pub use miner::{search, Miner};
