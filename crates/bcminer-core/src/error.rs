//! Error types for the nonce search engine.

use alloc::string::String;
use thiserror::Error;

/// Errors raised by header parsing and the search engine.
///
/// Exhausting the nonce space is not an error: `search` reports it as `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed hex text or a header of the wrong length.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The compact target maps to a digest word outside the 8-word hash.
    #[error("Unsupported target {nbits:#010x}: predicate offset {offset} is out of range")]
    UnsupportedTarget {
        /// Compact target as stored in the header.
        nbits: u32,
        /// Offset produced by the derivation.
        offset: i32,
    },

    /// A miner needs at least one worker.
    #[error("Invalid concurrency: {0}")]
    InvalidConcurrency(usize),

    /// `search` was called while another search on the same miner is running.
    #[error("Already mining")]
    AlreadyMining,

    /// A worker thread panicked; the search was stopped.
    #[error("Worker {worker} panicked: {message}")]
    WorkerPanicked {
        /// Index of the failed worker.
        worker: usize,
        /// Panic payload, when it was a string.
        message: String,
    },

    /// The OS refused to start a worker thread.
    #[error("Failed to spawn worker: {0}")]
    Spawn(String),
}

/// Result type alias for the engine.
pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_input("hex length 7 is not a multiple of 8");
        assert_eq!(
            err.to_string(),
            "Invalid input: hex length 7 is not a multiple of 8"
        );

        let err = Error::UnsupportedTarget { nbits: 0x00ffffff, offset: -1 };
        assert_eq!(
            err.to_string(),
            "Unsupported target 0x00ffffff: predicate offset -1 is out of range"
        );

        let err = Error::WorkerPanicked { worker: 2, message: "boom".to_string() };
        assert_eq!(err.to_string(), "Worker 2 panicked: boom");
    }
}
