//! Values reported to JavaScript.

use bcminer_core::MinerStats;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Worker statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsInfo {
    /// Total hashes computed.
    pub total_hashes: u64,
    /// Current hash rate (hashes per second).
    pub hash_rate: f64,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: f64,
    /// Next nonce this worker will try.
    pub next_nonce: Option<u32>,
    /// Nonce matching the target, once found.
    pub matched_nonce: Option<u32>,
    /// Whether every nonce of this worker was tried.
    pub exhausted: bool,
}

impl StatsInfo {
    /// Hash rate and totals as core stats.
    pub fn miner_stats(&self) -> MinerStats {
        MinerStats {
            total_hashes: self.total_hashes,
            elapsed_secs: self.elapsed_ms / 1000.0,
            hash_rate: self.hash_rate,
        }
    }

    /// Convert to JS value.
    pub fn to_js(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {:?}", e)))
    }
}

/// Result of one `mine_chunk` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkReport {
    /// Whether a nonce matching the target was found.
    pub found: bool,
    /// The matching nonce.
    pub nonce: Option<u32>,
    /// Block hash of the matching nonce (display format).
    pub hash: Option<String>,
    /// Hashes computed in this chunk.
    pub hashes_computed: u64,
    /// Whether every nonce of this worker was tried.
    pub exhausted: bool,
}

impl ChunkReport {
    /// Convert to JS value.
    pub fn to_js(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {:?}", e)))
    }
}
