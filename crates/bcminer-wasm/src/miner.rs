//! Chunked nonce search for one web worker.

use wasm_bindgen::prelude::*;
use bcminer_core::{BlockHeader, Error, NonceWorker, SearchContext, WorkerStatus};
use crate::state::{ChunkReport, StatsInfo};

/// One worker's share of a nonce search.
///
/// Worker `thread_index` of `threads_count` tries `start_nonce + thread_index`
/// and every `threads_count`-th nonce after it, up to `0xFFFFFFFF`.
#[wasm_bindgen]
pub struct Miner {
    /// The header being mined.
    header: BlockHeader,
    /// Midstate and target derived from the header.
    ctx: SearchContext,
    start_nonce: u32,
    thread_index: u32,
    threads_count: u32,
    /// Walk state, resumed by every chunk.
    worker: NonceWorker,
    /// Time of the first chunk, 0 before mining starts.
    start_time: f64,
    /// Time spent since the first chunk, as of the last one.
    elapsed_ms: f64,
    /// Nonce matching the target, once found.
    matched: Option<u32>,
}

#[wasm_bindgen]
impl Miner {
    /// Create a miner for one worker of a search.
    ///
    /// # Arguments
    /// * `header_hex` - The 160-character header hex
    /// * `start_nonce` - First nonce of the whole search
    /// * `thread_index` - This worker's index
    /// * `threads_count` - Number of workers in the search
    #[wasm_bindgen(constructor)]
    pub fn new(
        header_hex: &str,
        start_nonce: u32,
        thread_index: u32,
        threads_count: u32,
    ) -> Result<Miner, JsValue> {
        Self::create(header_hex, start_nonce, thread_index, threads_count)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Mine at most `chunk_size` nonces.
    ///
    /// # Returns
    /// The chunk report, with the nonce and block hash if one matched.
    #[wasm_bindgen]
    pub fn mine_chunk(&mut self, chunk_size: u32) -> Result<JsValue, JsValue> {
        self.run_chunk(chunk_size, js_sys::Date::now()).to_js()
    }

    /// Get current mining statistics.
    #[wasm_bindgen]
    pub fn get_stats(&self) -> Result<JsValue, JsValue> {
        self.stats_info().to_js()
    }

    /// Get the formatted hash rate.
    #[wasm_bindgen]
    pub fn get_hash_rate_display(&self) -> String {
        self.stats_info().miner_stats().format_hash_rate()
    }

    /// Nonce matching the target, once found.
    #[wasm_bindgen(getter)]
    pub fn matched_nonce(&self) -> Option<u32> {
        self.matched
    }

    /// Whether every nonce of this worker was tried.
    #[wasm_bindgen(getter)]
    pub fn exhausted(&self) -> bool {
        self.worker.is_exhausted()
    }

    /// Restart this worker's walk from the beginning.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.worker = NonceWorker::new(self.start_nonce, self.thread_index, self.threads_count);
        self.start_time = 0.0;
        self.elapsed_ms = 0.0;
        self.matched = None;
    }
}

impl Miner {
    fn create(
        header_hex: &str,
        start_nonce: u32,
        thread_index: u32,
        threads_count: u32,
    ) -> Result<Miner, Error> {
        if threads_count == 0 || thread_index >= threads_count {
            return Err(Error::InvalidConcurrency(threads_count as usize));
        }

        let header = BlockHeader::parse(header_hex)?;
        let ctx = SearchContext::new(&header)?;

        Ok(Miner {
            header,
            ctx,
            start_nonce,
            thread_index,
            threads_count,
            worker: NonceWorker::new(start_nonce, thread_index, threads_count),
            start_time: 0.0,
            elapsed_ms: 0.0,
            matched: None,
        })
    }

    fn run_chunk(&mut self, chunk_size: u32, now_ms: f64) -> ChunkReport {
        if self.start_time == 0.0 {
            self.start_time = now_ms;
        }

        let before = self.worker.hashes();
        let status = self.worker.mine(&self.ctx, chunk_size as u64, |_| true);
        self.elapsed_ms = now_ms - self.start_time;

        let mut report = ChunkReport {
            hashes_computed: self.worker.hashes() - before,
            exhausted: self.worker.is_exhausted(),
            ..ChunkReport::default()
        };

        if let WorkerStatus::Found(nonce) = status {
            report.found = true;
            report.nonce = Some(nonce);
            report.hash = Some(self.header.with_nonce(nonce).block_hash_display());
            self.matched.get_or_insert(nonce);
        }

        report
    }

    fn stats_info(&self) -> StatsInfo {
        StatsInfo {
            total_hashes: self.worker.hashes(),
            hash_rate: self.stats_rate(),
            elapsed_ms: self.elapsed_ms,
            next_nonce: self.worker.next_nonce(),
            matched_nonce: self.matched,
            exhausted: self.worker.is_exhausted(),
        }
    }

    fn stats_rate(&self) -> f64 {
        if self.elapsed_ms > 0.0 {
            self.worker.hashes() as f64 / (self.elapsed_ms / 1000.0)
        } else {
            0.0
        }
    }
}

/// Log to the browser console.
#[wasm_bindgen]
pub fn console_log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER_HEX: &str = "020000000affed3fc96851d8c74391c2d9333168fe62165eb228bced7e000000000000004277b65e3bd527f0ceb5298bdb06b4aacbae8a4a808c2c8aa414c20f252db801130dae516461011a3aeb9bb8";
    const EXPECTED_NONCE: u32 = 3_097_226_042;

    #[test]
    fn test_chunks_find_reference_nonce() {
        let mut miner = Miner::create(HEADER_HEX, EXPECTED_NONCE - 10, 0, 1).unwrap();

        let report = miner.run_chunk(6, 1_000.0);
        assert!(!report.found);
        assert_eq!(report.hashes_computed, 6);

        let report = miner.run_chunk(6, 3_000.0);
        assert!(report.found);
        assert_eq!(report.nonce, Some(EXPECTED_NONCE));
        assert_eq!(report.hashes_computed, 5);
        assert!(report.hash.unwrap().starts_with("0000000000000127"));
        assert_eq!(miner.matched_nonce(), Some(EXPECTED_NONCE));

        let info = miner.stats_info();
        assert_eq!(info.total_hashes, 11);
        assert_eq!(info.elapsed_ms, 2_000.0);
        assert_eq!(info.hash_rate, 5.5);
        assert_eq!(miner.get_hash_rate_display(), "5.50 H/s");
    }

    #[test]
    fn test_worker_share() {
        // Worker 1 of 2 from EXPECTED_NONCE - 1 hits it first
        let mut miner = Miner::create(HEADER_HEX, EXPECTED_NONCE - 1, 1, 2).unwrap();
        let report = miner.run_chunk(1, 1.0);
        assert_eq!(report.nonce, Some(EXPECTED_NONCE));

        // Worker 0 of 2 steps over it
        let mut miner = Miner::create(HEADER_HEX, EXPECTED_NONCE - 1, 0, 2).unwrap();
        assert!(!miner.run_chunk(10, 1.0).found);
    }

    #[test]
    fn test_exhausted_and_reset() {
        let mut miner = Miner::create(HEADER_HEX, u32::MAX - 3, 0, 2).unwrap();

        let report = miner.run_chunk(100, 1.0);
        assert_eq!(report.hashes_computed, 2);
        assert!(report.exhausted);
        assert!(miner.exhausted());

        miner.reset();
        assert!(!miner.exhausted());
        assert_eq!(miner.stats_info().total_hashes, 0);
        assert_eq!(miner.stats_info().next_nonce, Some(u32::MAX - 3));
    }

    #[test]
    fn test_create_rejects_bad_arguments() {
        assert!(matches!(
            Miner::create(HEADER_HEX, 0, 2, 2),
            Err(Error::InvalidConcurrency(2))
        ));
        assert!(matches!(
            Miner::create(HEADER_HEX, 0, 0, 0),
            Err(Error::InvalidConcurrency(0))
        ));
        assert!(matches!(
            Miner::create(&HEADER_HEX[..100], 0, 0, 1),
            Err(Error::InvalidInput(_))
        ));
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_mine_chunk_from_js() {
        let header = concat!(
            "020000000affed3fc96851d8c74391c2d9333168fe62165eb228bced7e000000000000004277b65e",
            "3bd527f0ceb5298bdb06b4aacbae8a4a808c2c8aa414c20f252db801130dae516461011a3aeb9bb8"
        );
        let mut miner = Miner::new(header, 3_097_226_032, 0, 1).unwrap();
        assert!(miner.mine_chunk(16).is_ok());
        assert_eq!(miner.matched_nonce(), Some(3_097_226_042));
    }
}
