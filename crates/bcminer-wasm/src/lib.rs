//! WebAssembly bindings for the bcminer nonce search.
//!
//! Browsers cannot share a thread pool with the page, so each web worker
//! owns one [`Miner`] covering its share of the nonce space and mines it in
//! chunks between message-loop turns.

use wasm_bindgen::prelude::*;

pub mod miner;
pub mod state;

// Re-export main types for JS access
pub use miner::Miner;

/// Initialize the WASM module with better panic messages.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
