//! Hex text to 32-bit word conversion.
//!
//! Headers travel as hex text where every group of 8 characters is one
//! big-endian word: the first byte pair becomes the most significant byte.
//! Hashes shown by block explorers use the reverse byte order of the one
//! stored in the header, hence [`reverse_byte_order`].

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use crate::error::{Error, Result};

/// Number of hex characters encoding one word.
pub const HEX_CHARS_PER_WORD: usize = 8;

/// Decode hex text into big-endian words.
///
/// The length must be a multiple of 8 characters.
pub fn parse_hex(hex: &str) -> Result<Vec<u32>> {
    let bytes = decode_word_bytes(hex)?;
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Decode hex text into an existing word slice.
///
/// The text must hold exactly `dst.len()` words.
pub fn parse_hex_into(hex: &str, dst: &mut [u32]) -> Result<()> {
    let expected = dst.len() * HEX_CHARS_PER_WORD;
    if hex.len() != expected {
        return Err(Error::invalid_input(format!(
            "expected {} hex characters, got {}",
            expected,
            hex.len()
        )));
    }

    let bytes = decode_word_bytes(hex)?;
    for (word, chunk) in dst.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Ok(())
}

/// Encode words as hex, the inverse of [`parse_hex`].
///
/// Output is always lowercase: uppercase input parses but does not round-trip.
pub fn print_words(words: &[u32]) -> String {
    let bytes: Vec<u8> = words.iter().flat_map(|word| word.to_be_bytes()).collect();
    hex::encode(bytes)
}

/// Reverse hex text one byte (two characters) at a time.
///
/// Converts a hash between display order and header order.
pub fn reverse_byte_order(hex: &str) -> Result<String> {
    let mut bytes = hex::decode(hex)
        .map_err(|e| Error::invalid_input(format!("invalid hex: {}", e)))?;
    bytes.reverse();
    Ok(hex::encode(bytes))
}

fn decode_word_bytes(hex: &str) -> Result<Vec<u8>> {
    if hex.len() % HEX_CHARS_PER_WORD != 0 {
        return Err(Error::invalid_input(format!(
            "hex length {} is not a multiple of {}",
            hex.len(),
            HEX_CHARS_PER_WORD
        )));
    }
    hex::decode(hex).map_err(|e| Error::invalid_input(format!("invalid hex: {}", e)))
}
