//! Block header as twenty 32-bit words.
//!
//! Words hold the raw 80 header bytes read big-endian, i.e. the order the
//! hash function consumes them. Integer fields are little-endian on the
//! wire, so the accessors byte-swap to return numeric values.

use alloc::format;
use alloc::string::String;
use core::fmt;
use core::str::FromStr;
use crate::codec::{parse_hex_into, print_words, reverse_byte_order};
use crate::error::{Error, Result};
use crate::predicate::HashPredicate;
use crate::sha256d::{compute_midstate, double_sha256, DIGEST_WORDS};

/// Words in a header.
pub const HEADER_WORDS: usize = 20;
/// Hex characters in a serialized header.
pub const HEADER_HEX_LEN: usize = HEADER_WORDS * 8;
/// Words packed by [`BlockHeader::copy_fields_for_hashing`].
pub const HASHING_FIELDS: usize = 13;

/// Word index of the block version.
pub const VERSION: usize = 0;
/// Word index of the previous block hash (8 words).
pub const PREV_HASH: usize = 1;
/// Word index of the merkle root (8 words).
pub const MERKLE_ROOT: usize = 9;
/// Word index of the block time.
pub const TIME: usize = 17;
/// Word index of the compact target.
pub const NBITS: usize = 18;
/// Word index of the nonce.
pub const NONCE: usize = 19;

/// The header words hashed in the second block, ahead of the nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TailWords {
    /// Last word of the merkle root.
    pub last_merkle_word: u32,
    /// Time, header order.
    pub time: u32,
    /// Compact target, header order.
    pub nbits: u32,
}

/// A block header (80 bytes) in hashing word order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    words: [u32; HEADER_WORDS],
}

impl BlockHeader {
    /// Wrap header words.
    pub fn from_words(words: [u32; HEADER_WORDS]) -> Self {
        BlockHeader { words }
    }

    /// Parse the 160-character hex form.
    pub fn parse(hex: &str) -> Result<Self> {
        let mut words = [0u32; HEADER_WORDS];
        parse_hex_into(hex, &mut words)?;
        Ok(BlockHeader { words })
    }

    /// Build a header from the display fields reported by block explorers.
    pub fn from_fields(fields: &HeaderFields) -> Result<Self> {
        let mut words = [0u32; HEADER_WORDS];
        words[VERSION] = fields.version.swap_bytes();
        parse_hash_field(&fields.prev_block_hash, &mut words[PREV_HASH..MERKLE_ROOT])?;
        parse_hash_field(&fields.merkle_root, &mut words[MERKLE_ROOT..TIME])?;
        words[TIME] = fields.time.swap_bytes();
        words[NBITS] = fields.bits.swap_bytes();
        words[NONCE] = fields.nonce.swap_bytes();
        Ok(BlockHeader { words })
    }

    /// Raw header words.
    pub fn words(&self) -> &[u32; HEADER_WORDS] {
        &self.words
    }

    /// Block version.
    pub fn version(&self) -> u32 {
        self.words[VERSION].swap_bytes()
    }

    /// Block timestamp (Unix time).
    pub fn time(&self) -> u32 {
        self.words[TIME].swap_bytes()
    }

    /// Compact target ("bits").
    pub fn nbits(&self) -> u32 {
        self.words[NBITS].swap_bytes()
    }

    /// Recorded nonce.
    pub fn nonce(&self) -> u32 {
        self.words[NONCE].swap_bytes()
    }

    /// Copy of this header carrying `nonce`.
    pub fn with_nonce(&self, nonce: u32) -> Self {
        let mut words = self.words;
        words[NONCE] = nonce.swap_bytes();
        BlockHeader { words }
    }

    /// Leading-zero-bytes predicate for this header's target.
    pub fn hash_predicate(&self) -> Result<HashPredicate> {
        HashPredicate::from_nbits(self.nbits())
    }

    /// Header words following the first 64-byte block, nonce excluded.
    pub fn tail(&self) -> TailWords {
        TailWords {
            last_merkle_word: self.words[TIME - 1],
            time: self.words[TIME],
            nbits: self.words[NBITS],
        }
    }

    /// Pack everything a hashing backend needs for this header.
    ///
    /// Layout: `[0]` last merkle word, `[1]` time, `[2]` nbits,
    /// `[3..11]` midstate, `[11]` predicate offset, `[12]` predicate mask.
    pub fn copy_fields_for_hashing(&self, dst: &mut [u32; HASHING_FIELDS]) -> Result<()> {
        let predicate = self.hash_predicate()?;
        let tail = self.tail();
        let midstate = compute_midstate(self);

        dst[0] = tail.last_merkle_word;
        dst[1] = tail.time;
        dst[2] = tail.nbits;
        dst[3..3 + DIGEST_WORDS].copy_from_slice(&midstate.0);
        dst[3 + DIGEST_WORDS] = predicate.offset as u32;
        dst[4 + DIGEST_WORDS] = predicate.mask;
        Ok(())
    }

    /// Serialize the header to its 80 wire bytes.
    pub fn to_bytes(&self) -> [u8; 80] {
        let mut bytes = [0u8; 80];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.words.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        bytes
    }

    /// Block hash (double SHA256 of the serialized header).
    pub fn block_hash(&self) -> [u8; 32] {
        double_sha256(&self.to_bytes())
    }

    /// Block hash in display format (reversed hex).
    pub fn block_hash_display(&self) -> String {
        let mut hash = self.block_hash();
        hash.reverse();
        hex::encode(hash)
    }
}

impl FromStr for BlockHeader {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for BlockHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&print_words(&self.words))
    }
}

/// Header fields as shown by block explorers: hashes in display byte order,
/// integers as numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFields {
    /// Block version.
    pub version: u32,
    /// Previous block hash, display order.
    pub prev_block_hash: String,
    /// Merkle root, display order.
    pub merkle_root: String,
    /// Block timestamp.
    pub time: u32,
    /// Compact target.
    pub bits: u32,
    /// Nonce.
    pub nonce: u32,
}

fn parse_hash_field(display_hex: &str, dst: &mut [u32]) -> Result<()> {
    if display_hex.len() != 64 {
        return Err(Error::invalid_input(format!(
            "hash must be 64 hex characters, got {}",
            display_hex.len()
        )));
    }
    parse_hex_into(&reverse_byte_order(display_hex)?, dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use crate::fixtures::*;

    #[test]
    fn test_parse_accessors() {
        let header = BlockHeader::parse(SECOND_HEADER_HEX).unwrap();
        assert_eq!(header.version(), 2);
        assert_eq!(header.time(), 1_415_239_972);
        assert_eq!(header.nbits(), 404_472_624);
        assert_eq!(header.nonce(), 1_678_286_846);
        assert_eq!(header.to_string(), SECOND_HEADER_HEX);

        let header = BlockHeader::parse(TEST_HEADER_HEX).unwrap();
        assert_eq!(header.nbits(), 0x1a016164);
        assert_eq!(header.nonce(), EXPECTED_NONCE);
        assert_eq!(header.time(), 1_370_361_107);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        let short = &TEST_HEADER_HEX[..152];
        assert!(matches!(BlockHeader::parse(short), Err(Error::InvalidInput(_))));

        let long = format!("{}00000000", TEST_HEADER_HEX);
        assert!(matches!(long.parse::<BlockHeader>(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_with_nonce() {
        let header = BlockHeader::parse(TEST_HEADER_HEX).unwrap();
        let zeroed = header.with_nonce(0);
        assert_eq!(zeroed.nonce(), 0);
        assert_eq!(zeroed.with_nonce(EXPECTED_NONCE), header);
        assert_eq!(&zeroed.words()[..NONCE], &header.words()[..NONCE]);
    }

    #[test]
    fn test_to_bytes_matches_hex() {
        let header = BlockHeader::parse(TEST_HEADER_HEX).unwrap();
        assert_eq!(hex::encode(header.to_bytes()), TEST_HEADER_HEX);

        // Nonce is little-endian on the wire
        assert_eq!(&header.to_bytes()[76..80], &EXPECTED_NONCE.to_le_bytes());
    }

    #[test]
    fn test_block_hash_display() {
        let header = BlockHeader::parse(TEST_HEADER_HEX).unwrap();
        assert_eq!(hex::encode(header.block_hash()), VALID_HASH);
        assert!(header.block_hash_display().starts_with("0000000000000127"));
    }

    #[test]
    fn test_from_fields() {
        let fields = HeaderFields {
            version: 2,
            prev_block_hash: TEST_PREV_HASH.to_string(),
            merkle_root: TEST_MERKLE_ROOT.to_string(),
            time: 1_370_361_107,
            bits: 0x1a016164,
            nonce: EXPECTED_NONCE,
        };
        let header = BlockHeader::from_fields(&fields).unwrap();
        assert_eq!(header.to_string(), TEST_HEADER_HEX);

        let bad = HeaderFields { merkle_root: "abcd".to_string(), ..fields };
        assert!(BlockHeader::from_fields(&bad).is_err());
    }

    #[test]
    fn test_copy_fields_for_hashing() {
        let header = BlockHeader::parse(TEST_HEADER_HEX).unwrap();
        let mut fields = [0u32; HASHING_FIELDS];
        header.copy_fields_for_hashing(&mut fields).unwrap();

        assert_eq!(fields[0], header.words()[16]);
        assert_eq!(fields[1], 0x130dae51);
        assert_eq!(fields[2], 0x6461011a);
        assert_eq!(&fields[3..11], &compute_midstate(&header).0);
        assert_eq!(fields[11], 6);
        assert_eq!(fields[12], 0xFFFF);
    }
}
