//! Leading-zero-bytes test derived from the compact target.
//!
//! The compact "bits" format is `[exponent (1 byte)][mantissa (3 bytes)]`.
//! The exponent alone says how many bytes of the 256-bit target are
//! significant, so `32 - exponent` high bytes of a qualifying hash must be
//! zero. The mantissa is ignored: the predicate is a leading-zero-bytes
//! check, not a full 256-bit comparison.
//!
//! Hash words are the SHA-256 state words. A block hash is displayed
//! byte-reversed, so its leading zero bytes live in the *last* digest words,
//! starting from the least significant byte of word `offset`.

use crate::error::{Error, Result};
use crate::sha256d::DIGEST_WORDS;

/// Which digest words and bytes must be zero for a nonce to qualify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashPredicate {
    /// First digest word checked (through the mask).
    pub offset: usize,
    /// Bytes of `digest[offset]` that must be zero.
    pub mask: u32,
}

impl HashPredicate {
    /// Derive the predicate from a compact target (numeric value, as returned
    /// by [`BlockHeader::nbits`](crate::BlockHeader::nbits)).
    ///
    /// Exponents whose offset falls outside the digest are rejected with
    /// [`Error::UnsupportedTarget`].
    pub fn from_nbits(nbits: u32) -> Result<Self> {
        let exponent = (nbits >> 24) as u8 as i32;
        let leading_bytes = 32 - exponent;
        let offset = 8 - leading_bytes / 4 - 1;

        let mut mask = 0u32;
        for i in 0..leading_bytes % 4 {
            mask |= 0xFF << (i * 8);
        }

        if !(0..DIGEST_WORDS as i32).contains(&offset) {
            return Err(Error::UnsupportedTarget { nbits, offset });
        }

        Ok(HashPredicate {
            offset: offset as usize,
            mask,
        })
    }

    /// Check that every byte selected by the predicate is zero.
    #[inline(always)]
    pub fn test(&self, digest: &[u32; DIGEST_WORDS]) -> bool {
        let mut sum = digest[self.offset] & self.mask;
        for word in &digest[self.offset + 1..] {
            sum |= *word;
        }
        sum == 0
    }

    /// Number of hash bytes required to be zero.
    pub fn zero_bytes(&self) -> u32 {
        (DIGEST_WORDS - 1 - self.offset) as u32 * 4 + self.mask.count_ones() / 8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_hex;

    fn digest(hex: &str) -> [u32; 8] {
        parse_hex(hex).unwrap().try_into().unwrap()
    }

    #[test]
    fn test_predicate_from_nbits() {
        // exponent 0x1a: 6 zero bytes, word 7 and the low half of word 6
        let predicate = HashPredicate::from_nbits(0x1a016164).unwrap();
        assert_eq!(predicate, HashPredicate { offset: 6, mask: 0xFFFF });
        assert_eq!(predicate.zero_bytes(), 6);

        // exponent 0x18: 8 zero bytes, whole words 6 and 7
        let predicate = HashPredicate::from_nbits(0x181bc330).unwrap();
        assert_eq!(predicate, HashPredicate { offset: 5, mask: 0 });
        assert_eq!(predicate.zero_bytes(), 8);

        // Genesis difficulty
        let predicate = HashPredicate::from_nbits(0x1d00ffff).unwrap();
        assert_eq!(predicate, HashPredicate { offset: 7, mask: 0xFFFFFF });
        assert_eq!(predicate.zero_bytes(), 3);
    }

    #[test]
    fn test_predicate_extreme_exponents() {
        // exponent 1: 31 zero bytes
        let predicate = HashPredicate::from_nbits(0x01003456).unwrap();
        assert_eq!(predicate, HashPredicate { offset: 0, mask: 0xFFFFFF });

        // exponent 0x20 and 0x21: nothing to check
        let predicate = HashPredicate::from_nbits(0x2000ffff).unwrap();
        assert_eq!(predicate, HashPredicate { offset: 7, mask: 0 });
        assert!(predicate.test(&[0xFFFF_FFFF; 8]));
        let predicate = HashPredicate::from_nbits(0x2100ffff).unwrap();
        assert_eq!(predicate, HashPredicate { offset: 7, mask: 0 });

        assert_eq!(
            HashPredicate::from_nbits(0x0000ffff),
            Err(Error::UnsupportedTarget { nbits: 0x0000ffff, offset: -1 })
        );
        assert_eq!(
            HashPredicate::from_nbits(0x2400ffff),
            Err(Error::UnsupportedTarget { nbits: 0x2400ffff, offset: 8 })
        );
    }

    #[test]
    fn test_predicate_reference_digests() {
        let predicate = HashPredicate::from_nbits(0x1a016164).unwrap();

        let valid = digest("5c8ad782c007cc563f8db735180b35dab8c983d172b57e2c2701000000000000");
        assert!(predicate.test(&valid));

        let invalid = digest("0658c4f948fe15a8bdc1c4fa8233ba41805638b07f3e2dc5c2af2300ffffdd00");
        assert!(!predicate.test(&invalid));
    }

    #[test]
    fn test_predicate_mask_bytes() {
        let predicate = HashPredicate { offset: 6, mask: 0xFFFF };
        let mut hash = [0xFFFF_FFFFu32; 8];
        hash[6] = 0xABCD_0000;
        hash[7] = 0;
        assert!(predicate.test(&hash));

        hash[6] = 0xABCD_0100;
        assert!(!predicate.test(&hash));

        hash[6] = 0;
        hash[7] = 1;
        assert!(!predicate.test(&hash));
    }
}
