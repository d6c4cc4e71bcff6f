//! SHA-256 compression with the midstate optimization.
//!
//! The 80-byte header spans two 64-byte blocks. The first block (header words
//! 0..16) never changes while the nonce varies, so its chaining value (the
//! midstate) is computed once per header. Each nonce trial then costs two
//! compressions: the second header block from the midstate, and the 32-byte
//! first-round digest from the initial state.
//!
//! The `sha2` crate does not expose its internal state, so the compression
//! function is implemented here. [`double_sha256`] uses `sha2` and serves as
//! the reference for verification.

use sha2::{Digest, Sha256};
use crate::header::{BlockHeader, TailWords};

/// Words in a SHA-256 state or digest.
pub const DIGEST_WORDS: usize = 8;
/// Words in a message block.
pub const BLOCK_WORDS: usize = 16;
/// Words in an extended message schedule.
pub const SCHEDULE_WORDS: usize = 64;

/// Bit length of the 80-byte header, the first hash input.
const HEADER_BITS: u32 = 640;
/// Bit length of the 32-byte first-round digest, the second hash input.
const DIGEST_BITS: u32 = 256;
/// Padding word following the message.
const PADDING: u32 = 0x8000_0000;

/// Initial hash values.
pub const H0: [u32; DIGEST_WORDS] = [
    0x6A09E667, 0xBB67AE85, 0x3C6EF372, 0xA54FF53A,
    0x510E527F, 0x9B05688C, 0x1F83D9AB, 0x5BE0CD19,
];

/// Round constants.
pub const K: [u32; SCHEDULE_WORDS] = [
    0x428A2F98, 0x71374491, 0xB5C0FBCF, 0xE9B5DBA5, 0x3956C25B, 0x59F111F1, 0x923F82A4, 0xAB1C5ED5,
    0xD807AA98, 0x12835B01, 0x243185BE, 0x550C7DC3, 0x72BE5D74, 0x80DEB1FE, 0x9BDC06A7, 0xC19BF174,
    0xE49B69C1, 0xEFBE4786, 0x0FC19DC6, 0x240CA1CC, 0x2DE92C6F, 0x4A7484AA, 0x5CB0A9DC, 0x76F988DA,
    0x983E5152, 0xA831C66D, 0xB00327C8, 0xBF597FC7, 0xC6E00BF3, 0xD5A79147, 0x06CA6351, 0x14292967,
    0x27B70A85, 0x2E1B2138, 0x4D2C6DFC, 0x53380D13, 0x650A7354, 0x766A0ABB, 0x81C2C92E, 0x92722C85,
    0xA2BFE8A1, 0xA81A664B, 0xC24B8B70, 0xC76C51A3, 0xD192E819, 0xD6990624, 0xF40E3585, 0x106AA070,
    0x19A4C116, 0x1E376C08, 0x2748774C, 0x34B0BCB5, 0x391C0CB3, 0x4ED8AA4A, 0x5B9CCA4F, 0x682E6FF3,
    0x748F82EE, 0x78A5636F, 0x84C87814, 0x8CC70208, 0x90BEFFFA, 0xA4506CEB, 0xBEF9A3F7, 0xC67178F2,
];

/// Chaining value after the first header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Midstate(pub [u32; DIGEST_WORDS]);

/// Per-worker buffers for [`double_hash_into`].
///
/// Never shared between workers.
#[derive(Debug, Clone)]
pub struct Scratch {
    schedule: [u32; SCHEDULE_WORDS],
    digest: [u32; DIGEST_WORDS],
}

impl Scratch {
    /// Zeroed buffers.
    pub fn new() -> Self {
        Scratch {
            schedule: [0; SCHEDULE_WORDS],
            digest: [0; DIGEST_WORDS],
        }
    }

    /// Digest of the last [`double_hash_into`] call.
    pub fn digest(&self) -> &[u32; DIGEST_WORDS] {
        &self.digest
    }
}

impl Default for Scratch {
    fn default() -> Self {
        Self::new()
    }
}

#[inline(always)]
fn big_sigma0(x: u32) -> u32 {
    x.rotate_right(2) ^ x.rotate_right(13) ^ x.rotate_right(22)
}

#[inline(always)]
fn big_sigma1(x: u32) -> u32 {
    x.rotate_right(6) ^ x.rotate_right(11) ^ x.rotate_right(25)
}

#[inline(always)]
fn small_sigma0(x: u32) -> u32 {
    x.rotate_right(7) ^ x.rotate_right(18) ^ (x >> 3)
}

#[inline(always)]
fn small_sigma1(x: u32) -> u32 {
    x.rotate_right(17) ^ x.rotate_right(19) ^ (x >> 10)
}

#[inline(always)]
fn ch(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (!x & z)
}

#[inline(always)]
fn maj(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (x & z) ^ (y & z)
}

/// Compress one block into `state`.
///
/// Only `schedule[0..16]` is read as input; words 16..64 are overwritten
/// with the message schedule.
#[inline]
pub fn compress(schedule: &mut [u32; SCHEDULE_WORDS], state: &mut [u32; DIGEST_WORDS]) {
    for i in BLOCK_WORDS..SCHEDULE_WORDS {
        schedule[i] = small_sigma1(schedule[i - 2])
            .wrapping_add(schedule[i - 7])
            .wrapping_add(small_sigma0(schedule[i - 15]))
            .wrapping_add(schedule[i - 16]);
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    for i in 0..SCHEDULE_WORDS {
        let t1 = h
            .wrapping_add(big_sigma1(e))
            .wrapping_add(ch(e, f, g))
            .wrapping_add(K[i])
            .wrapping_add(schedule[i]);
        let t2 = big_sigma0(a).wrapping_add(maj(a, b, c));

        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(t1);
        d = c;
        c = b;
        b = a;
        a = t1.wrapping_add(t2);
    }

    for (word, value) in state.iter_mut().zip([a, b, c, d, e, f, g, h]) {
        *word = word.wrapping_add(value);
    }
}

/// Compress the nonce-independent first block of the header.
pub fn compute_midstate(header: &BlockHeader) -> Midstate {
    let mut schedule = [0u32; SCHEDULE_WORDS];
    schedule[..BLOCK_WORDS].copy_from_slice(&header.words()[..BLOCK_WORDS]);

    let mut state = H0;
    compress(&mut schedule, &mut state);
    Midstate(state)
}

/// SHA256d of the header with `nonce`, reusing the midstate.
///
/// `nonce` is the numeric value; it is byte-swapped into header order.
/// Returns the digest held in `scratch`.
#[inline]
pub fn double_hash_into<'a>(
    scratch: &'a mut Scratch,
    midstate: &Midstate,
    tail: &TailWords,
    nonce: u32,
) -> &'a [u32; DIGEST_WORDS] {
    let schedule = &mut scratch.schedule;

    // Second header block: tail words, nonce, padding, 80-byte length
    schedule[0] = tail.last_merkle_word;
    schedule[1] = tail.time;
    schedule[2] = tail.nbits;
    schedule[3] = nonce.swap_bytes();
    schedule[4] = PADDING;
    schedule[5..BLOCK_WORDS - 1].fill(0);
    schedule[BLOCK_WORDS - 1] = HEADER_BITS;

    scratch.digest = midstate.0;
    compress(schedule, &mut scratch.digest);

    // Hash of the 32-byte digest
    schedule[..DIGEST_WORDS].copy_from_slice(&scratch.digest);
    schedule[DIGEST_WORDS] = PADDING;
    schedule[DIGEST_WORDS + 1..BLOCK_WORDS - 1].fill(0);
    schedule[BLOCK_WORDS - 1] = DIGEST_BITS;

    scratch.digest = H0;
    compress(schedule, &mut scratch.digest);

    &scratch.digest
}

/// [`double_hash_into`] with a fresh scratch buffer.
pub fn double_hash(midstate: &Midstate, tail: &TailWords, nonce: u32) -> [u32; DIGEST_WORDS] {
    let mut scratch = Scratch::new();
    *double_hash_into(&mut scratch, midstate, tail, nonce)
}

/// Bitcoin's double SHA256: SHA256(SHA256(data)).
///
/// Used to verify nonces found by the fast path.
#[inline]
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut result = [0u8; 32];
    result.copy_from_slice(&second);
    result
}

/// Serialize digest words to the 32 hash bytes.
pub fn digest_bytes(digest: &[u32; DIGEST_WORDS]) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    for (chunk, word) in bytes.chunks_exact_mut(4).zip(digest) {
        chunk.copy_from_slice(&word.to_be_bytes());
    }
    bytes
}

/// Read 32 hash bytes as big-endian digest words.
pub fn digest_words(bytes: &[u8; 32]) -> [u32; DIGEST_WORDS] {
    let mut words = [0u32; DIGEST_WORDS];
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    words
}
