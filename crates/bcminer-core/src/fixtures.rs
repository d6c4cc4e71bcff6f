//! Reference headers shared by the unit tests.

/// Block 239711, nonce 3097226042.
pub const TEST_HEADER_HEX: &str = "020000000affed3fc96851d8c74391c2d9333168fe62165eb228bced7e000000000000004277b65e3bd527f0ceb5298bdb06b4aacbae8a4a808c2c8aa414c20f252db801130dae516461011a3aeb9bb8";

/// Recorded nonce of [`TEST_HEADER_HEX`].
pub const EXPECTED_NONCE: u32 = 3_097_226_042;

/// Digest of [`TEST_HEADER_HEX`] as SHA-256 state words.
pub const VALID_HASH: &str = "5c8ad782c007cc563f8db735180b35dab8c983d172b57e2c2701000000000000";

/// Display-order previous block hash of [`TEST_HEADER_HEX`].
pub const TEST_PREV_HASH: &str = "000000000000007eedbc28b25e1662fe683133d9c29143c7d85168c93fedff0a";

/// Display-order merkle root of [`TEST_HEADER_HEX`].
pub const TEST_MERKLE_ROOT: &str = "01b82d250fc214a48a2c8c804a8aaecbaab406db8b29b5cef027d53b5eb67742";

/// A version 2 header with time 1415239972, bits 0x181bc330, nonce 1678286846.
pub const SECOND_HEADER_HEX: &str = "02000000b6ff0b1b1680a2862a30ca44d346d9e8910d334beb48ca0c00000000000000009d10aa52ee949386ca9385695f04ede270dda20810decd12bc9b048aaab3147124d95a5430c31b18fe9f0864";

/// [`TEST_HEADER_HEX`] with the nbits exponent lowered to 1: 31 zero bytes
/// required, never met in practice.
pub const IMPOSSIBLE_HEADER_HEX: &str = "020000000affed3fc96851d8c74391c2d9333168fe62165eb228bced7e000000000000004277b65e3bd527f0ceb5298bdb06b4aacbae8a4a808c2c8aa414c20f252db801130dae51646101013aeb9bb8";
