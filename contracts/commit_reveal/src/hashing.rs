//! Commitment hashing shared by voters (off-chain) and the contract (on-chain).
//!
//! ```text
//! digest = SHA-256( be32(len(choice)) || choice_utf8 || secret )
//! ```
//!
//! The 4-byte length prefix makes the preimage encoding injective: `("AB", "s")`
//! and `("A", "Bs")` serialise to different byte strings.

use soroban_sdk::{Bytes, BytesN, Env, String};

/// Canonical byte encoding of an option string.
pub fn encode_option(env: &Env, option: &String) -> Bytes {
    let raw = option.to_bytes();
    let mut out = Bytes::from_slice(env, &raw.len().to_be_bytes());
    out.append(&raw);
    out
}

/// `H(choice, secret)`.
pub fn commitment_digest(env: &Env, choice: &String, secret: &Bytes) -> BytesN<32> {
    let mut payload = encode_option(env, choice);
    payload.append(secret);
    env.crypto().sha256(&payload).into()
}

/// An all-zero digest is treated as "no commitment" and never accepted.
pub fn is_well_formed(digest: &BytesN<32>) -> bool {
    digest.to_array() != [0u8; 32]
}
