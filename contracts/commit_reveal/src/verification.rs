//! Independent verification of a claimed vote.
//!
//! Anyone can check that `(voter, choice, secret)` opens the voter's stored
//! commitment. The check never writes, never needs the voter to have revealed,
//! and keeps working after the round has ended. `reveal` uses the same
//! [`opens`] comparison, so the two can never disagree.

use soroban_sdk::{Address, Bytes, Env, String};

use crate::commitment::{self, Commitment};
use crate::hashing::commitment_digest;

/// `true` when `H(choice, secret)` equals the stored digest.
pub fn opens(env: &Env, record: &Commitment, choice: &String, secret: &Bytes) -> bool {
    commitment_digest(env, choice, secret) == record.digest
}

/// `None` when no commitment exists for `(round_id, voter)`.
pub fn verify_claim(
    env: &Env,
    round_id: u64,
    voter: &Address,
    choice: &String,
    secret: &Bytes,
) -> Option<bool> {
    let record = commitment::load(env, round_id, voter)?;
    Some(opens(env, &record, choice, secret))
}
