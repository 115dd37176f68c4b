//! Commitment store: `(round, voter) → Commitment`.
//!
//! A digest-owner index `(round, digest) → voter` sits next to the store so a
//! second voter cannot submit a copy of someone else's commitment.

use soroban_sdk::{contracttype, Address, BytesN, Env, IntoVal, String, Val};

use crate::{ContractError, DataKey};

// TTL: ~60 days at 5s/ledger
const TTL_THRESHOLD: u32 = 1_036_800;
const TTL_EXTEND_TO: u32 = 2_073_600;

// ── Types ─────────────────────────────────────────────────────────────────────

/// A voter's sealed vote for one round.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Commitment {
    /// `H(choice, secret)`, see [`crate::hashing`].
    pub digest: BytesN<32>,
    /// Set once by a successful reveal, never changed afterwards.
    pub revealed_choice: Option<String>,
    pub has_revealed: bool,
    /// Ledger time of the latest (possibly overwriting) commit.
    pub committed_at: u64,
    pub revealed_at: Option<u64>,
}

// ── Storage helpers ──────────────────────────────────────────────────────────

fn commitment_key(round_id: u64, voter: &Address) -> DataKey {
    DataKey::Commitment(round_id, voter.clone())
}

fn owner_key(round_id: u64, digest: &BytesN<32>) -> DataKey {
    DataKey::DigestOwner(round_id, digest.clone())
}

fn persist<V: IntoVal<Env, Val>>(env: &Env, key: &DataKey, value: &V) {
    env.storage().persistent().set(key, value);
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub(crate) fn load(env: &Env, round_id: u64, voter: &Address) -> Option<Commitment> {
    env.storage()
        .persistent()
        .get(&commitment_key(round_id, voter))
}

pub(crate) fn has_committed(env: &Env, round_id: u64, voter: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&commitment_key(round_id, voter))
}

pub(crate) fn digest_owner(env: &Env, round_id: u64, digest: &BytesN<32>) -> Option<Address> {
    env.storage().persistent().get(&owner_key(round_id, digest))
}

/// Write or overwrite `voter`'s commitment.
///
/// Returns `true` when this is the voter's first commitment in the round.
/// The caller is responsible for the phase check; this only enforces the
/// store's own invariants.
pub(crate) fn write(
    env: &Env,
    round_id: u64,
    voter: &Address,
    digest: &BytesN<32>,
    now: u64,
) -> Result<bool, ContractError> {
    if let Some(owner) = digest_owner(env, round_id, digest) {
        if owner != *voter {
            return Err(ContractError::DuplicateCommitment);
        }
    }

    let existing = load(env, round_id, voter);
    if let Some(previous) = &existing {
        if previous.has_revealed {
            return Err(ContractError::AlreadyRevealed);
        }
        if previous.digest != *digest {
            env.storage()
                .persistent()
                .remove(&owner_key(round_id, &previous.digest));
        }
    }

    let record = Commitment {
        digest: digest.clone(),
        revealed_choice: None,
        has_revealed: false,
        committed_at: now,
        revealed_at: None,
    };
    persist(env, &commitment_key(round_id, voter), &record);
    persist(env, &owner_key(round_id, digest), voter);

    Ok(existing.is_none())
}

/// The single `false → true` flip of `has_revealed`.
pub(crate) fn mark_revealed(
    env: &Env,
    round_id: u64,
    voter: &Address,
    mut record: Commitment,
    choice: String,
    now: u64,
) -> Result<Commitment, ContractError> {
    if record.has_revealed {
        return Err(ContractError::AlreadyRevealed);
    }
    record.revealed_choice = Some(choice);
    record.has_revealed = true;
    record.revealed_at = Some(now);
    persist(env, &commitment_key(round_id, voter), &record);
    Ok(record)
}
