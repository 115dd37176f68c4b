//! Hash-chained round transcript and phase transition log.
//!
//! Every mutating round operation extends the transcript:
//!
//! ```text
//! head_0     = [0u8; 32]
//! head_{n+1} = SHA-256( head_n || be32(tag) || payload )
//! ```
//!
//! The new head is published with each event, so an auditor replaying the
//! event stream through [`extend`] must land on `VotingRound::transcript_head`.
//! Editing, dropping or reordering any earlier operation breaks every later head.
//!
//! Phase transitions are additionally kept on-chain as [`TransitionRecord`]s.
//! A round has at most three of them.

use soroban_sdk::{contracttype, xdr::ToXdr, Address, Bytes, BytesN, Env, String, Vec};

use crate::hashing::encode_option;
use crate::round::Phase;
use crate::DataKey;

// TTL: ~60 days at 5s/ledger
const TTL_THRESHOLD: u32 = 1_036_800;
const TTL_EXTEND_TO: u32 = 2_073_600;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum TranscriptTag {
    Open = 1,
    Commit = 2,
    Advance = 3,
    Reveal = 4,
    Close = 5,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransitionRecord {
    pub round_id: u64,
    pub from: Phase,
    pub to: Phase,
    pub actor: Address,
    pub timestamp: u64,
    pub prev_hash: BytesN<32>,
    pub transition_hash: BytesN<32>,
}

pub fn genesis(env: &Env) -> BytesN<32> {
    BytesN::from_array(env, &[0u8; 32])
}

pub fn extend(env: &Env, head: &BytesN<32>, tag: TranscriptTag, payload: &Bytes) -> BytesN<32> {
    let mut data = Bytes::from_slice(env, &head.to_array());
    data.append(&Bytes::from_slice(env, &(tag as u32).to_be_bytes()));
    data.append(payload);
    env.crypto().sha256(&data).into()
}

// ── Payload encodings ────────────────────────────────────────────────────────

pub fn open_payload(env: &Env, round_id: u64, options: &Vec<String>) -> Bytes {
    let mut payload = Bytes::from_slice(env, &round_id.to_be_bytes());
    for option in options.iter() {
        payload.append(&encode_option(env, &option));
    }
    payload
}

pub fn commit_payload(env: &Env, voter: &Address, digest: &BytesN<32>) -> Bytes {
    let mut payload = voter.clone().to_xdr(env);
    payload.append(&Bytes::from_slice(env, &digest.to_array()));
    payload
}

pub fn reveal_payload(env: &Env, voter: &Address, option_index: u32) -> Bytes {
    let mut payload = voter.clone().to_xdr(env);
    payload.append(&Bytes::from_slice(env, &option_index.to_be_bytes()));
    payload
}

/// Payload for advance and close.
pub fn timestamp_payload(env: &Env, timestamp: u64) -> Bytes {
    Bytes::from_slice(env, &timestamp.to_be_bytes())
}

// ── Transition log ───────────────────────────────────────────────────────────

fn hash_transition(
    env: &Env,
    round_id: u64,
    from: Phase,
    to: Phase,
    actor: &Address,
    timestamp: u64,
    prev_hash: &BytesN<32>,
) -> BytesN<32> {
    let mut payload = Bytes::from_slice(env, &prev_hash.to_array());
    payload.append(&Bytes::from_slice(env, &round_id.to_be_bytes()));
    payload.append(&Bytes::from_slice(env, &(from as u32).to_be_bytes()));
    payload.append(&Bytes::from_slice(env, &(to as u32).to_be_bytes()));
    payload.append(&actor.clone().to_xdr(env));
    payload.append(&Bytes::from_slice(env, &timestamp.to_be_bytes()));
    env.crypto().sha256(&payload).into()
}

pub fn transition_log(env: &Env, round_id: u64) -> Vec<TransitionRecord> {
    env.storage()
        .persistent()
        .get(&DataKey::TransitionLog(round_id))
        .unwrap_or(Vec::new(env))
}

pub(crate) fn record_transition(
    env: &Env,
    round_id: u64,
    from: Phase,
    to: Phase,
    actor: &Address,
    timestamp: u64,
) -> TransitionRecord {
    let mut log = transition_log(env, round_id);
    let prev_hash = match log.last() {
        Some(last) => last.transition_hash,
        None => genesis(env),
    };
    let transition_hash = hash_transition(env, round_id, from, to, actor, timestamp, &prev_hash);

    let record = TransitionRecord {
        round_id,
        from,
        to,
        actor: actor.clone(),
        timestamp,
        prev_hash,
        transition_hash,
    };
    log.push_back(record.clone());

    let key = DataKey::TransitionLog(round_id);
    env.storage().persistent().set(&key, &log);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

    record
}

/// Recompute every link of a transition log. `true` when the chain is intact.
pub fn verify_transition_chain(env: &Env, log: &Vec<TransitionRecord>) -> bool {
    let mut expected_prev = genesis(env);
    for record in log.iter() {
        if record.prev_hash != expected_prev {
            return false;
        }
        let recomputed = hash_transition(
            env,
            record.round_id,
            record.from,
            record.to,
            &record.actor,
            record.timestamp,
            &record.prev_hash,
        );
        if recomputed != record.transition_hash {
            return false;
        }
        expected_prev = recomputed;
    }
    true
}
