//! Per-option vote counters.

use soroban_sdk::{contracttype, Env, String, Vec};

use crate::round::VotingRound;
use crate::DataKey;

// TTL: ~60 days at 5s/ledger
const TTL_THRESHOLD: u32 = 1_036_800;
const TTL_EXTEND_TO: u32 = 2_073_600;

/// One row of a round's results.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TallyEntry {
    pub option: String,
    pub count: u64,
}

fn set_count(env: &Env, round_id: u64, index: u32, count: u64) {
    let key = DataKey::Tally(round_id, index);
    env.storage().persistent().set(&key, &count);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Zero every counter of a freshly opened round.
pub(crate) fn initialize(env: &Env, round_id: u64, option_count: u32) {
    for index in 0..option_count {
        set_count(env, round_id, index, 0);
    }
}

pub(crate) fn count(env: &Env, round_id: u64, index: u32) -> u64 {
    env.storage()
        .persistent()
        .get(&DataKey::Tally(round_id, index))
        .unwrap_or(0u64)
}

pub(crate) fn increment(env: &Env, round_id: u64, index: u32) -> u64 {
    let next = count(env, round_id, index).saturating_add(1);
    set_count(env, round_id, index, next);
    next
}

/// Counts in the round's canonical option order.
pub(crate) fn results(env: &Env, round: &VotingRound) -> Vec<TallyEntry> {
    let mut out = Vec::new(env);
    for (index, option) in round.options.iter().enumerate() {
        out.push_back(TallyEntry {
            option,
            count: count(env, round.id, index as u32),
        });
    }
    out
}
