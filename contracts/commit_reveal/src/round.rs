//! Voting round records, storage and the phase state machine.
//!
//! ```text
//! NotStarted ──► Committing ──► Revealing ──► Ended
//! ```
//!
//! The only legal edge out of a phase is [`Phase::successor`]. Rounds are
//! never deleted; the `Round(id)` entries form an append-only index.

use soroban_sdk::{contracttype, BytesN, Env, String, Vec};

use crate::config::VotingConfig;
use crate::{ContractError, DataKey};

// TTL: ~60 days at 5s/ledger
const TTL_THRESHOLD: u32 = 1_036_800;
const TTL_EXTEND_TO: u32 = 2_073_600;

// ── Types ─────────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Phase {
    NotStarted = 0,
    Committing = 1,
    Revealing = 2,
    Ended = 3,
}

impl Phase {
    pub fn successor(self) -> Option<Phase> {
        match self {
            Phase::NotStarted => Some(Phase::Committing),
            Phase::Committing => Some(Phase::Revealing),
            Phase::Revealing => Some(Phase::Ended),
            Phase::Ended => None,
        }
    }
}

/// The on-chain record for one voting round.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VotingRound {
    pub id: u64,
    /// Canonical option order; also the reporting order for results.
    pub options: Vec<String>,
    pub phase: Phase,
    /// Commits are rejected once `now >= commit_deadline`.
    pub commit_deadline: Option<u64>,
    /// Reveals are rejected once `now >= reveal_deadline`.
    pub reveal_deadline: Option<u64>,
    pub opened_at: u64,
    pub revealing_at: Option<u64>,
    pub closed_at: Option<u64>,
    /// Distinct voters holding a commitment.
    pub commit_count: u32,
    /// Successful reveals; always equals the sum of the tally.
    pub reveal_count: u32,
    pub transcript_head: BytesN<32>,
    /// Populated exactly when `phase == Ended`.
    pub audit_randomness: Option<BytesN<32>>,
}

// ── Storage helpers ──────────────────────────────────────────────────────────

pub(crate) fn next_id(env: &Env) -> u64 {
    let id = round_count(env).saturating_add(1);
    env.storage().instance().set(&DataKey::RoundCounter, &id);
    id
}

pub(crate) fn round_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::RoundCounter)
        .unwrap_or(0u64)
}

pub(crate) fn store(env: &Env, round: &VotingRound) {
    let key = DataKey::Round(round.id);
    env.storage().persistent().set(&key, round);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub(crate) fn load(env: &Env, round_id: u64) -> Option<VotingRound> {
    env.storage().persistent().get(&DataKey::Round(round_id))
}

// ── Validation ───────────────────────────────────────────────────────────────

/// Options must be non-empty, duplicate-free and within the configured limits.
pub(crate) fn validate_options(
    options: &Vec<String>,
    config: &VotingConfig,
) -> Result<(), ContractError> {
    let len = options.len();
    if len == 0 || len > config.max_options {
        return Err(ContractError::InvalidOptions);
    }
    for i in 0..len {
        let option = options.get_unchecked(i);
        if option.len() == 0 || option.len() > config.max_option_len {
            return Err(ContractError::InvalidOptions);
        }
        for j in (i + 1)..len {
            if option == options.get_unchecked(j) {
                return Err(ContractError::InvalidOptions);
            }
        }
    }
    Ok(())
}

pub(crate) fn validate_deadlines(
    now: u64,
    commit_deadline: Option<u64>,
    reveal_deadline: Option<u64>,
) -> Result<(), ContractError> {
    if let Some(commit) = commit_deadline {
        if commit <= now {
            return Err(ContractError::InvalidDeadline);
        }
    }
    if let Some(reveal) = reveal_deadline {
        if reveal <= now {
            return Err(ContractError::InvalidDeadline);
        }
        if let Some(commit) = commit_deadline {
            if reveal <= commit {
                return Err(ContractError::InvalidDeadline);
            }
        }
    }
    Ok(())
}

// ── State machine ────────────────────────────────────────────────────────────

/// Move `round` one step forward to `to`, returning the phase it left.
///
/// Fails with `InvalidPhase` for anything but the single successor edge, so
/// phases can never regress or skip.
pub(crate) fn transition(round: &mut VotingRound, to: Phase) -> Result<Phase, ContractError> {
    let from = round.phase;
    if from.successor() != Some(to) {
        return Err(ContractError::InvalidPhase);
    }
    round.phase = to;
    Ok(from)
}

fn deadline_reached(deadline: Option<u64>, now: u64) -> bool {
    matches!(deadline, Some(d) if now >= d)
}

pub(crate) fn accepts_commits(round: &VotingRound, now: u64) -> bool {
    round.phase == Phase::Committing && !deadline_reached(round.commit_deadline, now)
}

pub(crate) fn accepts_reveals(round: &VotingRound, now: u64) -> bool {
    round.phase == Phase::Revealing && !deadline_reached(round.reveal_deadline, now)
}

pub(crate) fn option_index(round: &VotingRound, choice: &String) -> Option<u32> {
    for (i, option) in round.options.iter().enumerate() {
        if option == *choice {
            return Some(i as u32);
        }
    }
    None
}
