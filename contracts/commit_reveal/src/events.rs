//! Structured event publishing for the commit-reveal contract.
//!
//! Commit and reveal events carry the new transcript head, so the event
//! stream alone is enough to replay a round's hash chain.

#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, BytesN, Env, String, Vec};

use crate::config::VotingConfig;
use crate::round::Phase;

pub fn publish_round_opened(
    env: &Env,
    round_id: u64,
    options: &Vec<String>,
    commit_deadline: Option<u64>,
    reveal_deadline: Option<u64>,
) {
    env.events().publish(
        (symbol_short!("RND_OPEN"), round_id),
        (options.clone(), commit_deadline, reveal_deadline),
    );
}

pub fn publish_phase_transition(env: &Env, round_id: u64, from: Phase, to: Phase) {
    env.events()
        .publish((symbol_short!("RND_PHS"), round_id), (from, to));
}

pub fn publish_vote_committed(
    env: &Env,
    round_id: u64,
    voter: &Address,
    digest: &BytesN<32>,
    transcript_head: &BytesN<32>,
) {
    env.events().publish(
        (symbol_short!("VOTE_COM"), round_id),
        (voter.clone(), digest.clone(), transcript_head.clone()),
    );
}

pub fn publish_vote_revealed(
    env: &Env,
    round_id: u64,
    voter: &Address,
    choice: &String,
    transcript_head: &BytesN<32>,
) {
    env.events().publish(
        (symbol_short!("VOTE_REV"), round_id),
        (voter.clone(), choice.clone(), transcript_head.clone()),
    );
}

pub fn publish_round_closed(
    env: &Env,
    round_id: u64,
    audit_randomness: &BytesN<32>,
    transcript_head: &BytesN<32>,
) {
    env.events().publish(
        (symbol_short!("RND_END"), round_id),
        (audit_randomness.clone(), transcript_head.clone()),
    );
}

pub fn publish_admin_transferred(env: &Env, previous: &Address, next: &Address) {
    env.events()
        .publish((symbol_short!("ADM_XFER"),), (previous.clone(), next.clone()));
}

pub fn publish_config_updated(env: &Env, config: &VotingConfig) {
    env.events()
        .publish((symbol_short!("CFG_SET"),), config.clone());
}
