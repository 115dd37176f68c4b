#![no_std]

//! # Commit-Reveal Voting
//!
//! A verifiable voting engine:
//!
//! - **Commit**: voters submit `H(choice, secret)` while the round is Committing.
//! - **Reveal**: voters disclose `(choice, secret)`; the contract recomputes the
//!   digest and counts the vote exactly once.
//! - **Audit**: anyone can re-check a claimed vote with `verify`, replay the
//!   round transcript from events, and read the randomness published at close.
//!
//! Round lifecycle (admin-driven, deadlines are hard barriers):
//!
//! ```text
//! NotStarted ──open──► Committing ──advance_to_reveal──► Revealing ──close_round──► Ended
//! ```
//!
//! ## Module layout
//!
//! | Module           | Purpose                                             |
//! |------------------|-----------------------------------------------------|
//! | [`round`]        | `VotingRound`, `Phase`, transitions, deadlines      |
//! | [`commitment`]   | Commitment store and digest-owner index             |
//! | [`hashing`]      | `H(choice, secret)`                                 |
//! | [`tally`]        | Per-option counters                                 |
//! | [`verification`] | Read-only claim verification                        |
//! | [`randomness`]   | Audit randomness sources                            |
//! | [`audit_log`]    | Transcript hash chain and transition log            |
//! | [`config`]       | Admin and limits                                    |
//! | [`events`]       | Event publishing                                    |

pub mod audit_log;
pub mod commitment;
pub mod config;
pub mod events;
pub mod hashing;
pub mod randomness;
pub mod round;
pub mod tally;
pub mod verification;

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, log, Address, Bytes, BytesN, Env, String, Vec,
};

use audit_log::{TranscriptTag, TransitionRecord};
use commitment::Commitment;
use config::VotingConfig;
use randomness::RandomnessSource;
use round::{Phase, VotingRound};
use tally::TallyEntry;

// ── Storage keys ─────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Config,
    RoundCounter,
    Round(u64),
    Commitment(u64, Address),
    DigestOwner(u64, BytesN<32>),
    Tally(u64, u32),
    TransitionLog(u64),
}

// ── Error codes ───────────────────────────────────────────────────────────────

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    RoundNotFound = 4,
    InvalidOptions = 5,
    InvalidDeadline = 6,
    InvalidPhase = 7,
    PhaseClosed = 8,
    InvalidCommitment = 9,
    DuplicateCommitment = 10,
    NoCommitment = 11,
    AlreadyRevealed = 12,
    InvalidOption = 13,
    InvalidReveal = 14,
    InvalidConfig = 15,
    RandomnessUnavailable = 16,
}

// ── Contract ──────────────────────────────────────────────────────────────────

#[contract]
pub struct CommitRevealVoting;

#[contractimpl]
impl CommitRevealVoting {
    // ── Initialisation ────────────────────────────────────────────────────────

    /// Bootstrap the engine.
    ///
    /// * `admin`      — the single privileged identity allowed to open,
    ///                  advance and close rounds.
    /// * `randomness` — where the audit randomness comes from at close.
    pub fn initialize(
        env: Env,
        admin: Address,
        randomness: RandomnessSource,
    ) -> Result<(), ContractError> {
        if config::is_initialized(&env) {
            return Err(ContractError::AlreadyInitialized);
        }
        admin.require_auth();

        config::set_admin(&env, &admin);
        config::store(&env, &VotingConfig::with_source(randomness));
        Ok(())
    }

    // ── Round lifecycle (privileged) ─────────────────────────────────────────

    /// Open a new round and move it straight into Committing.
    ///
    /// `options` is the canonical, ordered option list. Deadlines are
    /// optional absolute ledger timestamps; without them the admin drives
    /// every transition manually.
    pub fn open_round(
        env: Env,
        caller: Address,
        options: Vec<String>,
        commit_deadline: Option<u64>,
        reveal_deadline: Option<u64>,
    ) -> Result<u64, ContractError> {
        config::require_initialized(&env)?;
        config::require_admin(&env, &caller)?;

        let cfg = config::load(&env)?;
        round::validate_options(&options, &cfg)?;
        let now = env.ledger().timestamp();
        round::validate_deadlines(now, commit_deadline, reveal_deadline)?;

        let id = round::next_id(&env);
        let mut voting_round = VotingRound {
            id,
            options: options.clone(),
            phase: Phase::NotStarted,
            commit_deadline,
            reveal_deadline,
            opened_at: now,
            revealing_at: None,
            closed_at: None,
            commit_count: 0,
            reveal_count: 0,
            transcript_head: audit_log::genesis(&env),
            audit_randomness: None,
        };
        let from = round::transition(&mut voting_round, Phase::Committing)?;
        voting_round.transcript_head = audit_log::extend(
            &env,
            &voting_round.transcript_head,
            TranscriptTag::Open,
            &audit_log::open_payload(&env, id, &options),
        );

        tally::initialize(&env, id, options.len());
        round::store(&env, &voting_round);
        audit_log::record_transition(&env, id, from, Phase::Committing, &caller, now);

        events::publish_round_opened(&env, id, &options, commit_deadline, reveal_deadline);
        events::publish_phase_transition(&env, id, from, Phase::Committing);

        Ok(id)
    }

    /// Committing → Revealing.
    pub fn advance_to_reveal(env: Env, caller: Address, round_id: u64) -> Result<(), ContractError> {
        config::require_initialized(&env)?;
        config::require_admin(&env, &caller)?;

        let mut voting_round = round::load(&env, round_id).ok_or(ContractError::RoundNotFound)?;
        let from = round::transition(&mut voting_round, Phase::Revealing)?;

        let now = env.ledger().timestamp();
        voting_round.revealing_at = Some(now);
        voting_round.transcript_head = audit_log::extend(
            &env,
            &voting_round.transcript_head,
            TranscriptTag::Advance,
            &audit_log::timestamp_payload(&env, now),
        );

        round::store(&env, &voting_round);
        audit_log::record_transition(&env, round_id, from, Phase::Revealing, &caller, now);
        events::publish_phase_transition(&env, round_id, from, Phase::Revealing);

        Ok(())
    }

    /// Revealing → Ended. Freezes the tally and returns the audit randomness.
    ///
    /// With a beacon source, a failed or empty beacon response aborts the
    /// close with `RandomnessUnavailable` and the round stays in Revealing.
    pub fn close_round(
        env: Env,
        caller: Address,
        round_id: u64,
    ) -> Result<BytesN<32>, ContractError> {
        config::require_initialized(&env)?;
        config::require_admin(&env, &caller)?;

        let mut voting_round = round::load(&env, round_id).ok_or(ContractError::RoundNotFound)?;
        let from = round::transition(&mut voting_round, Phase::Ended)?;

        let now = env.ledger().timestamp();
        let head = audit_log::extend(
            &env,
            &voting_round.transcript_head,
            TranscriptTag::Close,
            &audit_log::timestamp_payload(&env, now),
        );

        let cfg = config::load(&env)?;
        let entropy = randomness::draw_entropy(&env, &cfg.randomness, round_id, &head)?;
        let audit = randomness::audit_randomness(&env, round_id, &head, &entropy);

        voting_round.transcript_head = head.clone();
        voting_round.closed_at = Some(now);
        voting_round.audit_randomness = Some(audit.clone());

        round::store(&env, &voting_round);
        audit_log::record_transition(&env, round_id, from, Phase::Ended, &caller, now);
        events::publish_phase_transition(&env, round_id, from, Phase::Ended);
        events::publish_round_closed(&env, round_id, &audit, &head);
        log!(&env, "round closed", round_id, voting_round.reveal_count);

        Ok(audit)
    }

    // ── Voting ────────────────────────────────────────────────────────────────

    /// Phase 1 — commit (or re-commit) a sealed vote.
    ///
    /// Overwriting is allowed while the round accepts commits, which lets a
    /// voter correct a mistaken commitment without a separate cancel call.
    pub fn commit(
        env: Env,
        voter: Address,
        round_id: u64,
        digest: BytesN<32>,
    ) -> Result<(), ContractError> {
        config::require_initialized(&env)?;
        voter.require_auth();

        let mut voting_round = round::load(&env, round_id).ok_or(ContractError::RoundNotFound)?;
        let now = env.ledger().timestamp();
        if !round::accepts_commits(&voting_round, now) {
            return Err(ContractError::PhaseClosed);
        }
        if !hashing::is_well_formed(&digest) {
            return Err(ContractError::InvalidCommitment);
        }

        let first = commitment::write(&env, round_id, &voter, &digest, now)?;
        if first {
            voting_round.commit_count = voting_round.commit_count.saturating_add(1);
        }
        voting_round.transcript_head = audit_log::extend(
            &env,
            &voting_round.transcript_head,
            TranscriptTag::Commit,
            &audit_log::commit_payload(&env, &voter, &digest),
        );
        round::store(&env, &voting_round);

        events::publish_vote_committed(&env, round_id, &voter, &digest, &voting_round.transcript_head);

        Ok(())
    }

    /// Phase 2 — open a commitment and count the vote.
    ///
    /// A mismatch fails with `InvalidReveal` and mutates nothing, so the voter
    /// can retry with corrected inputs until the reveal window closes.
    pub fn reveal(
        env: Env,
        voter: Address,
        round_id: u64,
        choice: String,
        secret: Bytes,
    ) -> Result<(), ContractError> {
        config::require_initialized(&env)?;
        voter.require_auth();

        let record =
            commitment::load(&env, round_id, &voter).ok_or(ContractError::NoCommitment)?;
        if record.has_revealed {
            return Err(ContractError::AlreadyRevealed);
        }

        let mut voting_round = round::load(&env, round_id).ok_or(ContractError::RoundNotFound)?;
        let now = env.ledger().timestamp();
        if !round::accepts_reveals(&voting_round, now) {
            return Err(ContractError::PhaseClosed);
        }
        let index = round::option_index(&voting_round, &choice).ok_or(ContractError::InvalidOption)?;
        if !verification::opens(&env, &record, &choice, &secret) {
            log!(&env, "reveal rejected: digest mismatch", round_id, voter.clone());
            return Err(ContractError::InvalidReveal);
        }

        commitment::mark_revealed(&env, round_id, &voter, record, choice.clone(), now)?;
        tally::increment(&env, round_id, index);

        voting_round.reveal_count = voting_round.reveal_count.saturating_add(1);
        voting_round.transcript_head = audit_log::extend(
            &env,
            &voting_round.transcript_head,
            TranscriptTag::Reveal,
            &audit_log::reveal_payload(&env, &voter, index),
        );
        round::store(&env, &voting_round);

        events::publish_vote_revealed(&env, round_id, &voter, &choice, &voting_round.transcript_head);

        Ok(())
    }

    // ── Verification ──────────────────────────────────────────────────────────

    /// Re-check a claimed vote against the stored commitment.
    ///
    /// `Some(true)` / `Some(false)` is the digest comparison; `None` means the
    /// voter holds no commitment in this round. Never writes.
    pub fn verify(
        env: Env,
        round_id: u64,
        voter: Address,
        choice: String,
        secret: Bytes,
    ) -> Option<bool> {
        verification::verify_claim(&env, round_id, &voter, &choice, &secret)
    }

    /// `H(choice, secret)` exactly as `reveal` computes it.
    pub fn compute_commitment(env: Env, choice: String, secret: Bytes) -> BytesN<32> {
        hashing::commitment_digest(&env, &choice, &secret)
    }

    // ── Admin ─────────────────────────────────────────────────────────────────

    pub fn set_limits(
        env: Env,
        caller: Address,
        max_options: u32,
        max_option_len: u32,
    ) -> Result<(), ContractError> {
        config::require_initialized(&env)?;
        config::require_admin(&env, &caller)?;

        if max_options == 0 || max_option_len == 0 {
            return Err(ContractError::InvalidConfig);
        }
        let mut cfg = config::load(&env)?;
        cfg.max_options = max_options;
        cfg.max_option_len = max_option_len;
        config::store(&env, &cfg);
        events::publish_config_updated(&env, &cfg);
        Ok(())
    }

    /// Takes effect for every round closed from now on, including open ones.
    pub fn set_randomness_source(
        env: Env,
        caller: Address,
        source: RandomnessSource,
    ) -> Result<(), ContractError> {
        config::require_initialized(&env)?;
        config::require_admin(&env, &caller)?;

        let mut cfg = config::load(&env)?;
        cfg.randomness = source;
        config::store(&env, &cfg);
        events::publish_config_updated(&env, &cfg);
        Ok(())
    }

    /// Hand the privileged role to `new_admin`. Both parties must authorise.
    pub fn transfer_admin(
        env: Env,
        caller: Address,
        new_admin: Address,
    ) -> Result<(), ContractError> {
        config::require_initialized(&env)?;
        config::require_admin(&env, &caller)?;
        new_admin.require_auth();

        config::set_admin(&env, &new_admin);
        events::publish_admin_transferred(&env, &caller, &new_admin);
        Ok(())
    }

    // ── View functions ────────────────────────────────────────────────────────

    /// Current counts in canonical option order. Valid in every phase;
    /// frozen once the round has ended.
    pub fn get_results(env: Env, round_id: u64) -> Result<Vec<TallyEntry>, ContractError> {
        let voting_round = round::load(&env, round_id).ok_or(ContractError::RoundNotFound)?;
        Ok(tally::results(&env, &voting_round))
    }

    pub fn get_round(env: Env, round_id: u64) -> Option<VotingRound> {
        round::load(&env, round_id)
    }

    /// `NotStarted` for ids that have not been opened yet.
    pub fn get_phase(env: Env, round_id: u64) -> Phase {
        round::load(&env, round_id)
            .map(|r| r.phase)
            .unwrap_or(Phase::NotStarted)
    }

    pub fn round_count(env: Env) -> u64 {
        round::round_count(&env)
    }

    pub fn get_commitment(env: Env, round_id: u64, voter: Address) -> Option<Commitment> {
        commitment::load(&env, round_id, &voter)
    }

    pub fn has_committed(env: Env, round_id: u64, voter: Address) -> bool {
        commitment::has_committed(&env, round_id, &voter)
    }

    /// The voter's revealed choice, for downstream consumers of results.
    pub fn revealed_choice(env: Env, round_id: u64, voter: Address) -> Option<String> {
        commitment::load(&env, round_id, &voter).and_then(|c| c.revealed_choice)
    }

    pub fn get_transition_log(env: Env, round_id: u64) -> Vec<TransitionRecord> {
        audit_log::transition_log(&env, round_id)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        config::admin(&env)
    }

    pub fn get_config(env: Env) -> Result<VotingConfig, ContractError> {
        config::load(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        config::is_initialized(&env)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
