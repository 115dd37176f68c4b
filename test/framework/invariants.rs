//! # Voting Invariants
//!
//! Snapshot invariants hold for every reachable state of a round. Transition
//! invariants relate two consecutive snapshots (before and after an action).
//! Both are checked after every action during state exploration and can be
//! composed through `InvariantSet` / `TransitionInvariantSet`.
//!
//! Every check is O(v) in the number of tracked voters.

extern crate std;

use std::string::String;
use std::vec::Vec;

use commit_reveal::round::Phase;

use super::VotingSnapshot;

// ── Invariant Trait ──────────────────────────────────────────────────────────

/// A named invariant that can be verified against a state snapshot.
pub trait Invariant {
    fn name(&self) -> &str;

    /// `Ok(())` on success, `Err(description)` on violation.
    fn check(&self, snapshot: &VotingSnapshot) -> Result<(), String>;
}

// ── Built-in Invariants ──────────────────────────────────────────────────────

/// **Tally Conservation**: `Σ tally == reveal_count == #revealed voters`.
///
/// A violation means a vote was counted twice, dropped, or counted without a
/// successful reveal.
pub struct TallyConservation;

impl Invariant for TallyConservation {
    fn name(&self) -> &str {
        "sum(tally) == reveal_count == revealed voters"
    }

    fn check(&self, snapshot: &VotingSnapshot) -> Result<(), String> {
        let total = snapshot.total_votes();
        if total != snapshot.reveal_count as u64 {
            return Err(std::format!(
                "Tally sum ({}) != reveal_count ({})",
                total, snapshot.reveal_count
            ));
        }
        let revealed = snapshot.revealed_voters();
        if revealed != snapshot.reveal_count as usize {
            return Err(std::format!(
                "Revealed voters ({}) != reveal_count ({})",
                revealed, snapshot.reveal_count
            ));
        }
        Ok(())
    }
}

/// **Reveal Requires Commit**: every revealed voter holds a commitment and
/// `reveal_count <= commit_count`.
pub struct RevealsBoundedByCommits;

impl Invariant for RevealsBoundedByCommits {
    fn name(&self) -> &str {
        "reveals are bounded by commits"
    }

    fn check(&self, snapshot: &VotingSnapshot) -> Result<(), String> {
        if snapshot.reveal_count > snapshot.commit_count {
            return Err(std::format!(
                "reveal_count ({}) exceeds commit_count ({})",
                snapshot.reveal_count, snapshot.commit_count
            ));
        }
        for state in &snapshot.voters {
            if state.revealed && !state.committed {
                return Err(std::format!(
                    "Voter {:?} revealed without a commitment",
                    state.voter
                ));
            }
            if state.revealed != state.revealed_choice.is_some() {
                return Err(std::format!(
                    "Voter {:?} has revealed={} but revealed_choice={:?}",
                    state.voter, state.revealed, state.revealed_choice
                ));
            }
        }
        Ok(())
    }
}

/// **Commit Count Consistency**: `commit_count` equals the number of distinct
/// voters holding a commitment. Overwrites never count twice.
pub struct CommitCountConsistency;

impl Invariant for CommitCountConsistency {
    fn name(&self) -> &str {
        "commit_count == committed voters"
    }

    fn check(&self, snapshot: &VotingSnapshot) -> Result<(), String> {
        let committed = snapshot.committed_voters();
        if committed != snapshot.commit_count as usize {
            return Err(std::format!(
                "Committed voters ({}) != commit_count ({})",
                committed, snapshot.commit_count
            ));
        }
        Ok(())
    }
}

/// **Audit Randomness Only When Ended**: the audit value is present exactly
/// when the round has ended.
pub struct AuditRandomnessOnlyWhenEnded;

impl Invariant for AuditRandomnessOnlyWhenEnded {
    fn name(&self) -> &str {
        "audit_randomness.is_some() <=> phase == Ended"
    }

    fn check(&self, snapshot: &VotingSnapshot) -> Result<(), String> {
        let ended = snapshot.phase == Phase::Ended;
        if ended != snapshot.audit_randomness.is_some() {
            return Err(std::format!(
                "Phase {:?} with audit_randomness present = {}",
                snapshot.phase,
                snapshot.audit_randomness.is_some()
            ));
        }
        Ok(())
    }
}

/// **No Reveals Before Revealing**: a round that has not reached Revealing has
/// an all-zero tally.
pub struct NoVotesBeforeRevealing;

impl Invariant for NoVotesBeforeRevealing {
    fn name(&self) -> &str {
        "tally is zero before Revealing"
    }

    fn check(&self, snapshot: &VotingSnapshot) -> Result<(), String> {
        if snapshot.phase < Phase::Revealing && snapshot.total_votes() != 0 {
            return Err(std::format!(
                "Phase {:?} already has {} counted votes",
                snapshot.phase,
                snapshot.total_votes()
            ));
        }
        Ok(())
    }
}

// ── Invariant Set ────────────────────────────────────────────────────────────

/// A composable set of invariants that are checked together.
pub struct InvariantSet {
    invariants: Vec<Box<dyn Invariant>>,
}

impl InvariantSet {
    pub fn new() -> Self {
        Self {
            invariants: Vec::new(),
        }
    }

    /// Create a set pre-loaded with all built-in voting invariants.
    pub fn voting_defaults() -> Self {
        let mut set = Self::new();
        set.add(Box::new(TallyConservation));
        set.add(Box::new(RevealsBoundedByCommits));
        set.add(Box::new(CommitCountConsistency));
        set.add(Box::new(AuditRandomnessOnlyWhenEnded));
        set.add(Box::new(NoVotesBeforeRevealing));
        set
    }

    pub fn add(&mut self, invariant: Box<dyn Invariant>) {
        self.invariants.push(invariant);
    }

    /// Verify all invariants against a snapshot.
    /// Returns a list of (invariant_name, violation_message) for all failures.
    pub fn check_all(&self, snapshot: &VotingSnapshot) -> Vec<(String, String)> {
        let mut violations = Vec::new();
        for inv in &self.invariants {
            if let Err(msg) = inv.check(snapshot) {
                violations.push((inv.name().to_string(), msg));
            }
        }
        violations
    }

    /// Assert all invariants hold, panicking with details on violation.
    pub fn assert_all(&self, snapshot: &VotingSnapshot) {
        let violations = self.check_all(snapshot);
        if !violations.is_empty() {
            let mut report = String::from("Invariant violations detected:\n");
            for (name, msg) in &violations {
                report.push_str(&std::format!("  ✗ [{}]: {}\n", name, msg));
            }
            panic!("{}", report);
        }
    }

    pub fn len(&self) -> usize {
        self.invariants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invariants.is_empty()
    }
}

impl Default for InvariantSet {
    fn default() -> Self {
        Self::new()
    }
}

// ── Transition Invariants ────────────────────────────────────────────────────

/// Invariants over two consecutive snapshots of the same round.
pub trait TransitionInvariant {
    fn name(&self) -> &str;
    fn check(&self, before: &VotingSnapshot, after: &VotingSnapshot) -> Result<(), String>;
}

/// **Phase Monotonicity**: `before.phase <= after.phase`.
pub struct PhaseMonotonicity;

impl TransitionInvariant for PhaseMonotonicity {
    fn name(&self) -> &str {
        "phase never moves backward"
    }

    fn check(&self, before: &VotingSnapshot, after: &VotingSnapshot) -> Result<(), String> {
        if after.phase < before.phase {
            return Err(std::format!(
                "Phase regressed: {:?} -> {:?}",
                before.phase, after.phase
            ));
        }
        Ok(())
    }
}

/// **Tally Monotonicity**: no option count ever decreases.
pub struct TallyMonotonicity;

impl TransitionInvariant for TallyMonotonicity {
    fn name(&self) -> &str {
        "option counts never decrease"
    }

    fn check(&self, before: &VotingSnapshot, after: &VotingSnapshot) -> Result<(), String> {
        for (index, (b, a)) in before.tally.iter().zip(after.tally.iter()).enumerate() {
            if a < b {
                return Err(std::format!(
                    "Count for option #{} decreased: {} -> {}",
                    index, b, a
                ));
            }
        }
        Ok(())
    }
}

/// **Tally Frozen After End**: once Ended, counts and the audit value never change.
pub struct TallyFrozenAfterEnd;

impl TransitionInvariant for TallyFrozenAfterEnd {
    fn name(&self) -> &str {
        "tally and audit randomness are frozen after Ended"
    }

    fn check(&self, before: &VotingSnapshot, after: &VotingSnapshot) -> Result<(), String> {
        if before.phase != Phase::Ended {
            return Ok(());
        }
        if before.tally != after.tally {
            return Err(std::format!(
                "Tally changed after end: {:?} -> {:?}",
                before.tally, after.tally
            ));
        }
        if before.audit_randomness != after.audit_randomness {
            return Err(String::from("Audit randomness changed after end"));
        }
        if before.transcript_head != after.transcript_head {
            return Err(String::from("Transcript extended after end"));
        }
        Ok(())
    }
}

/// **Revealed Choice Immutable**: a revealed vote stays revealed with the same choice.
pub struct RevealedChoiceImmutable;

impl TransitionInvariant for RevealedChoiceImmutable {
    fn name(&self) -> &str {
        "revealed choices are immutable"
    }

    fn check(&self, before: &VotingSnapshot, after: &VotingSnapshot) -> Result<(), String> {
        for state in before.voters.iter().filter(|v| v.revealed) {
            match after.voter(&state.voter) {
                Some(next) if next.revealed && next.revealed_choice == state.revealed_choice => {}
                Some(next) => {
                    return Err(std::format!(
                        "Voter {:?} revealed {:?}, now revealed={} choice={:?}",
                        state.voter, state.revealed_choice, next.revealed, next.revealed_choice
                    ));
                }
                None => {}
            }
        }
        Ok(())
    }
}

/// Composite checker for transition invariants.
pub struct TransitionInvariantSet {
    invariants: Vec<Box<dyn TransitionInvariant>>,
}

impl TransitionInvariantSet {
    pub fn new() -> Self {
        Self {
            invariants: Vec::new(),
        }
    }

    pub fn voting_defaults() -> Self {
        let mut set = Self::new();
        set.add(Box::new(PhaseMonotonicity));
        set.add(Box::new(TallyMonotonicity));
        set.add(Box::new(TallyFrozenAfterEnd));
        set.add(Box::new(RevealedChoiceImmutable));
        set
    }

    pub fn add(&mut self, invariant: Box<dyn TransitionInvariant>) {
        self.invariants.push(invariant);
    }

    pub fn check_all(
        &self,
        before: &VotingSnapshot,
        after: &VotingSnapshot,
    ) -> Vec<(String, String)> {
        let mut violations = Vec::new();
        for inv in &self.invariants {
            if let Err(msg) = inv.check(before, after) {
                violations.push((inv.name().to_string(), msg));
            }
        }
        violations
    }

    pub fn assert_all(&self, before: &VotingSnapshot, after: &VotingSnapshot) {
        let violations = self.check_all(before, after);
        if !violations.is_empty() {
            let mut report = String::from("Transition invariant violations:\n");
            for (name, msg) in &violations {
                report.push_str(&std::format!("  ✗ [{}]: {}\n", name, msg));
            }
            panic!("{}", report);
        }
    }
}

impl Default for TransitionInvariantSet {
    fn default() -> Self {
        Self::new()
    }
}
