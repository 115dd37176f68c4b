#![no_main]

use arbitrary::Arbitrary;
use commit_reveal::randomness::RandomnessSource;
use commit_reveal::round::Phase;
use commit_reveal::{CommitRevealVoting, CommitRevealVotingClient};
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    Address, Bytes, Env, String, Vec as SorobanVec,
};

const OPTIONS: [&str; 3] = ["A", "B", "C"];

/// Actions modelling the voting entry points. Voter and option selectors are
/// reduced modulo the pool sizes; secrets are short so that equal digests
/// across voters actually occur.
#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Commit { voter: u8, choice: u8, secret: [u8; 2] },
    Reveal { voter: u8, choice: u8, secret: [u8; 2] },
    Advance,
    Close,
    AdvanceTime { delta: u16 },
}

fuzz_target!(|input: (Option<u16>, Vec<FuzzAction>)| {
    let (commit_window, actions) = input;
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let contract_id = env.register(CommitRevealVoting, ());
    let client = CommitRevealVotingClient::new(&env, &contract_id);

    if client
        .try_initialize(&admin, &RandomnessSource::LedgerPrng)
        .is_err()
    {
        return;
    }

    let mut options = SorobanVec::new(&env);
    for label in OPTIONS {
        options.push_back(String::from_str(&env, label));
    }
    let deadline = commit_window.map(|w| env.ledger().timestamp() + w as u64 + 1);
    let round_id = match client.try_open_round(&admin, &options, &deadline, &None) {
        Ok(Ok(id)) => id,
        _ => return,
    };

    let users: Vec<Address> = (0..4).map(|_| Address::generate(&env)).collect();
    let mut last_phase = client.get_phase(&round_id);
    let mut last_counts = vec![0u64; OPTIONS.len()];

    for action in actions {
        match action {
            FuzzAction::Commit { voter, choice, secret } => {
                let voter = &users[voter as usize % users.len()];
                let choice = String::from_str(&env, OPTIONS[choice as usize % OPTIONS.len()]);
                let digest = client.compute_commitment(&choice, &Bytes::from_slice(&env, &secret));
                let _ = client.try_commit(voter, &round_id, &digest);
            }
            FuzzAction::Reveal { voter, choice, secret } => {
                let voter = &users[voter as usize % users.len()];
                let choice = String::from_str(&env, OPTIONS[choice as usize % OPTIONS.len()]);
                let secret = Bytes::from_slice(&env, &secret);
                let expected = client.verify(&round_id, voter, &choice, &secret);
                let accepted = client.try_reveal(voter, &round_id, &choice, &secret).is_ok();
                // ── Binding: an accepted reveal must open the stored commitment ──
                if accepted {
                    assert_eq!(expected, Some(true), "INVARIANT VIOLATION: reveal accepted without a matching commitment");
                }
            }
            FuzzAction::Advance => {
                let _ = client.try_advance_to_reveal(&admin, &round_id);
            }
            FuzzAction::Close => {
                let _ = client.try_close_round(&admin, &round_id);
            }
            FuzzAction::AdvanceTime { delta } => {
                let ts = env.ledger().timestamp().saturating_add(delta as u64);
                env.ledger().set_timestamp(ts);
            }
        }

        // ── Post-action invariant checks ──
        let round = client.get_round(&round_id).expect("round exists");
        let counts: Vec<u64> = client.get_results(&round_id).iter().map(|e| e.count).collect();
        let total: u64 = counts.iter().sum();

        assert_eq!(total, round.reveal_count as u64, "INVARIANT VIOLATION: tally != reveal_count");
        assert!(round.reveal_count <= round.commit_count, "INVARIANT VIOLATION: more reveals than commits");
        assert!(round.phase >= last_phase, "INVARIANT VIOLATION: phase moved backward");
        assert_eq!(
            round.audit_randomness.is_some(),
            round.phase == Phase::Ended,
            "INVARIANT VIOLATION: audit randomness outside Ended"
        );
        for (before, after) in last_counts.iter().zip(counts.iter()) {
            assert!(after >= before, "INVARIANT VIOLATION: count decreased");
        }
        if last_phase == Phase::Ended {
            assert_eq!(counts, last_counts, "INVARIANT VIOLATION: tally changed after end");
        }

        last_phase = round.phase;
        last_counts = counts;
    }
});
