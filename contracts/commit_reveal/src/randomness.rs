//! Audit randomness published when a round closes.
//!
//! The value lets off-chain auditors seed sampling or cross-checks. It is never
//! read by tally code.
//!
//! Two sources are supported:
//!
//! | Source        | Strength                                                     |
//! |---------------|--------------------------------------------------------------|
//! | `LedgerPrng`  | Host PRNG. Its seed is network-derived and can be influenced by whoever orders transactions. |
//! | `Beacon(addr)`| External verifiable-randomness contract, called at close.    |
//!
//! ```text
//! audit = SHA-256( "CRV-AUDIT" || be64(round_id) || transcript_head || entropy )
//! ```

use soroban_sdk::{contractclient, contracttype, Address, Bytes, BytesN, Env};

use crate::hashing::is_well_formed;
use crate::ContractError;

const AUDIT_DOMAIN: &[u8] = b"CRV-AUDIT";

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RandomnessSource {
    LedgerPrng,
    Beacon(Address),
}

/// Interface an external randomness beacon must implement.
///
/// `seed` is the round's final transcript head, so a beacon that binds its
/// output to the seed commits to one specific round history.
#[contractclient(name = "RandomnessBeaconClient")]
pub trait RandomnessBeacon {
    fn randomness(env: Env, round_id: u64, seed: BytesN<32>) -> BytesN<32>;
}

pub(crate) fn draw_entropy(
    env: &Env,
    source: &RandomnessSource,
    round_id: u64,
    seed: &BytesN<32>,
) -> Result<BytesN<32>, ContractError> {
    match source {
        RandomnessSource::LedgerPrng => {
            let mut buf = [0u8; 32];
            for chunk in buf.chunks_mut(8) {
                let word: u64 = env.prng().gen_range(0..u64::MAX);
                chunk.copy_from_slice(&word.to_be_bytes());
            }
            Ok(BytesN::from_array(env, &buf))
        }
        RandomnessSource::Beacon(beacon) => {
            let client = RandomnessBeaconClient::new(env, beacon);
            match client.try_randomness(&round_id, seed) {
                Ok(Ok(value)) if is_well_formed(&value) => Ok(value),
                _ => Err(ContractError::RandomnessUnavailable),
            }
        }
    }
}

pub fn audit_randomness(
    env: &Env,
    round_id: u64,
    transcript_head: &BytesN<32>,
    entropy: &BytesN<32>,
) -> BytesN<32> {
    let mut payload = Bytes::from_slice(env, AUDIT_DOMAIN);
    payload.append(&Bytes::from_slice(env, &round_id.to_be_bytes()));
    payload.append(&Bytes::from_slice(env, &transcript_head.to_array()));
    payload.append(&Bytes::from_slice(env, &entropy.to_array()));
    env.crypto().sha256(&payload).into()
}
