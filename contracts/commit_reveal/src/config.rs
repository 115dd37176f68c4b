//! Admin identity and engine configuration (instance storage).

use soroban_sdk::{contracttype, Address, Env};

use crate::randomness::RandomnessSource;
use crate::{ContractError, DataKey};

/// Upper bound on options per round; bounds the duplicate scan at open.
pub const DEFAULT_MAX_OPTIONS: u32 = 32;
/// Upper bound on a single option label, in bytes.
pub const DEFAULT_MAX_OPTION_LEN: u32 = 64;

const TTL_THRESHOLD: u32 = 5_184_000;
const TTL_EXTEND_TO: u32 = 10_368_000;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VotingConfig {
    pub max_options: u32,
    pub max_option_len: u32,
    pub randomness: RandomnessSource,
}

impl VotingConfig {
    pub fn with_source(randomness: RandomnessSource) -> Self {
        Self {
            max_options: DEFAULT_MAX_OPTIONS,
            max_option_len: DEFAULT_MAX_OPTION_LEN,
            randomness,
        }
    }
}

pub(crate) fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub(crate) fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

pub(crate) fn require_initialized(env: &Env) -> Result<(), ContractError> {
    if !is_initialized(env) {
        return Err(ContractError::NotInitialized);
    }
    Ok(())
}

pub(crate) fn admin(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(ContractError::NotInitialized)
}

pub(crate) fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
    extend_instance_ttl(env);
}

/// Authenticate `caller` and check it is the stored admin.
pub(crate) fn require_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
    caller.require_auth();
    if *caller != admin(env)? {
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}

pub(crate) fn load(env: &Env) -> Result<VotingConfig, ContractError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(ContractError::NotInitialized)
}

pub(crate) fn store(env: &Env, config: &VotingConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    extend_instance_ttl(env);
}
