use soroban_sdk::{contracttype, Address, Env};

use crate::error::JusterError;
use crate::types::{Config, Event, Side};

/// Storage keys for the contract.
/// Global records live in instance storage, per-event records in persistent storage.
#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// Engine configuration
    Config,
    /// Current manager
    Manager,
    /// Manager candidate waiting for `accept_management`
    ProposedManager,
    /// Token used for bets, liquidity and fees
    CollateralToken,
    /// Id the next created event receives
    NextEventId,
    /// Treasury accumulator for baking rewards
    BakingRewards,
    /// Treasury accumulator for retained profits
    RetainedProfits,
    /// Event record: Event(event_id)
    Event(u64),
    /// Bettor stake: Bet(event_id, side, participant)
    Bet(u64, Side, Address),
    /// Provider shares: Shares(event_id, provider)
    Shares(u64, Address),
    /// Set once a provider redeemed shares: LiquidityWithdrawn(event_id, provider)
    LiquidityWithdrawn(u64, Address),
}

/// Scale of `target_dynamics` and `closed_dynamics`.
pub const TARGET_DYNAMICS_PRECISION: i128 = 1_000_000;

/// Scale used when reporting share price.
pub const SHARE_PRECISION: i128 = 100_000_000;

/// Scale of `liquidity_percent` (100% = 10^6).
pub const LIQUIDITY_PRECISION: i128 = 1_000_000;

/// Scale of internal ratios (100% = 10^8).
pub const RATIO_PRECISION: i128 = 100_000_000;

/// Scale of `provider_profit_fee` (100% = 10^6).
pub const PROVIDER_PROFIT_FEE_PRECISION: i128 = 1_000_000;

/// Part of the pool value standing behind each outcome at settlement.
pub const POOL_BACKING_RATIO: i128 = RATIO_PRECISION / 2;

/// Part of a late provider profit fee redirected to baking rewards.
pub const BAKING_REWARDS_RATIO: i128 = RATIO_PRECISION / 2;

const DAY_IN_LEDGERS: u32 = 17280;
const BUMP_THRESHOLD: u32 = 14 * DAY_IN_LEDGERS;
const BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;

pub fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(BUMP_THRESHOLD, BUMP_AMOUNT);
}

fn extend_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, BUMP_THRESHOLD, BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn read_config(env: &Env) -> Result<Config, JusterError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(JusterError::NotInitialized)
}

pub fn write_config(env: &Env, config: &Config) {
    env.storage().instance().set(&DataKey::Config, config);
}

pub fn read_manager(env: &Env) -> Result<Address, JusterError> {
    env.storage()
        .instance()
        .get(&DataKey::Manager)
        .ok_or(JusterError::StorageCorrupted)
}

pub fn write_manager(env: &Env, manager: &Address) {
    env.storage().instance().set(&DataKey::Manager, manager);
}

pub fn read_proposed_manager(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::ProposedManager)
}

pub fn write_proposed_manager(env: &Env, candidate: Option<&Address>) {
    match candidate {
        Some(address) => env
            .storage()
            .instance()
            .set(&DataKey::ProposedManager, address),
        None => env.storage().instance().remove(&DataKey::ProposedManager),
    }
}

pub fn read_token(env: &Env) -> Result<Address, JusterError> {
    env.storage()
        .instance()
        .get(&DataKey::CollateralToken)
        .ok_or(JusterError::StorageCorrupted)
}

pub fn write_token(env: &Env, token: &Address) {
    env.storage().instance().set(&DataKey::CollateralToken, token);
}

pub fn read_next_event_id(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::NextEventId)
        .unwrap_or(0)
}

pub fn write_next_event_id(env: &Env, id: u64) {
    env.storage().instance().set(&DataKey::NextEventId, &id);
}

/// Reads one of the treasury accumulators (`BakingRewards` or `RetainedProfits`).
pub fn read_accumulator(env: &Env, key: &DataKey) -> i128 {
    env.storage().instance().get(key).unwrap_or(0)
}

pub fn write_accumulator(env: &Env, key: &DataKey, value: i128) {
    env.storage().instance().set(key, &value);
}

pub fn read_event(env: &Env, event_id: u64) -> Result<Event, JusterError> {
    let key = DataKey::Event(event_id);
    let event = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(JusterError::NotFound)?;
    extend_persistent(env, &key);
    Ok(event)
}

pub fn write_event(env: &Env, event: &Event) {
    let key = DataKey::Event(event.id);
    env.storage().persistent().set(&key, event);
    extend_persistent(env, &key);
}

pub fn read_bet(env: &Env, event_id: u64, side: Side, participant: &Address) -> i128 {
    let key = DataKey::Bet(event_id, side, participant.clone());
    env.storage().persistent().get(&key).unwrap_or(0)
}

/// Stores a stake; a zero stake removes the ledger entry.
pub fn write_bet(env: &Env, event_id: u64, side: Side, participant: &Address, amount: i128) {
    let key = DataKey::Bet(event_id, side, participant.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &amount);
        extend_persistent(env, &key);
    }
}

pub fn read_shares(env: &Env, event_id: u64, provider: &Address) -> i128 {
    let key = DataKey::Shares(event_id, provider.clone());
    env.storage().persistent().get(&key).unwrap_or(0)
}

/// Stores provider shares; zero shares remove the ledger entry.
pub fn write_shares(env: &Env, event_id: u64, provider: &Address, shares: i128) {
    let key = DataKey::Shares(event_id, provider.clone());
    if shares == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &shares);
        extend_persistent(env, &key);
    }
}

pub fn is_liquidity_withdrawn(env: &Env, event_id: u64, provider: &Address) -> bool {
    let key = DataKey::LiquidityWithdrawn(event_id, provider.clone());
    env.storage().persistent().has(&key)
}

pub fn mark_liquidity_withdrawn(env: &Env, event_id: u64, provider: &Address) {
    let key = DataKey::LiquidityWithdrawn(event_id, provider.clone());
    env.storage().persistent().set(&key, &true);
    extend_persistent(env, &key);
}
