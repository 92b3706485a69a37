//! Contract events published after each successful state change.

use soroban_sdk::{symbol_short, Address, Env};

use crate::types::{ConfigUpdate, Side};

pub fn event_created(env: &Env, event_id: u64, creator: &Address, initial_liquidity: i128) {
    env.events().publish(
        (symbol_short!("created"), event_id),
        (creator.clone(), initial_liquidity),
    );
}

pub fn bet_placed(
    env: &Env,
    event_id: u64,
    participant: &Address,
    side: Side,
    stake: i128,
    liquidity_fee: i128,
) {
    env.events().publish(
        (symbol_short!("bet"), event_id),
        (participant.clone(), side, stake, liquidity_fee),
    );
}

pub fn liquidity_provided(env: &Env, event_id: u64, provider: &Address, amount: i128, shares: i128) {
    env.events().publish(
        (symbol_short!("provided"), event_id),
        (provider.clone(), amount, shares),
    );
}

pub fn measurement_started(env: &Env, event_id: u64, caller: &Address, start_rate: i128, fee: i128) {
    env.events().publish(
        (symbol_short!("started"), event_id),
        (caller.clone(), start_rate, fee),
    );
}

pub fn event_closed(
    env: &Env,
    event_id: u64,
    caller: &Address,
    closed_dynamics: i128,
    is_bets_above_eq_win: bool,
    fee: i128,
) {
    env.events().publish(
        (symbol_short!("closed"), event_id),
        (caller.clone(), closed_dynamics, is_bets_above_eq_win, fee),
    );
}

pub fn force_majeure(env: &Env, event_id: u64, caller: &Address, fee: i128) {
    env.events().publish(
        (symbol_short!("majeure"), event_id),
        (caller.clone(), fee),
    );
}

pub fn winnings_withdrawn(env: &Env, event_id: u64, participant: &Address, amount: i128) {
    env.events().publish(
        (symbol_short!("payout"), event_id),
        (participant.clone(), amount),
    );
}

pub fn liquidity_withdrawn(env: &Env, event_id: u64, provider: &Address, shares: i128, amount: i128) {
    env.events().publish(
        (symbol_short!("liq_out"), event_id),
        (provider.clone(), shares, amount),
    );
}

pub fn keeper_rewarded(env: &Env, event_id: u64, keeper: &Address, participant: &Address, fee: i128) {
    env.events().publish(
        (symbol_short!("keeper"), event_id),
        (keeper.clone(), participant.clone(), fee),
    );
}

pub fn manager_proposed(env: &Env, manager: &Address, candidate: &Address) {
    env.events().publish(
        (symbol_short!("mgr_prop"),),
        (manager.clone(), candidate.clone()),
    );
}

pub fn manager_accepted(env: &Env, manager: &Address) {
    env.events()
        .publish((symbol_short!("mgr_acc"),), manager.clone());
}

pub fn config_updated(env: &Env, update: &ConfigUpdate) {
    env.events()
        .publish((symbol_short!("config"),), update.clone());
}

pub fn creation_paused(env: &Env, paused: bool) {
    env.events().publish((symbol_short!("paused"),), paused);
}

pub fn treasury_claimed(env: &Env, manager: &Address, baking_rewards: i128, retained_profits: i128) {
    env.events().publish(
        (symbol_short!("treasury"),),
        (manager.clone(), baking_rewards, retained_profits),
    );
}
