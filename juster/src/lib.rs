#![no_std]

mod error;
mod events;
mod oracle;
mod settlement;
mod storage;
mod types;

pub use error::JusterError;
pub use oracle::{OracleClient, RateOracle};
pub use types::{Config, ConfigUpdate, Event, EventState, LiquidityPool, RateReading, Side};

use settlement::PayoutBasis;
use soroban_sdk::{contract, contractimpl, token, Address, Env, String};
use storage::DataKey;

/// Juster: oracle-settled binary betting with an integrated liquidity pool.
///
/// Each event asks whether `closed_rate / start_rate` for a currency pair
/// ends at or above a target dynamics over a fixed measurement period.
///
/// Key features:
/// - Bettors stake on AboveEq or Below until bets close
/// - Liquidity providers back both outcomes and receive pool shares
/// - Anyone can start measurement and close an event for a keeper fee
/// - Winners share losers' stakes plus pool backing; providers redeem
///   shares for the remaining pool value after a provider profit fee
/// - Stuck events fall into force majeure and refund everyone
#[contract]
pub struct Juster;

#[contractimpl]
impl Juster {
    /// Constructor: called once when the contract is deployed.
    ///
    /// Delegates to initialize() for the actual setup logic.
    pub fn __constructor(env: Env, manager: Address, collateral_token: Address, config: Config) {
        Self::initialize(env, manager, collateral_token, config).expect("initialization failed");
    }

    /// Initialize the engine with its manager, collateral token and config.
    ///
    /// # Arguments
    /// * `manager` - Address allowed to change config and claim the treasury
    /// * `collateral_token` - Token used for bets, liquidity and fees
    /// * `config` - Initial engine configuration
    pub fn initialize(
        env: Env,
        manager: Address,
        collateral_token: Address,
        config: Config,
    ) -> Result<(), JusterError> {
        if storage::is_initialized(&env) {
            return Err(JusterError::AlreadyInitialized);
        }
        config.validate()?;

        manager.require_auth();

        storage::write_config(&env, &config);
        storage::write_manager(&env, &manager);
        storage::write_token(&env, &collateral_token);
        storage::write_next_event_id(&env, 0);
        storage::extend_instance(&env);

        Ok(())
    }

    // --- Event registry ---

    /// Create a new event and seed its liquidity pool.
    ///
    /// # Arguments
    /// * `creator` - Event creator and first liquidity provider (must authorize)
    /// * `currency_pair` - Oracle currency pair, e.g. "XTZ-USD"
    /// * `target_dynamics` - Threshold for closed/start rate (scaled by 10^6)
    /// * `bets_close_time` - Ledger time after which bets are rejected
    /// * `measure_period` - Seconds between measurement start and close
    /// * `liquidity_percent` - Max liquidity fee on bets (scaled by 10^6)
    /// * `initial_liquidity` - Creator deposit; must exceed both keeper fees
    ///
    /// # Returns
    /// Id of the new event
    #[allow(clippy::too_many_arguments)]
    pub fn create_event(
        env: Env,
        creator: Address,
        currency_pair: String,
        target_dynamics: i128,
        bets_close_time: u64,
        measure_period: u64,
        liquidity_percent: i128,
        initial_liquidity: i128,
    ) -> Result<u64, JusterError> {
        let config = storage::read_config(&env)?;

        if config.is_event_creation_paused {
            return Err(JusterError::CreationPaused);
        }

        let now = env.ledger().timestamp();
        if bets_close_time <= now {
            return Err(JusterError::InvalidPeriod);
        }
        let period_to_bets_close = bets_close_time - now;
        if period_to_bets_close < config.min_period_to_bets_close
            || period_to_bets_close > config.max_period_to_bets_close
            || measure_period < config.min_measure_period
            || measure_period > config.max_measure_period
        {
            return Err(JusterError::InvalidPeriod);
        }

        if target_dynamics <= 0 {
            return Err(JusterError::InvalidTargetDynamics);
        }
        if liquidity_percent < config.min_liquidity_percent
            || liquidity_percent > config.max_liquidity_percent
        {
            return Err(JusterError::InvalidLiquidityPercent);
        }

        // The seed must cover both keeper fees and still leave the pool positive
        let keeper_fees = config
            .measure_start_fee
            .checked_add(config.expiration_fee)
            .ok_or(JusterError::Overflow)?;
        if initial_liquidity <= keeper_fees {
            return Err(JusterError::InsufficientLiquidity);
        }

        creator.require_auth();
        Self::transfer_in(&env, &creator, initial_liquidity)?;

        let event_id = storage::read_next_event_id(&env);
        let shares = settlement::shares_to_mint(initial_liquidity, 0, 0)?;

        let event = Event {
            id: event_id,
            creator: creator.clone(),
            currency_pair,
            target_dynamics,
            liquidity_percent,
            created_time: now,
            bets_close_time,
            measure_period,
            state: EventState::Created,
            measure_start_time: None,
            closed_time: None,
            closed_oracle_time: None,
            start_rate: None,
            closed_rate: None,
            closed_dynamics: None,
            is_bets_above_eq_win: None,
            total_above_eq: 0,
            total_below: 0,
            winners_payout: 0,
            winners_paid: 0,
            winning_stake_outstanding: 0,
            pool: LiquidityPool {
                provided_liquidity: initial_liquidity,
                total_shares: shares,
                ..LiquidityPool::default()
            },
        };

        storage::write_event(&env, &event);
        storage::write_shares(&env, event_id, &creator, shares);
        storage::write_next_event_id(&env, event_id + 1);

        events::event_created(&env, event_id, &creator, initial_liquidity);

        Ok(event_id)
    }

    /// Get an event snapshot.
    pub fn get_event(env: Env, event_id: u64) -> Result<Event, JusterError> {
        storage::read_event(&env, event_id)
    }

    /// Id that the next created event will receive.
    pub fn next_event_id(env: Env) -> u64 {
        storage::read_next_event_id(&env)
    }

    // --- Betting ledger ---

    /// Stake on one outcome of an event.
    ///
    /// Part of the amount is kept by the pool as a liquidity fee that grows
    /// from zero at creation to `liquidity_percent` at bets close.
    ///
    /// # Arguments
    /// * `min_payout` - Minimum projected payout if `side` wins (slippage protection)
    ///
    /// # Returns
    /// Stake recorded in the ledger after the liquidity fee
    pub fn place_bet(
        env: Env,
        participant: Address,
        event_id: u64,
        side: Side,
        amount: i128,
        min_payout: i128,
    ) -> Result<i128, JusterError> {
        let config = storage::read_config(&env)?;
        let mut event = storage::read_event(&env, event_id)?;

        let (stake, liquidity_fee, payout) = Self::bet_quote(&env, &config, &event, side, amount)?;
        if payout < min_payout {
            return Err(JusterError::SlippageExceeded);
        }

        participant.require_auth();
        Self::transfer_in(&env, &participant, amount)?;

        let current = storage::read_bet(&env, event_id, side, &participant);
        let updated = current.checked_add(stake).ok_or(JusterError::Overflow)?;
        storage::write_bet(&env, event_id, side, &participant, updated);

        match side {
            Side::AboveEq => {
                event.total_above_eq = event
                    .total_above_eq
                    .checked_add(stake)
                    .ok_or(JusterError::Overflow)?
            }
            Side::Below => {
                event.total_below = event
                    .total_below
                    .checked_add(stake)
                    .ok_or(JusterError::Overflow)?
            }
        }
        event.pool.liquidity_bonus = event
            .pool
            .liquidity_bonus
            .checked_add(liquidity_fee)
            .ok_or(JusterError::Overflow)?;
        storage::write_event(&env, &event);

        events::bet_placed(&env, event_id, &participant, side, stake, liquidity_fee);

        Ok(stake)
    }

    /// Get a quote for a bet placed now.
    ///
    /// The payout is projected from current totals with this bet included
    /// and the unpaid keeper fees taken out of the pool. Later bets and
    /// deposits still move it until close.
    ///
    /// # Returns
    /// (stake, projected_payout)
    pub fn quote_bet(
        env: Env,
        event_id: u64,
        side: Side,
        amount: i128,
    ) -> Result<(i128, i128), JusterError> {
        let config = storage::read_config(&env)?;
        let event = storage::read_event(&env, event_id)?;
        let (stake, _, payout) = Self::bet_quote(&env, &config, &event, side, amount)?;
        Ok((stake, payout))
    }

    /// Get a participant's stake on one side of an event.
    pub fn get_bet(env: Env, event_id: u64, participant: Address, side: Side) -> i128 {
        storage::read_bet(&env, event_id, side, &participant)
    }

    /// Withdraw winnings after close, or refund all stakes after force majeure.
    ///
    /// The winning stake is paid `stake * (winners + losers + pool) /
    /// (winners + pool backing)` and zeroed, so it pays out at most once.
    /// The last winning stake takes whatever is left of the winners' total.
    ///
    /// # Returns
    /// Amount transferred to the participant
    pub fn withdraw_winnings(
        env: Env,
        participant: Address,
        event_id: u64,
    ) -> Result<i128, JusterError> {
        let mut event = storage::read_event(&env, event_id)?;
        if !event.is_settled() {
            return Err(JusterError::InvalidState);
        }

        participant.require_auth();

        let amount = Self::take_winnings(&env, &mut event, &participant)?;
        if amount == 0 {
            return Err(JusterError::NothingToWithdraw);
        }
        storage::write_event(&env, &event);

        Self::transfer_out(&env, &participant, amount)?;
        events::winnings_withdrawn(&env, event_id, &participant, amount);

        Ok(amount)
    }

    // --- Liquidity pool ---

    /// Add liquidity to an event before bets close.
    ///
    /// Shares are minted at the pool's current value, so earlier and later
    /// providers hold the same value per share.
    ///
    /// # Arguments
    /// * `max_share_price` - Highest acceptable value of SHARE_PRECISION shares
    ///   (slippage protection)
    ///
    /// # Returns
    /// Shares minted
    pub fn provide_liquidity(
        env: Env,
        provider: Address,
        event_id: u64,
        amount: i128,
        max_share_price: i128,
    ) -> Result<i128, JusterError> {
        let mut event = storage::read_event(&env, event_id)?;

        if event.state != EventState::Created {
            return Err(JusterError::InvalidState);
        }
        if env.ledger().timestamp() >= event.bets_close_time {
            return Err(JusterError::BetsClosed);
        }
        if amount <= 0 {
            return Err(JusterError::ZeroAmount);
        }

        let pool_value = event.pool.value()?;
        if settlement::share_price(pool_value, event.pool.total_shares)? > max_share_price {
            return Err(JusterError::SlippageExceeded);
        }

        let shares = settlement::shares_to_mint(amount, event.pool.total_shares, pool_value)?;
        if shares <= 0 {
            return Err(JusterError::InsufficientLiquidity);
        }

        provider.require_auth();
        Self::transfer_in(&env, &provider, amount)?;

        let current = storage::read_shares(&env, event_id, &provider);
        storage::write_shares(
            &env,
            event_id,
            &provider,
            current.checked_add(shares).ok_or(JusterError::Overflow)?,
        );

        event.pool.provided_liquidity = event
            .pool
            .provided_liquidity
            .checked_add(amount)
            .ok_or(JusterError::Overflow)?;
        event.pool.total_shares = event
            .pool
            .total_shares
            .checked_add(shares)
            .ok_or(JusterError::Overflow)?;
        storage::write_event(&env, &event);

        events::liquidity_provided(&env, event_id, &provider, amount, shares);

        Ok(shares)
    }

    /// Redeem all of a provider's shares after close or force majeure.
    ///
    /// # Returns
    /// Amount transferred to the provider
    pub fn withdraw_liquidity(
        env: Env,
        provider: Address,
        event_id: u64,
    ) -> Result<i128, JusterError> {
        let mut event = storage::read_event(&env, event_id)?;
        if !event.is_settled() {
            return Err(JusterError::EventNotClosed);
        }

        provider.require_auth();

        let (shares, amount) = Self::take_liquidity(&env, &mut event, &provider)?;
        if shares == 0 {
            return Err(JusterError::NothingToWithdraw);
        }
        storage::write_event(&env, &event);

        Self::transfer_out(&env, &provider, amount)?;
        events::liquidity_withdrawn(&env, event_id, &provider, shares, amount);

        Ok(amount)
    }

    /// Get a provider's outstanding shares for an event.
    pub fn get_shares(env: Env, event_id: u64, provider: Address) -> i128 {
        storage::read_shares(&env, event_id, &provider)
    }

    /// Get the value of SHARE_PRECISION (10^8) shares.
    pub fn get_share_price(env: Env, event_id: u64) -> Result<i128, JusterError> {
        let event = storage::read_event(&env, event_id)?;
        let value = if event.is_settled() {
            event.pool.redeemable
        } else {
            event.pool.value()?
        };
        settlement::share_price(value, event.pool.total_shares)
    }

    // --- Event state machine ---

    /// Start measurement once bets are closed (anyone can call).
    ///
    /// Reads the oracle, records the start rate and pays the measure start
    /// fee from the event pool to the caller.
    ///
    /// # Returns
    /// Keeper fee paid to the caller
    pub fn start_measurement(env: Env, caller: Address, event_id: u64) -> Result<i128, JusterError> {
        let config = storage::read_config(&env)?;
        let mut event = storage::read_event(&env, event_id)?;

        if event.is_measurement_started() {
            return Err(JusterError::AlreadyStarted);
        }
        if event.state != EventState::Created {
            return Err(JusterError::InvalidState);
        }
        if env.ledger().timestamp() < event.bets_close_time {
            return Err(JusterError::TooEarly);
        }

        let reading = oracle::read_fresh_rate(
            &env,
            &config.oracle,
            &event.currency_pair,
            event.bets_close_time,
            config.max_allowed_measure_lag,
        )?;

        let fee = config.measure_start_fee;
        Self::charge_keeper_fee(&mut event, fee)?;

        let closed_time = reading
            .timestamp
            .checked_add(event.measure_period)
            .ok_or(JusterError::Overflow)?;
        event.start_rate = Some(reading.rate);
        event.measure_start_time = Some(reading.timestamp);
        event.closed_time = Some(closed_time);
        event.state = EventState::MeasurementStarted;

        caller.require_auth();
        storage::write_event(&env, &event);
        Self::transfer_out(&env, &caller, fee)?;

        events::measurement_started(&env, event_id, &caller, reading.rate, fee);

        Ok(fee)
    }

    /// Close the event once the measure period is over (anyone can call).
    ///
    /// Reads the oracle, decides the winning side, pays the expiration fee
    /// to the caller and settles the pool.
    ///
    /// # Returns
    /// Keeper fee paid to the caller
    pub fn close(env: Env, caller: Address, event_id: u64) -> Result<i128, JusterError> {
        let config = storage::read_config(&env)?;
        let mut event = storage::read_event(&env, event_id)?;

        if event.state != EventState::MeasurementStarted {
            return Err(JusterError::InvalidState);
        }
        let closed_time = event.closed_time.ok_or(JusterError::StorageCorrupted)?;
        let start_rate = event.start_rate.ok_or(JusterError::StorageCorrupted)?;

        let now = env.ledger().timestamp();
        if now < closed_time {
            return Err(JusterError::TooEarly);
        }

        let reading = oracle::read_fresh_rate(
            &env,
            &config.oracle,
            &event.currency_pair,
            closed_time,
            config.max_allowed_measure_lag,
        )?;

        let closed_dynamics = settlement::dynamics(start_rate, reading.rate)?;
        let is_bets_above_eq_win = closed_dynamics >= event.target_dynamics;

        let fee = config.expiration_fee;
        Self::charge_keeper_fee(&mut event, fee)?;

        let pool_value = event.pool.value()?;
        let (above, below) = (event.total_above_eq, event.total_below);
        let for_settlement =
            settlement::settle(above, below, pool_value, config.provider_profit_fee)?;
        let against_settlement =
            settlement::settle(below, above, pool_value, config.provider_profit_fee)?;
        let outcome = if is_bets_above_eq_win {
            for_settlement
        } else {
            against_settlement
        };

        let winning = if is_bets_above_eq_win {
            Side::AboveEq
        } else {
            Side::Below
        };
        event.winners_payout = outcome.winners_payout;
        event.winners_paid = 0;
        event.winning_stake_outstanding = event.total_on(winning);

        event.pool.closing_value = pool_value;
        event.pool.for_profit_diff = for_settlement.profit;
        event.pool.against_profit_diff = against_settlement.profit;
        event.pool.profit_fee = outcome.profit_fee;
        event.pool.redeemable = outcome.redeemable;

        let is_late = now - closed_time >= config.reward_fee_split_after;
        let (baking, retained) = settlement::split_profit_fee(outcome.profit_fee, is_late)?;
        Self::accrue(&env, &DataKey::BakingRewards, baking)?;
        Self::accrue(&env, &DataKey::RetainedProfits, retained)?;

        event.closed_rate = Some(reading.rate);
        event.closed_oracle_time = Some(reading.timestamp);
        event.closed_dynamics = Some(closed_dynamics);
        event.is_bets_above_eq_win = Some(is_bets_above_eq_win);
        event.state = EventState::Closed;

        caller.require_auth();
        storage::write_event(&env, &event);
        Self::transfer_out(&env, &caller, fee)?;

        events::event_closed(
            &env,
            event_id,
            &caller,
            closed_dynamics,
            is_bets_above_eq_win,
            fee,
        );

        Ok(fee)
    }

    /// Cancel an event whose measurement was not started or closed in time.
    ///
    /// Allowed once `bets_close_time + max_allowed_measure_lag` passes without
    /// measurement, or `closed_time + max_allowed_measure_lag` passes without
    /// close. Unpaid keeper fees go to the caller if the pool covers them;
    /// afterwards every stake is refundable and shares redeem the rest.
    ///
    /// # Returns
    /// Fee paid to the caller
    pub fn trigger_force_majeure(
        env: Env,
        caller: Address,
        event_id: u64,
    ) -> Result<i128, JusterError> {
        let config = storage::read_config(&env)?;
        let mut event = storage::read_event(&env, event_id)?;

        let (deadline, unpaid_fees) = match event.state {
            EventState::Created => (
                event.bets_close_time,
                config
                    .measure_start_fee
                    .checked_add(config.expiration_fee)
                    .ok_or(JusterError::Overflow)?,
            ),
            EventState::MeasurementStarted => (
                event.closed_time.ok_or(JusterError::StorageCorrupted)?,
                config.expiration_fee,
            ),
            _ => return Err(JusterError::InvalidState),
        };
        let deadline = deadline
            .checked_add(config.max_allowed_measure_lag)
            .ok_or(JusterError::Overflow)?;
        if env.ledger().timestamp() <= deadline {
            return Err(JusterError::TooEarly);
        }

        let fee = unpaid_fees.min(event.pool.value()?.max(0));
        Self::charge_keeper_fee(&mut event, fee)?;

        let pool_value = event.pool.value()?;
        event.pool.closing_value = pool_value;
        event.pool.redeemable = pool_value;
        event.state = EventState::ForceMajeure;

        caller.require_auth();
        storage::write_event(&env, &event);
        Self::transfer_out(&env, &caller, fee)?;

        events::force_majeure(&env, event_id, &caller, fee);

        Ok(fee)
    }

    /// Pay out a participant's winnings and liquidity on their behalf.
    ///
    /// After `closed_time + reward_fee_split_after` any keeper may call this
    /// and keep up to `reward_call_fee` of the payout. After force majeure
    /// it can be called at any time and no fee is taken.
    ///
    /// # Returns
    /// Amount transferred to the participant
    pub fn withdraw_for(
        env: Env,
        keeper: Address,
        participant: Address,
        event_id: u64,
    ) -> Result<i128, JusterError> {
        let config = storage::read_config(&env)?;
        let mut event = storage::read_event(&env, event_id)?;

        let fee_cap = match event.state {
            EventState::Closed => {
                let closed_time = event.closed_time.ok_or(JusterError::StorageCorrupted)?;
                let open_at = closed_time
                    .checked_add(config.reward_fee_split_after)
                    .ok_or(JusterError::Overflow)?;
                if env.ledger().timestamp() < open_at {
                    return Err(JusterError::TooEarly);
                }
                config.reward_call_fee
            }
            EventState::ForceMajeure => 0,
            _ => return Err(JusterError::EventNotClosed),
        };

        let winnings = Self::take_winnings(&env, &mut event, &participant)?;
        let (shares, liquidity) = if storage::is_liquidity_withdrawn(&env, event_id, &participant) {
            (0, 0)
        } else {
            Self::take_liquidity(&env, &mut event, &participant)?
        };

        let total = winnings
            .checked_add(liquidity)
            .ok_or(JusterError::Overflow)?;
        if total == 0 {
            return Err(JusterError::NothingToWithdraw);
        }

        let keeper_fee = if keeper == participant {
            0
        } else {
            fee_cap.min(total)
        };
        let participant_amount = total - keeper_fee;

        keeper.require_auth();
        storage::write_event(&env, &event);
        Self::transfer_out(&env, &keeper, keeper_fee)?;
        Self::transfer_out(&env, &participant, participant_amount)?;

        if winnings > 0 {
            events::winnings_withdrawn(&env, event_id, &participant, winnings);
        }
        if shares > 0 {
            events::liquidity_withdrawn(&env, event_id, &participant, shares, liquidity);
        }
        if keeper_fee > 0 {
            events::keeper_rewarded(&env, event_id, &keeper, &participant, keeper_fee);
        }

        Ok(participant_amount)
    }

    // --- Governance ---

    /// Propose a new manager (manager only). Takes effect on acceptance.
    pub fn propose_manager(
        env: Env,
        manager: Address,
        candidate: Address,
    ) -> Result<(), JusterError> {
        Self::require_manager(&env, &manager)?;

        storage::write_proposed_manager(&env, Some(&candidate));
        events::manager_proposed(&env, &manager, &candidate);

        Ok(())
    }

    /// Accept management (proposed manager only).
    pub fn accept_management(env: Env, candidate: Address) -> Result<(), JusterError> {
        let proposed = storage::read_proposed_manager(&env).ok_or(JusterError::NoProposal)?;
        if candidate != proposed {
            return Err(JusterError::Unauthorized);
        }
        candidate.require_auth();

        storage::write_manager(&env, &candidate);
        storage::write_proposed_manager(&env, None);
        events::manager_accepted(&env, &candidate);

        Ok(())
    }

    /// Change one config field (manager only). The resulting config must
    /// pass the same bounds checks as at construction.
    pub fn set_config(env: Env, manager: Address, update: ConfigUpdate) -> Result<(), JusterError> {
        Self::require_manager(&env, &manager)?;

        let mut config = storage::read_config(&env)?;
        config.apply(update.clone());
        config.validate()?;

        storage::write_config(&env, &config);
        events::config_updated(&env, &update);

        Ok(())
    }

    /// Pause or resume event creation (manager only).
    pub fn pause_event_creation(env: Env, manager: Address, paused: bool) -> Result<(), JusterError> {
        Self::require_manager(&env, &manager)?;

        let mut config = storage::read_config(&env)?;
        config.is_event_creation_paused = paused;

        storage::write_config(&env, &config);
        events::creation_paused(&env, paused);

        Ok(())
    }

    /// Transfer accumulated retained profits to the manager.
    pub fn claim_retained_profits(env: Env, manager: Address) -> Result<i128, JusterError> {
        Self::claim_accumulator(&env, &manager, &DataKey::RetainedProfits)
    }

    /// Transfer accumulated baking rewards to the manager.
    pub fn claim_baking_rewards(env: Env, manager: Address) -> Result<i128, JusterError> {
        Self::claim_accumulator(&env, &manager, &DataKey::BakingRewards)
    }

    pub fn get_config(env: Env) -> Result<Config, JusterError> {
        storage::read_config(&env)
    }

    pub fn get_manager(env: Env) -> Result<Address, JusterError> {
        storage::read_manager(&env)
    }

    pub fn get_proposed_manager(env: Env) -> Option<Address> {
        storage::read_proposed_manager(&env)
    }

    /// Get treasury accumulators.
    ///
    /// # Returns
    /// (baking_rewards, retained_profits)
    pub fn get_treasury(env: Env) -> (i128, i128) {
        (
            storage::read_accumulator(&env, &DataKey::BakingRewards),
            storage::read_accumulator(&env, &DataKey::RetainedProfits),
        )
    }

    pub fn get_collateral_token(env: Env) -> Result<Address, JusterError> {
        storage::read_token(&env)
    }

    // --- Internal helpers ---

    fn require_manager(env: &Env, caller: &Address) -> Result<(), JusterError> {
        let manager = storage::read_manager(env)?;
        if *caller != manager {
            return Err(JusterError::Unauthorized);
        }
        caller.require_auth();
        storage::extend_instance(env);
        Ok(())
    }

    /// Pays a keeper fee out of the event pool.
    fn charge_keeper_fee(event: &mut Event, fee: i128) -> Result<(), JusterError> {
        if event.pool.value()? < fee {
            return Err(JusterError::FeeUnfunded);
        }
        event.pool.fees_paid = event
            .pool
            .fees_paid
            .checked_add(fee)
            .ok_or(JusterError::Overflow)?;
        Ok(())
    }

    /// Zeroes the participant's bet entries that pay out in the event's
    /// final state and returns the amount owed.
    fn take_winnings(
        env: &Env,
        event: &mut Event,
        participant: &Address,
    ) -> Result<i128, JusterError> {
        match event.state {
            EventState::Closed => {
                let winning = event.winning_side().ok_or(JusterError::StorageCorrupted)?;
                let stake = storage::read_bet(env, event.id, winning, participant);
                if stake == 0 {
                    return Ok(0);
                }

                let payout = if stake == event.winning_stake_outstanding {
                    event
                        .winners_payout
                        .checked_sub(event.winners_paid)
                        .ok_or(JusterError::Overflow)?
                } else {
                    PayoutBasis::new(
                        event.total_on(winning),
                        event.total_on(winning.opposite()),
                        event.pool.closing_value,
                    )?
                    .payout(stake)?
                };

                event.winning_stake_outstanding = event
                    .winning_stake_outstanding
                    .checked_sub(stake)
                    .ok_or(JusterError::StorageCorrupted)?;
                event.winners_paid = event
                    .winners_paid
                    .checked_add(payout)
                    .ok_or(JusterError::Overflow)?;
                storage::write_bet(env, event.id, winning, participant, 0);
                Ok(payout)
            }
            EventState::ForceMajeure => {
                let above = storage::read_bet(env, event.id, Side::AboveEq, participant);
                let below = storage::read_bet(env, event.id, Side::Below, participant);
                storage::write_bet(env, event.id, Side::AboveEq, participant, 0);
                storage::write_bet(env, event.id, Side::Below, participant, 0);
                above.checked_add(below).ok_or(JusterError::Overflow)
            }
            _ => Err(JusterError::InvalidState),
        }
    }

    /// Prices a bet of `amount` placed now without touching storage.
    ///
    /// # Returns
    /// (stake, liquidity_fee, projected_payout)
    fn bet_quote(
        env: &Env,
        config: &Config,
        event: &Event,
        side: Side,
        amount: i128,
    ) -> Result<(i128, i128, i128), JusterError> {
        let now = env.ledger().timestamp();
        if event.state != EventState::Created || now >= event.bets_close_time {
            return Err(JusterError::BetsClosed);
        }
        if amount <= 0 {
            return Err(JusterError::ZeroAmount);
        }

        let liquidity_fee = settlement::liquidity_bonus_fee(
            amount,
            event.liquidity_percent,
            now - event.created_time,
            event.bets_close_time - event.created_time,
        )?;
        let stake = amount - liquidity_fee;

        // Both keeper fees are still ahead of an event taking bets
        let keeper_fees = config
            .measure_start_fee
            .checked_add(config.expiration_fee)
            .ok_or(JusterError::Overflow)?;
        let closing_value = event
            .pool
            .value()?
            .checked_add(liquidity_fee)
            .and_then(|v| v.checked_sub(keeper_fees))
            .ok_or(JusterError::Overflow)?
            .max(0);
        let winning_total = event
            .total_on(side)
            .checked_add(stake)
            .ok_or(JusterError::Overflow)?;

        let payout = PayoutBasis::new(winning_total, event.total_on(side.opposite()), closing_value)?
            .payout(stake)?;

        Ok((stake, liquidity_fee, payout))
    }

    /// Burns all of the provider's shares against the redeemable pool value.
    ///
    /// # Returns
    /// (shares burned, amount owed)
    fn take_liquidity(
        env: &Env,
        event: &mut Event,
        provider: &Address,
    ) -> Result<(i128, i128), JusterError> {
        if storage::is_liquidity_withdrawn(env, event.id, provider) {
            return Err(JusterError::AlreadyWithdrawn);
        }
        let shares = storage::read_shares(env, event.id, provider);
        if shares == 0 {
            return Ok((0, 0));
        }

        let amount = settlement::redeem(shares, event.pool.redeemable, event.pool.total_shares)?;
        event.pool.redeemable -= amount;
        event.pool.total_shares -= shares;

        storage::write_shares(env, event.id, provider, 0);
        storage::mark_liquidity_withdrawn(env, event.id, provider);

        Ok((shares, amount))
    }

    fn accrue(env: &Env, key: &DataKey, amount: i128) -> Result<(), JusterError> {
        if amount == 0 {
            return Ok(());
        }
        let current = storage::read_accumulator(env, key);
        let updated = current.checked_add(amount).ok_or(JusterError::Overflow)?;
        storage::write_accumulator(env, key, updated);
        Ok(())
    }

    fn claim_accumulator(env: &Env, manager: &Address, key: &DataKey) -> Result<i128, JusterError> {
        Self::require_manager(env, manager)?;

        let amount = storage::read_accumulator(env, key);
        if amount <= 0 {
            return Err(JusterError::NothingToWithdraw);
        }
        storage::write_accumulator(env, key, 0);
        Self::transfer_out(env, manager, amount)?;

        let (baking, retained) = match key {
            DataKey::BakingRewards => (amount, 0),
            _ => (0, amount),
        };
        events::treasury_claimed(env, manager, baking, retained);

        Ok(amount)
    }

    // Note: token_client.transfer() may panic on failure (e.g., insufficient balance,
    // authorization issues). The panic aborts the whole invocation, same as an error.
    fn transfer_in(env: &Env, from: &Address, amount: i128) -> Result<(), JusterError> {
        let token = storage::read_token(env)?;
        token::Client::new(env, &token).transfer(from, &env.current_contract_address(), &amount);
        Ok(())
    }

    fn transfer_out(env: &Env, to: &Address, amount: i128) -> Result<(), JusterError> {
        if amount <= 0 {
            return Ok(());
        }
        let token = storage::read_token(env)?;
        token::Client::new(env, &token).transfer(&env.current_contract_address(), to, &amount);
        Ok(())
    }
}
