use soroban_sdk::{contracttype, Address, String};

use crate::error::JusterError;
use crate::storage::{LIQUIDITY_PRECISION, PROVIDER_PROFIT_FEE_PRECISION};

/// Bet outcome: closing dynamics at or above the target, or below it.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    AboveEq,
    Below,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::AboveEq => Side::Below,
            Side::Below => Side::AboveEq,
        }
    }
}

/// Event lifecycle. Transitions only move forward:
/// `Created -> MeasurementStarted -> Closed`, or into `ForceMajeure`
/// when a transition could not happen in time.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventState {
    Created,
    MeasurementStarted,
    Closed,
    ForceMajeure,
}

/// Rate reported by the oracle for a currency pair.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RateReading {
    pub rate: i128,
    pub timestamp: u64,
}

/// Engine configuration, set at construction and changed only by the manager.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub oracle: Address,
    pub measure_start_fee: i128,
    pub expiration_fee: i128,
    pub reward_call_fee: i128,
    /// Share of provider profit kept by the contract (scaled by 10^6)
    pub provider_profit_fee: i128,
    pub min_measure_period: u64,
    pub max_measure_period: u64,
    pub min_period_to_bets_close: u64,
    pub max_period_to_bets_close: u64,
    /// Liquidity bonus bounds (scaled by 10^6)
    pub min_liquidity_percent: i128,
    pub max_liquidity_percent: i128,
    pub max_allowed_measure_lag: u64,
    pub reward_fee_split_after: u64,
    pub is_event_creation_paused: bool,
}

impl Config {
    pub fn validate(&self) -> Result<(), JusterError> {
        let fees_valid = self.measure_start_fee >= 0
            && self.expiration_fee >= 0
            && self.reward_call_fee >= 0
            && (0..=PROVIDER_PROFIT_FEE_PRECISION).contains(&self.provider_profit_fee);
        let bounds_valid = self.min_measure_period <= self.max_measure_period
            && self.min_period_to_bets_close <= self.max_period_to_bets_close
            && self.min_liquidity_percent <= self.max_liquidity_percent;
        let percents_valid = self.min_liquidity_percent >= 0
            && self.max_liquidity_percent <= LIQUIDITY_PRECISION;

        if fees_valid && bounds_valid && percents_valid {
            Ok(())
        } else {
            Err(JusterError::InvalidConfig)
        }
    }

    pub fn apply(&mut self, update: ConfigUpdate) {
        match update {
            ConfigUpdate::Oracle(v) => self.oracle = v,
            ConfigUpdate::MeasureStartFee(v) => self.measure_start_fee = v,
            ConfigUpdate::ExpirationFee(v) => self.expiration_fee = v,
            ConfigUpdate::RewardCallFee(v) => self.reward_call_fee = v,
            ConfigUpdate::ProviderProfitFee(v) => self.provider_profit_fee = v,
            ConfigUpdate::MinMeasurePeriod(v) => self.min_measure_period = v,
            ConfigUpdate::MaxMeasurePeriod(v) => self.max_measure_period = v,
            ConfigUpdate::MinPeriodToBetsClose(v) => self.min_period_to_bets_close = v,
            ConfigUpdate::MaxPeriodToBetsClose(v) => self.max_period_to_bets_close = v,
            ConfigUpdate::MinLiquidityPercent(v) => self.min_liquidity_percent = v,
            ConfigUpdate::MaxLiquidityPercent(v) => self.max_liquidity_percent = v,
            ConfigUpdate::MaxAllowedMeasureLag(v) => self.max_allowed_measure_lag = v,
            ConfigUpdate::RewardFeeSplitAfter(v) => self.reward_fee_split_after = v,
        }
    }
}

/// Single-field config change accepted by `set_config`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConfigUpdate {
    Oracle(Address),
    MeasureStartFee(i128),
    ExpirationFee(i128),
    RewardCallFee(i128),
    ProviderProfitFee(i128),
    MinMeasurePeriod(u64),
    MaxMeasurePeriod(u64),
    MinPeriodToBetsClose(u64),
    MaxPeriodToBetsClose(u64),
    MinLiquidityPercent(i128),
    MaxLiquidityPercent(i128),
    MaxAllowedMeasureLag(u64),
    RewardFeeSplitAfter(u64),
}

/// Per-event liquidity pool totals.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LiquidityPool {
    /// Principal contributed by providers
    pub provided_liquidity: i128,
    /// Liquidity fees collected from bets
    pub liquidity_bonus: i128,
    /// Keeper fees paid out of the pool
    pub fees_paid: i128,
    /// Shares outstanding
    pub total_shares: i128,
    /// Pool value at settlement, after keeper fees
    pub closing_value: i128,
    /// Pool profit (negative for loss) if AboveEq wins
    pub for_profit_diff: i128,
    /// Pool profit (negative for loss) if Below wins
    pub against_profit_diff: i128,
    /// Provider profit fee deducted at settlement
    pub profit_fee: i128,
    /// Value still redeemable by outstanding shares
    pub redeemable: i128,
}

impl LiquidityPool {
    /// Net asset value while the event is open.
    pub fn value(&self) -> Result<i128, JusterError> {
        self.provided_liquidity
            .checked_add(self.liquidity_bonus)
            .and_then(|v| v.checked_sub(self.fees_paid))
            .ok_or(JusterError::Overflow)
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Event {
    pub id: u64,
    pub creator: Address,
    pub currency_pair: String,
    /// Threshold for closing dynamics (scaled by 10^6)
    pub target_dynamics: i128,
    pub liquidity_percent: i128,
    pub created_time: u64,
    pub bets_close_time: u64,
    pub measure_period: u64,
    pub state: EventState,
    pub measure_start_time: Option<u64>,
    pub closed_time: Option<u64>,
    pub closed_oracle_time: Option<u64>,
    pub start_rate: Option<i128>,
    pub closed_rate: Option<i128>,
    pub closed_dynamics: Option<i128>,
    pub is_bets_above_eq_win: Option<bool>,
    pub total_above_eq: i128,
    pub total_below: i128,
    /// Owed to winning bettors in total, fixed at close
    pub winners_payout: i128,
    pub winners_paid: i128,
    /// Winning stake not yet withdrawn
    pub winning_stake_outstanding: i128,
    pub pool: LiquidityPool,
}

impl Event {
    pub fn is_measurement_started(&self) -> bool {
        self.measure_start_time.is_some()
    }

    /// Closed or cancelled: payouts and redemptions are open.
    pub fn is_settled(&self) -> bool {
        matches!(self.state, EventState::Closed | EventState::ForceMajeure)
    }

    pub fn total_on(&self, side: Side) -> i128 {
        match side {
            Side::AboveEq => self.total_above_eq,
            Side::Below => self.total_below,
        }
    }

    pub fn winning_side(&self) -> Option<Side> {
        self.is_bets_above_eq_win
            .map(|above| if above { Side::AboveEq } else { Side::Below })
    }
}
