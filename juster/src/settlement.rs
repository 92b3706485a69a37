//! Fixed-point settlement math for binary events backed by a liquidity pool.
//!
//! Winners share the losing side's stakes together with the pool's backing.
//! The pool stands behind each outcome with `POOL_BACKING_RATIO` of its
//! value, so it acts as a counterparty to whichever side is lighter:
//!
//! - total  = above_eq + below + pool_value
//! - weight = winning_total + pool_value * POOL_BACKING_RATIO / RATIO_PRECISION
//! - payout(stake) = stake * total / weight
//!
//! Whatever winners do not take stays with the pool, and a provider profit
//! fee is cut from any gain before shares are redeemed.
//!
//! All divisions round down, so rounding dust stays in the contract.

use crate::error::JusterError;
use crate::storage::{
    BAKING_REWARDS_RATIO, LIQUIDITY_PRECISION, POOL_BACKING_RATIO, PROVIDER_PROFIT_FEE_PRECISION,
    RATIO_PRECISION, SHARE_PRECISION, TARGET_DYNAMICS_PRECISION,
};

/// `a * b / d` with overflow and division-by-zero checks.
pub fn mul_div(a: i128, b: i128, d: i128) -> Result<i128, JusterError> {
    a.checked_mul(b)
        .ok_or(JusterError::Overflow)?
        .checked_div(d)
        .ok_or(JusterError::Overflow)
}

/// Closing dynamics: `closed_rate / start_rate`, scaled by TARGET_DYNAMICS_PRECISION.
pub fn dynamics(start_rate: i128, closed_rate: i128) -> Result<i128, JusterError> {
    if start_rate <= 0 {
        return Err(JusterError::OracleUnavailable);
    }
    mul_div(closed_rate, TARGET_DYNAMICS_PRECISION, start_rate)
}

/// Liquidity fee taken from a bet, growing linearly from zero at event
/// creation to `liquidity_percent` at bets close.
pub fn liquidity_bonus_fee(
    amount: i128,
    liquidity_percent: i128,
    elapsed: u64,
    betting_period: u64,
) -> Result<i128, JusterError> {
    if betting_period == 0 || liquidity_percent == 0 {
        return Ok(0);
    }
    let elapsed = elapsed.min(betting_period) as i128;
    let scaled = mul_div(amount, liquidity_percent, LIQUIDITY_PRECISION)?;
    mul_div(scaled, elapsed, betting_period as i128)
}

/// Shares minted for a deposit at the pool's current value.
/// An empty pool mints 1:1.
pub fn shares_to_mint(
    deposit: i128,
    total_shares: i128,
    pool_value: i128,
) -> Result<i128, JusterError> {
    if total_shares == 0 {
        return Ok(deposit);
    }
    if pool_value <= 0 {
        return Err(JusterError::InsufficientLiquidity);
    }
    mul_div(deposit, total_shares, pool_value)
}

/// Value of `SHARE_PRECISION` shares.
pub fn share_price(pool_value: i128, total_shares: i128) -> Result<i128, JusterError> {
    if total_shares == 0 {
        return Ok(0);
    }
    mul_div(pool_value, SHARE_PRECISION, total_shares)
}

/// Amount paid for `shares` out of `redeemable` value backing `total_shares`.
pub fn redeem(shares: i128, redeemable: i128, total_shares: i128) -> Result<i128, JusterError> {
    if shares == total_shares {
        return Ok(redeemable);
    }
    mul_div(shares, redeemable, total_shares)
}

/// Totals needed to price a single winning stake.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PayoutBasis {
    pub total: i128,
    pub weight: i128,
}

impl PayoutBasis {
    pub fn new(
        winning_total: i128,
        losing_total: i128,
        pool_value: i128,
    ) -> Result<Self, JusterError> {
        let backing = mul_div(pool_value, POOL_BACKING_RATIO, RATIO_PRECISION)?;
        let total = winning_total
            .checked_add(losing_total)
            .and_then(|v| v.checked_add(pool_value))
            .ok_or(JusterError::Overflow)?;
        let weight = winning_total
            .checked_add(backing)
            .ok_or(JusterError::Overflow)?;
        Ok(Self { total, weight })
    }

    pub fn payout(&self, stake: i128) -> Result<i128, JusterError> {
        if stake == 0 || self.weight == 0 {
            return Ok(0);
        }
        mul_div(stake, self.total, self.weight)
    }
}

/// Outcome of settling the pool against one winning side.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Settlement {
    /// Sum owed to winning bettors
    pub winners_payout: i128,
    /// Pool gain (positive) or loss (negative) before the profit fee
    pub profit: i128,
    /// Provider profit fee cut from a gain
    pub profit_fee: i128,
    /// Value left for share redemption
    pub redeemable: i128,
}

pub fn settle(
    winning_total: i128,
    losing_total: i128,
    pool_value: i128,
    provider_profit_fee: i128,
) -> Result<Settlement, JusterError> {
    let basis = PayoutBasis::new(winning_total, losing_total, pool_value)?;
    let winners_payout = basis.payout(winning_total)?;

    let pool_gross = basis
        .total
        .checked_sub(winners_payout)
        .ok_or(JusterError::Overflow)?;
    let profit = pool_gross
        .checked_sub(pool_value)
        .ok_or(JusterError::Overflow)?;

    let profit_fee = if profit > 0 {
        mul_div(profit, provider_profit_fee, PROVIDER_PROFIT_FEE_PRECISION)?
    } else {
        0
    };

    Ok(Settlement {
        winners_payout,
        profit,
        profit_fee,
        redeemable: pool_gross - profit_fee,
    })
}

/// Splits a provider profit fee into `(baking_rewards, retained_profits)`.
/// Timely settlement keeps all of it; late settlement redirects
/// `BAKING_REWARDS_RATIO` to baking rewards.
pub fn split_profit_fee(fee: i128, is_late: bool) -> Result<(i128, i128), JusterError> {
    if !is_late {
        return Ok((0, fee));
    }
    let baking = mul_div(fee, BAKING_REWARDS_RATIO, RATIO_PRECISION)?;
    Ok((baking, fee - baking))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamics() {
        assert_eq!(dynamics(6_000_000, 7_500_000).unwrap(), 1_250_000);
        assert_eq!(dynamics(6_000_000, 6_000_000).unwrap(), TARGET_DYNAMICS_PRECISION);
        assert_eq!(dynamics(3, 2).unwrap(), 666_666);
        assert_eq!(dynamics(0, 2), Err(JusterError::OracleUnavailable));
    }

    #[test]
    fn test_liquidity_bonus_fee_grows_with_time() {
        // 10% liquidity percent
        assert_eq!(liquidity_bonus_fee(1_000, 100_000, 0, 3600).unwrap(), 0);
        assert_eq!(liquidity_bonus_fee(1_000, 100_000, 1800, 3600).unwrap(), 50);
        assert_eq!(liquidity_bonus_fee(1_000, 100_000, 3600, 3600).unwrap(), 100);
        // Capped at the betting period
        assert_eq!(liquidity_bonus_fee(1_000, 100_000, 7200, 3600).unwrap(), 100);
        assert_eq!(liquidity_bonus_fee(1_000, 0, 1800, 3600).unwrap(), 0);
    }

    #[test]
    fn test_shares_minted_at_pool_value() {
        // Empty pool sets the 1:1 exchange rate
        assert_eq!(shares_to_mint(200, 0, 0).unwrap(), 200);
        // Pool grew by liquidity fees: late provider gets fewer shares
        assert_eq!(shares_to_mint(100, 200, 250).unwrap(), 80);
        // Pool shrank by keeper fees: late provider gets more shares
        assert_eq!(shares_to_mint(90, 200, 180).unwrap(), 100);
        assert_eq!(
            shares_to_mint(100, 200, 0),
            Err(JusterError::InsufficientLiquidity)
        );
    }

    #[test]
    fn test_settle_pool_backs_heavier_winning_side() {
        // 100 above, 50 below, pool 200: above wins
        let s = settle(100, 50, 200, 0).unwrap();
        assert_eq!(s.winners_payout, 175);
        assert_eq!(s.profit, -25);
        assert_eq!(s.profit_fee, 0);
        assert_eq!(s.redeemable, 175);
    }

    #[test]
    fn test_settle_pool_profits_from_lighter_winning_side() {
        // 100 above, 50 below, pool 200: below wins, 10% profit fee
        let s = settle(50, 100, 200, 100_000).unwrap();
        // 50 * 350 / 150
        assert_eq!(s.winners_payout, 116);
        assert_eq!(s.profit, 34);
        assert_eq!(s.profit_fee, 3);
        assert_eq!(s.redeemable, 231);
        assert_eq!(s.winners_payout + s.profit_fee + s.redeemable, 350);
    }

    #[test]
    fn test_settle_without_winners_gives_everything_to_pool() {
        let s = settle(0, 500, 100, 0).unwrap();
        assert_eq!(s.winners_payout, 0);
        assert_eq!(s.profit, 500);
        assert_eq!(s.redeemable, 600);
    }

    #[test]
    fn test_single_payout_matches_aggregate_for_one_winner() {
        let basis = PayoutBasis::new(100, 50, 180).unwrap();
        let s = settle(100, 50, 180, 0).unwrap();
        assert_eq!(basis.payout(100).unwrap(), s.winners_payout);
        assert_eq!(basis.payout(100).unwrap(), 173);
    }

    #[test]
    fn test_redeem_gives_remainder_to_last_share() {
        assert_eq!(redeem(1, 100, 3).unwrap(), 33);
        assert_eq!(redeem(2, 67, 2).unwrap(), 67);
    }

    #[test]
    fn test_split_profit_fee() {
        assert_eq!(split_profit_fee(101, false).unwrap(), (0, 101));
        assert_eq!(split_profit_fee(101, true).unwrap(), (50, 51));
    }

    #[test]
    fn test_share_price() {
        assert_eq!(share_price(250, 200).unwrap(), 125_000_000);
        assert_eq!(share_price(0, 0).unwrap(), 0);
    }
}
