use soroban_sdk::{contractclient, Address, Env, String};

use crate::error::JusterError;
use crate::types::RateReading;

/// Price oracle interface consumed by the engine.
#[contractclient(name = "OracleClient")]
pub trait RateOracle {
    /// Latest rate for `currency_pair` and the time it was reported.
    fn get_rate(env: Env, currency_pair: String) -> RateReading;
}

/// Reads the oracle once and checks the reading is usable for a transition
/// whose measurement point is `window_start`.
///
/// The reading must be within `max_lag` seconds of the ledger time and fall
/// inside `[window_start, window_start + max_lag]`. No retry: a missing or
/// stale reading fails the call and the caller tries again later.
pub fn read_fresh_rate(
    env: &Env,
    oracle: &Address,
    currency_pair: &String,
    window_start: u64,
    max_lag: u64,
) -> Result<RateReading, JusterError> {
    let client = OracleClient::new(env, oracle);
    let reading = match client.try_get_rate(currency_pair) {
        Ok(Ok(reading)) => reading,
        _ => return Err(JusterError::OracleUnavailable),
    };

    if reading.rate <= 0 {
        return Err(JusterError::OracleUnavailable);
    }

    let now = env.ledger().timestamp();
    let window_end = window_start
        .checked_add(max_lag)
        .ok_or(JusterError::Overflow)?;

    if now.abs_diff(reading.timestamp) > max_lag
        || reading.timestamp < window_start
        || reading.timestamp > window_end
    {
        return Err(JusterError::StaleOracleData);
    }

    Ok(reading)
}
