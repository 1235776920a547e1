use rand::Rng;
use tracing::warn;

use super::{Coin, round8};
use crate::error::GenerationError;

pub const DEFAULT_BTC_FEE: f64 = 0.0005;
pub const DEFAULT_ETH_FEE: f64 = 0.005;

/// Draw a fee for a transfer of `value` coins.
///
/// Deliberately crude: the draw ignores `value` and any notion of size or
/// weight. BTC fees fall in [0.0001, 0.001), ETH fees in [0.001, 0.011).
/// An unusable `value` yields the per-coin default.
pub fn estimate_fee<R: Rng + ?Sized>(value: f64, coin: Coin, rng: &mut R) -> f64 {
    match try_estimate_fee(value, coin, rng) {
        Ok(fee) => fee,
        Err(e) => {
            let fallback = default_fee(coin);
            warn!("fee estimation failed ({e}), using {fallback} {coin}");
            fallback
        }
    }
}

pub fn default_fee(coin: Coin) -> f64 {
    match coin {
        Coin::Btc => DEFAULT_BTC_FEE,
        Coin::Eth => DEFAULT_ETH_FEE,
    }
}

fn try_estimate_fee<R: Rng + ?Sized>(value: f64, coin: Coin, rng: &mut R) -> Result<f64, GenerationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(GenerationError::InvalidAmount(value));
    }
    let (low, high) = match coin {
        Coin::Btc => (0.0001, 0.001),
        Coin::Eth => (0.001, 0.011),
    };
    // Rounding can land exactly on `high`; keep the range half-open.
    let fee = round8(rng.gen_range(low..high));
    Ok(if fee >= high { low } else { fee })
}
