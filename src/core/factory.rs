use chrono::{DateTime, Utc};
use rand::Rng;

use super::fee::estimate_fee;
use super::ids::{generate_address, generate_txid};
use super::{Coin, MockTransaction, TxStatus, round8};

/// Fee multiplier applied by a simulated replace-by-fee bump.
pub const RBF_FEE_MULTIPLIER: f64 = 1.15;

const RBF_ENABLED_PROBABILITY: f64 = 0.7;
const MIN_MEMPOOL_DELAY_SECS: f64 = 2.0;
const MAX_MEMPOOL_DELAY_SECS: f64 = 30.0;

/// Create a fresh pending transaction stamped with the current time.
pub fn create_transaction<R: Rng + ?Sized>(coin: Coin, rng: &mut R) -> MockTransaction {
    create_transaction_at(coin, Utc::now(), rng)
}

/// Create a fresh pending transaction stamped with `timestamp`.
pub fn create_transaction_at<R: Rng + ?Sized>(
    coin: Coin,
    timestamp: DateTime<Utc>,
    rng: &mut R,
) -> MockTransaction {
    let value = round8(match coin {
        Coin::Btc => rng.gen_range(0.001..10.0),
        Coin::Eth => rng.gen_range(0.01..50.0),
    });
    let fee = estimate_fee(value, coin, rng);

    MockTransaction {
        id: generate_txid(coin, rng),
        input_address: generate_address(coin, rng),
        output_address: generate_address(coin, rng),
        value,
        fee,
        timestamp,
        status: TxStatus::Pending,
        confirmations: 0,
        coin,
        mempool_delay_seconds: rng.gen_range(MIN_MEMPOOL_DELAY_SECS..MAX_MEMPOOL_DELAY_SECS),
        rbf_enabled: rng.gen_bool(RBF_ENABLED_PROBABILITY),
    }
}

/// Derive the replacement of `original` after a fee bump.
///
/// Only the record is simulated: new id, fee × 1.15, fresh timestamp, and the
/// lifecycle restarts at pending with no confirmations.
pub fn bump_fee<R: Rng + ?Sized>(original: &MockTransaction, rng: &mut R) -> MockTransaction {
    bump_fee_at(original, Utc::now(), rng)
}

pub fn bump_fee_at<R: Rng + ?Sized>(
    original: &MockTransaction,
    timestamp: DateTime<Utc>,
    rng: &mut R,
) -> MockTransaction {
    let mut id = generate_txid(original.coin, rng);
    // A sentinel id (entropy failure) could collide with the original.
    if id == original.id {
        id = format!("{}-rbf", original.id);
    }

    MockTransaction {
        id,
        fee: round8(original.fee * RBF_FEE_MULTIPLIER),
        timestamp,
        status: TxStatus::Pending,
        confirmations: 0,
        ..original.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::FailingRng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn created_transactions_respect_bounds() {
        let mut rng = StdRng::seed_from_u64(20);
        for i in 0..300 {
            let coin = if i % 2 == 0 { Coin::Btc } else { Coin::Eth };
            let tx = create_transaction(coin, &mut rng);
            assert!(tx.fee >= 0.0);
            assert!(tx.value >= 0.0);
            assert_eq!(tx.confirmations, 0);
            assert_eq!(tx.status, TxStatus::Pending);
            assert_eq!(tx.coin, coin);
            assert!((2.0..30.0).contains(&tx.mempool_delay_seconds));
        }
    }

    #[test]
    fn rbf_enabled_roughly_seventy_percent() {
        let mut rng = StdRng::seed_from_u64(21);
        let enabled = (0..2000)
            .filter(|_| create_transaction(Coin::Btc, &mut rng).rbf_enabled)
            .count();
        let ratio = enabled as f64 / 2000.0;
        assert!((0.63..0.77).contains(&ratio), "ratio {ratio}");
    }

    #[test]
    fn bump_multiplies_fee_and_resets_lifecycle() {
        let mut rng = StdRng::seed_from_u64(22);
        let mut tx = create_transaction(Coin::Btc, &mut rng);
        tx.status = TxStatus::Mempool;
        tx.confirmations = 3;

        let bumped = bump_fee(&tx, &mut rng);
        assert!((bumped.fee - tx.fee * 1.15).abs() < 1e-8);
        assert_ne!(bumped.id, tx.id);
        assert_eq!(bumped.status, TxStatus::Pending);
        assert_eq!(bumped.confirmations, 0);
        assert_eq!(bumped.input_address, tx.input_address);
        assert_eq!(bumped.value, tx.value);
        assert!(bumped.timestamp >= tx.timestamp);
    }

    #[test]
    fn bump_with_failing_entropy_still_changes_id() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut tx = create_transaction(Coin::Btc, &mut rng);
        tx.id = crate::core::ids::FALLBACK_TXID.to_string();

        let bumped = bump_fee(&tx, &mut FailingRng);
        assert_ne!(bumped.id, tx.id);
    }
}
