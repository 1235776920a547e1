pub mod factory;
pub mod fee;
pub mod ids;
pub mod lifecycle;
pub mod pipeline;

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Supported coins for mock generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Coin {
    Btc,
    Eth,
}

impl Coin {
    pub fn ticker(&self) -> &'static str {
        match self {
            Coin::Btc => "BTC",
            Coin::Eth => "ETH",
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ticker())
    }
}

/// Mock transaction lifecycle. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Mempool,
    Confirmed,
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TxStatus::Pending => "pending",
            TxStatus::Mempool => "mempool",
            TxStatus::Confirmed => "confirmed",
        };
        f.write_str(s)
    }
}

/// A synthesized transaction record. Replaced whole-value on every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockTransaction {
    pub id: String,
    pub input_address: String,
    pub output_address: String,
    pub value: f64,
    pub fee: f64,
    pub timestamp: DateTime<Utc>,
    pub status: TxStatus,
    pub confirmations: u32,
    pub coin: Coin,
    pub mempool_delay_seconds: f64,
    pub rbf_enabled: bool,
}

/// Discrete decision attached to a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskAction {
    Allow, // ≤50
    Warn,  // 51-80
    Ban,   // >80
}

impl RiskAction {
    pub fn from_score(score: u8) -> Self {
        if score > 80 {
            RiskAction::Ban
        } else if score > 50 {
            RiskAction::Warn
        } else {
            RiskAction::Allow
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskAction::Ban => "🔴",
            RiskAction::Warn => "🟡",
            RiskAction::Allow => "🟢",
        }
    }
}

impl fmt::Display for RiskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskAction::Allow => "ALLOW",
            RiskAction::Warn => "WARN",
            RiskAction::Ban => "BAN",
        };
        f.write_str(s)
    }
}

/// Result of heuristic scoring for one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    pub score: u8, // 0-100
    pub flags: BTreeSet<String>,
    pub action: RiskAction,
}

impl RiskScore {
    /// Build a score, keeping `action` consistent with `score`.
    pub fn new(score: u8, flags: BTreeSet<String>) -> Self {
        let score = score.min(100);
        Self {
            score,
            flags,
            action: RiskAction::from_score(score),
        }
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }
}

/// A transaction paired with the score it was given when it entered the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTransaction {
    pub tx: MockTransaction,
    pub risk: RiskScore,
}

/// Round to satoshi / 1e-8 precision.
pub fn round8(value: f64) -> f64 {
    (value * 100_000_000.0).round() / 100_000_000.0
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// An entropy source that always fails `try_fill_bytes`.
    pub struct FailingRng;

    impl rand::RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy unavailable"))
        }
    }

    pub fn make_test_tx() -> MockTransaction {
        MockTransaction {
            id: "ab".repeat(32),
            input_address: "1TestInputAddress000000000000000000".to_string(),
            output_address: "3TestOutputAddress00000000000000000".to_string(),
            value: 1.0,
            fee: 0.0005,
            timestamp: Utc::now(),
            status: TxStatus::Pending,
            confirmations: 0,
            coin: Coin::Btc,
            mempool_delay_seconds: 5.0,
            rbf_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_boundaries() {
        assert_eq!(RiskAction::from_score(0), RiskAction::Allow);
        assert_eq!(RiskAction::from_score(50), RiskAction::Allow);
        assert_eq!(RiskAction::from_score(51), RiskAction::Warn);
        assert_eq!(RiskAction::from_score(80), RiskAction::Warn);
        assert_eq!(RiskAction::from_score(81), RiskAction::Ban);
        assert_eq!(RiskAction::from_score(100), RiskAction::Ban);
    }

    #[test]
    fn risk_score_clamps_and_derives_action() {
        let r = RiskScore::new(250, BTreeSet::new());
        assert_eq!(r.score, 100);
        assert_eq!(r.action, RiskAction::Ban);
    }

    #[test]
    fn status_order_is_forward() {
        assert!(TxStatus::Pending < TxStatus::Mempool);
        assert!(TxStatus::Mempool < TxStatus::Confirmed);
    }

    #[test]
    fn coin_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Coin::Eth).unwrap(), "\"ETH\"");
        assert_eq!(serde_json::to_string(&TxStatus::Mempool).unwrap(), "\"mempool\"");
    }

    #[test]
    fn round8_truncates_float_noise() {
        assert_eq!(round8(0.1 + 0.2), 0.3);
    }
}
