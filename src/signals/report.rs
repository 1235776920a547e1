use serde::{Deserialize, Serialize};

use crate::core::ScoredTransaction;

/// Scores strictly above this count as high risk in summaries.
pub const HIGH_RISK_THRESHOLD: u8 = 70;

/// Aggregate view over a batch of scored transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub total_transactions: usize,
    pub high_risk_count: usize,
    /// Unique input addresses of high-risk transactions, first seen first.
    pub flagged_addresses: Vec<String>,
    pub average_risk_score: f64,
}

impl RiskReport {
    pub fn from_scored(scored: &[ScoredTransaction], high_risk_threshold: u8) -> Self {
        if scored.is_empty() {
            return Self::default();
        }

        let mut flagged_addresses: Vec<String> = Vec::new();
        let mut high_risk_count = 0;
        for entry in scored.iter().filter(|s| s.risk.score > high_risk_threshold) {
            high_risk_count += 1;
            if !flagged_addresses.contains(&entry.tx.input_address) {
                flagged_addresses.push(entry.tx.input_address.clone());
            }
        }

        let total: f64 = scored.iter().map(|s| s.risk.score as f64).sum();
        let average = total / scored.len() as f64;

        Self {
            total_transactions: scored.len(),
            high_risk_count,
            flagged_addresses,
            average_risk_score: (average * 100.0).round() / 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RiskScore;
    use crate::core::test_support::make_test_tx;
    use std::collections::BTreeSet;

    fn entry(input: &str, score: u8) -> ScoredTransaction {
        let mut tx = make_test_tx();
        tx.input_address = input.to_string();
        ScoredTransaction {
            tx,
            risk: RiskScore::new(score, BTreeSet::new()),
        }
    }

    #[test]
    fn empty_report_is_all_zero() {
        let report = RiskReport::from_scored(&[], HIGH_RISK_THRESHOLD);
        assert_eq!(report.total_transactions, 0);
        assert_eq!(report.high_risk_count, 0);
        assert!(report.flagged_addresses.is_empty());
        assert_eq!(report.average_risk_score, 0.0);
        assert_eq!(report, RiskReport::default());
    }

    #[test]
    fn threshold_is_strict() {
        let scored = vec![entry("a", 70), entry("b", 71)];
        let report = RiskReport::from_scored(&scored, HIGH_RISK_THRESHOLD);
        assert_eq!(report.high_risk_count, 1);
        assert_eq!(report.flagged_addresses, vec!["b".to_string()]);
    }

    #[test]
    fn flagged_addresses_are_unique() {
        let scored = vec![entry("a", 90), entry("a", 95), entry("c", 10), entry("d", 88)];
        let report = RiskReport::from_scored(&scored, HIGH_RISK_THRESHOLD);
        assert_eq!(report.total_transactions, 4);
        assert_eq!(report.high_risk_count, 3);
        assert_eq!(report.flagged_addresses, vec!["a".to_string(), "d".to_string()]);
    }

    #[test]
    fn average_is_rounded_to_cents() {
        let scored = vec![entry("a", 10), entry("b", 20), entry("c", 20)];
        let report = RiskReport::from_scored(&scored, HIGH_RISK_THRESHOLD);
        assert_eq!(report.average_risk_score, 16.67);
    }
}
