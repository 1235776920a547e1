use std::collections::BTreeSet;

use crate::core::RiskScore;

/// Points contributed by one rule that fired.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleHit {
    pub rule_name: String,
    pub weight: f64,
}

/// Sum fired weights plus noise, clamp to 0-100 and round.
pub fn compute_composite(hits: &[RuleHit], noise: f64) -> u8 {
    let total: f64 = hits.iter().map(|h| h.weight).sum::<f64>() + noise;
    if total.is_nan() {
        return 0;
    }
    total.clamp(0.0, 100.0).round() as u8
}

/// Build the final score; flags are the names of the rules that fired.
pub fn to_risk_score(hits: &[RuleHit], noise: f64) -> RiskScore {
    let flags: BTreeSet<String> = hits.iter().map(|h| h.rule_name.clone()).collect();
    RiskScore::new(compute_composite(hits, noise), flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RiskAction;

    fn hit(name: &str, weight: f64) -> RuleHit {
        RuleHit {
            rule_name: name.to_string(),
            weight,
        }
    }

    #[test]
    fn empty_hits() {
        assert_eq!(compute_composite(&[], 0.0), 0);
    }

    #[test]
    fn additive() {
        let hits = vec![hit("a", 50.0), hit("b", 20.0)];
        assert_eq!(compute_composite(&hits, 0.0), 70);
    }

    #[test]
    fn noise_is_added_and_rounded() {
        assert_eq!(compute_composite(&[hit("a", 15.0)], 4.6), 20);
        assert_eq!(compute_composite(&[], 19.4), 19);
    }

    #[test]
    fn clamped_to_hundred() {
        let hits = vec![hit("a", 50.0), hit("b", 20.0), hit("c", 30.0), hit("d", 15.0)];
        assert_eq!(compute_composite(&hits, 19.9), 100);
    }

    #[test]
    fn negative_weight_clamped_to_zero() {
        assert_eq!(compute_composite(&[hit("a", -30.0)], 0.0), 0);
    }

    #[test]
    fn risk_score_carries_flags_and_action() {
        let score = to_risk_score(&[hit("BLACKLIST_ADDRESS", 50.0), hit("RBF_FLOODING", 30.0)], 1.0);
        assert_eq!(score.score, 81);
        assert_eq!(score.action, RiskAction::Ban);
        assert!(score.has_flag("BLACKLIST_ADDRESS"));
        assert!(score.has_flag("RBF_FLOODING"));
        assert_eq!(score.flags.len(), 2);
    }
}
