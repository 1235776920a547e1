use crate::core::MockTransaction;
use crate::session::UserSession;
use crate::tags::TagLookup;

pub const BLACKLIST_ADDRESS: &str = "BLACKLIST_ADDRESS";
pub const HIGH_VALUE_TX: &str = "HIGH_VALUE_TX";
pub const RBF_FLOODING: &str = "RBF_FLOODING";
pub const SUSPICIOUS_FEE: &str = "SUSPICIOUS_FEE";

/// Everything a rule may look at.
pub struct RuleInput<'a> {
    pub tx: &'a MockTransaction,
    pub session: Option<&'a UserSession>,
    pub tags: &'a TagLookup,
}

/// A heuristic that either fires (adding its points and flag) or doesn't.
pub trait Rule {
    /// Flag name reported when the rule fires.
    fn name(&self) -> &str;
    fn default_weight(&self) -> f64;
    fn evaluate(&self, input: &RuleInput<'_>) -> bool;
}

/// Return all default rules with their built-in weights.
pub fn default_rules() -> Vec<Box<dyn Rule + Send + Sync>> {
    vec![
        Box::new(BlacklistRule),
        Box::new(HighValueRule),
        Box::new(RbfFloodingRule),
        Box::new(SuspiciousFeeRule),
    ]
}

// --- Individual Rules ---

struct BlacklistRule;
impl Rule for BlacklistRule {
    fn name(&self) -> &str { BLACKLIST_ADDRESS }
    fn default_weight(&self) -> f64 { 50.0 }
    fn evaluate(&self, input: &RuleInput<'_>) -> bool {
        input.tags.is_blacklisted(&input.tx.input_address)
            || input.tags.is_blacklisted(&input.tx.output_address)
    }
}

struct HighValueRule;
impl Rule for HighValueRule {
    fn name(&self) -> &str { HIGH_VALUE_TX }
    fn default_weight(&self) -> f64 { 20.0 }
    fn evaluate(&self, input: &RuleInput<'_>) -> bool {
        input.tx.value > 5.0
    }
}

/// Needs a session; without one it never fires.
struct RbfFloodingRule;
impl Rule for RbfFloodingRule {
    fn name(&self) -> &str { RBF_FLOODING }
    fn default_weight(&self) -> f64 { 30.0 }
    fn evaluate(&self, input: &RuleInput<'_>) -> bool {
        input.session.is_some_and(|s| s.rbf_attempts > 5)
    }
}

/// Fee above 5% of the transferred value. A zero-value transfer with any fee counts.
struct SuspiciousFeeRule;
impl Rule for SuspiciousFeeRule {
    fn name(&self) -> &str { SUSPICIOUS_FEE }
    fn default_weight(&self) -> f64 { 15.0 }
    fn evaluate(&self, input: &RuleInput<'_>) -> bool {
        let tx = input.tx;
        if tx.value <= 0.0 {
            return tx.fee > 0.0;
        }
        tx.fee / tx.value * 100.0 > 5.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::make_test_tx;
    use crate::tags::BLACKLISTED_ADDRESSES;

    fn fires(rule: &dyn Rule, tx: &MockTransaction, session: Option<&UserSession>) -> bool {
        let tags = TagLookup::builtin();
        rule.evaluate(&RuleInput { tx, session, tags: &tags })
    }

    #[test]
    fn blacklist_input_side() {
        let mut tx = make_test_tx();
        tx.input_address = BLACKLISTED_ADDRESSES[1].to_string();
        assert!(fires(&BlacklistRule, &tx, None));
    }

    #[test]
    fn blacklist_output_side() {
        let mut tx = make_test_tx();
        tx.output_address = BLACKLISTED_ADDRESSES[2].to_string();
        assert!(fires(&BlacklistRule, &tx, None));
    }

    #[test]
    fn blacklist_clean() {
        assert!(!fires(&BlacklistRule, &make_test_tx(), None));
    }

    #[test]
    fn high_value_is_strictly_above_five() {
        let mut tx = make_test_tx();
        tx.value = 5.0;
        assert!(!fires(&HighValueRule, &tx, None));
        tx.value = 5.01;
        assert!(fires(&HighValueRule, &tx, None));
    }

    #[test]
    fn rbf_flooding_needs_more_than_five_attempts() {
        let tx = make_test_tx();
        let mut session = UserSession::new("s", "127.0.0.1", "agent");
        session.rbf_attempts = 5;
        assert!(!fires(&RbfFloodingRule, &tx, Some(&session)));
        session.rbf_attempts = 6;
        assert!(fires(&RbfFloodingRule, &tx, Some(&session)));
        assert!(!fires(&RbfFloodingRule, &tx, None));
    }

    #[test]
    fn suspicious_fee_ratio() {
        let mut tx = make_test_tx();
        tx.value = 1.0;
        tx.fee = 0.05;
        assert!(!fires(&SuspiciousFeeRule, &tx, None));
        tx.fee = 0.06;
        assert!(fires(&SuspiciousFeeRule, &tx, None));
    }

    #[test]
    fn suspicious_fee_zero_value() {
        let mut tx = make_test_tx();
        tx.value = 0.0;
        tx.fee = 0.0001;
        assert!(fires(&SuspiciousFeeRule, &tx, None));
        tx.fee = 0.0;
        assert!(!fires(&SuspiciousFeeRule, &tx, None));
    }

    #[test]
    fn default_rules_count() {
        assert_eq!(default_rules().len(), 4);
    }

    #[test]
    fn all_rules_names_unique() {
        let rules = default_rules();
        let mut names: Vec<&str> = rules.iter().map(|r| r.name()).collect();
        let len = names.len();
        names.sort();
        names.dedup();
        assert_eq!(len, names.len());
    }
}
