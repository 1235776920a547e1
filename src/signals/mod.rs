pub mod report;
pub mod rules;
pub mod score;

use std::collections::{BTreeSet, HashMap};

use rand::Rng;
use tracing::warn;

use crate::config::RiskConfig;
use crate::core::{MockTransaction, RiskAction, RiskScore, ScoredTransaction};
use crate::error::ScoringError;
use crate::session::UserSession;
use crate::tags::TagLookup;
use report::RiskReport;
use rules::{Rule, RuleInput};
use score::RuleHit;

/// Flag carried by the fallback score when scoring itself fails.
pub const ERROR_DETECTION_FAILED: &str = "ERROR_DETECTION_FAILED";

/// The risk engine applies all rules, adds bounded noise, and maps to an action.
pub struct RiskEngine {
    rules: Vec<Box<dyn Rule + Send + Sync>>,
    weights: HashMap<String, f64>,
    noise_ceiling: f64,
    high_risk_threshold: u8,
    tags: TagLookup,
}

impl RiskEngine {
    pub fn new(config: &RiskConfig) -> Self {
        Self::with_tags(config, TagLookup::builtin())
    }

    pub fn with_tags(config: &RiskConfig, tags: TagLookup) -> Self {
        Self {
            rules: rules::default_rules(),
            weights: config.weights.clone(),
            noise_ceiling: noise_ceiling(config),
            high_risk_threshold: config.high_risk_threshold,
            tags,
        }
    }

    /// Weight for a rule: config override, else the rule's default.
    fn weight(&self, rule: &dyn Rule) -> f64 {
        self.weights
            .get(rule.name())
            .copied()
            .unwrap_or_else(|| rule.default_weight())
    }

    /// Score a transaction. Never fails: unusable input yields the safe default.
    ///
    /// The noise term is uniform in `[0, noise_ceiling)`, so identical
    /// transactions can score differently between calls.
    pub fn score<R: Rng + ?Sized>(
        &self,
        tx: &MockTransaction,
        session: Option<&UserSession>,
        rng: &mut R,
    ) -> RiskScore {
        match self.try_score(tx, session, rng) {
            Ok(score) => score,
            Err(e) => {
                warn!("risk scoring failed: {e}");
                fallback_score()
            }
        }
    }

    fn try_score<R: Rng + ?Sized>(
        &self,
        tx: &MockTransaction,
        session: Option<&UserSession>,
        rng: &mut R,
    ) -> Result<RiskScore, ScoringError> {
        let usable = |v: f64| v.is_finite() && v >= 0.0;
        if !usable(tx.value) || !usable(tx.fee) {
            return Err(ScoringError::InvalidAmounts {
                txid: tx.id.clone(),
                value: tx.value,
                fee: tx.fee,
            });
        }

        let input = RuleInput {
            tx,
            session,
            tags: &self.tags,
        };
        let hits: Vec<RuleHit> = self
            .rules
            .iter()
            .filter(|rule| rule.evaluate(&input))
            .map(|rule| RuleHit {
                rule_name: rule.name().to_string(),
                weight: self.weight(rule.as_ref()),
            })
            .collect();

        let noise = if self.noise_ceiling > 0.0 {
            rng.gen_range(0.0..self.noise_ceiling)
        } else {
            0.0
        };

        Ok(score::to_risk_score(&hits, noise))
    }

    /// Score and pair a transaction for the feed.
    pub fn score_transaction<R: Rng + ?Sized>(
        &self,
        tx: MockTransaction,
        session: Option<&UserSession>,
        rng: &mut R,
    ) -> ScoredTransaction {
        let risk = self.score(&tx, session, rng);
        ScoredTransaction { tx, risk }
    }

    /// Score every transaction and summarize. Empty input gives the all-zero report.
    pub fn report_summary<R: Rng + ?Sized>(&self, txs: &[MockTransaction], rng: &mut R) -> RiskReport {
        let scored: Vec<ScoredTransaction> = txs
            .iter()
            .map(|tx| self.score_transaction(tx.clone(), None, rng))
            .collect();
        RiskReport::from_scored(&scored, self.high_risk_threshold)
    }

    pub fn high_risk_threshold(&self) -> u8 {
        self.high_risk_threshold
    }

    pub fn tags(&self) -> &TagLookup {
        &self.tags
    }
}

/// Configured noise ceiling, or the default when it is not a finite number.
fn noise_ceiling(config: &RiskConfig) -> f64 {
    if config.noise_ceiling.is_finite() {
        return config.noise_ceiling.max(0.0);
    }
    let fallback = RiskConfig::default().noise_ceiling;
    warn!(
        "risk.noise_ceiling = {} is not usable, using {fallback}",
        config.noise_ceiling
    );
    fallback
}

/// Score returned when detection itself fails.
pub fn fallback_score() -> RiskScore {
    RiskScore {
        score: 50,
        flags: BTreeSet::from([ERROR_DETECTION_FAILED.to_string()]),
        action: RiskAction::Warn,
    }
}
