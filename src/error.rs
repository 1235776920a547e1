//! Error types for generation, scoring, analysis and explorer lookups

use thiserror::Error;

/// Surfaced to callers: the only failure a user can cause.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Invalid transaction hash: expected 64 hex characters, got {0:?}")]
    InvalidHashFormat(String),
}

/// Internal to the generators; always absorbed into a fallback value.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Entropy source failed: {0}")]
    Entropy(#[from] rand::Error),

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),
}

/// Internal to the scorer; always absorbed into the safe default score.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("Transaction {txid} has unusable amounts (value={value}, fee={fee})")]
    InvalidAmounts { txid: String, value: f64, fee: f64 },
}

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Explorer returned status {0}")]
    Status(u16),

    #[error("Explorer lookup timed out after {0} ms")]
    Timeout(u64),

    #[error("Unexpected explorer response: {0:?}")]
    Parse(String),
}
