use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use rand::Rng;

use super::{MockTransaction, RiskScore, ScoredTransaction, TxStatus};

/// Seconds a transaction sits in the mempool before it confirms.
pub const CONFIRMATION_LAG_SECS: f64 = 15.0;

/// Status a transaction should have `elapsed` seconds after creation.
pub fn status_after(elapsed_secs: f64, mempool_delay_secs: f64, confirmation_lag_secs: f64) -> TxStatus {
    if elapsed_secs >= mempool_delay_secs + confirmation_lag_secs {
        TxStatus::Confirmed
    } else if elapsed_secs >= mempool_delay_secs {
        TxStatus::Mempool
    } else {
        TxStatus::Pending
    }
}

/// Advance a transaction along pending → mempool → confirmed.
///
/// Returns the replacement record when the status moved, `None` otherwise.
/// Never moves backwards. Confirmations are drawn from 1..=6 when the record
/// first becomes confirmed.
pub fn advance<R: Rng + ?Sized>(
    tx: &MockTransaction,
    now: DateTime<Utc>,
    confirmation_lag_secs: f64,
    rng: &mut R,
) -> Option<MockTransaction> {
    let elapsed = (now - tx.timestamp).num_milliseconds() as f64 / 1000.0;
    let target = status_after(elapsed, tx.mempool_delay_seconds, confirmation_lag_secs);
    if target <= tx.status {
        return None;
    }

    let confirmations = if target == TxStatus::Confirmed {
        rng.gen_range(1..=6)
    } else {
        tx.confirmations
    };

    Some(MockTransaction {
        status: target,
        confirmations,
        ..tx.clone()
    })
}

/// Bounded in-memory feed of the most recent transactions and their scores.
#[derive(Debug)]
pub struct TxFeed {
    entries: VecDeque<MockTransaction>,
    risk: HashMap<String, RiskScore>,
    capacity: usize,
}

impl TxFeed {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            risk: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a scored transaction at the front; returns the evicted record, if any.
    ///
    /// A transaction whose id is already in the feed replaces the old entry.
    pub fn push(&mut self, scored: ScoredTransaction) -> Option<MockTransaction> {
        let ScoredTransaction { tx, risk } = scored;
        if self.risk.contains_key(&tx.id) {
            self.entries.retain(|entry| entry.id != tx.id);
        }
        self.risk.insert(tx.id.clone(), risk);
        self.entries.push_front(tx);

        if self.entries.len() > self.capacity {
            let evicted = self.entries.pop_back()?;
            self.risk.remove(&evicted.id);
            return Some(evicted);
        }
        None
    }

    /// Apply lifecycle transitions to every entry. Returns the records that changed.
    pub fn advance_all<R: Rng + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        confirmation_lag_secs: f64,
        rng: &mut R,
    ) -> Vec<MockTransaction> {
        let mut changed = Vec::new();
        for entry in self.entries.iter_mut() {
            if let Some(next) = advance(entry, now, confirmation_lag_secs, rng) {
                *entry = next.clone();
                changed.push(next);
            }
        }
        changed
    }

    pub fn risk_for(&self, txid: &str) -> Option<&RiskScore> {
        self.risk.get(txid)
    }

    /// Transactions newest first.
    pub fn transactions(&self) -> impl Iterator<Item = &MockTransaction> {
        self.entries.iter()
    }

    /// Transactions paired with their stored scores, newest first.
    pub fn scored(&self) -> Vec<ScoredTransaction> {
        self.entries
            .iter()
            .filter_map(|tx| {
                self.risk.get(&tx.id).map(|risk| ScoredTransaction {
                    tx: tx.clone(),
                    risk: risk.clone(),
                })
            })
            .collect()
    }

    pub fn count_with_status(&self, status: TxStatus) -> usize {
        self.entries.iter().filter(|tx| tx.status == status).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
