use chrono::{Duration, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

use super::scenario::Scenario;
use super::{
    AddressAnalysis, AddressProfile, AnalysisFocus, ComplianceCheck, Congestion, DataSource,
    HashAnalysisResult, NetworkAnalysis, RbfDetails, RiskAnalysis, TransactionDetails,
};
use crate::core::factory::RBF_FEE_MULTIPLIER;
use crate::core::ids::{generate_address, generate_txid};
use crate::core::{Coin, RiskAction, TxStatus, round8};
use crate::tags::EntityType;

const EXCHANGE_LABELS: &[&str] = &[
    "Binance Hot Wallet",
    "Coinbase Custody",
    "Kraken Deposit",
    "Bitfinex Cold Storage",
];

const SUSPICIOUS_LABELS: &[(&str, EntityType)] = &[
    ("Wasabi CoinJoin Output", EntityType::Mixer),
    ("Sinbad Mixer", EntityType::Mixer),
    ("Hydra Market Cluster", EntityType::Darknet),
    ("Ransomware Collector", EntityType::Darknet),
];

/// BIP-125 opt-in sequence value.
const RBF_SEQUENCE: u32 = 0xffff_fffd;
const BASE_BLOCK_HEIGHT: u32 = 840_000;

/// Build the full result for an already validated hash.
pub fn build<R: Rng + ?Sized>(
    txid: &str,
    scenario: Scenario,
    focus: AnalysisFocus,
    rng: &mut R,
) -> HashAnalysisResult {
    let transaction_details = transaction_details(&scenario, rng);
    let rbf_details = scenario
        .is_rbf
        .then(|| rbf_details(transaction_details.fee, rng));
    let can_rbf = scenario.is_rbf && transaction_details.status != TxStatus::Confirmed;

    HashAnalysisResult {
        txid: txid.to_string(),
        is_valid: true,
        focus,
        scenario,
        is_rbf: scenario.is_rbf,
        can_rbf,
        rbf_details,
        risk_analysis: risk_analysis(&scenario, rng),
        address_analysis: AddressAnalysis {
            input: address_profiles(&scenario, true, rng),
            output: address_profiles(&scenario, false, rng),
        },
        network_analysis: network_analysis(&transaction_details, scenario.is_rbf, rng),
        transaction_details,
        data_source: DataSource::Synthetic,
    }
}

fn transaction_details<R: Rng + ?Sized>(scenario: &Scenario, rng: &mut R) -> TransactionDetails {
    let value = round8(if scenario.is_high_value {
        100.0 + rng.gen_range(0.0..900.0)
    } else if scenario.is_exchange {
        1.0 + rng.gen_range(0.0..20.0)
    } else {
        0.01 + rng.gen_range(0.0..2.0)
    });

    let size_bytes: u32 = rng.gen_range(200..600);
    let fee_rate: f64 = if scenario.is_rbf {
        25.0 + rng.gen_range(0.0..50.0)
    } else {
        5.0 + rng.gen_range(0.0..20.0)
    };
    let fee = round8(fee_rate * size_bytes as f64 / 100_000_000.0);

    // RBF transactions are still replaceable, so they must be unconfirmed.
    let confirmed = !scenario.is_rbf && rng.gen_bool(0.8);
    let now = Utc::now();
    let (status, confirmations, block_height, timestamp) = if confirmed {
        let confirmations: u32 = rng.gen_range(1..=100);
        (
            TxStatus::Confirmed,
            confirmations,
            Some(BASE_BLOCK_HEIGHT + rng.gen_range(0..10_000)),
            now - Duration::minutes(confirmations as i64 * 10),
        )
    } else {
        (
            TxStatus::Mempool,
            0,
            None,
            now - Duration::seconds(rng.gen_range(0..1800)),
        )
    };

    TransactionDetails {
        value,
        fee,
        fee_rate: (fee_rate * 10.0).round() / 10.0,
        size_bytes,
        status,
        confirmations,
        block_height,
        timestamp,
        input_count: rng.gen_range(1..=3),
        output_count: rng.gen_range(1..=3),
    }
}

fn rbf_details<R: Rng + ?Sized>(current_fee: f64, rng: &mut R) -> RbfDetails {
    let original_fee = round8(current_fee / RBF_FEE_MULTIPLIER);
    RbfDetails {
        original_fee,
        replacement_fee: current_fee,
        fee_increase_percent: ((RBF_FEE_MULTIPLIER - 1.0) * 100.0).round(),
        replacement_count: rng.gen_range(1..=3),
        replaced_txid: generate_txid(Coin::Btc, rng),
        sequence: RBF_SEQUENCE,
        bip125_signaled: true,
    }
}

fn risk_analysis<R: Rng + ?Sized>(scenario: &Scenario, rng: &mut R) -> RiskAnalysis {
    let mut raw: f64 = rng.gen_range(0.0..20.0);
    let mut flags = Vec::new();
    let mut patterns = Vec::new();

    if scenario.is_suspicious {
        raw += 60.0;
        flags.push("SUSPICIOUS_PATTERN".to_string());
        patterns.push("Interaction with known mixing service".to_string());
        patterns.push("Peel chain across 5+ hops".to_string());
        patterns.push("Rapid fund movement after receipt".to_string());
    }
    if scenario.is_high_value {
        raw += 20.0;
        flags.push("HIGH_VALUE_TX".to_string());
        if !scenario.is_exchange {
            patterns.push("Large transfer to unlabeled address".to_string());
        }
    }
    if scenario.is_rbf {
        raw += 5.0;
        flags.push("RBF_SIGNALED".to_string());
        patterns.push("Fee bumped via replace-by-fee".to_string());
    }
    if scenario.is_exchange {
        raw -= 10.0;
        flags.push("EXCHANGE_COUNTERPARTY".to_string());
    }

    let score = raw.clamp(0.0, 100.0).round() as u8;
    let watchlist_hit = scenario.is_suspicious || (scenario.is_high_value && !scenario.is_exchange);

    RiskAnalysis {
        score,
        action: RiskAction::from_score(score),
        flags,
        suspicious_patterns: patterns,
        compliance: vec![
            ComplianceCheck {
                source: "OFAC SDN".to_string(),
                hit: scenario.is_suspicious,
            },
            ComplianceCheck {
                source: "Chainalysis".to_string(),
                hit: watchlist_hit,
            },
            ComplianceCheck {
                source: "Elliptic".to_string(),
                hit: watchlist_hit,
            },
        ],
    }
}

/// `floor(random * 3) + 1` profiles; the first one carries the scenario's label.
fn address_profiles<R: Rng + ?Sized>(scenario: &Scenario, inputs: bool, rng: &mut R) -> Vec<AddressProfile> {
    let count = (rng.gen_range(0.0f64..1.0) * 3.0).floor() as usize + 1;
    (0..count)
        .map(|i| {
            let labeled = if i != 0 {
                None
            } else if inputs && scenario.is_suspicious {
                SUSPICIOUS_LABELS
                    .choose(rng)
                    .map(|(label, kind)| (label.to_string(), *kind))
            } else if !inputs && scenario.is_exchange {
                EXCHANGE_LABELS
                    .choose(rng)
                    .map(|label| (label.to_string(), EntityType::Exchange))
            } else {
                None
            };

            let (label, entity_type) = match labeled {
                Some((label, kind)) => (Some(label), kind),
                None => (None, EntityType::Unknown),
            };
            let risk_score = match entity_type {
                EntityType::Mixer | EntityType::Darknet | EntityType::Sanctioned => rng.gen_range(85..=100),
                EntityType::Exchange => rng.gen_range(5..15),
                EntityType::Unknown => rng.gen_range(0..40),
            };

            AddressProfile {
                address: generate_address(Coin::Btc, rng),
                label,
                entity_type,
                risk_score,
                balance: round8(rng.gen_range(0.0..50.0)),
                tx_count: rng.gen_range(1..5000),
            }
        })
        .collect()
}

fn network_analysis<R: Rng + ?Sized>(details: &TransactionDetails, is_rbf: bool, rng: &mut R) -> NetworkAnalysis {
    let mempool_size: u32 = rng.gen_range(5_000..150_000);
    let congestion = Congestion::from_mempool_size(mempool_size);
    let estimated_confirmation_minutes = match details.status {
        TxStatus::Confirmed => 0,
        _ if is_rbf => 10,
        _ => rng.gen_range(10..60),
    };

    NetworkAnalysis {
        mempool_size,
        avg_fee_rate: ((3.0 + rng.gen_range(0.0f64..60.0)) * 10.0).round() / 10.0,
        congestion,
        estimated_confirmation_minutes,
        propagation_percent: ((95.0 + rng.gen_range(0.0f64..5.0)) * 10.0).round() / 10.0,
    }
}
