use crate::analysis::{AddressProfile, DataSource, HashAnalysisResult};
use crate::context::Theme;

use super::feed::{action_marker, format_amount, short_id};
use crate::core::Coin;

fn address_line(profile: &AddressProfile) -> String {
    let label = profile.label.as_deref().unwrap_or("unlabeled");
    format!(
        "    {} [{label}] risk {} | {} txs",
        profile.address, profile.risk_score, profile.tx_count
    )
}

/// Human-readable analysis report.
pub fn analysis_report(result: &HashAnalysisResult, theme: Theme) -> String {
    let d = &result.transaction_details;
    let risk = &result.risk_analysis;
    let mut lines = vec![
        format!("Transaction {}", result.txid),
        format!(
            "  {} risk {} ({})",
            action_marker(risk.action, theme),
            risk.score,
            risk.action
        ),
        format!(
            "  value {} | fee {} ({} sat/vB) | {} bytes",
            format_amount(d.value, Coin::Btc),
            format_amount(d.fee, Coin::Btc),
            d.fee_rate,
            d.size_bytes
        ),
        format!("  status {} | confirmations {}", d.status, d.confirmations),
    ];

    if let Some(height) = d.block_height {
        lines.push(format!("  block {height}"));
    }
    if let Some(rbf) = &result.rbf_details {
        lines.push(format!(
            "  RBF: {} → {} (+{}%), replaces {}{}",
            format_amount(rbf.original_fee, Coin::Btc),
            format_amount(rbf.replacement_fee, Coin::Btc),
            rbf.fee_increase_percent,
            short_id(&rbf.replaced_txid),
            if result.can_rbf { ", still replaceable" } else { "" }
        ));
    }
    if !risk.flags.is_empty() {
        lines.push(format!("  flags: {}", risk.flags.join(", ")));
    }
    for pattern in &risk.suspicious_patterns {
        lines.push(format!("  ! {pattern}"));
    }
    let hits: Vec<&str> = risk
        .compliance
        .iter()
        .filter(|c| c.hit)
        .map(|c| c.source.as_str())
        .collect();
    if !hits.is_empty() {
        lines.push(format!("  watchlists: {}", hits.join(", ")));
    }

    lines.push("  inputs:".to_string());
    lines.extend(result.address_analysis.input.iter().map(address_line));
    lines.push("  outputs:".to_string());
    lines.extend(result.address_analysis.output.iter().map(address_line));

    let net = &result.network_analysis;
    lines.push(format!(
        "  network: mempool {} txs ({:?}) | avg {} sat/vB | eta {} min",
        net.mempool_size, net.congestion, net.avg_fee_rate, net.estimated_confirmation_minutes
    ));
    if result.data_source == DataSource::Explorer {
        lines.push("  (chain data from block explorer)".to_string());
    }
    lines.join("\n")
}
