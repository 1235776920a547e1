use crate::context::Theme;
use crate::core::{Coin, MockTransaction, RiskAction, ScoredTransaction};

/// Format a coin amount with decimals scaled to its magnitude.
pub fn format_amount(value: f64, coin: Coin) -> String {
    let digits = if value >= 1.0 {
        4
    } else if value >= 0.001 {
        6
    } else {
        8
    };
    format!("{value:.digits$} {coin}")
}

/// First 16 characters of an id, with an ellipsis when shortened.
pub fn short_id(id: &str) -> String {
    match id.char_indices().nth(16) {
        Some((cut, _)) => format!("{}…", &id[..cut]),
        None => id.to_string(),
    }
}

pub fn action_marker(action: RiskAction, theme: Theme) -> String {
    match theme {
        Theme::Dark => action.emoji().to_string(),
        Theme::Plain => format!("[{action}]"),
    }
}

pub fn tx_row(scored: &ScoredTransaction, theme: Theme) -> String {
    let tx = &scored.tx;
    let mut row = format!(
        "{} {} {} | score {} | fee {} | {}",
        action_marker(scored.risk.action, theme),
        short_id(&tx.id),
        format_amount(tx.value, tx.coin),
        scored.risk.score,
        format_amount(tx.fee, tx.coin),
        tx.status,
    );
    if tx.rbf_enabled {
        row.push_str(" | rbf");
    }
    if !scored.risk.flags.is_empty() {
        let flags: Vec<&str> = scored.risk.flags.iter().map(String::as_str).collect();
        row.push_str(&format!(" | {}", flags.join(",")));
    }
    row
}

pub fn status_row(tx: &MockTransaction) -> String {
    if tx.confirmations > 0 {
        format!("{} → {} ({} conf)", short_id(&tx.id), tx.status, tx.confirmations)
    } else {
        format!("{} → {}", short_id(&tx.id), tx.status)
    }
}
