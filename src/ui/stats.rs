use crate::signals::report::RiskReport;

pub fn summary_line(report: &RiskReport) -> String {
    let mut line = format!(
        "📊 {} txs | high risk {} | avg score {:.1}",
        report.total_transactions, report.high_risk_count, report.average_risk_score
    );
    if !report.flagged_addresses.is_empty() {
        line.push_str(&format!(" | flagged: {}", report.flagged_addresses.join(", ")));
    }
    line
}
