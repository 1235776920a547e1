//! Terminal rendering for dashboard events and analysis reports.

pub mod alerts;
pub mod feed;
pub mod report;
pub mod stats;

use crate::context::Theme;
use crate::core::pipeline::PipelineOutput;

/// One printable block per pipeline message.
pub fn render_output(output: &PipelineOutput, theme: Theme) -> String {
    match output {
        PipelineOutput::NewTx(scored) => feed::tx_row(scored, theme),
        PipelineOutput::StatusChanged(tx) => feed::status_row(tx),
        PipelineOutput::Evicted { txid } => format!("{} dropped from feed", feed::short_id(txid)),
        PipelineOutput::Alerts(list) => alerts::alert_panel(list, theme),
        PipelineOutput::Summary(report) => stats::summary_line(report),
    }
}
