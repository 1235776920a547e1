use crate::alerts::ThreatAlert;
use crate::context::Theme;

pub fn alert_panel(alerts: &[ThreatAlert], theme: Theme) -> String {
    if alerts.is_empty() {
        return "No threat intelligence to show.".to_string();
    }
    let mut out = match theme {
        Theme::Dark => format!("🚨 Threat intel ({})", alerts.len()),
        Theme::Plain => format!("Threat intel ({})", alerts.len()),
    };
    for alert in alerts {
        let marker = match theme {
            Theme::Dark => alert.severity.emoji().to_string(),
            Theme::Plain => format!("[{:?}]", alert.severity).to_uppercase(),
        };
        out.push_str(&format!(
            "\n  {marker} {} {} ({}) {}",
            alert.id, alert.title, alert.source, alert.address
        ));
    }
    out
}
