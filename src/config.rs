use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::context::Theme;
use crate::core::lifecycle::CONFIRMATION_LAG_SECS;
use crate::signals::report::HIGH_RISK_THRESHOLD;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub risk: RiskConfig,
    pub dashboard: DashboardConfig,
    pub analysis: AnalysisConfig,
    pub explorer: ExplorerConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Fixed seed for reproducible runs; entropy from the OS when unset.
    pub seed: Option<u64>,
    pub feed_capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RiskConfig {
    /// Per-flag point overrides, e.g. `HIGH_VALUE_TX = 25.0`.
    pub weights: HashMap<String, f64>,
    pub noise_ceiling: f64,
    pub high_risk_threshold: u8,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub new_tx_interval_secs: u64,
    pub new_tx_probability: f64,
    pub status_interval_secs: u64,
    pub alert_rotation_secs: u64,
    pub alert_window: usize,
    pub summary_debounce_ms: u64,
    pub confirmation_lag_secs: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnalysisConfig {
    pub recent_capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExplorerConfig {
    pub enabled: bool,
    pub base_url: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct UiConfig {
    pub theme: Theme,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            feed_capacity: 10,
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            weights: HashMap::new(),
            noise_ceiling: 20.0,
            high_risk_threshold: HIGH_RISK_THRESHOLD,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            new_tx_interval_secs: 8,
            new_tx_probability: 0.15,
            status_interval_secs: 3,
            alert_rotation_secs: 6,
            alert_window: 3,
            summary_debounce_ms: 1000,
            confirmation_lag_secs: CONFIRMATION_LAG_SECS,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { recent_capacity: 5 }
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://blockstream.info/api".into(),
            timeout_ms: 3000,
        }
    }
}

impl Config {
    /// Load config from a TOML file. Falls back to defaults if file doesn't exist.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    tracing::info!("Config loaded from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
