use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ERROR_HISTORY_CAPACITY: usize = 50;

/// Terminal presentation style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Plain,
}

/// Where an absorbed error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSource {
    Validation,
    Scoring,
    Explorer,
    Pipeline,
}

impl fmt::Display for ErrorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorSource::Validation => "validation",
            ErrorSource::Scoring => "scoring",
            ErrorSource::Explorer => "explorer",
            ErrorSource::Pipeline => "pipeline",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub at: DateTime<Utc>,
    pub source: ErrorSource,
    pub message: String,
}

/// Bounded log of errors the core absorbed instead of propagating.
#[derive(Debug, Clone)]
pub struct ErrorHistory {
    records: VecDeque<ErrorRecord>,
    capacity: usize,
}

impl ErrorHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, source: ErrorSource, message: impl fmt::Display) {
        let message = message.to_string();
        tracing::debug!("recorded {source} error: {message}");
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(ErrorRecord {
            at: Utc::now(),
            source,
            message,
        });
    }

    /// Records oldest first.
    pub fn records(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.records.iter()
    }

    pub fn count(&self, source: ErrorSource) -> usize {
        self.records.iter().filter(|r| r.source == source).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Default for ErrorHistory {
    fn default() -> Self {
        Self::with_capacity(ERROR_HISTORY_CAPACITY)
    }
}

/// Per-session state that would otherwise be global: error history and theme.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub errors: ErrorHistory,
    pub theme: Theme,
    default_theme: Theme,
}

impl AppContext {
    pub fn new(theme: Theme) -> Self {
        Self {
            errors: ErrorHistory::default(),
            theme,
            default_theme: theme,
        }
    }

    /// Drop recorded errors and restore the theme the context was built with.
    pub fn reset(&mut self) {
        self.errors.clear();
        self.theme = self.default_theme;
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}
