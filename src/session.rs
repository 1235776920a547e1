use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Points considered by [`UserSession::looks_scripted`].
const MOUSE_WINDOW: usize = 10;
/// Max per-axis difference between consecutive displacement vectors to count as "same direction".
const LINEAR_TOLERANCE: f64 = 5.0;
/// Share of near-identical vector pairs above which movement is called linear.
const LINEAR_RATIO: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MousePoint {
    pub x: f64,
    pub y: f64,
    pub timestamp: DateTime<Utc>,
}

/// Optional caller context for the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub id: String,
    pub ip_address: String,
    pub user_agent: String,
    pub start_time: DateTime<Utc>,
    pub mouse_movements: Vec<MousePoint>,
    pub rbf_attempts: u32,
}

impl UserSession {
    pub fn new(id: impl Into<String>, ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ip_address: ip_address.into(),
            user_agent: user_agent.into(),
            start_time: Utc::now(),
            mouse_movements: Vec::new(),
            rbf_attempts: 0,
        }
    }

    pub fn record_rbf_attempt(&mut self) {
        self.rbf_attempts = self.rbf_attempts.saturating_add(1);
    }

    pub fn record_mouse(&mut self, x: f64, y: f64) {
        self.mouse_movements.push(MousePoint {
            x,
            y,
            timestamp: Utc::now(),
        });
    }

    /// Bot heuristic over the most recent mouse points. Informational only.
    pub fn looks_scripted(&self) -> bool {
        let start = self.mouse_movements.len().saturating_sub(MOUSE_WINDOW);
        is_linear_mouse_movement(&self.mouse_movements[start..])
    }
}

/// True when at least 70% of consecutive displacement-vector pairs differ by
/// less than 5 units on both axes. Fewer than three points is never linear.
pub fn is_linear_mouse_movement(points: &[MousePoint]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let vectors: Vec<(f64, f64)> = points
        .windows(2)
        .map(|w| (w[1].x - w[0].x, w[1].y - w[0].y))
        .collect();

    let pairs = vectors.len() - 1;
    let similar = vectors
        .windows(2)
        .filter(|v| {
            (v[1].0 - v[0].0).abs() < LINEAR_TOLERANCE && (v[1].1 - v[0].1).abs() < LINEAR_TOLERANCE
        })
        .count();

    similar as f64 / pairs as f64 >= LINEAR_RATIO
}
