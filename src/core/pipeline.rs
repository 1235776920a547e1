use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::time::{Instant, interval_at, sleep_until};
use tracing::{debug, info, warn};

use crate::alerts::{self, ThreatAlert};
use crate::config::{Config, DashboardConfig};
use crate::context::{AppContext, ErrorSource};
use crate::core::factory::create_transaction_at;
use crate::core::lifecycle::TxFeed;
use crate::core::{Coin, MockTransaction, ScoredTransaction};
use crate::session::UserSession;
use crate::signals::report::RiskReport;
use crate::signals::{ERROR_DETECTION_FAILED, RiskEngine};

const BTC_SHARE: f64 = 0.8;

/// Messages from pipeline to UI.
#[derive(Debug, Clone)]
pub enum PipelineOutput {
    NewTx(ScoredTransaction),
    StatusChanged(MockTransaction),
    Evicted { txid: String },
    Alerts(Vec<ThreatAlert>),
    Summary(RiskReport),
}

/// Everything one dashboard session owns. Mutated only by the pipeline task.
pub struct DashboardState {
    feed: TxFeed,
    engine: RiskEngine,
    session: UserSession,
    rng: StdRng,
    ctx: AppContext,
    alert_offset: usize,
    settings: DashboardConfig,
}

impl DashboardState {
    pub fn new(config: &Config) -> Self {
        let rng = match config.generator.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            feed: TxFeed::new(config.generator.feed_capacity),
            engine: RiskEngine::new(&config.risk),
            session: UserSession::new("dashboard", "127.0.0.1", "txsleuth"),
            rng,
            ctx: AppContext::new(config.ui.theme),
            alert_offset: 0,
            settings: sanitize_settings(&config.dashboard),
        }
    }

    /// Timer (a): with the configured probability, create, score and store a transaction.
    pub fn maybe_new_tx(&mut self, now: DateTime<Utc>) -> Option<(ScoredTransaction, Option<MockTransaction>)> {
        let p = self.settings.new_tx_probability.clamp(0.0, 1.0);
        if !self.rng.gen_bool(p) {
            return None;
        }
        Some(self.new_tx(now))
    }

    /// Create, score and store a transaction. Returns it with any evicted record.
    pub fn new_tx(&mut self, now: DateTime<Utc>) -> (ScoredTransaction, Option<MockTransaction>) {
        let coin = if self.rng.gen_bool(BTC_SHARE) { Coin::Btc } else { Coin::Eth };
        let tx = create_transaction_at(coin, now, &mut self.rng);
        let scored = self
            .engine
            .score_transaction(tx, Some(&self.session), &mut self.rng);

        if scored.risk.has_flag(ERROR_DETECTION_FAILED) {
            self.ctx
                .errors
                .record(ErrorSource::Scoring, format!("fallback score for {}", scored.tx.id));
        }
        debug!(
            "New {} tx {} value={} score={}",
            scored.tx.coin, scored.tx.id, scored.tx.value, scored.risk.score
        );

        let evicted = self.feed.push(scored.clone());
        (scored, evicted)
    }

    /// Timer (b): advance every transaction's lifecycle.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Vec<MockTransaction> {
        self.feed
            .advance_all(now, self.settings.confirmation_lag_secs, &mut self.rng)
    }

    /// Timer (c): next window of the static alert list.
    pub fn rotate_alerts(&mut self) -> Vec<ThreatAlert> {
        self.alert_offset = self.alert_offset.wrapping_add(1);
        self.current_alerts()
    }

    pub fn current_alerts(&self) -> Vec<ThreatAlert> {
        alerts::rotate(self.alert_offset, self.settings.alert_window)
    }

    pub fn summary(&self) -> RiskReport {
        RiskReport::from_scored(&self.feed.scored(), self.engine.high_risk_threshold())
    }

    pub fn feed(&self) -> &TxFeed {
        &self.feed
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn into_context(self) -> AppContext {
        self.ctx
    }
}

/// Replace non-finite timing values with their defaults.
fn sanitize_settings(settings: &DashboardConfig) -> DashboardConfig {
    let defaults = DashboardConfig::default();
    let mut settings = settings.clone();
    if !settings.new_tx_probability.is_finite() {
        warn!(
            "dashboard.new_tx_probability = {} is not usable, using {}",
            settings.new_tx_probability, defaults.new_tx_probability
        );
        settings.new_tx_probability = defaults.new_tx_probability;
    }
    if !settings.confirmation_lag_secs.is_finite() || settings.confirmation_lag_secs < 0.0 {
        warn!(
            "dashboard.confirmation_lag_secs = {} is not usable, using {}",
            settings.confirmation_lag_secs, defaults.confirmation_lag_secs
        );
        settings.confirmation_lag_secs = defaults.confirmation_lag_secs;
    }
    settings
}

/// Wall-clock time that follows tokio's clock, so paused-time runs stay consistent.
struct PipelineClock {
    wall_start: DateTime<Utc>,
    start: Instant,
}

impl PipelineClock {
    fn start() -> Self {
        Self {
            wall_start: Utc::now(),
            start: Instant::now(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.start.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.wall_start + elapsed
    }
}

fn period_secs(secs: u64) -> Duration {
    Duration::from_secs(secs.max(1))
}

/// Run the dashboard timers until the UI side hangs up. Returns the session context.
pub async fn run_pipeline(config: Config, ui_tx: mpsc::UnboundedSender<PipelineOutput>) -> AppContext {
    let mut state = DashboardState::new(&config);
    let settings = config.dashboard.clone();
    let clock = PipelineClock::start();

    let new_tx_period = period_secs(settings.new_tx_interval_secs);
    let status_period = period_secs(settings.status_interval_secs);
    let alert_period = period_secs(settings.alert_rotation_secs);
    let debounce = Duration::from_millis(settings.summary_debounce_ms);

    let start = Instant::now();
    let mut new_tx_timer = interval_at(start + new_tx_period, new_tx_period);
    let mut status_timer = interval_at(start + status_period, status_period);
    let mut alert_timer = interval_at(start + alert_period, alert_period);
    let mut summary_deadline: Option<Instant> = None;

    let mut tx_count: u64 = 0;

    info!("Pipeline started (feed capacity {})", config.generator.feed_capacity);

    if ui_tx.send(PipelineOutput::Alerts(state.current_alerts())).is_err() {
        info!("UI channel closed before start");
        state
            .ctx
            .errors
            .record(ErrorSource::Pipeline, "UI channel closed before start");
        return state.into_context();
    }

    loop {
        let mut outputs = Vec::new();
        let mut feed_changed = false;

        tokio::select! {
            _ = new_tx_timer.tick() => {
                if let Some((scored, evicted)) = state.maybe_new_tx(clock.now()) {
                    tx_count += 1;
                    outputs.push(PipelineOutput::NewTx(scored));
                    if let Some(old) = evicted {
                        outputs.push(PipelineOutput::Evicted { txid: old.id });
                    }
                    feed_changed = true;
                }
            }
            _ = status_timer.tick() => {
                let changed = state.advance(clock.now());
                feed_changed = !changed.is_empty();
                outputs.extend(changed.into_iter().map(PipelineOutput::StatusChanged));
            }
            _ = alert_timer.tick() => {
                outputs.push(PipelineOutput::Alerts(state.rotate_alerts()));
            }
            _ = sleep_until(summary_deadline.unwrap_or_else(Instant::now)), if summary_deadline.is_some() => {
                summary_deadline = None;
                outputs.push(PipelineOutput::Summary(state.summary()));
            }
            _ = ui_tx.closed() => {
                info!("UI channel closed, stopping pipeline");
                break;
            }
        }

        // Debounce: every change pushes the summary back.
        if feed_changed {
            summary_deadline = Some(Instant::now() + debounce);
        }

        if outputs.into_iter().any(|out| ui_tx.send(out).is_err()) {
            info!("UI channel closed, stopping pipeline");
            break;
        }
    }

    let ctx = state.into_context();
    info!(
        "Pipeline shutting down after {tx_count} txs, {} absorbed errors",
        ctx.errors.len()
    );
    ctx
}
