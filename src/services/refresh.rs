//! Periodic fetch, analyse and publish loop.
//!
//! One task owns the history buffer and the price source. Each cycle fetches
//! a price, appends it, recomputes the analysis over a history snapshot and
//! replaces the published [`Snapshot`] in a single `watch` send. Readers only
//! ever see complete snapshots.

use crate::config::Config;
use crate::services::history::HistoryBuffer;
use crate::services::price_source::PriceSource;
use crate::services::signals::scorer::percent_change;
use crate::services::signals::Analyzer;
use crate::types::{PricePoint, Snapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Source of wall-clock time for snapshot timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system UTC clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Where the refresh loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    Idle,
    Fetching,
    Computing,
    /// Sleeping after a successful publish.
    Published,
    /// Sleeping after a failed fetch.
    Backoff,
    Stopped,
}

/// Owns the mutable state of the refresh cycle.
pub struct RefreshLoop {
    config: Config,
    source: PriceSource,
    history: HistoryBuffer,
    analyzer: Analyzer,
    clock: Arc<dyn Clock>,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    state_tx: watch::Sender<LoopState>,
    refresh: Arc<Notify>,
    last_price: Option<f64>,
}

impl RefreshLoop {
    pub fn new(config: Config, source: PriceSource, clock: Arc<dyn Clock>) -> Self {
        let (snapshot_tx, _) = watch::channel(Arc::new(Snapshot::default()));
        let (state_tx, _) = watch::channel(LoopState::Idle);

        Self {
            history: HistoryBuffer::new(config.history_capacity),
            analyzer: Analyzer::new(&config),
            config,
            source,
            clock,
            snapshot_tx,
            state_tx,
            refresh: Arc::new(Notify::new()),
            last_price: None,
        }
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot_tx.borrow().clone()
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// Fill the history from the first provider that offers a series.
    ///
    /// Publishes nothing and leaves `update_count` untouched.
    pub async fn seed_history(&mut self) -> usize {
        if !self.history.is_empty() {
            return 0;
        }

        let points = self.source.fetch_series(self.history.capacity()).await;
        let seeded = points.len();
        self.history.extend(points);

        if seeded > 0 {
            info!("History seeded with {} points", seeded);
        } else {
            debug!("No provider offered a series; starting with empty history");
        }
        seeded
    }

    /// Run one fetch/compute/publish cycle and return how long to sleep
    /// before the next one.
    pub async fn run_cycle(&mut self) -> Duration {
        self.set_state(LoopState::Fetching);
        let outcome = self.source.fetch().await;

        let (quote, source) = match (outcome.quote.clone(), outcome.source) {
            (Some(quote), Some(source)) if outcome.success => (quote, source),
            _ => {
                warn!(
                    "All providers failed ({}), keeping last snapshot; last known price {:?}",
                    outcome.failure_summary(),
                    outcome.price
                );
                self.set_state(LoopState::Backoff);
                return self.config.backoff_interval();
            }
        };

        self.set_state(LoopState::Computing);
        let now = self.clock.now();
        self.history.push(PricePoint::from_quote(&quote, source, now));

        let points = self.history.snapshot();
        let analysis = self.analyzer.analyze(&points, self.last_price);
        let update_count = self.snapshot_tx.borrow().update_count + 1;

        let snapshot = Snapshot {
            current_price: quote.price,
            price_change: self.last_price.map(|prev| quote.price - prev).unwrap_or(0.0),
            price_change_percent: percent_change(quote.price, self.last_price),
            change_24h: quote.change_24h,
            signal: analysis.signal,
            indicators: analysis.indicators,
            scores: analysis.scores,
            forecast: analysis.forecast,
            source: Some(source),
            last_update: Some(now),
            next_update: chrono::Duration::from_std(self.config.refresh_interval)
                .ok()
                .map(|d| now + d),
            update_count,
            history_size: points.len(),
        };

        info!(
            "#{} {} ${:.2} ({:+.2}%) from {}: {} {:.0}% [{}]",
            update_count,
            self.config.symbol.to_uppercase(),
            snapshot.current_price,
            snapshot.price_change_percent,
            source,
            snapshot.signal.direction.label(),
            snapshot.signal.confidence,
            snapshot.scores.total_score
        );

        self.last_price = Some(quote.price);
        self.snapshot_tx.send_replace(Arc::new(snapshot));
        self.set_state(LoopState::Published);

        self.config.refresh_interval
    }

    /// Start the loop on the tokio runtime.
    pub fn spawn(self) -> RefreshHandle {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let snapshot_rx = self.snapshot_tx.subscribe();
        let state_rx = self.state_tx.subscribe();
        let refresh = self.refresh.clone();

        let task = tokio::spawn(self.run(shutdown_rx));

        RefreshHandle {
            snapshot_rx,
            state_rx,
            refresh,
            shutdown_tx,
            task: Some(task),
        }
    }

    async fn run(mut self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!(
            "Refresh loop started for {} every {:?} ({} providers)",
            self.config.symbol,
            self.config.refresh_interval,
            self.source.provider_count()
        );

        if self.config.seed_history {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    self.set_state(LoopState::Stopped);
                    return;
                }
                _ = self.seed_history() => {}
            }
        }

        loop {
            let pause = tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                pause = self.run_cycle() => pause,
            };

            let refresh = self.refresh.clone();
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                _ = refresh.notified() => debug!("Manual refresh requested"),
                _ = tokio::time::sleep(pause) => {}
            }
        }

        self.set_state(LoopState::Stopped);
        info!("Refresh loop stopped");
    }

    fn set_state(&self, state: LoopState) {
        self.state_tx.send_replace(state);
    }
}

/// Control handle for a spawned [`RefreshLoop`].
///
/// Dropping the handle without calling [`RefreshHandle::shutdown`] also stops
/// the loop at its next suspension point.
pub struct RefreshHandle {
    snapshot_rx: watch::Receiver<Arc<Snapshot>>,
    state_rx: watch::Receiver<LoopState>,
    refresh: Arc<Notify>,
    shutdown_tx: broadcast::Sender<()>,
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    /// The last published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot_rx.borrow().clone()
    }

    /// A receiver that is notified on every publish.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot_rx.clone()
    }

    pub fn state(&self) -> LoopState {
        *self.state_rx.borrow()
    }

    /// Cut the current sleep short and run a cycle immediately. A request
    /// made while a cycle is running takes effect once it finishes.
    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }

    /// Stop the loop and wait for the task to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(());

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Refresh loop task failed: {}", e);
            }
        }
    }
}
