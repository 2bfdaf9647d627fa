use super::{Forecast, IndicatorSet, ProviderKind, ScoreBreakdown, Signal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last published analysis result.
///
/// Replaced wholesale on every successful refresh cycle. The default value is
/// the "no data yet" record published at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub current_price: f64,
    pub price_change: f64,
    pub price_change_percent: f64,
    /// 24h change in percent from the provider, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_24h: Option<f64>,
    pub signal: Signal,
    pub indicators: IndicatorSet,
    pub scores: ScoreBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Forecast>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ProviderKind>,
    pub last_update: Option<DateTime<Utc>>,
    pub next_update: Option<DateTime<Utc>>,
    pub update_count: u64,
    pub history_size: usize,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            current_price: 0.0,
            price_change: 0.0,
            price_change_percent: 0.0,
            change_24h: None,
            signal: Signal::insufficient_data(),
            indicators: IndicatorSet::neutral(),
            scores: ScoreBreakdown::default(),
            forecast: None,
            source: None,
            last_update: None,
            next_update: None,
            update_count: 0,
            history_size: 0,
        }
    }
}

impl Snapshot {
    /// Whether at least one cycle has been published.
    pub fn has_data(&self) -> bool {
        self.update_count > 0
    }

    /// Seconds since the last publish, relative to `now`.
    pub fn age_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_update.map(|t| (now - t).num_seconds())
    }
}
