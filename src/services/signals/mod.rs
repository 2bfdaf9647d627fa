//! Trading signal service module.
//!
//! Provides technical indicator calculations, the multi-factor scorer and a
//! short-horizon forecast, combined by [`Analyzer`] into one pass over a
//! history snapshot.

pub mod forecast;
pub mod indicators;
pub mod scorer;

pub use forecast::Forecaster;
pub use indicators::IndicatorEngine;
pub use scorer::{SignalScorer, MIN_SIGNAL_SAMPLES};

use crate::config::Config;
use crate::types::{Forecast, IndicatorSet, PricePoint, ScoreBreakdown, Signal};

/// Everything derived from one history snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub indicators: IndicatorSet,
    pub signal: Signal,
    pub scores: ScoreBreakdown,
    pub forecast: Option<Forecast>,
}

/// Runs the indicator engine, scorer and forecaster over a history snapshot.
///
/// Holds only configuration, so analysing the same snapshot twice gives the
/// same result.
pub struct Analyzer {
    engine: IndicatorEngine,
    scorer: SignalScorer,
    forecaster: Forecaster,
}

impl Analyzer {
    pub fn new(config: &Config) -> Self {
        Self {
            engine: IndicatorEngine::new(&config.indicators),
            scorer: SignalScorer::new(&config.scoring),
            forecaster: Forecaster::new(config.forecast_horizon, config.refresh_interval),
        }
    }

    /// Analyse `points` (oldest first). `previous_price` is the price of the
    /// last published snapshot, if any.
    pub fn analyze(&self, points: &[PricePoint], previous_price: Option<f64>) -> Analysis {
        let indicators = self.engine.compute(points);
        let current_price = points.last().map(PricePoint::close).unwrap_or_default();

        let (signal, scores) = self
            .scorer
            .score(points.len(), current_price, previous_price, &indicators);

        let closes: Vec<f64> = points.iter().map(PricePoint::close).collect();
        let forecast = self.forecaster.forecast(&closes);

        Analysis {
            indicators,
            signal,
            scores,
            forecast,
        }
    }
}
