//! Technical indicator implementations.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod volatility;

pub use bollinger::{Bands, BollingerBands};
pub use ema::Ema;
pub use macd::{Macd, MacdValue};
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::Stochastic;

use crate::config::IndicatorConfig;
use crate::types::{IndicatorSet, PricePoint};

/// Computes the full [`IndicatorSet`] from a history snapshot.
///
/// Stateless: the same input always yields the same output.
pub struct IndicatorEngine {
    sma_short: Sma,
    sma_long: Sma,
    ema_short: Ema,
    ema_long: Ema,
    rsi: Rsi,
    macd: Macd,
    bollinger: BollingerBands,
    stochastic: Stochastic,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new(&IndicatorConfig::default())
    }
}

impl IndicatorEngine {
    pub fn new(config: &IndicatorConfig) -> Self {
        Self {
            sma_short: Sma::new(config.sma_short),
            sma_long: Sma::new(config.sma_long),
            ema_short: Ema::new(config.ema_short),
            ema_long: Ema::new(config.ema_long),
            rsi: Rsi::new(config.rsi_period),
            macd: Macd::new(config.macd_fast, config.macd_slow, config.macd_signal),
            bollinger: BollingerBands::new(config.bollinger_period, config.bollinger_std_dev),
            stochastic: Stochastic::new(config.stochastic_period),
        }
    }

    /// Compute every indicator over the given points (oldest first).
    ///
    /// An empty history yields the all-zero set with neutral RSI, %B and %K.
    pub fn compute(&self, points: &[PricePoint]) -> IndicatorSet {
        let closes: Vec<f64> = points.iter().map(PricePoint::close).collect();
        let Some(&price) = closes.last() else {
            return IndicatorSet::neutral();
        };

        let macd = self.macd.calculate(&closes);
        let bands = self.bollinger.calculate(&closes);

        IndicatorSet {
            sma_short: self.sma_short.value(&closes).unwrap_or(price),
            sma_long: self.sma_long.value(&closes).unwrap_or(price),
            ema_short: self.ema_short.value(&closes).unwrap_or(price),
            ema_long: self.ema_long.value(&closes).unwrap_or(price),
            rsi: self.rsi.value(&closes),
            macd: macd.macd,
            macd_signal: macd.signal,
            macd_histogram: macd.histogram,
            bollinger_upper: bands.upper,
            bollinger_middle: bands.middle,
            bollinger_lower: bands.lower,
            bollinger_position: bands.position,
            stochastic_k: self.stochastic.value(points),
            momentum: volatility::momentum(&closes),
            volatility: volatility::volatility(&closes),
        }
    }
}
