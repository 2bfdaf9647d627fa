//! Short-horizon price projection from the recent linear trend.

use super::indicators::volatility::{pct_changes, MOMENTUM_WINDOW};
use crate::types::Forecast;
use std::time::Duration;

/// Prices used for the projection; fewer means no forecast.
pub const FORECAST_WINDOW: usize = 10;
pub const BASE_CONFIDENCE: f64 = 70.0;
/// Confidence lost per unit of fractional-change volatility.
pub const VOLATILITY_PENALTY: f64 = 1000.0;
/// Weight of recent momentum in the projected change.
pub const MOMENTUM_WEIGHT: f64 = 2.0;
/// Amplification of the projected change per unit of volatility.
pub const VOLATILITY_AMPLIFIER: f64 = 10.0;

/// Least-squares slope of `values` against their index.
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return 0.0;
    }

    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;

    let (num, den) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, y)| {
            let dx = i as f64 - mean_x;
            (num + dx * (y - mean_y), den + dx * dx)
        });

    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Projects the latest close `horizon` ahead, assuming one sample per
/// `sample_interval`.
pub struct Forecaster {
    horizon: Duration,
    sample_interval: Duration,
}

impl Forecaster {
    pub fn new(horizon: Duration, sample_interval: Duration) -> Self {
        Self {
            horizon,
            sample_interval,
        }
    }

    /// Samples between now and the horizon.
    fn steps(&self) -> f64 {
        if self.sample_interval.is_zero() {
            return 0.0;
        }
        self.horizon.as_secs_f64() / self.sample_interval.as_secs_f64()
    }

    /// None until a full window is available, or when the projection is
    /// not a finite positive price.
    pub fn forecast(&self, closes: &[f64]) -> Option<Forecast> {
        if closes.len() < FORECAST_WINDOW {
            return None;
        }

        let recent = &closes[closes.len() - FORECAST_WINDOW..];
        let price = *recent.last()?;
        if price <= 0.0 {
            return None;
        }

        let changes = pct_changes(recent);
        let mean = changes.iter().sum::<f64>() / changes.len().max(1) as f64;
        let volatility = super::indicators::BollingerBands::std_dev(&changes, mean);
        let momentum = changes.iter().rev().take(MOMENTUM_WINDOW).sum::<f64>()
            / MOMENTUM_WINDOW as f64;

        let trend = linear_slope(recent) / price;
        let predicted_change = trend * self.steps() + momentum * MOMENTUM_WEIGHT;
        let predicted_price =
            price * (1.0 + predicted_change * (1.0 + volatility * VOLATILITY_AMPLIFIER));

        if !predicted_price.is_finite() || predicted_price <= 0.0 {
            return None;
        }

        Some(Forecast {
            predicted_price,
            predicted_change_percent: (predicted_price - price) / price * 100.0,
            confidence: (BASE_CONFIDENCE - volatility * VOLATILITY_PENALTY).clamp(0.0, 100.0),
            horizon_minutes: self.horizon.as_secs() / 60,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forecaster() -> Forecaster {
        Forecaster::new(Duration::from_secs(90 * 60), Duration::from_secs(30))
    }

    #[test]
    fn test_linear_slope() {
        assert!((linear_slope(&[1.0, 3.0, 5.0, 7.0]) - 2.0).abs() < 1e-12);
        assert_eq!(linear_slope(&[5.0]), 0.0);
        assert_eq!(linear_slope(&[4.0, 4.0, 4.0]), 0.0);
    }

    #[test]
    fn test_forecast_needs_window() {
        assert!(forecaster().forecast(&[100.0; 9]).is_none());
    }

    #[test]
    fn test_forecast_flat_series() {
        let f = forecaster().forecast(&[100.0; 12]).unwrap();
        assert_eq!(f.predicted_price, 100.0);
        assert_eq!(f.confidence, 70.0);
        assert_eq!(f.horizon_minutes, 90);
    }

    #[test]
    fn test_forecast_follows_trend() {
        let up: Vec<f64> = (0..15).map(|i| 50_000.0 + i as f64 * 5.0).collect();
        let f = forecaster().forecast(&up).unwrap();
        assert!(f.predicted_price > 50_070.0);
        assert!(f.predicted_change_percent > 0.0);

        let down: Vec<f64> = (0..15).map(|i| 50_000.0 - i as f64 * 5.0).collect();
        assert!(forecaster().forecast(&down).unwrap().predicted_change_percent < 0.0);
    }

    #[test]
    fn test_forecast_confidence_drops_with_volatility() {
        let calm: Vec<f64> = (0..12).map(|i| 100.0 + (i % 2) as f64 * 0.01).collect();
        let wild: Vec<f64> = (0..12).map(|i| 100.0 + (i % 2) as f64 * 5.0).collect();
        let calm = forecaster().forecast(&calm).unwrap();
        let wild = forecaster().forecast(&wild).unwrap();
        assert!(wild.confidence < calm.confidence);
        assert!((0.0..=100.0).contains(&wild.confidence));
    }

    #[test]
    fn test_crash_projection_is_dropped() {
        let crash: Vec<f64> = (1..=10).rev().map(|i| i as f64 * 10.0).collect();
        assert!(forecaster().forecast(&crash).is_none());
    }
}
