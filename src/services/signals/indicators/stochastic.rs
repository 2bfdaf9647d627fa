//! Stochastic Oscillator indicator.

use crate::types::PricePoint;

/// %K reported when the range is flat or the window is not yet full.
pub const NEUTRAL_K: f64 = 50.0;

/// Stochastic Oscillator.
///
/// Compares closing price to price range over a period:
/// %K = (Current Close - Lowest Low) / (Highest High - Lowest Low) * 100
///
/// Points without candle data contribute their observed price as high,
/// low and close.
///
/// Signals:
/// - Below 20: Oversold (bullish)
/// - Above 80: Overbought (bearish)
pub struct Stochastic {
    k_period: usize,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self { k_period: 14 }
    }
}

impl Stochastic {
    pub fn new(k_period: usize) -> Self {
        Self { k_period }
    }

    pub fn value(&self, points: &[PricePoint]) -> f64 {
        if self.k_period == 0 || points.len() < self.k_period {
            return NEUTRAL_K;
        }

        let window = &points[points.len() - self.k_period..];

        let lowest_low = window.iter().map(|p| p.low()).fold(f64::INFINITY, f64::min);
        let highest_high = window
            .iter()
            .map(|p| p.high())
            .fold(f64::NEG_INFINITY, f64::max);

        let current_close = match window.last() {
            Some(p) => p.close(),
            None => return NEUTRAL_K,
        };

        if highest_high > lowest_low {
            (((current_close - lowest_low) / (highest_high - lowest_low)) * 100.0).clamp(0.0, 100.0)
        } else {
            NEUTRAL_K
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn create_uptrend_candles(count: usize) -> Vec<PricePoint> {
        let start = Utc.timestamp_opt(1_000_000, 0).unwrap();
        (0..count)
            .map(|i| {
                let base = 100.0 + i as f64 * 1.5;
                PricePoint::candle(
                    start + Duration::minutes(i as i64),
                    base,
                    base + 2.0,
                    base - 1.0,
                    base + 1.0,
                    Some(1000.0),
                )
            })
            .collect()
    }

    fn closes_only(prices: &[f64]) -> Vec<PricePoint> {
        let start = Utc.timestamp_opt(1_000_000, 0).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| PricePoint::new(*p, start + Duration::seconds(30 * i as i64)))
            .collect()
    }

    #[test]
    fn test_stochastic_insufficient_data() {
        let stoch = Stochastic::default();
        assert_eq!(stoch.value(&create_uptrend_candles(10)), 50.0);
    }

    #[test]
    fn test_stochastic_uptrend_high_k() {
        let k = Stochastic::default().value(&create_uptrend_candles(30));
        assert!(k > 50.0, "Stochastic %K in uptrend should be > 50, got {}", k);
        assert!(k <= 100.0);
    }

    #[test]
    fn test_stochastic_close_only_top_of_range() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_eq!(Stochastic::default().value(&closes_only(&prices)), 100.0);
    }

    #[test]
    fn test_stochastic_close_only_bottom_of_range() {
        let prices: Vec<f64> = (0..20).map(|i| 200.0 - i as f64).collect();
        assert_eq!(Stochastic::default().value(&closes_only(&prices)), 0.0);
    }

    #[test]
    fn test_stochastic_flat_range_neutral() {
        assert_eq!(Stochastic::default().value(&closes_only(&[10.0; 20])), 50.0);
    }
}
