//! Bollinger Bands indicator.

/// %B reported when the band has no width or the window is not yet full.
pub const NEUTRAL_POSITION: f64 = 0.5;

/// Band levels and the price's relative position between them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// %B clamped to [0, 1].
    pub position: f64,
}

/// Bollinger Bands indicator.
///
/// Consists of:
/// - Middle band: SMA(20)
/// - Upper band: SMA + 2 * StdDev
/// - Lower band: SMA - 2 * StdDev
///
/// Signals:
/// - Price near lower band = oversold (bullish)
/// - Price near upper band = overbought (bearish)
///
/// With fewer samples than the period the bands are drawn over what exists
/// and the position stays at the neutral midpoint.
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Self {
        Self {
            period,
            std_dev_multiplier,
        }
    }

    /// Population standard deviation.
    pub fn std_dev(values: &[f64], mean: f64) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let variance: f64 =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }

    pub fn calculate(&self, closes: &[f64]) -> Bands {
        let Some(&current_price) = closes.last() else {
            return Bands {
                position: NEUTRAL_POSITION,
                ..Bands::default()
            };
        };

        let window = closes.len().min(self.period.max(1));
        let recent = &closes[closes.len() - window..];

        let middle = recent.iter().sum::<f64>() / window as f64;
        let std_dev = Self::std_dev(recent, middle);

        let upper = middle + self.std_dev_multiplier * std_dev;
        let lower = middle - self.std_dev_multiplier * std_dev;
        let band_width = upper - lower;

        // %B = (Price - Lower) / (Upper - Lower)
        let position = if closes.len() < self.period || band_width <= 0.0 {
            NEUTRAL_POSITION
        } else {
            ((current_price - lower) / band_width).clamp(0.0, 1.0)
        };

        Bands {
            upper,
            middle,
            lower,
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((BollingerBands::std_dev(&values, 5.0) - 2.0).abs() < 1e-12);
        assert_eq!(BollingerBands::std_dev(&[], 0.0), 0.0);
    }

    #[test]
    fn test_bollinger_flat_series_neutral() {
        let bands = BollingerBands::default().calculate(&vec![100.0; 25]);
        assert_eq!(bands.position, 0.5);
        assert_eq!(bands.upper, 100.0);
        assert_eq!(bands.lower, 100.0);
    }

    #[test]
    fn test_bollinger_insufficient_data_neutral() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let bands = BollingerBands::default().calculate(&closes);
        assert_eq!(bands.position, 0.5);
        assert!(bands.upper > bands.lower);
    }

    #[test]
    fn test_bollinger_rising_series_near_top() {
        let closes: Vec<f64> = (100..=120).map(f64::from).collect();
        let bands = BollingerBands::default().calculate(&closes);
        assert!((bands.middle - 110.5).abs() < 1e-9);
        assert!(bands.position > 0.8, "got {}", bands.position);
        assert!(bands.position <= 1.0);
    }

    #[test]
    fn test_bollinger_position_clamped() {
        let mut closes = vec![100.0; 19];
        closes.push(1_000.0);
        let bands = BollingerBands::default().calculate(&closes);
        assert!((0.0..=1.0).contains(&bands.position));

        let mut closes = vec![100.0; 19];
        closes.push(1.0);
        let bands = BollingerBands::default().calculate(&closes);
        assert!((0.0..=1.0).contains(&bands.position));
    }

    #[test]
    fn test_bollinger_empty() {
        let bands = BollingerBands::default().calculate(&[]);
        assert_eq!(bands.position, 0.5);
    }
}
