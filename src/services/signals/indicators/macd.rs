//! MACD (Moving Average Convergence Divergence) indicator.

use super::Ema;

/// MACD line, signal line and histogram at the latest sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MacdValue {
    pub macd: f64,
    /// Zero until enough history exists for a smoothed signal line.
    pub signal: f64,
    pub histogram: f64,
}

/// MACD indicator.
///
/// Shows the relationship between two EMAs:
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = EMA(9) of MACD Line
/// - Histogram = MACD Line - Signal Line
///
/// The MACD line follows the EMA cold-start approximation, so it is defined
/// from the first sample. The signal line needs `slow + signal - 1` samples;
/// before that it is reported as 0, which makes `macd > signal` reduce to
/// `macd > 0`.
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }

    /// Samples needed before the signal line is computed.
    pub fn min_periods_for_signal(&self) -> usize {
        self.slow_period + self.signal_period - 1
    }

    pub fn calculate(&self, closes: &[f64]) -> MacdValue {
        let fast = Ema::new(self.fast_period);
        let slow = Ema::new(self.slow_period);

        let (Some(fast_value), Some(slow_value)) = (fast.value(closes), slow.value(closes)) else {
            return MacdValue::default();
        };
        let macd = fast_value - slow_value;

        let signal = self.signal_line(closes).unwrap_or(0.0);

        MacdValue {
            macd,
            signal,
            histogram: macd - signal,
        }
    }

    fn signal_line(&self, closes: &[f64]) -> Option<f64> {
        if closes.len() < self.min_periods_for_signal() || self.fast_period > self.slow_period {
            return None;
        }

        let fast_ema = Ema::new(self.fast_period).series(closes);
        let slow_ema = Ema::new(self.slow_period).series(closes);

        // Align the EMAs (fast starts earlier)
        let offset = self.slow_period - self.fast_period;
        let macd_line: Vec<f64> = fast_ema
            .iter()
            .skip(offset)
            .zip(slow_ema.iter())
            .map(|(f, s)| f - s)
            .collect();

        Ema::new(self.signal_period).series(&macd_line).last().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising(count: usize) -> Vec<f64> {
        (0..count).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn test_macd_min_periods_for_signal() {
        assert_eq!(Macd::default().min_periods_for_signal(), 34);
    }

    #[test]
    fn test_macd_empty_is_zero() {
        assert_eq!(Macd::default().calculate(&[]), MacdValue::default());
    }

    #[test]
    fn test_macd_positive_in_uptrend() {
        let value = Macd::default().calculate(&rising(21));
        assert!(value.macd > 0.0, "MACD in uptrend should be > 0, got {}", value.macd);
    }

    #[test]
    fn test_macd_signal_zero_before_enough_history() {
        let value = Macd::default().calculate(&rising(33));
        assert_eq!(value.signal, 0.0);
        assert_eq!(value.histogram, value.macd);
    }

    #[test]
    fn test_macd_signal_present_with_enough_history() {
        let value = Macd::default().calculate(&rising(60));
        assert!(value.signal > 0.0);
        assert!((value.histogram - (value.macd - value.signal)).abs() < 1e-12);
    }

    #[test]
    fn test_macd_flat_series() {
        let value = Macd::default().calculate(&vec![250.0; 50]);
        assert!(value.macd.abs() < 1e-9);
        assert!(value.signal.abs() < 1e-9);
    }
}
