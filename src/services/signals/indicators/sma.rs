//! Simple Moving Average (SMA) indicator.

/// SMA (Simple Moving Average) indicator.
///
/// Calculates the average price over the last `period` samples. With fewer
/// samples than the period it averages everything available instead of
/// failing, so a cold history still yields a usable value.
#[derive(Debug, Clone, Copy)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Mean of the last `period` closes (or all of them if fewer).
    /// Returns None only for an empty series.
    pub fn value(&self, closes: &[f64]) -> Option<f64> {
        if closes.is_empty() || self.period == 0 {
            return None;
        }

        let window = closes.len().min(self.period);
        let sum: f64 = closes.iter().rev().take(window).sum();
        Some(sum / window as f64)
    }
}
