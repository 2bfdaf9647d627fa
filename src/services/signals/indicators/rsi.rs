//! Relative Strength Index (RSI) indicator.

/// RSI value reported while fewer than two samples exist.
pub const NEUTRAL_RSI: f64 = 50.0;

/// RSI (Relative Strength Index) indicator.
///
/// Measures momentum by comparing the mean gain to the mean loss over the
/// last `period` price deltas. Values range from 0-100:
/// - Below 30: Oversold (potential buy signal)
/// - Above 70: Overbought (potential sell signal)
///
/// Edge cases:
/// - fewer than two samples: 50 (neutral)
/// - fewer than `period` deltas: averages the deltas that exist
/// - zero mean loss (including a flat series): saturates to 100
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn value(&self, closes: &[f64]) -> f64 {
        if closes.len() < 2 || self.period == 0 {
            return NEUTRAL_RSI;
        }

        let deltas = (closes.len() - 1).min(self.period);
        let recent = &closes[closes.len() - deltas - 1..];

        let mut gains = 0.0;
        let mut losses = 0.0;
        for pair in recent.windows(2) {
            let change = pair[1] - pair[0];
            if change > 0.0 {
                gains += change;
            } else {
                losses -= change;
            }
        }

        let avg_gain = gains / deltas as f64;
        let avg_loss = losses / deltas as f64;

        if avg_loss == 0.0 {
            return 100.0;
        }

        let rs = avg_gain / avg_loss;
        (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
    }
}
