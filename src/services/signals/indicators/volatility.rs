//! Momentum and volatility measures over fractional price changes.

use super::BollingerBands;

/// Deltas averaged for momentum.
pub const MOMENTUM_WINDOW: usize = 3;
/// Prices used for the volatility estimate.
pub const VOLATILITY_WINDOW: usize = 10;

/// Fractional change between consecutive prices (`Δp / p_prev`).
pub fn pct_changes(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Mean fractional change over the last `MOMENTUM_WINDOW` deltas.
/// Zero until that many deltas exist.
pub fn momentum(closes: &[f64]) -> f64 {
    let changes = pct_changes(closes);
    if changes.len() < MOMENTUM_WINDOW {
        return 0.0;
    }
    changes.iter().rev().take(MOMENTUM_WINDOW).sum::<f64>() / MOMENTUM_WINDOW as f64
}

/// Population standard deviation of fractional changes over the last
/// `VOLATILITY_WINDOW` prices. Zero with fewer than two prices.
pub fn volatility(closes: &[f64]) -> f64 {
    let start = closes.len().saturating_sub(VOLATILITY_WINDOW);
    let changes = pct_changes(&closes[start..]);
    if changes.is_empty() {
        return 0.0;
    }
    let mean = changes.iter().sum::<f64>() / changes.len() as f64;
    BollingerBands::std_dev(&changes, mean)
}
