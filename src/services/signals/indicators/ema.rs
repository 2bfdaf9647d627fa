//! Exponential Moving Average (EMA) indicator.

/// EMA (Exponential Moving Average) indicator.
///
/// Like SMA but gives more weight to recent prices. With at least `period`
/// samples the first EMA is the SMA of the first window and the rest follow
/// the usual recursion with `α = 2 / (period + 1)`.
///
/// Cold start (fewer samples than the period) is an approximation: the
/// recursion is seeded with the first sample instead of a full-window SMA.
/// For two samples this is exactly `price * α + previous_price * (1 - α)`;
/// a single sample yields the price itself.
#[derive(Debug, Clone, Copy)]
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Smoothing factor `2 / (period + 1)`.
    pub fn alpha(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }

    /// Latest EMA value. Returns None only for an empty series.
    pub fn value(&self, closes: &[f64]) -> Option<f64> {
        if closes.len() >= self.period {
            return self.series(closes).last().copied();
        }

        let (first, rest) = closes.split_first()?;
        let alpha = self.alpha();
        Some(rest.iter().fold(*first, |ema, price| price * alpha + ema * (1.0 - alpha)))
    }

    /// Full SMA-seeded EMA series, one value per close from index
    /// `period - 1` on. Empty if there are fewer closes than the period.
    pub fn series(&self, closes: &[f64]) -> Vec<f64> {
        if self.period == 0 || closes.len() < self.period {
            return Vec::new();
        }

        let multiplier = self.alpha();
        let mut ema = Vec::with_capacity(closes.len() - self.period + 1);

        // First EMA is SMA
        let sma: f64 = closes.iter().take(self.period).sum::<f64>() / self.period as f64;
        ema.push(sma);

        let mut prev = sma;
        for close in &closes[self.period..] {
            prev = (close - prev) * multiplier + prev;
            ema.push(prev);
        }

        ema
    }
}
