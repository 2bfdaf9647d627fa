//! Multi-factor signal scoring.
//!
//! Each factor is a pure function of the [`IndicatorSet`] that votes -1, 0 or
//! +1 (the trend factor votes -3..+3). The votes are summed and the total is
//! mapped onto a direction, confidence and strength.

use crate::config::ScoringConfig;
use crate::types::{Direction, IndicatorSet, ScoreBreakdown, Signal, Strength};

/// Samples required before any indicator-based scoring happens.
pub const MIN_SIGNAL_SAMPLES: usize = 20;

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const BOLLINGER_LOWER_ZONE: f64 = 0.2;
pub const BOLLINGER_UPPER_ZONE: f64 = 0.8;
pub const STOCHASTIC_OVERSOLD: f64 = 20.0;
pub const STOCHASTIC_OVERBOUGHT: f64 = 80.0;

/// Totals at or beyond this magnitude are strong calls.
pub const STRONG_SCORE: i32 = 3;
pub const STRONG_BASE_CONFIDENCE: f64 = 60.0;
pub const STRONG_MAX_CONFIDENCE: f64 = 95.0;
pub const MODERATE_BASE_CONFIDENCE: f64 = 55.0;
pub const MODERATE_MAX_CONFIDENCE: f64 = 85.0;
/// Confidence added per point of total score.
pub const CONFIDENCE_PER_POINT: f64 = 5.0;
pub const STABLE_CONFIDENCE: f64 = 75.0;

/// Uptrend votes minus the mirrored downtrend votes.
pub fn trend_factor(price: f64, ind: &IndicatorSet) -> i32 {
    let vote = |a: f64, b: f64| -> i32 {
        if a > b {
            1
        } else if a < b {
            -1
        } else {
            0
        }
    };

    vote(ind.sma_short, ind.sma_long) + vote(ind.ema_short, ind.ema_long) + vote(price, ind.sma_short)
}

/// Oversold is a bullish tilt, overbought a bearish one.
pub fn rsi_factor(ind: &IndicatorSet) -> i32 {
    if ind.rsi < RSI_OVERSOLD {
        1
    } else if ind.rsi > RSI_OVERBOUGHT {
        -1
    } else {
        0
    }
}

/// MACD above its signal line is bullish. With no signal line yet the line
/// is zero and this is the plain `macd > 0` test.
pub fn macd_factor(ind: &IndicatorSet) -> i32 {
    if ind.macd > ind.macd_signal {
        1
    } else {
        -1
    }
}

pub fn bollinger_factor(ind: &IndicatorSet) -> i32 {
    if ind.bollinger_position < BOLLINGER_LOWER_ZONE {
        1
    } else if ind.bollinger_position > BOLLINGER_UPPER_ZONE {
        -1
    } else {
        0
    }
}

pub fn stochastic_factor(ind: &IndicatorSet) -> i32 {
    if ind.stochastic_k < STOCHASTIC_OVERSOLD {
        1
    } else if ind.stochastic_k > STOCHASTIC_OVERBOUGHT {
        -1
    } else {
        0
    }
}

/// Map a total score onto a signal.
///
/// A total of -1 or -2 is only called FALLING when the raw price change
/// agrees (not positive); otherwise it stays STABLE.
pub fn classify(total_score: i32, price_change_percent: f64) -> Signal {
    let magnitude = total_score.unsigned_abs() as f64;

    let strong = || (STRONG_BASE_CONFIDENCE + magnitude * CONFIDENCE_PER_POINT).min(STRONG_MAX_CONFIDENCE);
    let moderate =
        || (MODERATE_BASE_CONFIDENCE + magnitude * CONFIDENCE_PER_POINT).min(MODERATE_MAX_CONFIDENCE);
    let stable = Signal {
        direction: Direction::Stable,
        confidence: STABLE_CONFIDENCE,
        strength: Strength::Neutral,
    };

    match total_score {
        t if t >= STRONG_SCORE => Signal {
            direction: Direction::Rising,
            confidence: strong(),
            strength: Strength::Strong,
        },
        t if t > 0 => Signal {
            direction: Direction::Rising,
            confidence: moderate(),
            strength: Strength::Moderate,
        },
        0 => stable,
        t if t > -STRONG_SCORE => {
            if price_change_percent <= 0.0 {
                Signal {
                    direction: Direction::Falling,
                    confidence: moderate(),
                    strength: Strength::Moderate,
                }
            } else {
                stable
            }
        }
        _ => Signal {
            direction: Direction::Falling,
            confidence: strong(),
            strength: Strength::Strong,
        },
    }
}

/// Percent change from `previous` to `current`; zero without a usable previous.
pub fn percent_change(current: f64, previous: Option<f64>) -> f64 {
    match previous {
        Some(prev) if prev > 0.0 => (current - prev) / prev * 100.0,
        _ => 0.0,
    }
}

/// Weighted multi-factor vote over an [`IndicatorSet`].
#[derive(Debug, Clone, Default)]
pub struct SignalScorer {
    stochastic_enabled: bool,
}

impl SignalScorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            stochastic_enabled: config.stochastic_enabled,
        }
    }

    /// Score the latest sample.
    ///
    /// `sample_count` is the history length; below [`MIN_SIGNAL_SAMPLES`] the
    /// result is INSUFFICIENT_DATA with all-zero votes and no factor is
    /// evaluated.
    pub fn score(
        &self,
        sample_count: usize,
        current_price: f64,
        previous_price: Option<f64>,
        indicators: &IndicatorSet,
    ) -> (Signal, ScoreBreakdown) {
        if sample_count < MIN_SIGNAL_SAMPLES {
            return (Signal::insufficient_data(), ScoreBreakdown::default());
        }

        let stochastic = if self.stochastic_enabled {
            stochastic_factor(indicators)
        } else {
            0
        };

        let scores = ScoreBreakdown::new(
            trend_factor(current_price, indicators),
            rsi_factor(indicators),
            macd_factor(indicators),
            bollinger_factor(indicators),
            stochastic,
        );

        let change = percent_change(current_price, previous_price);
        (classify(scores.total_score, change), scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral_set(price: f64) -> IndicatorSet {
        IndicatorSet {
            sma_short: price,
            sma_long: price,
            ema_short: price,
            ema_long: price,
            rsi: 50.0,
            macd: 0.0,
            macd_signal: 0.0,
            bollinger_position: 0.5,
            stochastic_k: 50.0,
            ..IndicatorSet::default()
        }
    }

    #[test]
    fn test_trend_factor_full_uptrend() {
        let ind = IndicatorSet {
            sma_short: 105.0,
            sma_long: 100.0,
            ema_short: 106.0,
            ema_long: 101.0,
            ..neutral_set(100.0)
        };
        assert_eq!(trend_factor(110.0, &ind), 3);
    }

    #[test]
    fn test_trend_factor_full_downtrend() {
        let ind = IndicatorSet {
            sma_short: 95.0,
            sma_long: 100.0,
            ema_short: 94.0,
            ema_long: 99.0,
            ..neutral_set(100.0)
        };
        assert_eq!(trend_factor(90.0, &ind), -3);
    }

    #[test]
    fn test_trend_factor_flat() {
        assert_eq!(trend_factor(100.0, &neutral_set(100.0)), 0);
    }

    #[test]
    fn test_rsi_factor_thresholds() {
        let base = neutral_set(1.0);
        assert_eq!(rsi_factor(&IndicatorSet { rsi: 29.9, ..base }), 1);
        assert_eq!(rsi_factor(&IndicatorSet { rsi: 30.0, ..base }), 0);
        assert_eq!(rsi_factor(&IndicatorSet { rsi: 70.0, ..base }), 0);
        assert_eq!(rsi_factor(&IndicatorSet { rsi: 70.1, ..base }), -1);
    }

    #[test]
    fn test_macd_factor() {
        let base = neutral_set(1.0);
        assert_eq!(macd_factor(&IndicatorSet { macd: 1.0, macd_signal: 0.5, ..base }), 1);
        assert_eq!(macd_factor(&IndicatorSet { macd: 0.4, macd_signal: 0.5, ..base }), -1);
        // no signal line yet: plain sign test
        assert_eq!(macd_factor(&IndicatorSet { macd: 2.0, ..base }), 1);
        assert_eq!(macd_factor(&IndicatorSet { macd: 0.0, ..base }), -1);
    }

    #[test]
    fn test_bollinger_factor_zones() {
        let base = neutral_set(1.0);
        assert_eq!(bollinger_factor(&IndicatorSet { bollinger_position: 0.1, ..base }), 1);
        assert_eq!(bollinger_factor(&IndicatorSet { bollinger_position: 0.5, ..base }), 0);
        assert_eq!(bollinger_factor(&IndicatorSet { bollinger_position: 0.9, ..base }), -1);
    }

    #[test]
    fn test_stochastic_factor_zones() {
        let base = neutral_set(1.0);
        assert_eq!(stochastic_factor(&IndicatorSet { stochastic_k: 10.0, ..base }), 1);
        assert_eq!(stochastic_factor(&IndicatorSet { stochastic_k: 50.0, ..base }), 0);
        assert_eq!(stochastic_factor(&IndicatorSet { stochastic_k: 95.0, ..base }), -1);
    }

    #[test]
    fn test_classify_table() {
        let s = classify(5, 0.0);
        assert_eq!((s.direction, s.strength), (Direction::Rising, Strength::Strong));
        assert_eq!(s.confidence, 85.0);

        let s = classify(3, 0.0);
        assert_eq!(s.confidence, 75.0);

        let s = classify(2, 0.0);
        assert_eq!((s.direction, s.strength), (Direction::Rising, Strength::Moderate));
        assert_eq!(s.confidence, 65.0);

        let s = classify(0, 1.0);
        assert_eq!((s.direction, s.strength), (Direction::Stable, Strength::Neutral));
        assert_eq!(s.confidence, 75.0);

        let s = classify(-2, -0.5);
        assert_eq!((s.direction, s.strength), (Direction::Falling, Strength::Moderate));
        assert_eq!(s.confidence, 65.0);

        let s = classify(-4, 0.3);
        assert_eq!((s.direction, s.strength), (Direction::Falling, Strength::Strong));
        assert_eq!(s.confidence, 80.0);
    }

    #[test]
    fn test_classify_mild_negative_with_rising_price_is_stable() {
        let s = classify(-1, 0.2);
        assert_eq!(s.direction, Direction::Stable);
        assert_eq!(s.confidence, 75.0);
    }

    #[test]
    fn test_classify_confidence_caps() {
        assert_eq!(classify(9, 0.0).confidence, 95.0);
        assert_eq!(classify(-9, 0.0).confidence, 95.0);
    }

    #[test]
    fn test_classify_confidence_monotonic_rising() {
        let mut last = 0.0;
        for total in 1..=6 {
            let confidence = classify(total, 0.0).confidence;
            assert!(confidence >= last, "confidence dropped at {}", total);
            last = confidence;
        }
    }

    #[test]
    fn test_score_short_circuits_below_min_samples() {
        let scorer = SignalScorer::default();
        let ind = IndicatorSet {
            sma_short: 200.0,
            ema_short: 200.0,
            rsi: 10.0,
            macd: 5.0,
            ..neutral_set(100.0)
        };
        let (signal, scores) = scorer.score(19, 250.0, Some(100.0), &ind);
        assert_eq!(signal, Signal::insufficient_data());
        assert_eq!(scores, ScoreBreakdown::default());
    }

    #[test]
    fn test_score_stochastic_toggle() {
        let ind = IndicatorSet {
            stochastic_k: 95.0,
            ..neutral_set(100.0)
        };
        let (_, off) = SignalScorer::default().score(30, 100.0, Some(100.0), &ind);
        assert_eq!(off.stochastic_score, 0);

        let scorer = SignalScorer::new(&ScoringConfig {
            stochastic_enabled: true,
        });
        let (_, on) = scorer.score(30, 100.0, Some(100.0), &ind);
        assert_eq!(on.stochastic_score, -1);
        assert_eq!(on.total_score, off.total_score - 1);
    }

    #[test]
    fn test_percent_change() {
        assert!((percent_change(110.0, Some(100.0)) - 10.0).abs() < 1e-12);
        assert_eq!(percent_change(110.0, None), 0.0);
        assert_eq!(percent_change(110.0, Some(0.0)), 0.0);
    }
}
