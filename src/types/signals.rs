use serde::{Deserialize, Serialize};

/// Directional call for the tracked price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Rising,
    Falling,
    Stable,
    InsufficientData,
}

impl Direction {
    /// Get display label for this direction.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Rising => "Rising",
            Direction::Falling => "Falling",
            Direction::Stable => "Stable",
            Direction::InsufficientData => "Insufficient data",
        }
    }
}

/// Qualitative strength of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
    Neutral,
    Unknown,
}

impl Strength {
    pub fn label(&self) -> &'static str {
        match self {
            Strength::Weak => "Weak",
            Strength::Moderate => "Moderate",
            Strength::Strong => "Strong",
            Strength::Neutral => "Neutral",
            Strength::Unknown => "Unknown",
        }
    }
}

/// Scored call derived from a [`ScoreBreakdown`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub direction: Direction,
    /// Confidence percentage (0-100).
    pub confidence: f64,
    pub strength: Strength,
}

impl Signal {
    /// Signal reported until enough samples exist.
    pub fn insufficient_data() -> Self {
        Self {
            direction: Direction::InsufficientData,
            confidence: 50.0,
            strength: Strength::Unknown,
        }
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::insufficient_data()
    }
}

/// Per-factor votes of the scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Uptrend votes minus downtrend votes (-3 to +3).
    pub trend_score: i32,
    pub rsi_score: i32,
    pub macd_score: i32,
    pub bollinger_score: i32,
    /// Zero when the stochastic factor is disabled.
    pub stochastic_score: i32,
    pub total_score: i32,
}

impl ScoreBreakdown {
    /// Build a breakdown whose total is the sum of the factor votes.
    pub fn new(trend: i32, rsi: i32, macd: i32, bollinger: i32, stochastic: i32) -> Self {
        Self {
            trend_score: trend,
            rsi_score: rsi,
            macd_score: macd,
            bollinger_score: bollinger,
            stochastic_score: stochastic,
            total_score: trend + rsi + macd + bollinger + stochastic,
        }
    }
}

/// Indicator values computed from one history snapshot.
///
/// Every field is always finite; cold-start paths substitute documented
/// fallbacks instead of leaving a value undefined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub sma_short: f64,
    pub sma_long: f64,
    pub ema_short: f64,
    pub ema_long: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub bollinger_upper: f64,
    pub bollinger_middle: f64,
    pub bollinger_lower: f64,
    /// %B clamped to [0, 1].
    pub bollinger_position: f64,
    /// Stochastic %K (0-100).
    pub stochastic_k: f64,
    /// Mean fractional change over the last few deltas.
    pub momentum: f64,
    /// Standard deviation of recent fractional changes.
    pub volatility: f64,
}

impl IndicatorSet {
    /// Mid-range oscillators with every other indicator zeroed; reported
    /// before any price has been observed.
    pub fn neutral() -> Self {
        Self {
            rsi: 50.0,
            bollinger_position: 0.5,
            stochastic_k: 50.0,
            ..Self::default()
        }
    }

    /// All indicators as (name, value) pairs.
    pub fn entries(&self) -> [(&'static str, f64); 15] {
        [
            ("sma_short", self.sma_short),
            ("sma_long", self.sma_long),
            ("ema_short", self.ema_short),
            ("ema_long", self.ema_long),
            ("rsi", self.rsi),
            ("macd", self.macd),
            ("macd_signal", self.macd_signal),
            ("macd_histogram", self.macd_histogram),
            ("bollinger_upper", self.bollinger_upper),
            ("bollinger_middle", self.bollinger_middle),
            ("bollinger_lower", self.bollinger_lower),
            ("bollinger_position", self.bollinger_position),
            ("stochastic_k", self.stochastic_k),
            ("momentum", self.momentum),
            ("volatility", self.volatility),
        ]
    }

    /// Look up an indicator by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    pub fn all_finite(&self) -> bool {
        self.entries().iter().all(|(_, v)| v.is_finite())
    }
}

/// Projected price over a fixed horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub predicted_price: f64,
    pub predicted_change_percent: f64,
    /// Confidence percentage (0-100), lower in volatile markets.
    pub confidence: f64,
    pub horizon_minutes: u64,
}
