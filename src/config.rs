use crate::error::{AppError, Result};
use crate::types::ProviderKind;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Windows and multipliers used by the indicator engine.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    /// Short simple moving average window.
    pub sma_short: usize,
    /// Long simple moving average window.
    pub sma_long: usize,
    /// Short exponential moving average window.
    pub ema_short: usize,
    /// Long exponential moving average window.
    pub ema_long: usize,
    /// RSI lookback in deltas.
    pub rsi_period: usize,
    /// MACD fast EMA window.
    pub macd_fast: usize,
    /// MACD slow EMA window.
    pub macd_slow: usize,
    /// MACD signal line EMA window.
    pub macd_signal: usize,
    /// Bollinger middle band window.
    pub bollinger_period: usize,
    /// Bollinger band width in standard deviations.
    pub bollinger_std_dev: f64,
    /// Stochastic %K lookback.
    pub stochastic_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_short: 10,
            sma_long: 20,
            ema_short: 12,
            ema_long: 26,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            stochastic_period: 14,
        }
    }
}

/// Factor toggles for the signal scorer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringConfig {
    /// Include the stochastic %K vote in the total score.
    pub stochastic_enabled: bool,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Asset symbol to track (lowercase, e.g. "btc").
    pub symbol: String,
    /// Sleep between successful refresh cycles.
    pub refresh_interval: Duration,
    /// Multiplier applied to the interval after a failed fetch.
    pub backoff_multiplier: u32,
    /// Maximum number of price points kept in memory.
    pub history_capacity: usize,
    /// Providers in priority order.
    pub providers: Vec<ProviderKind>,
    /// Timeout for a single provider attempt.
    pub provider_timeout: Duration,
    /// CoinGecko API key (optional, for pro tier).
    pub coingecko_api_key: Option<String>,
    /// Binance API key (optional, public endpoints work without).
    pub binance_api_key: Option<String>,
    /// Seed the history from a provider series on startup.
    pub seed_history: bool,
    /// How far ahead the forecast projects.
    pub forecast_horizon: Duration,
    /// Indicator windows.
    pub indicators: IndicatorConfig,
    /// Scorer factor toggles.
    pub scoring: ScoringConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbol: "btc".to_string(),
            refresh_interval: Duration::from_secs(30),
            backoff_multiplier: 2,
            history_capacity: 100,
            providers: vec![
                ProviderKind::CoinGecko,
                ProviderKind::Binance,
                ProviderKind::Kraken,
                ProviderKind::CoinCap,
            ],
            provider_timeout: Duration::from_secs(10),
            coingecko_api_key: None,
            binance_api_key: None,
            seed_history: true,
            forecast_horizon: Duration::from_secs(90 * 60),
            indicators: IndicatorConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

/// Longest accepted refresh interval and provider timeout.
pub const MAX_REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
pub const MAX_BACKOFF_MULTIPLIER: u32 = 100;
pub const MAX_FORECAST_HORIZON: Duration = Duration::from_secs(7 * 24 * 60 * 60);

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unset or unparsable numeric values fall back to the defaults; an unknown
    /// provider name is an error.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v == "true" || v == "1")
                .unwrap_or(default)
        };

        let providers = match lookup("PRICE_PROVIDERS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse)
                .collect::<Result<Vec<ProviderKind>>>()?,
            None => defaults.providers.clone(),
        };

        let ind = &defaults.indicators;
        let indicators = IndicatorConfig {
            sma_short: parse_var(&lookup, "SMA_SHORT_PERIOD").unwrap_or(ind.sma_short),
            sma_long: parse_var(&lookup, "SMA_LONG_PERIOD").unwrap_or(ind.sma_long),
            ema_short: parse_var(&lookup, "EMA_SHORT_PERIOD").unwrap_or(ind.ema_short),
            ema_long: parse_var(&lookup, "EMA_LONG_PERIOD").unwrap_or(ind.ema_long),
            rsi_period: parse_var(&lookup, "RSI_PERIOD").unwrap_or(ind.rsi_period),
            macd_fast: parse_var(&lookup, "MACD_FAST_PERIOD").unwrap_or(ind.macd_fast),
            macd_slow: parse_var(&lookup, "MACD_SLOW_PERIOD").unwrap_or(ind.macd_slow),
            macd_signal: parse_var(&lookup, "MACD_SIGNAL_PERIOD").unwrap_or(ind.macd_signal),
            bollinger_period: parse_var(&lookup, "BOLLINGER_PERIOD").unwrap_or(ind.bollinger_period),
            bollinger_std_dev: parse_var(&lookup, "BOLLINGER_STD_DEV").unwrap_or(ind.bollinger_std_dev),
            stochastic_period: parse_var(&lookup, "STOCHASTIC_PERIOD").unwrap_or(ind.stochastic_period),
        };

        let config = Self {
            symbol: lookup("SYMBOL")
                .map(|s| s.trim().to_lowercase())
                .unwrap_or(defaults.symbol),
            refresh_interval: parse_var(&lookup, "REFRESH_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.refresh_interval),
            backoff_multiplier: parse_var(&lookup, "FAILURE_BACKOFF_MULTIPLIER")
                .unwrap_or(defaults.backoff_multiplier),
            history_capacity: parse_var(&lookup, "HISTORY_CAPACITY").unwrap_or(defaults.history_capacity),
            providers,
            provider_timeout: parse_var(&lookup, "PROVIDER_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.provider_timeout),
            coingecko_api_key: lookup("COINGECKO_API_KEY"),
            binance_api_key: lookup("BINANCE_API_KEY"),
            seed_history: flag("SEED_HISTORY", defaults.seed_history),
            forecast_horizon: match parse_var::<u64, _>(&lookup, "FORECAST_HORIZON_MINUTES") {
                Some(minutes) => minutes
                    .checked_mul(60)
                    .map(Duration::from_secs)
                    .ok_or_else(|| AppError::Config(format!("forecast horizon {}m is too large", minutes)))?,
                None => defaults.forecast_horizon,
            },
            indicators,
            scoring: ScoringConfig {
                stochastic_enabled: flag("STOCHASTIC_ENABLED", defaults.scoring.stochastic_enabled),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the refresh loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        let ind = &self.indicators;

        if self.refresh_interval.is_zero() || self.refresh_interval > MAX_REFRESH_INTERVAL {
            return Err(AppError::Config(format!(
                "refresh interval must be between 1s and {:?}",
                MAX_REFRESH_INTERVAL
            )));
        }
        if self.backoff_multiplier > MAX_BACKOFF_MULTIPLIER {
            return Err(AppError::Config(format!(
                "backoff multiplier must be at most {}",
                MAX_BACKOFF_MULTIPLIER
            )));
        }
        if self.provider_timeout > MAX_REFRESH_INTERVAL {
            return Err(AppError::Config(format!(
                "provider timeout must be at most {:?}",
                MAX_REFRESH_INTERVAL
            )));
        }
        if self.forecast_horizon.is_zero() || self.forecast_horizon > MAX_FORECAST_HORIZON {
            return Err(AppError::Config(format!(
                "forecast horizon must be between 1m and {:?}",
                MAX_FORECAST_HORIZON
            )));
        }
        if self.provider_timeout.is_zero() {
            return Err(AppError::Config("provider timeout must be positive".into()));
        }
        if self.backoff_multiplier == 0 {
            return Err(AppError::Config("backoff multiplier must be at least 1".into()));
        }
        if self.providers.is_empty() {
            return Err(AppError::Config("at least one price provider is required".into()));
        }
        if self.history_capacity < crate::services::signals::MIN_SIGNAL_SAMPLES {
            return Err(AppError::Config(format!(
                "history capacity {} is below the {} samples needed for a signal",
                self.history_capacity,
                crate::services::signals::MIN_SIGNAL_SAMPLES
            )));
        }

        let periods = [
            ind.sma_short,
            ind.sma_long,
            ind.ema_short,
            ind.ema_long,
            ind.rsi_period,
            ind.macd_fast,
            ind.macd_slow,
            ind.macd_signal,
            ind.bollinger_period,
            ind.stochastic_period,
        ];
        if periods.contains(&0) {
            return Err(AppError::Config("indicator periods must be positive".into()));
        }
        if ind.sma_short >= ind.sma_long {
            return Err(AppError::Config("SMA short period must be below the long period".into()));
        }
        if ind.ema_short >= ind.ema_long {
            return Err(AppError::Config("EMA short period must be below the long period".into()));
        }
        if ind.macd_fast >= ind.macd_slow {
            return Err(AppError::Config("MACD fast period must be below the slow period".into()));
        }
        if !(ind.bollinger_std_dev.is_finite() && ind.bollinger_std_dev > 0.0) {
            return Err(AppError::Config("Bollinger multiplier must be positive".into()));
        }

        Ok(())
    }

    /// Sleep after a cycle whose fetch failed.
    pub fn backoff_interval(&self) -> Duration {
        self.refresh_interval.saturating_mul(self.backoff_multiplier)
    }
}
