use crate::error::{AppError, ProviderError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Upstream price provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    CoinGecko,
    Binance,
    Kraken,
    CoinCap,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::CoinGecko => write!(f, "coingecko"),
            ProviderKind::Binance => write!(f, "binance"),
            ProviderKind::Kraken => write!(f, "kraken"),
            ProviderKind::CoinCap => write!(f, "coincap"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coingecko" | "gecko" => Ok(Self::CoinGecko),
            "binance" => Ok(Self::Binance),
            "kraken" => Ok(Self::Kraken),
            "coincap" => Ok(Self::CoinCap),
            _ => Err(AppError::UnknownProvider(s.to_string())),
        }
    }
}

/// Spot quote returned by a single provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_24h: Option<f64>,
    /// 24h change in percent, when the provider reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_24h: Option<f64>,
}

impl Quote {
    pub fn new(price: f64) -> Self {
        Self {
            price,
            volume_24h: None,
            change_24h: None,
        }
    }
}

/// A single observed price. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<f64>,
    /// Volume traded within this candle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// Rolling 24h volume reported with a live quote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_24h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_24h: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ProviderKind>,
}

impl PricePoint {
    /// A bare price observation without candle data.
    pub fn new(price: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            price,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
            volume_24h: None,
            change_24h: None,
            source: None,
        }
    }

    /// Build a point from a provider quote.
    pub fn from_quote(quote: &Quote, source: ProviderKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            volume_24h: quote.volume_24h,
            change_24h: quote.change_24h,
            source: Some(source),
            ..Self::new(quote.price, timestamp)
        }
    }

    /// Build a point from an OHLC candle; the price is the close.
    pub fn candle(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: Option<f64>,
    ) -> Self {
        Self {
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            volume,
            ..Self::new(close, timestamp)
        }
    }

    /// Closing price, falling back to the observed price.
    pub fn close(&self) -> f64 {
        self.close.unwrap_or(self.price)
    }

    /// Period high, falling back to the observed price.
    pub fn high(&self) -> f64 {
        self.high.unwrap_or(self.price)
    }

    /// Period low, falling back to the observed price.
    pub fn low(&self) -> f64 {
        self.low.unwrap_or(self.price)
    }
}

/// One provider attempt within a fetch.
#[derive(Debug)]
pub struct ProviderAttempt {
    pub provider: ProviderKind,
    pub elapsed: Duration,
    pub result: Result<Quote, ProviderError>,
}

impl ProviderAttempt {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregated result of trying providers in priority order.
#[derive(Debug)]
pub struct FetchOutcome {
    /// Fresh price on success, otherwise the last known good price (if any).
    pub price: Option<f64>,
    pub success: bool,
    /// Provider that answered, on success.
    pub source: Option<ProviderKind>,
    /// Quote from the answering provider, on success.
    pub quote: Option<Quote>,
    pub attempts: Vec<ProviderAttempt>,
}

impl FetchOutcome {
    /// Human-readable summary of failed attempts, for logging.
    pub fn failure_summary(&self) -> String {
        self.attempts
            .iter()
            .filter_map(|a| a.result.as_ref().err().map(|e| format!("{}: {}", a.provider, e)))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
