use super::{get_json, http_client, parse_price, PriceProvider};
use crate::error::ProviderError;
use crate::types::{PricePoint, ProviderKind, Quote};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const BINANCE_API_URL: &str = "https://api.binance.com/api/v3";
/// Binance caps a single klines request at 1000 candles.
const MAX_KLINES: usize = 1000;

/// Symbol mapping for Binance (symbol -> Binance trading pair).
pub const SYMBOL_PAIRS: &[(&str, &str)] = &[
    ("btc", "BTCUSDT"),
    ("eth", "ETHUSDT"),
    ("bnb", "BNBUSDT"),
    ("sol", "SOLUSDT"),
    ("xrp", "XRPUSDT"),
    ("doge", "DOGEUSDT"),
    ("ada", "ADAUSDT"),
    ("avax", "AVAXUSDT"),
    ("dot", "DOTUSDT"),
    ("link", "LINKUSDT"),
    ("ltc", "LTCUSDT"),
    ("trx", "TRXUSDT"),
    ("atom", "ATOMUSDT"),
    ("uni", "UNIUSDT"),
    ("xlm", "XLMUSDT"),
    ("bch", "BCHUSDT"),
    ("near", "NEARUSDT"),
    ("apt", "APTUSDT"),
];

/// Binance 24hr ticker response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceTicker {
    symbol: String,
    last_price: String,
    price_change_percent: String,
    quote_volume: String,
}

/// Binance REST client for one trading pair.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    api_key: Option<String>,
    pair: &'static str,
    base_url: String,
}

impl BinanceClient {
    /// Create a client for `symbol`. Returns None if the symbol is not mapped.
    pub fn new(symbol: &str, api_key: Option<String>, timeout: Duration) -> Option<Self> {
        let symbol = symbol.to_lowercase();
        let pair = SYMBOL_PAIRS
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, p)| *p)?;

        Some(Self {
            client: http_client(timeout),
            api_key,
            pair,
            base_url: BINANCE_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn get(&self, url: String) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url);
        if let Some(ref key) = self.api_key {
            request = request.header("X-MBX-APIKEY", key);
        }
        request
    }
}

fn parse_ticker(ticker: BinanceTicker, pair: &str) -> Result<Quote, ProviderError> {
    if ticker.symbol != pair {
        return Err(ProviderError::Malformed(format!(
            "expected {} ticker, got {}",
            pair, ticker.symbol
        )));
    }

    Ok(Quote {
        price: parse_price(&ticker.last_price)?,
        volume_24h: ticker.quote_volume.parse().ok(),
        change_24h: ticker.price_change_percent.parse().ok(),
    })
}

fn kline_field(row: &[Value], i: usize) -> Result<f64, ProviderError> {
    match row.get(i) {
        Some(Value::String(s)) => parse_price(s),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| ProviderError::Malformed(format!("bad kline field {}", i))),
        _ => Err(ProviderError::Malformed(format!("missing kline field {}", i))),
    }
}

/// Kline rows are arrays: [open time, open, high, low, close, volume, ...].
fn parse_klines(rows: Vec<Vec<Value>>) -> Result<Vec<PricePoint>, ProviderError> {
    rows.iter()
        .map(|row| {
            let open_time = row
                .first()
                .and_then(Value::as_i64)
                .ok_or_else(|| ProviderError::Malformed("missing kline open time".into()))?;
            let timestamp = Utc
                .timestamp_millis_opt(open_time)
                .single()
                .ok_or_else(|| ProviderError::Malformed(format!("bad timestamp {}", open_time)))?;

            let volume = match row.get(5) {
                Some(Value::String(s)) => s.parse().ok(),
                _ => None,
            };

            let mut point = PricePoint::candle(
                timestamp,
                kline_field(row, 1)?,
                kline_field(row, 2)?,
                kline_field(row, 3)?,
                kline_field(row, 4)?,
                volume,
            );
            point.source = Some(ProviderKind::Binance);
            Ok(point)
        })
        .collect()
}

#[async_trait]
impl PriceProvider for BinanceClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Binance
    }

    async fn fetch_quote(&self) -> Result<Quote, ProviderError> {
        let url = format!("{}/ticker/24hr?symbol={}", self.base_url, self.pair);
        let ticker: BinanceTicker = get_json(self.get(url), self.kind()).await?;
        let quote = parse_ticker(ticker, self.pair)?;
        debug!("Binance price update: {} = ${}", self.pair, quote.price);
        Ok(quote)
    }

    async fn fetch_series(&self, limit: usize) -> Result<Vec<PricePoint>, ProviderError> {
        let limit = limit.clamp(1, MAX_KLINES);
        let url = format!(
            "{}/klines?symbol={}&interval=1m&limit={}",
            self.base_url, self.pair, limit
        );
        let rows: Vec<Vec<Value>> = get_json(self.get(url), self.kind()).await?;
        let points = parse_klines(rows)?;
        info!("Fetched {} Binance candles for {}", points.len(), self.pair);
        Ok(points)
    }
}
