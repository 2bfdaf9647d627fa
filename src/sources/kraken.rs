use super::{get_json, http_client, parse_price, PriceProvider};
use crate::error::ProviderError;
use crate::types::{ProviderKind, Quote};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const KRAKEN_API_URL: &str = "https://api.kraken.com/0/public";

/// Symbol mapping for Kraken (symbol -> Kraken trading pair).
pub const SYMBOL_PAIRS: &[(&str, &str)] = &[
    ("btc", "XXBTZUSD"),
    ("eth", "XETHZUSD"),
    ("sol", "SOLUSD"),
    ("xrp", "XXRPZUSD"),
    ("doge", "XDGUSD"),
    ("ada", "ADAUSD"),
    ("avax", "AVAXUSD"),
    ("dot", "DOTUSD"),
    ("link", "LINKUSD"),
    ("ltc", "XLTCZUSD"),
    ("atom", "ATOMUSD"),
    ("uni", "UNIUSD"),
    ("xlm", "XXLMZUSD"),
    ("bch", "BCHUSD"),
    ("near", "NEARUSD"),
    ("apt", "APTUSD"),
];

/// Kraken ticker response.
#[derive(Debug, Deserialize)]
struct KrakenResponse {
    error: Vec<String>,
    result: Option<HashMap<String, KrakenTicker>>,
}

#[derive(Debug, Deserialize)]
struct KrakenTicker {
    /// Last trade closed [price, lot volume]
    c: Vec<String>,
    /// Volume [today, last 24 hours]
    v: Vec<String>,
    /// Today's opening price
    o: Option<String>,
}

/// Kraken REST client for one trading pair.
#[derive(Clone)]
pub struct KrakenClient {
    client: Client,
    pair: &'static str,
    base_url: String,
}

impl KrakenClient {
    /// Create a client for `symbol`. Returns None if the symbol is not mapped.
    pub fn new(symbol: &str, timeout: Duration) -> Option<Self> {
        let symbol = symbol.to_lowercase();
        let pair = SYMBOL_PAIRS
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, p)| *p)?;

        Some(Self {
            client: http_client(timeout),
            pair,
            base_url: KRAKEN_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Kraken may answer under an alternate pair name, so a single-entry result
/// is accepted whatever its key.
fn parse_ticker(data: KrakenResponse, pair: &str) -> Result<Quote, ProviderError> {
    if !data.error.is_empty() {
        return Err(ProviderError::Malformed(data.error.join(", ")));
    }

    let mut result = data
        .result
        .ok_or_else(|| ProviderError::Malformed("missing result".into()))?;

    let ticker = match result.remove(pair) {
        Some(t) => t,
        None if result.len() == 1 => match result.into_values().next() {
            Some(t) => t,
            None => return Err(ProviderError::Malformed(format!("no ticker for {}", pair))),
        },
        None => return Err(ProviderError::Malformed(format!("no ticker for {}", pair))),
    };

    let price = ticker
        .c
        .first()
        .ok_or_else(|| ProviderError::Malformed("empty close field".into()))
        .and_then(|p| parse_price(p))?;

    // Change since today's open (UTC), the closest Kraken offers to a 24h change.
    let change_24h = ticker
        .o
        .as_deref()
        .and_then(|o| o.parse::<f64>().ok())
        .filter(|open| *open > 0.0)
        .map(|open| (price - open) / open * 100.0);

    Ok(Quote {
        price,
        volume_24h: ticker.v.get(1).and_then(|v| v.parse::<f64>().ok()).map(|v| v * price),
        change_24h,
    })
}

#[async_trait]
impl PriceProvider for KrakenClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Kraken
    }

    async fn fetch_quote(&self) -> Result<Quote, ProviderError> {
        let url = format!("{}/Ticker?pair={}", self.base_url, self.pair);
        let data: KrakenResponse = get_json(self.client.get(url), self.kind()).await?;

        if !data.error.is_empty() {
            warn!("Kraken API errors: {:?}", data.error);
        }

        let quote = parse_ticker(data, self.pair)?;
        debug!("Kraken price update: {} = ${}", self.pair, quote.price);
        Ok(quote)
    }
}
