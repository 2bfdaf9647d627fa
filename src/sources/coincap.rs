//! CoinCap.io API client.
//!
//! CoinCap provides free, no-API-key-required access to crypto data.
//! Used as the last fallback in the default provider order.

use super::{get_json, http_client, parse_price, PriceProvider};
use crate::error::ProviderError;
use crate::types::{ProviderKind, Quote};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const COINCAP_API_URL: &str = "https://api.coincap.io/v2";

/// Symbol to CoinCap asset ID mapping.
pub const SYMBOL_TO_ID: &[(&str, &str)] = &[
    ("btc", "bitcoin"),
    ("eth", "ethereum"),
    ("bnb", "binance-coin"),
    ("sol", "solana"),
    ("xrp", "xrp"),
    ("doge", "dogecoin"),
    ("ada", "cardano"),
    ("avax", "avalanche"),
    ("dot", "polkadot"),
    ("link", "chainlink"),
    ("ltc", "litecoin"),
    ("trx", "tron"),
    ("atom", "cosmos"),
    ("uni", "uniswap"),
    ("xlm", "stellar"),
    ("bch", "bitcoin-cash"),
    ("near", "near-protocol"),
];

#[derive(Debug, Deserialize)]
struct CoinCapResponse<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinCapAsset {
    id: String,
    price_usd: Option<String>,
    volume_usd_24_hr: Option<String>,
    change_percent_24_hr: Option<String>,
}

/// CoinCap REST client for one asset.
#[derive(Clone)]
pub struct CoinCapClient {
    client: Client,
    asset_id: &'static str,
    base_url: String,
}

impl CoinCapClient {
    /// Create a client for `symbol`. Returns None if the symbol is not mapped.
    pub fn new(symbol: &str, timeout: Duration) -> Option<Self> {
        let symbol = symbol.to_lowercase();
        let asset_id = SYMBOL_TO_ID
            .iter()
            .find(|(s, _)| *s == symbol)
            .map(|(_, id)| *id)?;

        Some(Self {
            client: http_client(timeout),
            asset_id,
            base_url: COINCAP_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn parse_asset(asset: CoinCapAsset, asset_id: &str) -> Result<Quote, ProviderError> {
    if asset.id != asset_id {
        return Err(ProviderError::Malformed(format!(
            "expected asset {}, got {}",
            asset_id, asset.id
        )));
    }

    let price = asset
        .price_usd
        .as_deref()
        .ok_or_else(|| ProviderError::Malformed("missing priceUsd".into()))
        .and_then(parse_price)?;

    Ok(Quote {
        price,
        volume_24h: asset.volume_usd_24_hr.and_then(|s| s.parse::<f64>().ok()),
        change_24h: asset.change_percent_24_hr.and_then(|s| s.parse::<f64>().ok()),
    })
}

#[async_trait]
impl PriceProvider for CoinCapClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::CoinCap
    }

    async fn fetch_quote(&self) -> Result<Quote, ProviderError> {
        let url = format!("{}/assets/{}", self.base_url, self.asset_id);
        let response: CoinCapResponse<CoinCapAsset> =
            get_json(self.client.get(url).header("Accept-Encoding", "gzip"), self.kind()).await?;
        let quote = parse_asset(response.data, self.asset_id)?;
        debug!("CoinCap price update: {} = ${}", self.asset_id, quote.price);
        Ok(quote)
    }
}
