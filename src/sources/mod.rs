//! Upstream price providers.

pub mod binance;
pub mod coincap;
pub mod coingecko;
pub mod kraken;

pub use binance::BinanceClient;
pub use coincap::CoinCapClient;
pub use coingecko::CoinGeckoClient;
pub use kraken::KrakenClient;

use crate::config::Config;
use crate::error::{AppError, ProviderError, Result};
use crate::types::{PricePoint, ProviderKind, Quote};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const USER_AGENT: &str = "augur/0.1 (price trend signal)";

/// A single upstream source of spot prices for one symbol.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Current spot quote.
    async fn fetch_quote(&self) -> std::result::Result<Quote, ProviderError>;

    /// Up to `limit` recent points, oldest first.
    async fn fetch_series(
        &self,
        _limit: usize,
    ) -> std::result::Result<Vec<PricePoint>, ProviderError> {
        Err(ProviderError::Unsupported(format!(
            "{} does not provide a price series",
            self.kind()
        )))
    }
}

/// HTTP client shared by the REST providers.
pub(crate) fn http_client(timeout: Duration) -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// GET `url` and decode a JSON body, mapping non-2xx statuses and bad
/// payloads to typed errors.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    provider: ProviderKind,
) -> std::result::Result<T, ProviderError> {
    let response = request.header("Accept", "application/json").send().await?;

    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let body: String = text.chars().take(200).collect();
        warn!("{} API returned {}: {}", provider, status, body);
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(serde_json::from_str(&text)?)
}

/// Parse a decimal string field as a positive price.
pub(crate) fn parse_price(raw: &str) -> std::result::Result<f64, ProviderError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ProviderError::Malformed(format!("not a number: {:?}", raw)))?;
    crate::error::ensure_positive(value)
}

/// Build the configured providers in priority order.
///
/// Providers that do not list the configured symbol are skipped with a
/// warning; it is an error if none remain.
pub fn providers_from_config(config: &Config) -> Result<Vec<Arc<dyn PriceProvider>>> {
    let mut providers: Vec<Arc<dyn PriceProvider>> = Vec::new();

    for kind in &config.providers {
        let provider: Option<Arc<dyn PriceProvider>> = match kind {
            ProviderKind::CoinGecko => CoinGeckoClient::new(
                &config.symbol,
                config.coingecko_api_key.clone(),
                config.provider_timeout,
            )
            .map(|c| Arc::new(c) as Arc<dyn PriceProvider>),
            ProviderKind::Binance => BinanceClient::new(
                &config.symbol,
                config.binance_api_key.clone(),
                config.provider_timeout,
            )
            .map(|c| Arc::new(c) as Arc<dyn PriceProvider>),
            ProviderKind::Kraken => KrakenClient::new(&config.symbol, config.provider_timeout)
                .map(|c| Arc::new(c) as Arc<dyn PriceProvider>),
            ProviderKind::CoinCap => CoinCapClient::new(&config.symbol, config.provider_timeout)
                .map(|c| Arc::new(c) as Arc<dyn PriceProvider>),
        };

        match provider {
            Some(p) => providers.push(p),
            None => warn!("{} does not list symbol {}, skipping", kind, config.symbol),
        }
    }

    if providers.is_empty() {
        return Err(AppError::Config(format!(
            "no configured provider supports symbol {}",
            config.symbol
        )));
    }

    info!(
        "Price providers for {}: {}",
        config.symbol,
        providers
            .iter()
            .map(|p| p.kind().to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    Ok(providers)
}
