use super::{get_json, http_client, PriceProvider};
use crate::error::{ensure_positive, ProviderError};
use crate::types::{ProviderKind, Quote};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";
const COINGECKO_PRO_API_URL: &str = "https://pro-api.coingecko.com/api/v3";

/// Symbol to CoinGecko ID mapping.
pub const SYMBOL_TO_ID: &[(&str, &str)] = &[
    ("btc", "bitcoin"),
    ("eth", "ethereum"),
    ("bnb", "binancecoin"),
    ("sol", "solana"),
    ("xrp", "ripple"),
    ("doge", "dogecoin"),
    ("ada", "cardano"),
    ("avax", "avalanche-2"),
    ("dot", "polkadot"),
    ("link", "chainlink"),
    ("ltc", "litecoin"),
    ("trx", "tron"),
    ("atom", "cosmos"),
    ("uni", "uniswap"),
    ("xlm", "stellar"),
    ("bch", "bitcoin-cash"),
    ("near", "near"),
    ("apt", "aptos"),
];

/// Entry of the `/simple/price` response, keyed by coin ID.
#[derive(Debug, Deserialize)]
struct CoinGeckoPrice {
    usd: Option<f64>,
    usd_24h_vol: Option<f64>,
    usd_24h_change: Option<f64>,
}

/// CoinGecko REST client for one coin.
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    api_key: Option<String>,
    coin_id: &'static str,
    base_url: String,
}

impl CoinGeckoClient {
    /// Create a client for `symbol`. Returns None if the symbol is not mapped.
    pub fn new(symbol: &str, api_key: Option<String>, timeout: Duration) -> Option<Self> {
        let coin_id = coin_id(symbol)?;
        let base_url = if api_key.is_some() {
            COINGECKO_PRO_API_URL
        } else {
            COINGECKO_API_URL
        };

        Some(Self {
            client: http_client(timeout),
            api_key,
            coin_id,
            base_url: base_url.to_string(),
        })
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn price_url(&self) -> String {
        let mut url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd&include_24hr_change=true&include_24hr_vol=true",
            self.base_url, self.coin_id
        );

        if let Some(ref key) = self.api_key {
            url.push_str(&format!("&x_cg_pro_api_key={}", key));
        }

        url
    }
}

/// Look up the CoinGecko ID for a lowercase symbol.
pub fn coin_id(symbol: &str) -> Option<&'static str> {
    let symbol = symbol.to_lowercase();
    SYMBOL_TO_ID
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, id)| *id)
}

fn parse_simple_price(
    mut body: HashMap<String, CoinGeckoPrice>,
    coin_id: &str,
) -> Result<Quote, ProviderError> {
    let entry = body
        .remove(coin_id)
        .ok_or_else(|| ProviderError::Malformed(format!("missing entry for {}", coin_id)))?;

    let price = entry
        .usd
        .ok_or_else(|| ProviderError::Malformed("missing usd price".to_string()))?;

    Ok(Quote {
        price: ensure_positive(price)?,
        volume_24h: entry.usd_24h_vol,
        change_24h: entry.usd_24h_change,
    })
}

#[async_trait]
impl PriceProvider for CoinGeckoClient {
    fn kind(&self) -> ProviderKind {
        ProviderKind::CoinGecko
    }

    async fn fetch_quote(&self) -> Result<Quote, ProviderError> {
        let body: HashMap<String, CoinGeckoPrice> =
            get_json(self.client.get(self.price_url()), self.kind()).await?;
        let quote = parse_simple_price(body, self.coin_id)?;
        debug!("CoinGecko price update: {} = ${}", self.coin_id, quote.price);
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Quote, ProviderError> {
        let body: HashMap<String, CoinGeckoPrice> = serde_json::from_str(json).unwrap();
        parse_simple_price(body, "bitcoin")
    }

    #[test]
    fn test_coin_id_lookup() {
        assert_eq!(coin_id("btc"), Some("bitcoin"));
        assert_eq!(coin_id("ETH"), Some("ethereum"));
        assert_eq!(coin_id("nope"), None);
    }

    #[test]
    fn test_symbol_table_lowercase() {
        for (symbol, _) in SYMBOL_TO_ID {
            assert_eq!(*symbol, symbol.to_lowercase());
        }
    }

    #[test]
    fn test_parse_simple_price() {
        let quote = parse(
            r#"{"bitcoin":{"usd":43500.5,"usd_24h_vol":21000000000.0,"usd_24h_change":-1.25}}"#,
        )
        .unwrap();
        assert_eq!(quote.price, 43500.5);
        assert_eq!(quote.volume_24h, Some(21_000_000_000.0));
        assert_eq!(quote.change_24h, Some(-1.25));
    }

    #[test]
    fn test_parse_simple_price_missing_coin() {
        let result = parse(r#"{"ethereum":{"usd":2500.0}}"#);
        assert!(matches!(result, Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn test_parse_simple_price_missing_usd() {
        let result = parse(r#"{"bitcoin":{}}"#);
        assert!(matches!(result, Err(ProviderError::Malformed(_))));
    }

    #[test]
    fn test_parse_simple_price_zero_rejected() {
        let result = parse(r#"{"bitcoin":{"usd":0.0}}"#);
        assert!(matches!(result, Err(ProviderError::InvalidPrice(_))));
    }

    #[test]
    fn test_price_url_includes_pro_key() {
        let client = CoinGeckoClient::new("btc", Some("k".into()), Duration::from_secs(5)).unwrap();
        let url = client.price_url();
        assert!(url.starts_with(COINGECKO_PRO_API_URL));
        assert!(url.contains("ids=bitcoin"));
        assert!(url.ends_with("&x_cg_pro_api_key=k"));
    }
}
