//! Ordered multi-provider price fetching with per-attempt timeouts.

use crate::error::ProviderError;
use crate::sources::PriceProvider;
use crate::types::{FetchOutcome, PricePoint, ProviderAttempt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

/// Tries providers in priority order and remembers the last good price.
pub struct PriceSource {
    providers: Vec<Arc<dyn PriceProvider>>,
    timeout: Duration,
    last_good: Option<f64>,
}

impl PriceSource {
    pub fn new(providers: Vec<Arc<dyn PriceProvider>>, timeout: Duration) -> Self {
        Self {
            providers,
            timeout,
            last_good: None,
        }
    }

    /// Last price any provider returned successfully.
    pub fn last_good(&self) -> Option<f64> {
        self.last_good
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }

    /// Fetch the current price, stopping at the first provider that answers.
    ///
    /// Never fails: when every provider errors the outcome carries the last
    /// known good price with `success = false`.
    pub async fn fetch(&mut self) -> FetchOutcome {
        let mut attempts = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            let kind = provider.kind();
            let started = Instant::now();

            let result = match timeout(self.timeout, provider.fetch_quote()).await {
                Ok(result) => result.and_then(|quote| {
                    crate::error::ensure_positive(quote.price).map(|_| quote)
                }),
                Err(_) => Err(ProviderError::Timeout(self.timeout)),
            };
            let elapsed = started.elapsed();

            match result {
                Ok(quote) => {
                    debug!("{} answered in {:?}: ${}", kind, elapsed, quote.price);
                    self.last_good = Some(quote.price);
                    attempts.push(ProviderAttempt {
                        provider: kind,
                        elapsed,
                        result: Ok(quote.clone()),
                    });
                    return FetchOutcome {
                        price: Some(quote.price),
                        success: true,
                        source: Some(kind),
                        quote: Some(quote),
                        attempts,
                    };
                }
                Err(e) => {
                    warn!("{} failed after {:?}: {}", kind, elapsed, e);
                    attempts.push(ProviderAttempt {
                        provider: kind,
                        elapsed,
                        result: Err(e),
                    });
                }
            }
        }

        FetchOutcome {
            price: self.last_good,
            success: false,
            source: None,
            quote: None,
            attempts,
        }
    }

    /// Fetch up to `limit` recent points from the first provider that
    /// supports series, oldest first. Returns an empty vector if none does.
    pub async fn fetch_series(&self, limit: usize) -> Vec<PricePoint> {
        for provider in &self.providers {
            let kind = provider.kind();
            match timeout(self.timeout, provider.fetch_series(limit)).await {
                Ok(Ok(mut points)) if !points.is_empty() => {
                    points.retain(|p| p.price.is_finite() && p.price > 0.0);
                    points.sort_by_key(|p| p.timestamp);
                    if points.len() > limit {
                        points.drain(..points.len() - limit);
                    }
                    info!("Seeded {} points from {}", points.len(), kind);
                    return points;
                }
                Ok(Ok(_)) => debug!("{} returned an empty series", kind),
                Ok(Err(ProviderError::Unsupported(_))) => {}
                Ok(Err(e)) => warn!("{} series fetch failed: {}", kind, e),
                Err(_) => warn!("{} series fetch timed out after {:?}", kind, self.timeout),
            }
        }

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProviderKind, Quote};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        kind: ProviderKind,
        price: Option<f64>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn ok(kind: ProviderKind, price: f64) -> Arc<Self> {
            Arc::new(Self {
                kind,
                price: Some(price),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(kind: ProviderKind) -> Arc<Self> {
            Arc::new(Self {
                kind,
                price: None,
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            })
        }

        fn slow(kind: ProviderKind, price: f64, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                kind,
                price: Some(price),
                delay,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PriceProvider for Fixed {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn fetch_quote(&self) -> Result<Quote, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match self.price {
                Some(p) => Ok(Quote::new(p)),
                None => Err(ProviderError::Status {
                    status: 503,
                    body: "unavailable".into(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let first = Fixed::ok(ProviderKind::CoinGecko, 100.0);
        let second = Fixed::ok(ProviderKind::Binance, 200.0);
        let mut source = PriceSource::new(
            vec![first.clone(), second.clone()],
            Duration::from_secs(1),
        );

        let outcome = source.fetch().await;
        assert!(outcome.success);
        assert_eq!(outcome.price, Some(100.0));
        assert_eq!(outcome.source, Some(ProviderKind::CoinGecko));
        assert_eq!(outcome.attempts.len(), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_in_order() {
        let mut source = PriceSource::new(
            vec![
                Fixed::failing(ProviderKind::CoinGecko),
                Fixed::ok(ProviderKind::Kraken, 42.0),
            ],
            Duration::from_secs(1),
        );

        let outcome = source.fetch().await;
        assert!(outcome.success);
        assert_eq!(outcome.source, Some(ProviderKind::Kraken));
        assert_eq!(outcome.attempts.len(), 2);
        assert!(!outcome.attempts[0].succeeded());
        assert!(outcome.attempts[1].succeeded());
    }

    #[tokio::test]
    async fn test_all_fail_without_history() {
        let mut source =
            PriceSource::new(vec![Fixed::failing(ProviderKind::Binance)], Duration::from_secs(1));

        let outcome = source.fetch().await;
        assert!(!outcome.success);
        assert_eq!(outcome.price, None);
        assert!(outcome.failure_summary().contains("binance"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_then_last_known() {
        let slow = Fixed::slow(ProviderKind::CoinCap, 10.0, Duration::from_secs(60));
        let mut source = PriceSource::new(
            vec![Fixed::ok(ProviderKind::CoinGecko, 55.0)],
            Duration::from_secs(2),
        );
        assert!(source.fetch().await.success);

        source.providers = vec![slow];
        let outcome = source.fetch().await;
        assert!(!outcome.success);
        assert_eq!(outcome.price, Some(55.0));
        assert!(matches!(
            outcome.attempts[0].result,
            Err(ProviderError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_non_positive_quote() {
        let mut source = PriceSource::new(
            vec![
                Fixed::ok(ProviderKind::CoinGecko, 0.0),
                Fixed::ok(ProviderKind::Binance, 7.0),
            ],
            Duration::from_secs(1),
        );

        let outcome = source.fetch().await;
        assert_eq!(outcome.price, Some(7.0));
        assert!(matches!(
            outcome.attempts[0].result,
            Err(ProviderError::InvalidPrice(_))
        ));
    }

    struct Series;

    #[async_trait]
    impl PriceProvider for Series {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Binance
        }

        async fn fetch_quote(&self) -> Result<Quote, ProviderError> {
            Ok(Quote::new(1.0))
        }

        async fn fetch_series(&self, _limit: usize) -> Result<Vec<PricePoint>, ProviderError> {
            let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
            Ok((0..5)
                .rev()
                .map(|i| PricePoint::new(100.0 + i as f64, start + chrono::Duration::minutes(i)))
                .collect())
        }
    }

    #[tokio::test]
    async fn test_fetch_series_skips_unsupported() {
        let source = PriceSource::new(
            vec![Fixed::ok(ProviderKind::CoinGecko, 1.0), Arc::new(Series)],
            Duration::from_secs(1),
        );

        let points = source.fetch_series(3).await;
        assert_eq!(points.len(), 3);
        assert!(points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(points.last().map(|p| p.price), Some(104.0));
    }
}
