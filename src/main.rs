use augur::config::Config;
use augur::services::{PriceSource, RefreshLoop, SystemClock};
use augur::sources::providers_from_config;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "augur=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(
        "Starting Augur for {} (refresh {:?}, history {})",
        config.symbol.to_uppercase(),
        config.refresh_interval,
        config.history_capacity
    );

    let providers = providers_from_config(&config)?;
    let source = PriceSource::new(providers, config.provider_timeout);
    let handle = RefreshLoop::new(config, source, Arc::new(SystemClock)).spawn();

    let mut updates = handle.subscribe();
    let reporter = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            match serde_json::to_string(snapshot.as_ref()) {
                Ok(json) => debug!("Snapshot: {}", json),
                Err(e) => debug!("Snapshot not serialisable: {}", e),
            }
            if let Some(ref forecast) = snapshot.forecast {
                info!(
                    "Forecast {}m: ${:.2} ({:+.2}%, {:.0}% confidence)",
                    forecast.horizon_minutes,
                    forecast.predicted_price,
                    forecast.predicted_change_percent,
                    forecast.confidence
                );
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    handle.shutdown().await;
    reporter.abort();

    Ok(())
}
