use std::time::Duration;
use thiserror::Error;

/// Failure of a single price provider attempt.
///
/// These never escape the price source: each one is recorded on the attempt
/// that produced it and the next provider is tried.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Malformed(e.to_string())
    }
}

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unknown price provider: {0}")]
    UnknownProvider(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Validate that a provider reported a usable price.
pub fn ensure_positive(price: f64) -> std::result::Result<f64, ProviderError> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(ProviderError::InvalidPrice(price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_positive() {
        assert_eq!(ensure_positive(42.5).unwrap(), 42.5);
        assert!(matches!(ensure_positive(0.0), Err(ProviderError::InvalidPrice(_))));
        assert!(matches!(ensure_positive(-1.0), Err(ProviderError::InvalidPrice(_))));
        assert!(ensure_positive(f64::NAN).is_err());
        assert!(ensure_positive(f64::INFINITY).is_err());
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::Status {
            status: 429,
            body: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "API returned status 429: rate limited");

        let err = ProviderError::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "Timed out after 5s");
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config("refresh interval must be positive".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: refresh interval must be positive"
        );

        let err: AppError = "bitstamp".parse::<crate::types::ProviderKind>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown price provider: bitstamp");
    }

    #[test]
    fn test_serde_error_maps_to_malformed() {
        let parse: std::result::Result<f64, _> = serde_json::from_str("{not json");
        let err: ProviderError = parse.unwrap_err().into();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }
}
