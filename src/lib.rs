//! Augur - cryptocurrency price trend signal service.
//!
//! Polls spot prices from a prioritised list of providers, keeps a bounded
//! history and publishes an indicator-driven trend signal snapshot.

pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

pub use config::Config;
pub use error::{AppError, ProviderError, Result};
pub use services::{RefreshHandle, RefreshLoop};
pub use types::*;
