//! Ratestash - currency exchange-rate client core
//!
//! Ratestash is the reusable core of a small currency-rates client: a
//! cache-aside repository over a remote rate API with a time-boxed
//! SQLite cache, and a generic single-flight action dispatcher for
//! UI-observable screen state.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, port traits, and domain errors
//! - **Adapters** (`adapters`): SQLite cache and HTTP rate-source implementations
//! - **Service Layer** (`services`): The cache-aside rates repository
//! - **Application Layer** (`application`): The action dispatcher and screen models
//! - **Infrastructure** (`infrastructure`): Configuration, logging, composition root
//!
//! # Example
//!
//! ```ignore
//! use ratestash::application::CurrencyAction;
//! use ratestash::infrastructure::{build_currency_model, ConfigLoader};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let model = build_currency_model(&config).await?;
//!     model.submit(CurrencyAction::LoadRates);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{
    Action, ActionDispatcher, ActionScope, CurrencyAction, CurrencyEvent, CurrencyModel,
    CurrencyState,
};
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{Config, LatestRates, RateSnapshot};
pub use domain::ports::{Clock, RateSource, RatesCache, SystemClock};
pub use infrastructure::{ConfigError, ConfigLoader};
pub use services::{RatesRepository, CACHE_VALIDITY_MILLIS, DEFAULT_BASE};
