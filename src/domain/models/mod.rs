//! Domain models for the ratestash core.

pub mod config;
pub mod snapshot;

pub use config::{ApiConfig, CacheConfig, Config, DatabaseConfig, LoggingConfig};
pub use snapshot::{LatestRates, RateSnapshot};
