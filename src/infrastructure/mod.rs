//! Infrastructure: configuration, logging, and the composition root.

pub mod config;
pub mod logging;
pub mod setup;

pub use config::{ConfigError, ConfigLoader};
pub use logging::init_logging;
pub use setup::{build_currency_model, build_repository};
