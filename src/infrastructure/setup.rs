//! Composition root wiring the core together.
//!
//! All dependencies are constructed here and injected explicitly; there
//! are no lazily-initialized globals.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::adapters::http::ExchangeRateApi;
use crate::adapters::sqlite::{initialize_database, SqliteRatesCache};
use crate::application::CurrencyModel;
use crate::domain::models::Config;
use crate::domain::ports::SystemClock;
use crate::services::RatesRepository;

/// Build the rates repository from configuration: database pool with
/// migrations applied, HTTP rate source, and the system clock.
pub async fn build_repository(config: &Config) -> Result<Arc<RatesRepository>> {
    let database_url = format!("sqlite:{}", config.database.path);
    let pool = initialize_database(&database_url, config.database.max_connections)
        .await
        .context("failed to initialize rates database")?;

    let cache = SqliteRatesCache::new(pool);
    let source = ExchangeRateApi::new(&config.api).context("failed to build rate API client")?;

    let repository = RatesRepository::new(Arc::new(source), Arc::new(cache), Arc::new(SystemClock))
        .with_validity_millis(config.cache.validity_millis);

    Ok(Arc::new(repository))
}

/// Build a ready-to-use currency screen model.
pub async fn build_currency_model(config: &Config) -> Result<CurrencyModel> {
    let repository = build_repository(config).await?;
    Ok(CurrencyModel::new(repository))
}
