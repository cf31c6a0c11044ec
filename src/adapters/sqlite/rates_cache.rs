//! SQLite implementation of the RatesCache port.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::RateSnapshot;
use crate::domain::ports::RatesCache;

/// Rates cache backed by the `cached_rates` table.
///
/// The rates map is stored as a JSON text column; the upsert makes
/// replace-on-write atomic per base currency.
#[derive(Clone)]
pub struct SqliteRatesCache {
    pool: SqlitePool,
}

impl SqliteRatesCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatesCache for SqliteRatesCache {
    async fn get(&self, base: &str) -> DomainResult<Option<RateSnapshot>> {
        let row: Option<CachedRatesRow> = sqlx::query_as(
            "SELECT base_currency, as_of_date, rates, cached_at_millis FROM cached_rates WHERE base_currency = ?",
        )
        .bind(base)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn put(&self, snapshot: &RateSnapshot) -> DomainResult<()> {
        let rates_json = serde_json::to_string(&snapshot.rates)?;

        sqlx::query(
            r#"INSERT INTO cached_rates (base_currency, as_of_date, rates, cached_at_millis)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(base_currency) DO UPDATE SET
                   as_of_date = excluded.as_of_date,
                   rates = excluded.rates,
                   cached_at_millis = excluded.cached_at_millis"#,
        )
        .bind(&snapshot.base_currency)
        .bind(&snapshot.as_of_date)
        .bind(&rates_json)
        .bind(snapshot.cached_at_millis)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, base: &str) -> DomainResult<()> {
        sqlx::query("DELETE FROM cached_rates WHERE base_currency = ?")
            .bind(base)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn clear(&self) -> DomainResult<()> {
        sqlx::query("DELETE FROM cached_rates").execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct CachedRatesRow {
    base_currency: String,
    as_of_date: String,
    rates: String,
    cached_at_millis: i64,
}

impl TryFrom<CachedRatesRow> for RateSnapshot {
    type Error = DomainError;

    fn try_from(row: CachedRatesRow) -> Result<Self, Self::Error> {
        let rates: HashMap<String, String> = serde_json::from_str(&row.rates)?;

        Ok(RateSnapshot {
            base_currency: row.base_currency,
            as_of_date: row.as_of_date,
            rates,
            cached_at_millis: row.cached_at_millis,
        })
    }
}
