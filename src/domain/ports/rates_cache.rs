//! Port for the persistent rates cache.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::RateSnapshot;

/// Keyed, time-boxed store of the latest fetched snapshot per base currency.
///
/// Implementations must make `put` atomic with respect to concurrent
/// `get`/`put` on the same key: no observer ever sees a partially written
/// row. Storage failures propagate as [`DomainError::CacheIo`]; a missing
/// key is `Ok(None)`, never an error.
///
/// [`DomainError::CacheIo`]: crate::domain::errors::DomainError::CacheIo
#[async_trait]
pub trait RatesCache: Send + Sync {
    /// Get the stored snapshot for `base`, if any. No side effects.
    async fn get(&self, base: &str) -> DomainResult<Option<RateSnapshot>>;

    /// Insert or wholly replace the snapshot for `snapshot.base_currency`.
    async fn put(&self, snapshot: &RateSnapshot) -> DomainResult<()>;

    /// Remove the entry for `base` if present; no-op otherwise.
    async fn delete(&self, base: &str) -> DomainResult<()>;

    /// Remove all entries.
    async fn clear(&self) -> DomainResult<()>;
}
