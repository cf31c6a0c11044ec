//! Cache-aside repository for latest currency rates.

use std::sync::Arc;

use crate::domain::errors::DomainResult;
use crate::domain::models::RateSnapshot;
use crate::domain::ports::{Clock, RateSource, RatesCache};

/// How long a cached snapshot stays valid. Staleness is measured from
/// write time because the remote source provides no cache-control
/// metadata; the client owns the TTL policy.
pub const CACHE_VALIDITY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Base currency served when the caller does not name one.
pub const DEFAULT_BASE: &str = "EUR";

/// Serves "latest rates for a base currency", preferring cache, falling
/// back to the remote source, keeping the cache warm.
///
/// Holds no mutable state of its own; one instance can be shared across
/// concurrent callers. Per-key write atomicity is the cache's concern.
pub struct RatesRepository {
    source: Arc<dyn RateSource>,
    cache: Arc<dyn RatesCache>,
    clock: Arc<dyn Clock>,
    validity_millis: i64,
}

impl RatesRepository {
    pub fn new(source: Arc<dyn RateSource>, cache: Arc<dyn RatesCache>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            cache,
            clock,
            validity_millis: CACHE_VALIDITY_MILLIS,
        }
    }

    /// Override the cache validity window (configuration and tests).
    pub fn with_validity_millis(mut self, validity_millis: i64) -> Self {
        self.validity_millis = validity_millis;
        self
    }

    /// Latest rates for [`DEFAULT_BASE`].
    pub async fn get_latest(&self) -> DomainResult<RateSnapshot> {
        self.get_latest_rates(DEFAULT_BASE).await
    }

    /// Latest rates for `base`.
    ///
    /// A fresh cached snapshot is returned unchanged with no network
    /// call. On miss or expiry the remote source is consulted, the new
    /// snapshot written back, and returned. A remote failure propagates
    /// and leaves any stale cache entry untouched.
    pub async fn get_latest_rates(&self, base: &str) -> DomainResult<RateSnapshot> {
        if let Some(cached) = self.cache.get(base).await? {
            if cached.is_fresh(self.clock.now_millis(), self.validity_millis) {
                tracing::debug!(base, cached_at_millis = cached.cached_at_millis, "serving rates from cache");
                return Ok(cached);
            }
            tracing::debug!(base, "cached rates expired");
        }

        let payload = self.source.fetch_latest(base).await?;
        let snapshot = payload.into_snapshot(self.clock.now_millis());
        self.cache.put(&snapshot).await?;
        tracing::info!(
            base = %snapshot.base_currency,
            rate_count = snapshot.rates.len(),
            "fetched and cached latest rates"
        );
        Ok(snapshot)
    }
}
