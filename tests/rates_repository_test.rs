//! Integration tests for the cache-aside rates repository against a
//! real in-memory SQLite cache.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ratestash::adapters::sqlite::{create_migrated_test_pool, SqliteRatesCache};
use ratestash::domain::errors::{DomainError, DomainResult};
use ratestash::domain::models::{LatestRates, RateSnapshot};
use ratestash::domain::ports::{Clock, RateSource, RatesCache};
use ratestash::services::{RatesRepository, CACHE_VALIDITY_MILLIS};
use tokio_test::assert_ok;

// 2024-01-26 12:00:00 UTC
const CURRENT_TIME: i64 = 1_706_284_800_000;

struct FixedClock(AtomicI64);

impl FixedClock {
    fn at(millis: i64) -> Arc<Self> {
        Arc::new(Self(AtomicI64::new(millis)))
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Rate source that serves scripted responses and counts calls.
struct ScriptedSource {
    responses: tokio::sync::Mutex<VecDeque<DomainResult<LatestRates>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(responses: Vec<DomainResult<LatestRates>>) -> Arc<Self> {
        Arc::new(Self {
            responses: tokio::sync::Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateSource for ScriptedSource {
    async fn fetch_latest(&self, base: &str) -> DomainResult<LatestRates> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(DomainError::RemoteFetch(format!("no scripted response for {base}"))))
    }
}

fn latest(base: &str, date: &str, rates: &[(&str, &str)]) -> LatestRates {
    LatestRates {
        base: base.to_string(),
        date: date.to_string(),
        rates: rates
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<HashMap<_, _>>(),
    }
}

fn cached(base: &str, date: &str, rates: &[(&str, &str)], cached_at_millis: i64) -> RateSnapshot {
    RateSnapshot {
        base_currency: base.to_string(),
        as_of_date: date.to_string(),
        rates: rates
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<HashMap<_, _>>(),
        cached_at_millis,
    }
}

async fn test_cache() -> Arc<SqliteRatesCache> {
    let pool = create_migrated_test_pool().await.unwrap();
    Arc::new(SqliteRatesCache::new(pool))
}

/// Delegating cache that counts writes.
struct CountingCache {
    inner: Arc<SqliteRatesCache>,
    puts: AtomicUsize,
}

impl CountingCache {
    fn around(inner: Arc<SqliteRatesCache>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            puts: AtomicUsize::new(0),
        })
    }

    fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RatesCache for CountingCache {
    async fn get(&self, base: &str) -> DomainResult<Option<RateSnapshot>> {
        self.inner.get(base).await
    }
    async fn put(&self, snapshot: &RateSnapshot) -> DomainResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(snapshot).await
    }
    async fn delete(&self, base: &str) -> DomainResult<()> {
        self.inner.delete(base).await
    }
    async fn clear(&self) -> DomainResult<()> {
        self.inner.clear().await
    }
}

#[tokio::test]
async fn returns_cached_data_when_cache_is_valid() {
    let cache = test_cache().await;
    let entry = cached(
        "EUR",
        "2026-01-26",
        &[("USD", "1.0856"), ("GBP", "0.8432")],
        CURRENT_TIME - CACHE_VALIDITY_MILLIS / 2,
    );
    cache.put(&entry).await.unwrap();

    let source = ScriptedSource::new(vec![]);
    let repository = RatesRepository::new(source.clone(), cache, FixedClock::at(CURRENT_TIME));

    let result = repository.get_latest_rates("EUR").await.unwrap();

    assert_eq!(result, entry);
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn fetches_from_api_when_no_cache_exists() {
    let cache = test_cache().await;
    let source = ScriptedSource::new(vec![Ok(latest(
        "EUR",
        "2026-01-26",
        &[("USD", "1.0856"), ("GBP", "0.8432"), ("JPY", "162.35")],
    ))]);
    let repository = RatesRepository::new(source.clone(), cache.clone(), FixedClock::at(CURRENT_TIME));

    let result = repository.get_latest_rates("EUR").await.unwrap();

    assert_eq!(result.base_currency, "EUR");
    assert_eq!(result.as_of_date, "2026-01-26");
    assert_eq!(result.rates.len(), 3);
    assert_eq!(result.cached_at_millis, CURRENT_TIME);
    assert_eq!(source.call_count(), 1);

    let stored = cache.get("EUR").await.unwrap().unwrap();
    assert_eq!(stored, result);
}

#[tokio::test]
async fn cache_hit_performs_no_writes() {
    let inner = test_cache().await;
    let entry = cached("EUR", "2026-01-26", &[("USD", "1.0856")], CURRENT_TIME - 1_000);
    inner.put(&entry).await.unwrap();
    let cache = CountingCache::around(inner);

    let source = ScriptedSource::new(vec![]);
    let repository = RatesRepository::new(source.clone(), cache.clone(), FixedClock::at(CURRENT_TIME));

    let result = repository.get_latest_rates("EUR").await.unwrap();

    assert_eq!(result, entry);
    assert_eq!(source.call_count(), 0);
    assert_eq!(cache.put_count(), 0);
}

#[tokio::test]
async fn successful_fetch_writes_the_cache_exactly_once() {
    let cache = CountingCache::around(test_cache().await);
    let source = ScriptedSource::new(vec![Ok(latest("EUR", "2026-01-26", &[("USD", "1.0856")]))]);
    let repository = RatesRepository::new(source.clone(), cache.clone(), FixedClock::at(CURRENT_TIME));

    assert_ok!(repository.get_latest_rates("EUR").await);

    assert_eq!(source.call_count(), 1);
    assert_eq!(cache.put_count(), 1);
}

#[tokio::test]
async fn fetches_from_api_when_cache_is_expired() {
    let cache = test_cache().await;
    cache
        .put(&cached(
            "EUR",
            "2026-01-24",
            &[("USD", "1.0800")],
            CURRENT_TIME - CACHE_VALIDITY_MILLIS - 1_000,
        ))
        .await
        .unwrap();

    let source = ScriptedSource::new(vec![Ok(latest("EUR", "2026-01-26", &[("USD", "1.0856")]))]);
    let repository = RatesRepository::new(source.clone(), cache.clone(), FixedClock::at(CURRENT_TIME));

    let result = repository.get_latest_rates("EUR").await.unwrap();

    assert_eq!(result.as_of_date, "2026-01-26");
    assert_eq!(source.call_count(), 1);
    assert_eq!(cache.get("EUR").await.unwrap().unwrap().as_of_date, "2026-01-26");
}

#[tokio::test]
async fn entry_exactly_at_validity_boundary_is_expired() {
    let cache = test_cache().await;
    cache
        .put(&cached("EUR", "2026-01-25", &[("USD", "1.0850")], CURRENT_TIME - CACHE_VALIDITY_MILLIS))
        .await
        .unwrap();

    let source = ScriptedSource::new(vec![Ok(latest("EUR", "2026-01-26", &[("USD", "1.0856")]))]);
    let repository = RatesRepository::new(source.clone(), cache, FixedClock::at(CURRENT_TIME));

    assert_ok!(repository.get_latest_rates("EUR").await);

    assert_eq!(source.call_count(), 1);
}

#[tokio::test]
async fn entry_one_millisecond_inside_boundary_is_valid() {
    let cache = test_cache().await;
    let entry = cached(
        "EUR",
        "2026-01-25",
        &[("USD", "1.0850")],
        CURRENT_TIME - CACHE_VALIDITY_MILLIS + 1,
    );
    cache.put(&entry).await.unwrap();

    let source = ScriptedSource::new(vec![]);
    let repository = RatesRepository::new(source.clone(), cache, FixedClock::at(CURRENT_TIME));

    let result = repository.get_latest_rates("EUR").await.unwrap();

    assert_eq!(result, entry);
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn remote_failure_propagates_and_leaves_stale_entry_untouched() {
    let cache = test_cache().await;
    let stale = cached(
        "EUR",
        "2026-01-24",
        &[("USD", "1.0800")],
        CURRENT_TIME - CACHE_VALIDITY_MILLIS - 1,
    );
    cache.put(&stale).await.unwrap();

    let source = ScriptedSource::new(vec![Err(DomainError::RemoteFetch("connection refused".to_string()))]);
    let repository = RatesRepository::new(source.clone(), cache.clone(), FixedClock::at(CURRENT_TIME));

    let err = repository.get_latest_rates("EUR").await.unwrap_err();

    assert!(matches!(err, DomainError::RemoteFetch(_)));
    assert_eq!(cache.get("EUR").await.unwrap().unwrap(), stale);
}

#[tokio::test]
async fn cache_errors_are_not_masked() {
    struct BrokenCache;

    #[async_trait]
    impl RatesCache for BrokenCache {
        async fn get(&self, _base: &str) -> DomainResult<Option<RateSnapshot>> {
            Err(DomainError::CacheIo("disk full".to_string()))
        }
        async fn put(&self, _snapshot: &RateSnapshot) -> DomainResult<()> {
            Err(DomainError::CacheIo("disk full".to_string()))
        }
        async fn delete(&self, _base: &str) -> DomainResult<()> {
            Ok(())
        }
        async fn clear(&self) -> DomainResult<()> {
            Ok(())
        }
    }

    let source = ScriptedSource::new(vec![]);
    let repository = RatesRepository::new(source.clone(), Arc::new(BrokenCache), FixedClock::at(CURRENT_TIME));

    let err = repository.get_latest_rates("EUR").await.unwrap_err();

    assert!(matches!(err, DomainError::CacheIo(_)));
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn second_call_within_validity_window_is_served_from_cache() {
    let cache = test_cache().await;
    let source = ScriptedSource::new(vec![Ok(latest("USD", "2026-01-26", &[("EUR", "0.9212")]))]);
    let clock = FixedClock::at(CURRENT_TIME);
    let repository = RatesRepository::new(source.clone(), cache.clone(), clock.clone());

    let first = repository.get_latest_rates("USD").await.unwrap();
    assert_eq!(first.base_currency, "USD");
    assert_eq!(first.rates.get("EUR").map(String::as_str), Some("0.9212"));
    assert_eq!(first.cached_at_millis, CURRENT_TIME);

    // Twelve hours later, still within validity.
    clock.0.store(CURRENT_TIME + CACHE_VALIDITY_MILLIS / 2, Ordering::SeqCst);
    let second = repository.get_latest_rates("USD").await.unwrap();

    assert_eq!(second, first);
    assert_eq!(source.call_count(), 1);
}

#[tokio::test]
async fn default_base_is_eur() {
    let cache = test_cache().await;
    let entry = cached("EUR", "2026-01-26", &[("USD", "1.0856")], CURRENT_TIME);
    cache.put(&entry).await.unwrap();

    let source = ScriptedSource::new(vec![]);
    let repository = RatesRepository::new(source, cache, FixedClock::at(CURRENT_TIME));

    assert_eq!(repository.get_latest().await.unwrap(), entry);
}

#[tokio::test]
async fn custom_validity_window_is_honored() {
    let cache = test_cache().await;
    cache
        .put(&cached("EUR", "2026-01-26", &[("USD", "1.0856")], CURRENT_TIME - 500))
        .await
        .unwrap();

    let source = ScriptedSource::new(vec![Ok(latest("EUR", "2026-01-26", &[("USD", "1.0900")]))]);
    let repository = RatesRepository::new(source.clone(), cache, FixedClock::at(CURRENT_TIME))
        .with_validity_millis(100);

    repository.get_latest_rates("EUR").await.unwrap();

    assert_eq!(source.call_count(), 1);
}
