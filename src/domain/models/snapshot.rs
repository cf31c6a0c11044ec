//! Rate snapshot and remote payload models.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A cached set of exchange rates for one base currency.
///
/// At most one snapshot exists per `base_currency`; updates are whole-row
/// replacements, never partial mutation. Rates are kept as decimal strings
/// so no floating-point precision is lost between the wire and the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSnapshot {
    /// Base currency code, the cache key.
    pub base_currency: String,
    /// Server-reported date label. Informational only.
    pub as_of_date: String,
    /// Target currency code to decimal-string rate.
    pub rates: HashMap<String, String>,
    /// Epoch milliseconds at which this snapshot was stored.
    pub cached_at_millis: i64,
}

impl RateSnapshot {
    /// Whether the snapshot is still valid at `now_millis`.
    ///
    /// The boundary is inclusive-exclusive: a snapshot aged exactly
    /// `validity_millis` is expired.
    pub fn is_fresh(&self, now_millis: i64, validity_millis: i64) -> bool {
        now_millis - self.cached_at_millis < validity_millis
    }
}

/// The payload a remote rate source returns for one base currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestRates {
    pub base: String,
    #[serde(default)]
    pub date: String,
    pub rates: HashMap<String, String>,
}

impl LatestRates {
    /// Build the snapshot to cache for this payload.
    pub fn into_snapshot(self, cached_at_millis: i64) -> RateSnapshot {
        RateSnapshot {
            base_currency: self.base,
            as_of_date: self.date,
            rates: self.rates,
            cached_at_millis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(cached_at_millis: i64) -> RateSnapshot {
        RateSnapshot {
            base_currency: "EUR".to_string(),
            as_of_date: "2026-01-26".to_string(),
            rates: HashMap::from([("USD".to_string(), "1.0856".to_string())]),
            cached_at_millis,
        }
    }

    #[test]
    fn fresh_strictly_inside_validity_window() {
        let s = snapshot(1_000);
        assert!(s.is_fresh(1_999, 1_000));
    }

    #[test]
    fn expired_exactly_at_validity_boundary() {
        let s = snapshot(1_000);
        assert!(!s.is_fresh(2_000, 1_000));
    }

    #[test]
    fn into_snapshot_carries_all_fields() {
        let payload = LatestRates {
            base: "USD".to_string(),
            date: "2026-01-26".to_string(),
            rates: HashMap::from([("EUR".to_string(), "0.9212".to_string())]),
        };
        let s = payload.into_snapshot(42);
        assert_eq!(s.base_currency, "USD");
        assert_eq!(s.as_of_date, "2026-01-26");
        assert_eq!(s.rates.get("EUR").map(String::as_str), Some("0.9212"));
        assert_eq!(s.cached_at_millis, 42);
    }
}
