//! Port for the remote rate source.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::LatestRates;

/// Remote lookup of the latest rates for a base currency.
///
/// Network and parsing failures propagate as
/// [`DomainError::RemoteFetch`](crate::domain::errors::DomainError::RemoteFetch).
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_latest(&self, base: &str) -> DomainResult<LatestRates>;
}
