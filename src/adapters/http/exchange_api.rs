//! HTTP client for the exchange-rate service.
//!
//! Wraps the `latest` endpoint of an exchangeratesapi.io-style service.
//! Fetches map HTTP / network / decode errors to
//! [`DomainError::RemoteFetch`]; client construction failures surface as
//! [`DomainError::HttpClient`].

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ApiConfig, LatestRates};
use crate::domain::ports::RateSource;

/// HTTP implementation of [`RateSource`].
#[derive(Debug, Clone)]
pub struct ExchangeRateApi {
    http: Client,
    base_url: String,
    access_key: Option<String>,
}

impl ExchangeRateApi {
    pub fn new(config: &ApiConfig) -> DomainResult<Self> {
        // Not a fetch failure; keep the builder error distinguishable.
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_key: config.access_key.clone(),
        })
    }
}

#[async_trait::async_trait]
impl RateSource for ExchangeRateApi {
    async fn fetch_latest(&self, base: &str) -> DomainResult<LatestRates> {
        let url = format!("{}/latest", self.base_url);
        let mut request = self.http.get(&url).query(&[("base", base)]);
        if let Some(key) = &self.access_key {
            request = request.query(&[("access_key", key)]);
        }

        tracing::debug!(base, %url, "fetching latest rates");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::RemoteFetch(format!(
                "rate service returned HTTP {status} for base {base}"
            )));
        }

        let dto: LatestRatesDto = response.json().await?;
        dto.into_latest_rates(base)
    }
}

/// Wire shape of the `latest` response. Every field is optional on the
/// wire; rates may arrive as JSON numbers or strings.
#[derive(Debug, Deserialize)]
struct LatestRatesDto {
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    rates: Option<HashMap<String, serde_json::Value>>,
}

impl LatestRatesDto {
    fn into_latest_rates(self, requested_base: &str) -> DomainResult<LatestRates> {
        let rates = self
            .rates
            .unwrap_or_default()
            .into_iter()
            .map(|(currency, value)| {
                let text = match value {
                    serde_json::Value::String(s) => s,
                    // serde_json's arbitrary_precision feature preserves
                    // the exact number text from the wire.
                    serde_json::Value::Number(n) => n.to_string(),
                    other => {
                        return Err(DomainError::RemoteFetch(format!(
                            "unexpected rate value for {currency}: {other}"
                        )))
                    }
                };
                Ok((currency, text))
            })
            .collect::<DomainResult<HashMap<_, _>>>()?;

        Ok(LatestRates {
            base: self.base.unwrap_or_else(|| requested_base.to_string()),
            date: self.date.unwrap_or_default(),
            rates,
        })
    }
}
