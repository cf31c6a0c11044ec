//! HTTP adapters for remote rate sources.

pub mod exchange_api;

pub use exchange_api::ExchangeRateApi;
