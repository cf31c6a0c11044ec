//! Services coordinating domain ports.

pub mod rates_repository;

pub use rates_repository::{RatesRepository, CACHE_VALIDITY_MILLIS, DEFAULT_BASE};
