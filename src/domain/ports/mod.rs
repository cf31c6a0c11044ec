//! Port traits decoupling the core from storage, network, and time.

pub mod clock;
pub mod rate_source;
pub mod rates_cache;

pub use clock::{Clock, SystemClock};
pub use rate_source::RateSource;
pub use rates_cache::RatesCache;
