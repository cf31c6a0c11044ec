//! Application layer: the action-dispatch runtime and the screen models
//! built on it.

pub mod currency;
pub mod dispatcher;

pub use currency::{
    CurrencyAction, CurrencyDeps, CurrencyEvent, CurrencyModel, CurrencyState, SystemTimestamps,
    TimestampProvider,
};
pub use dispatcher::{Action, ActionDispatcher, ActionScope};
