//! Currency exchange screen model: state, events, and actions driving
//! the rates-loading flow through the single-flight dispatcher.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::{mpsc, watch};

use crate::application::dispatcher::{Action, ActionDispatcher, ActionScope};
use crate::domain::errors::{DomainError, DomainResult};
use crate::services::RatesRepository;

/// Observable state of the currency screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrencyState {
    pub is_loading: bool,
    pub rates: Vec<(String, Decimal)>,
    pub timestamp: String,
    pub error_message: Option<String>,
}

/// One-shot notifications for the currency screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrencyEvent {
    ShowToast(String),
    ShowError { title: String, message: String },
    NavigateBack,
}

/// Human-readable "last refreshed" label, injected for tests.
pub trait TimestampProvider: Send + Sync {
    fn now_timestamp(&self) -> String;
}

/// Local wall-clock timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimestamps;

impl TimestampProvider for SystemTimestamps {
    fn now_timestamp(&self) -> String {
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Read-only dependency bundle shared by all currency actions.
pub struct CurrencyDeps {
    pub repository: Arc<RatesRepository>,
    pub timestamps: Arc<dyn TimestampProvider>,
}

/// Actions the currency screen can dispatch. All three drive the same
/// load routine; they differ only in what UI gesture triggered them.
#[derive(Debug, Clone, Copy)]
pub enum CurrencyAction {
    LoadRates,
    RefreshRates,
    RetryLoad,
}

#[async_trait]
impl Action<CurrencyDeps, CurrencyState, CurrencyEvent> for CurrencyAction {
    async fn execute(&self, deps: &CurrencyDeps, scope: &ActionScope<CurrencyState, CurrencyEvent>) {
        match self {
            Self::LoadRates | Self::RefreshRates | Self::RetryLoad => load_rates(deps, scope).await,
        }
    }
}

async fn load_rates(deps: &CurrencyDeps, scope: &ActionScope<CurrencyState, CurrencyEvent>) {
    // Belt-and-suspenders with the dispatcher's single-flight slot, in
    // case state hasn't caught up yet.
    if scope.current_state().is_loading {
        return;
    }

    scope.set_state(|s| CurrencyState {
        is_loading: true,
        error_message: None,
        ..s
    });

    match fetch_mapped_rates(deps).await {
        Ok(rates) => {
            let timestamp = deps.timestamps.now_timestamp();
            scope.set_state(|_| CurrencyState {
                is_loading: false,
                rates,
                timestamp,
                error_message: None,
            });
        }
        Err(err) => {
            let message = display_message(&err);
            tracing::warn!(error = %err, "rates load failed");
            scope.set_state(|s| CurrencyState {
                is_loading: false,
                error_message: Some(message.clone()),
                ..s
            });
            scope
                .send_event(CurrencyEvent::ShowToast(format!("Failed to load rates: {message}")))
                .await;
        }
    }
}

/// Fetch the latest snapshot and map it to a sorted display list.
async fn fetch_mapped_rates(deps: &CurrencyDeps) -> DomainResult<Vec<(String, Decimal)>> {
    let snapshot = deps.repository.get_latest().await?;

    let mut rates = snapshot
        .rates
        .into_iter()
        .map(|(currency, value)| match Decimal::from_str(&value) {
            Ok(rate) => Ok((currency, rate)),
            Err(_) => Err(DomainError::InvalidRate { currency, value }),
        })
        .collect::<DomainResult<Vec<_>>>()?;

    rates.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(rates)
}

fn display_message(err: &DomainError) -> String {
    let message = err.to_string();
    if message.is_empty() {
        "Unknown error occurred".to_string()
    } else {
        message
    }
}

/// The currency screen's view-model: a dispatcher wired with its
/// dependency bundle.
pub struct CurrencyModel {
    dispatcher: ActionDispatcher<CurrencyDeps, CurrencyState, CurrencyEvent>,
}

impl CurrencyModel {
    pub fn new(repository: Arc<RatesRepository>) -> Self {
        Self::with_timestamps(repository, Arc::new(SystemTimestamps))
    }

    pub fn with_timestamps(repository: Arc<RatesRepository>, timestamps: Arc<dyn TimestampProvider>) -> Self {
        let deps = CurrencyDeps { repository, timestamps };
        Self {
            dispatcher: ActionDispatcher::new(CurrencyState::default(), deps),
        }
    }

    /// Submit an action; returns `false` if dropped because another
    /// action is in flight.
    pub fn submit(&self, action: CurrencyAction) -> bool {
        self.dispatcher.submit(action)
    }

    /// Snapshot of the current screen state.
    pub fn current_state(&self) -> CurrencyState {
        self.dispatcher.current_state()
    }

    /// Observe the state stream.
    pub fn state(&self) -> watch::Receiver<CurrencyState> {
        self.dispatcher.subscribe()
    }

    /// Take the one-shot event stream (first caller only).
    pub fn take_events(&self) -> Option<mpsc::Receiver<CurrencyEvent>> {
        self.dispatcher.take_events()
    }

    /// Cancel any in-flight action (screen teardown).
    pub fn close(&self) {
        self.dispatcher.close();
    }
}
