//! Single-flight action dispatcher.
//!
//! A dispatcher owns one screen's state and event streams and runs at
//! most one action at a time against them. A submission made while an
//! action is in flight is dropped, not queued: first-action-wins,
//! in-flight duplicates are discarded.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinHandle;

/// Events buffered before a subscriber attaches.
const EVENT_BUFFER: usize = 64;

/// A typed command that can mutate state and emit events.
///
/// Actions are expected to catch their own errors and translate them
/// into a state update and/or an event. A panicking action is fatal to
/// that one task only; the dispatch slot is still released.
#[async_trait]
pub trait Action<D, S, E>: Send + Sync
where
    S: Clone + Send + Sync,
    E: Send,
{
    async fn execute(&self, deps: &D, scope: &ActionScope<S, E>);
}

/// Provides controlled access to state mutations and event emissions.
pub struct ActionScope<S, E> {
    state_tx: Arc<watch::Sender<S>>,
    event_tx: mpsc::Sender<E>,
}

impl<S, E> ActionScope<S, E>
where
    S: Clone + Send + Sync,
    E: Send,
{
    /// Snapshot of the state at the time of the call.
    pub fn current_state(&self) -> S {
        self.state_tx.borrow().clone()
    }

    /// Atomically apply a pure transform and publish the new state to
    /// all observers.
    pub fn set_state<F>(&self, transform: F)
    where
        F: FnOnce(S) -> S,
    {
        self.state_tx.send_modify(|state| *state = transform(state.clone()));
    }

    /// Push a one-shot event.
    ///
    /// Buffered until a subscriber takes the event stream; waits when
    /// the buffer is full rather than dropping.
    pub async fn send_event(&self, event: E) {
        if self.event_tx.send(event).await.is_err() {
            tracing::warn!("event dropped, subscriber has gone away");
        }
    }
}

/// Generic single-flight state container.
///
/// One instance per screen. State is observable through [`subscribe`]
/// (last-write-wins snapshots); events are delivered at most once
/// through the receiver handed out by [`take_events`].
///
/// [`subscribe`]: ActionDispatcher::subscribe
/// [`take_events`]: ActionDispatcher::take_events
pub struct ActionDispatcher<D, S, E> {
    deps: Arc<D>,
    state_tx: Arc<watch::Sender<S>>,
    // Keeps the channel open so publishing never fails with zero
    // external observers.
    _state_rx: watch::Receiver<S>,
    event_tx: mpsc::Sender<E>,
    event_rx: Mutex<Option<mpsc::Receiver<E>>>,
    slot: Arc<Semaphore>,
    running: Mutex<Option<JoinHandle<()>>>,
}

impl<D, S, E> ActionDispatcher<D, S, E>
where
    D: Send + Sync + 'static,
    S: Clone + Send + Sync + 'static,
    E: Send + 'static,
{
    pub fn new(initial_state: S, deps: D) -> Self {
        let (state_tx, state_rx) = watch::channel(initial_state);
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);

        Self {
            deps: Arc::new(deps),
            state_tx: Arc::new(state_tx),
            _state_rx: state_rx,
            event_tx,
            event_rx: Mutex::new(Some(event_rx)),
            slot: Arc::new(Semaphore::new(1)),
            running: Mutex::new(None),
        }
    }

    /// Submit an action for execution.
    ///
    /// Returns `false` when another action currently holds the dispatch
    /// slot; the submission is dropped and its effects never happen.
    /// The slot is released on every exit path: normal completion,
    /// panic, and cancellation via [`close`](ActionDispatcher::close).
    pub fn submit<A>(&self, action: A) -> bool
    where
        A: Action<D, S, E> + 'static,
    {
        let Ok(permit) = Arc::clone(&self.slot).try_acquire_owned() else {
            tracing::debug!("action dropped, another action is in flight");
            return false;
        };

        let deps = Arc::clone(&self.deps);
        let scope = ActionScope {
            state_tx: Arc::clone(&self.state_tx),
            event_tx: self.event_tx.clone(),
        };

        let handle = tokio::spawn(async move {
            // Moved into the task so dropping the future on any exit
            // path releases the slot.
            let _permit = permit;
            action.execute(&deps, &scope).await;
        });

        if let Ok(mut running) = self.running.lock() {
            *running = Some(handle);
        }
        true
    }

    /// Snapshot of the current state.
    pub fn current_state(&self) -> S {
        self.state_tx.borrow().clone()
    }

    /// Observe the state stream. Receivers see last-write-wins
    /// snapshots; no stale state is delivered after a newer publish.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.state_tx.subscribe()
    }

    /// Take the one-shot event stream.
    ///
    /// The receiver exists once: the first caller gets it, later calls
    /// get `None`. Events emitted before this call are buffered;
    /// already-delivered events are never replayed.
    pub fn take_events(&self) -> Option<mpsc::Receiver<E>> {
        self.event_rx.lock().ok().and_then(|mut rx| rx.take())
    }

    /// Cancel the in-flight action, if any. The dispatch slot is
    /// released as the cancelled task is dropped.
    pub fn close(&self) {
        if let Ok(mut running) = self.running.lock() {
            if let Some(handle) = running.take() {
                handle.abort();
            }
        }
    }
}

impl<D, S, E> Drop for ActionDispatcher<D, S, E> {
    fn drop(&mut self) {
        // close() lives in the bounded impl; Drop cannot carry those
        // bounds, so the abort is inlined here.
        if let Ok(mut running) = self.running.lock() {
            if let Some(handle) = running.take() {
                handle.abort();
            }
        }
    }
}
