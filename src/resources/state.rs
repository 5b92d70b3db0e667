//! Observable resource state

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::client::{AuthGate, AuthStatus};
use crate::error::Result;

/// What a resource currently shows
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    pub data: T,
    /// A visible refresh is in flight
    pub loading: bool,
    /// Last backend error, cleared by the next successful refresh
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T: Default> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            data: T::default(),
            loading: false,
            error: None,
            last_updated: None,
        }
    }
}

/// How a refresh presents itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// User-initiated: `loading` is raised while the fetch runs
    Visible,
    /// Event-driven: `loading` is left alone
    Silent,
}

/// Shared state of one resource, updated by refreshes.
///
/// When refreshes overlap, the one started last decides the data.
pub struct StateCell<T> {
    tx: watch::Sender<ResourceState<T>>,
    started: AtomicU64,
    applied: AtomicU64,
    visible_in_flight: AtomicUsize,
}

impl<T> StateCell<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    pub fn new() -> Arc<Self> {
        let (tx, _) = watch::channel(ResourceState::default());
        Arc::new(Self {
            tx,
            started: AtomicU64::new(0),
            applied: AtomicU64::new(0),
            visible_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn snapshot(&self) -> ResourceState<T> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.tx.subscribe()
    }

    /// Run `fetch` and fold its outcome into the state.
    ///
    /// Without an authenticated session nothing is fetched: the state is
    /// emptied, and stays `loading` while the session check is pending.
    /// Errors are returned as well as recorded; auth-precondition errors
    /// are never recorded.
    pub async fn refresh<F, Fut>(&self, gate: &AuthGate, mode: RefreshMode, fetch: F) -> Result<()>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match gate.status() {
            AuthStatus::Authenticated => {}
            status => {
                self.tx.send_replace(ResourceState {
                    loading: status == AuthStatus::Unknown,
                    ..ResourceState::default()
                });
                return Ok(());
            }
        }

        let seq = self.started.fetch_add(1, Ordering::SeqCst) + 1;
        if mode == RefreshMode::Visible {
            self.visible_in_flight.fetch_add(1, Ordering::SeqCst);
            self.tx.send_modify(|state| state.loading = true);
        }

        let result = fetch().await;

        let latest = self.applied.fetch_max(seq, Ordering::SeqCst) < seq;
        let still_loading = match mode {
            RefreshMode::Visible => self.visible_in_flight.fetch_sub(1, Ordering::SeqCst) > 1,
            RefreshMode::Silent => self.visible_in_flight.load(Ordering::SeqCst) > 0,
        };

        match result {
            Ok(data) => {
                self.tx.send_modify(|state| {
                    if latest {
                        state.data = data;
                        state.error = None;
                        state.last_updated = Some(Utc::now());
                    }
                    state.loading = still_loading;
                });
                Ok(())
            }
            Err(e) => {
                let shown = latest && !e.is_auth_precondition();
                if !shown {
                    log::debug!("Refresh failed quietly: {}", e);
                }
                self.tx.send_modify(|state| {
                    if shown {
                        state.error = Some(e.to_string());
                    }
                    state.loading = still_loading;
                });
                Err(e)
            }
        }
    }
}
