//! Connectivity and pending-changes indicator.
//!
//! Mirrors the sync manager's connectivity flag and polls the offline store's
//! queue length on a fixed interval. Hosts render [`IndicatorStatus::badge`]:
//! nothing while online with an empty queue, a status affordance otherwise.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{Instrument, debug, info_span, warn};

use crate::{
    config::IndicatorConfig,
    offline::{OfflineStore, OfflineStoreExt},
};

/// What the indicator currently knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorStatus {
    pub online: bool,
    /// Queue length as of the last successful poll.
    pub pending: usize,
}

impl IndicatorStatus {
    /// The affordance to show, or `None` when there is nothing to report.
    pub fn badge(&self) -> Option<Badge> {
        match (self.online, self.pending) {
            (true, 0) => None,
            (true, pending) => Some(Badge::Pending { pending }),
            (false, pending) => Some(Badge::Offline { pending }),
        }
    }
}

/// A visible connectivity badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    /// Connectivity is down; `pending` changes are waiting.
    Offline { pending: usize },
    /// Online, but changes have not reached the remote yet.
    Pending { pending: usize },
}

impl Badge {
    pub fn label(&self) -> String {
        match *self {
            Badge::Offline { pending: 0 } => "Offline".to_string(),
            Badge::Offline { pending } => format!("Offline · {} pending", changes(pending)),
            Badge::Pending { pending } => format!("Syncing {}", changes(pending)),
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn changes(count: usize) -> String {
    if count == 1 {
        "1 change".to_string()
    } else {
        format!("{count} changes")
    }
}

/// Polls queue length and follows connectivity transitions.
#[derive(Debug)]
pub struct ConnectivityIndicator {
    store: Arc<dyn OfflineStore>,
    connectivity: watch::Receiver<bool>,
    status: Arc<watch::Sender<IndicatorStatus>>,
    config: IndicatorConfig,
}

impl ConnectivityIndicator {
    pub fn new(
        store: Arc<dyn OfflineStore>,
        connectivity: watch::Receiver<bool>,
        config: IndicatorConfig,
    ) -> Self {
        let online = *connectivity.borrow();
        let (status, _) = watch::channel(IndicatorStatus { online, pending: 0 });
        Self {
            store,
            connectivity,
            status: Arc::new(status),
            config,
        }
    }

    pub fn status(&self) -> IndicatorStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<IndicatorStatus> {
        self.status.subscribe()
    }

    /// Read the queue length once.
    ///
    /// On failure the error is logged, the previous count is kept, and
    /// `None` is returned.
    pub async fn poll_once(&self) -> Option<usize> {
        match self.store.pending_count().await {
            Ok(pending) => {
                self.status.send_if_modified(|status| {
                    let changed = status.pending != pending;
                    status.pending = pending;
                    changed
                });
                Some(pending)
            }
            Err(e) => {
                warn!("Failed to poll sync queue: {e}");
                None
            }
        }
    }

    /// Copy the latest connectivity flag into the status.
    pub fn refresh_connectivity(&mut self) {
        let online = *self.connectivity.borrow_and_update();
        self.status.send_if_modified(|status| {
            let changed = status.online != online;
            status.online = online;
            changed
        });
    }

    /// Run the polling loop on the current tokio runtime.
    pub fn spawn(mut self) -> IndicatorHandle {
        let status = self.status.subscribe();
        let shared = self.status.clone();
        let task = tokio::spawn(
            async move {
                let mut ticker = interval(self.config.poll_interval.max(Duration::from_millis(1)));
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        // The first tick fires immediately, giving an initial count.
                        _ = ticker.tick() => {
                            self.poll_once().await;
                        }
                        changed = self.connectivity.changed() => {
                            if changed.is_err() {
                                debug!("Connectivity source dropped, stopping indicator");
                                break;
                            }
                            self.refresh_connectivity();
                        }
                    }
                }
            }
            .instrument(info_span!("connectivity_indicator")),
        );
        IndicatorHandle {
            status,
            _sender: shared,
            task,
        }
    }
}

/// Handle to a running indicator loop.
#[derive(Debug)]
pub struct IndicatorHandle {
    status: watch::Receiver<IndicatorStatus>,
    /// Keeps the status channel open after the loop stops, so readers still
    /// see the last known value.
    _sender: Arc<watch::Sender<IndicatorStatus>>,
    task: JoinHandle<()>,
}

impl IndicatorHandle {
    pub fn status(&self) -> IndicatorStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<IndicatorStatus> {
        self.status.clone()
    }

    /// Stop polling. The last status stays readable.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for IndicatorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
