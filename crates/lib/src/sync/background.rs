//! Background sync engine implementation.
//!
//! [`BackgroundSync`] runs in a single tokio task and decides *when* to call
//! [`SyncManager::sync`]: on every offline-to-online transition, on a
//! periodic timer while the queue is non-empty, and on explicit request.
//! Failures are logged and the loop keeps running.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{Instrument, debug, error, info, info_span};

use super::{SyncError, SyncManager, SyncReport};
use crate::{Result, offline::OfflineStoreExt};

/// Commands that can be sent to the background sync engine
#[derive(Debug)]
pub enum SyncCommand {
    /// Run a sync pass now, optionally reporting its result.
    SyncNow {
        response: Option<oneshot::Sender<Result<SyncReport>>>,
    },
    /// Shutdown the background engine
    Shutdown,
}

/// Background engine that owns the trigger logic for a [`SyncManager`].
pub struct BackgroundSync {
    manager: Arc<SyncManager>,
    connectivity: watch::Receiver<bool>,
    was_online: bool,
    command_rx: mpsc::Receiver<SyncCommand>,
}

impl BackgroundSync {
    /// Start the engine on the current tokio runtime.
    pub fn start(manager: Arc<SyncManager>) -> BackgroundHandle {
        let (tx, rx) = mpsc::channel(32);
        // Mark the current state as seen here, not in the task, so a
        // transition made before the task is first polled still fires.
        let mut connectivity = manager.subscribe();
        let was_online = *connectivity.borrow_and_update();
        let background = Self {
            manager,
            connectivity,
            was_online,
            command_rx: rx,
        };
        let task = tokio::spawn(background.run());
        BackgroundHandle { tx, task }
    }

    /// Main event loop
    async fn run(mut self) {
        async move {
            info!("Starting background sync engine");
            let period = self
                .manager
                .config()
                .periodic_interval
                .max(Duration::from_millis(1));
            let mut periodic = interval(period);
            periodic.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Skip initial tick to avoid immediate execution
            periodic.tick().await;

            loop {
                tokio::select! {
                    cmd = self.command_rx.recv() => match cmd {
                        Some(SyncCommand::SyncNow { response }) => {
                            let result = self.manager.sync().await;
                            if let Err(e) = &result {
                                debug!("Requested sync failed: {e}");
                            }
                            if let Some(response) = response {
                                let _ = response.send(result);
                            }
                        }
                        Some(SyncCommand::Shutdown) | None => {
                            info!("Background sync engine shutting down");
                            break;
                        }
                    },

                    changed = self.connectivity.changed() => {
                        if changed.is_err() {
                            info!("Sync manager dropped, stopping background sync");
                            break;
                        }
                        let online = *self.connectivity.borrow_and_update();
                        if online && !self.was_online {
                            info!("Back online, draining pending changes");
                            self.run_pass().await;
                        }
                        self.was_online = online;
                    }

                    _ = periodic.tick() => {
                        if self.manager.is_currently_online() {
                            self.run_pass_if_pending().await;
                        }
                    }
                }
            }
        }
        .instrument(info_span!("background_sync"))
        .await
    }

    async fn run_pass(&self) {
        match self.manager.sync().await {
            Ok(report) => debug!(?report, "Background sync pass finished"),
            // Log errors but continue running - background sync should be resilient
            Err(e) => error!("Background sync failed: {e}"),
        }
    }

    async fn run_pass_if_pending(&self) {
        match self.manager.store().pending_count().await {
            Ok(0) => {}
            Ok(_) => self.run_pass().await,
            Err(e) => error!("Failed to read sync queue: {e}"),
        }
    }
}

/// Handle to a running [`BackgroundSync`] task.
#[derive(Debug)]
pub struct BackgroundHandle {
    tx: mpsc::Sender<SyncCommand>,
    task: JoinHandle<()>,
}

impl BackgroundHandle {
    /// Queue a sync pass without waiting for it.
    pub async fn trigger(&self) -> Result<()> {
        self.tx
            .send(SyncCommand::SyncNow { response: None })
            .await
            .map_err(|e| SyncError::CommandSendError(e.to_string()).into())
    }

    /// Run a sync pass on the engine and wait for its report.
    pub async fn sync_now(&self) -> Result<SyncReport> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(SyncCommand::SyncNow { response: Some(tx) })
            .await
            .map_err(|e| SyncError::CommandSendError(e.to_string()))?;
        rx.await
            .map_err(|e| SyncError::CommandSendError(format!("Response channel error: {e}")))?
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the engine and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.tx.send(SyncCommand::Shutdown).await;
        if let Err(e) = self.task.await {
            error!("Background sync task ended abnormally: {e}");
        }
    }
}
