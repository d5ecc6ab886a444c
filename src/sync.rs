//! Periodic, additive synchronisation of the quote store with a remote source

use crate::core::error::{QuoteError, Result};
use crate::core::notify::{Notification, Notifier};
use crate::core::quote::QuoteRecord;
use crate::core::quote_store::QuoteStore;
use crate::core::remote::RemoteQuoteSource;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Number of remote records that were new to the store.
    Added(usize),
    /// Another sync was still running; nothing was fetched.
    AlreadyInProgress,
}

/// Clears the in-flight flag however the sync ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SyncAgent {
    store: Arc<Mutex<QuoteStore>>,
    remote: Arc<dyn RemoteQuoteSource>,
    notifier: Arc<dyn Notifier>,
    in_flight: AtomicBool,
}

impl SyncAgent {
    pub fn new(
        store: Arc<Mutex<QuoteStore>>,
        remote: Arc<dyn RemoteQuoteSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            remote,
            notifier,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn fetch_remote(&self) -> Result<Vec<QuoteRecord>> {
        self.remote
            .fetch_remote()
            .await
            .map_err(|e| QuoteError::SyncFailed(format!("{e:#}")))
    }

    /// Best effort. A failed push is logged and otherwise ignored.
    pub async fn push_local(&self, record: &QuoteRecord) {
        if let Err(e) = self.remote.push_local(record).await {
            warn!(error = %e, "Failed to push quote to server");
        }
    }

    /// Fetches remote records and merges the unseen ones into the store.
    ///
    /// The store lock is only taken for the merge, never across the fetch.
    /// A fetch failure leaves the store untouched.
    pub async fn sync(&self) -> Result<SyncOutcome> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            debug!("Sync requested while another is in flight");
            self.notifier.notify(&Notification::SyncSkipped);
            return Ok(SyncOutcome::AlreadyInProgress);
        };

        let records = match self.fetch_remote().await {
            Ok(records) => records,
            Err(e) => {
                self.notifier.notify(&Notification::SyncFailed {
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };

        let merged = {
            let mut store = self.store.lock().await;
            let merged = store.merge(records).await;
            if merged.is_ok()
                && let Err(e) = store.mark_synced(Utc::now()).await
            {
                debug!("Failed to record sync time: {}", e);
            }
            merged
        };
        let added = match merged {
            Ok(added) => added,
            Err(e) => {
                warn!(error = %e, "Failed to store synced quotes");
                self.notifier.notify(&Notification::SyncFailed {
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };

        info!(added, "Sync finished");
        self.notifier.notify(&Notification::Synced { added });
        Ok(SyncOutcome::Added(added))
    }

    /// Follow-up for a local add: notify the server, then pull.
    pub async fn after_local_add(&self, record: &QuoteRecord) -> Result<SyncOutcome> {
        self.push_local(record).await;
        self.sync().await
    }

    /// Starts syncing now and then every `every`. Each tick runs in its own
    /// task, so stopping the schedule does not abort a fetch in progress.
    pub fn start(self: &Arc<Self>, every: Duration) -> SyncSchedule {
        let agent = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let agent = Arc::clone(&agent);
                tokio::spawn(async move {
                    if let Err(e) = agent.sync().await {
                        debug!("Scheduled sync failed: {}", e);
                    }
                });
            }
        });
        info!(interval = ?every, "Started periodic sync");
        SyncSchedule { handle }
    }
}

/// Handle to the periodic timer. Dropping it stops the timer.
pub struct SyncSchedule {
    handle: JoinHandle<()>,
}

impl SyncSchedule {
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for SyncSchedule {
    fn drop(&mut self) {
        self.handle.abort();
        debug!("Stopped periodic sync");
    }
}
