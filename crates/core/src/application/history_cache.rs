// History Cache - read-through cache of past match records
// Stale-but-available: a failed refresh keeps serving the last good sequence

use crate::application::lock;
use crate::domain::HistoryRecord;
use crate::port::HistorySource;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// History refresh failed; cached records are still served
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("history refresh failed, serving {cached} cached record(s): {reason}")]
pub struct StaleDataWarning {
    pub reason: String,
    pub cached: usize,
}

/// Result of one refresh. Never an error: failures degrade to `Stale`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Cache wholesale-replaced with `count` records
    Refreshed { count: usize },
    /// Fetch failed, prior contents kept
    Stale(StaleDataWarning),
    /// A newer refresh was applied first; this response was dropped
    Superseded,
}

struct CacheState {
    records: Arc<Vec<HistoryRecord>>,
    applied_seq: u64,
}

/// Ordered cache of the server's history
///
/// Server order is preserved exactly: no sorting, no deduplication.
pub struct HistoryCache {
    source: Arc<dyn HistorySource>,
    state: Mutex<CacheState>,
    issued_seq: AtomicU64,
    status: watch::Sender<Option<RefreshOutcome>>,
}

impl HistoryCache {
    pub fn new(source: Arc<dyn HistorySource>) -> Self {
        let (status, _) = watch::channel(None);
        Self {
            source,
            state: Mutex::new(CacheState {
                records: Arc::new(Vec::new()),
                applied_seq: 0,
            }),
            issued_seq: AtomicU64::new(0),
            status,
        }
    }

    /// Fetch the full history and replace the cache
    ///
    /// Each call takes a sequence number; a response older than the last
    /// applied one is dropped so overlapping refreshes cannot roll back.
    pub async fn refresh(&self) -> RefreshOutcome {
        let seq = self.issued_seq.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(seq, "Refreshing history");

        let outcome = match self.source.fetch_history().await {
            Ok(records) => {
                let count = records.len();
                let applied = {
                    let mut state = lock(&self.state);
                    if seq < state.applied_seq {
                        false
                    } else {
                        state.records = Arc::new(records);
                        state.applied_seq = seq;
                        true
                    }
                };

                if applied {
                    info!(seq, records = count, "History refreshed");
                    RefreshOutcome::Refreshed { count }
                } else {
                    debug!(seq, "History response superseded by a newer refresh");
                    RefreshOutcome::Superseded
                }
            }
            Err(e) => {
                let cached = self.len();
                warn!(seq, error = %e, cached, "History refresh failed; serving cached records");
                RefreshOutcome::Stale(StaleDataWarning {
                    reason: e.to_string(),
                    cached,
                })
            }
        };

        self.status.send_replace(Some(outcome.clone()));
        outcome
    }

    /// Shared snapshot of the cached sequence
    pub fn records(&self) -> Arc<Vec<HistoryRecord>> {
        Arc::clone(&lock(&self.state).records)
    }

    pub fn len(&self) -> usize {
        lock(&self.state).records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Outcome of the latest completed refresh, `None` before the first one
    pub fn last_outcome(&self) -> Option<RefreshOutcome> {
        self.status.borrow().clone()
    }

    /// Receiver notified after every refresh completes
    pub fn subscribe(&self) -> watch::Receiver<Option<RefreshOutcome>> {
        self.status.subscribe()
    }
}
