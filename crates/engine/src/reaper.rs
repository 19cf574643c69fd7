//! Expiry reaper
//!
//! Retires bundles whose interval has elapsed. Each pass runs in three
//! phases so no shared lock is ever held across disk I/O:
//!
//! 1. **Extract**: under the registry read lock (and each entry's own
//!    lock), copy out and seal every expired bundle.
//! 2. **Persist**: with no lock held, write each bundle's data.
//! 3. **Finalize**: insert the outcome into the completed log, then remove
//!    the bundle from the registry under the write lock.
//!
//! A bundle is therefore visible as "In Progress" until its completed
//! record exists, and appears in exactly one of the two collections
//! whenever the registry lock is free.
//!
//! [`ReaperHandle`] runs passes on a dedicated thread at the engine's
//! sweep interval.

use crate::engine::DiagnosticsEngine;
use chrono::{DateTime, Utc};
use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use strata_qdiag_durability::{try_persist, PersistOutcome};
use tracing::{debug, info, warn};

/// Name of the background reaper thread
pub const REAPER_THREAD_NAME: &str = "qdiag-reaper";

/// Counts from one reaper pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReapSummary {
    /// Bundles retired by this pass
    pub expired: usize,
    /// Retired with a Success record
    pub succeeded: usize,
    /// Retired with an Error record
    pub failed: usize,
}

/// Retires expired bundles
pub struct ExpiryReaper;

impl ExpiryReaper {
    /// Run one pass at the current time
    pub fn run_pass(engine: &DiagnosticsEngine) -> ReapSummary {
        Self::run_pass_at(engine, Utc::now())
    }

    /// Run one pass treating `now` as the current time.
    ///
    /// Persistence failures are absorbed into Error records; a pass never
    /// fails.
    pub fn run_pass_at(engine: &DiagnosticsEngine, now: DateTime<Utc>) -> ReapSummary {
        let expired = engine.registry().extract_expired(now);
        let mut summary = ReapSummary {
            expired: expired.len(),
            ..ReapSummary::default()
        };

        for bundle in expired {
            let query_id = bundle.metadata.query_id();
            let result = try_persist(bundle.metadata.output_path(), &bundle.data);
            match &result {
                Ok(persisted) => {
                    summary.succeeded += 1;
                    debug!(query_id = %query_id, ?persisted, "Retired query diagnostics bundle");
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!(
                        query_id = %query_id,
                        error = %e,
                        "Failed to write query diagnostics bundle"
                    );
                }
            }

            let outcome = PersistOutcome::from_result(&result);
            engine
                .completed_log()
                .insert(bundle.metadata, outcome.status, outcome.description);
            engine.registry().remove(query_id);
        }

        if summary.expired > 0 {
            debug!(
                expired = summary.expired,
                succeeded = summary.succeeded,
                failed = summary.failed,
                "Reaper pass complete"
            );
        }
        summary
    }
}

/// Handle to the background reaper thread.
///
/// The thread stops when [`stop`](Self::stop) is called or the handle is
/// dropped. Bundles still active at that point stay active.
pub struct ReaperHandle {
    stop_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl ReaperHandle {
    /// Spawn the reaper thread for `engine`
    pub fn spawn(engine: Arc<DiagnosticsEngine>) -> io::Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let thread = thread::Builder::new()
            .name(REAPER_THREAD_NAME.to_string())
            .spawn(move || {
                info!(
                    interval_ms = engine.sweep_interval().as_millis() as u64,
                    "Query diagnostics reaper started"
                );
                loop {
                    match stop_rx.recv_timeout(engine.sweep_interval()) {
                        Err(RecvTimeoutError::Timeout) => {
                            ExpiryReaper::run_pass(&engine);
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                info!("Query diagnostics reaper stopped");
            })?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            thread: Some(thread),
        })
    }

    /// Check if the reaper thread is still running
    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .map_or(false, |thread| !thread.is_finished())
    }

    /// Signal the thread and wait for it to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            // The thread may already be gone
            let _ = stop_tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Query diagnostics reaper thread panicked");
            }
        }
    }
}

impl Drop for ReaperHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ReaperHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaperHandle")
            .field("running", &self.is_running())
            .finish()
    }
}
