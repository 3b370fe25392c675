//! Best-effort durable writes for session records.
//!
//! A failed post never becomes an error for the caller: the record moves to
//! the pending queue and waits for [`SessionRecorder::flush_pending`].

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::pending::{PendingEntry, PendingQueue};
use crate::record::SessionRecord;
use crate::transport::Transport;

/// What happened to a single `persist` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PersistOutcome {
    Persisted,
    /// Post failed; the record is queued.
    Queued { pending: usize },
    /// Credentials were rejected; the record is queued until they are fixed.
    AuthRejected { pending: usize },
}

/// Result of one `flush_pending` pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushReport {
    pub attempted: usize,
    pub persisted: usize,
    pub remaining: usize,
    pub auth_rejected: bool,
    /// Another flush was already running; nothing was attempted.
    pub skipped: bool,
}

pub struct SessionRecorder<T: Transport> {
    transport: T,
    pending: Mutex<PendingQueue>,
    flushing: AtomicBool,
    flush_on_success: bool,
}

impl<T: Transport> SessionRecorder<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            pending: Mutex::new(PendingQueue::new()),
            flushing: AtomicBool::new(false),
            flush_on_success: true,
        }
    }

    /// Seed the queue, e.g. with entries loaded from disk.
    pub fn with_pending(self, queue: PendingQueue) -> Self {
        *self.queue() = queue;
        self
    }

    /// Retry the queue after every successful post (on by default).
    pub fn flush_on_success(mut self, enabled: bool) -> Self {
        self.flush_on_success = enabled;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn pending_count(&self) -> usize {
        self.queue().len()
    }

    pub fn pending_records(&self) -> Vec<SessionRecord> {
        self.queue().records()
    }

    pub fn pending_entries(&self) -> Vec<PendingEntry> {
        self.queue().snapshot()
    }

    pub fn save_pending(&self, path: &Path) -> crate::error::Result<()> {
        let snapshot = self.queue().clone();
        snapshot.save(path)
    }

    /// Post one record. Failures are queued, never returned.
    pub async fn persist(&self, record: SessionRecord) -> PersistOutcome {
        match self.transport.post_session(&record.to_payload()).await {
            Ok(()) => {
                info!(
                    phase = %record.phase(),
                    duration = record.duration_minutes(),
                    "session persisted"
                );
                let has_pending = self.pending_count() > 0;
                if self.flush_on_success && has_pending {
                    let report = self.flush_pending().await;
                    debug!(?report, "opportunistic flush");
                }
                PersistOutcome::Persisted
            }
            Err(err) => {
                let auth = err.is_auth();
                let pending = {
                    let mut queue = self.queue();
                    queue.push(record, err.to_string());
                    queue.len()
                };
                warn!(error = %err, pending, "session queued for retry");
                if auth {
                    PersistOutcome::AuthRejected { pending }
                } else {
                    PersistOutcome::Queued { pending }
                }
            }
        }
    }

    /// Retry every pending record in order.
    ///
    /// Only acknowledged records leave the queue; the rest keep their
    /// relative order, as do records queued while the flush was running.
    pub async fn flush_pending(&self) -> FlushReport {
        if self.flushing.swap(true, Ordering::AcqRel) {
            return FlushReport {
                remaining: self.pending_count(),
                skipped: true,
                ..FlushReport::default()
            };
        }
        let _guard = FlushGuard(&self.flushing);

        let batch = self.queue().snapshot();
        let mut report = FlushReport::default();
        let mut persisted: HashSet<Uuid> = HashSet::new();
        let mut failures: Vec<(Uuid, String)> = Vec::new();

        for entry in &batch {
            report.attempted += 1;
            match self.transport.post_session(&entry.record.to_payload()).await {
                Ok(()) => {
                    persisted.insert(entry.id);
                }
                Err(err) => {
                    let auth = err.is_auth();
                    failures.push((entry.id, err.to_string()));
                    if auth {
                        // Every remaining post would be rejected the same way.
                        report.auth_rejected = true;
                        break;
                    }
                }
            }
        }

        let mut queue = self.queue();
        report.persisted = queue.remove(&persisted);
        for (id, error) in failures {
            queue.record_failure(id, error);
        }
        report.remaining = queue.len();
        drop(queue);

        if report.attempted > 0 {
            info!(
                attempted = report.attempted,
                persisted = report.persisted,
                remaining = report.remaining,
                "pending flush finished"
            );
        }
        report
    }

    fn queue(&self) -> MutexGuard<'_, PendingQueue> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct FlushGuard<'a>(&'a AtomicBool);

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
