use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::session_recorder::{PersistOutcome, SessionRecorder};
use crate::record::SessionRecord;
use crate::transport::Transport;

/// Drain records submitted through a [`ChannelSink`](super::ChannelSink).
///
/// Records are persisted one at a time so the remote store sees them in
/// completion order. When `pending_path` is set the queue is written to disk
/// after every record that leaves or changes it. Returns once every sender
/// is dropped.
pub async fn run_recorder_worker<T: Transport>(
    recorder: Arc<SessionRecorder<T>>,
    mut records: mpsc::UnboundedReceiver<SessionRecord>,
    pending_path: Option<PathBuf>,
) {
    while let Some(record) = records.recv().await {
        let before = recorder.pending_count();
        let outcome = recorder.persist(record).await;
        debug!(?outcome, "record handled");

        let changed = !matches!(outcome, PersistOutcome::Persisted) || before > 0;
        if let (true, Some(path)) = (changed, pending_path.as_deref()) {
            if let Err(e) = recorder.save_pending(path) {
                warn!(error = %e, path = %path.display(), "failed to save pending queue");
            }
        }
    }
    debug!("recorder worker stopped");
}
