use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::warn;

use crate::record::SessionRecord;

/// Where the timer engine drops finished records.
///
/// Submission is fire-and-forget: the engine never waits on persistence and
/// never sees its failures.
pub trait RecordSink: Send + Sync {
    fn submit(&self, record: SessionRecord);
}

/// Hands records to the recorder worker over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SessionRecord>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SessionRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl RecordSink for ChannelSink {
    fn submit(&self, record: SessionRecord) {
        if self.tx.send(record).is_err() {
            warn!("recorder worker is gone; session record dropped");
        }
    }
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RecordSink for NullSink {
    fn submit(&self, _record: SessionRecord) {}
}

/// Collects records in memory; handy for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<SessionRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<SessionRecord> {
        self.records
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl RecordSink for MemorySink {
    fn submit(&self, record: SessionRecord) {
        if let Ok(mut guard) = self.records.lock() {
            guard.push(record);
        }
    }
}
