//! In-memory queue of records the remote store has not acknowledged.

use std::collections::{HashSet, VecDeque};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::record::SessionRecord;

/// A record waiting for a successful post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingEntry {
    pub id: Uuid,
    pub record: SessionRecord,
    /// Failed post attempts so far.
    pub attempts: u32,
    pub queued_at: DateTime<Utc>,
    #[serde(default)]
    pub last_error: Option<String>,
}

/// FIFO of unsent records. Order is the order of the first failure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingQueue {
    entries: VecDeque<PendingEntry>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record after its first failed post.
    pub fn push(&mut self, record: SessionRecord, error: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.entries.push_back(PendingEntry {
            id,
            record,
            attempts: 1,
            queued_at: Utc::now(),
            last_error: Some(error.into()),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of every entry, oldest first.
    pub fn snapshot(&self) -> Vec<PendingEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn records(&self) -> Vec<SessionRecord> {
        self.entries.iter().map(|e| e.record.clone()).collect()
    }

    /// Drop acknowledged entries; everything else keeps its position.
    pub fn remove(&mut self, ids: &HashSet<Uuid>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !ids.contains(&e.id));
        before - self.entries.len()
    }

    pub fn record_failure(&mut self, id: Uuid, error: impl Into<String>) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.attempts = entry.attempts.saturating_add(1);
            entry.last_error = Some(error.into());
        }
    }

    /// Persist queue to disk.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.entries)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, data)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Load queue from disk. A missing file is an empty queue.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let entries: VecDeque<PendingEntry> = serde_json::from_str(&content)?;
        Ok(Self { entries })
    }
}
