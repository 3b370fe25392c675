//! Shared setup for commands that talk to the DevDash service.

use std::path::PathBuf;
use std::sync::Arc;

use devdash_core::recorder::PendingQueue;
use devdash_core::storage::pending_queue_path;
use devdash_core::{Config, HttpTransport, SessionRecorder};

pub struct Context {
    pub config: Config,
    pub recorder: Arc<SessionRecorder<HttpTransport>>,
    pub pending_path: PathBuf,
}

impl Context {
    /// Load config and the saved pending queue, and build the HTTP recorder.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        config.validate()?;

        let transport = HttpTransport::new(
            &config.remote.base_url,
            Config::api_token(),
            config.request_timeout(),
        )?;
        let pending_path = pending_queue_path()?;
        let pending = PendingQueue::load(&pending_path)?;
        let recorder = SessionRecorder::new(transport)
            .with_pending(pending)
            .flush_on_success(config.remote.flush_on_success);

        Ok(Self {
            config,
            recorder: Arc::new(recorder),
            pending_path,
        })
    }

    pub fn save_pending(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.recorder.save_pending(&self.pending_path)?;
        Ok(())
    }
}
