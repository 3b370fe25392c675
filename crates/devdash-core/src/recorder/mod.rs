//! Session persistence: the sink the timer writes to, the pending retry
//! queue, and the recorder that talks to the remote store.

mod pending;
mod session_recorder;
mod sink;
mod worker;

pub use pending::{PendingEntry, PendingQueue};
pub use session_recorder::{FlushReport, PersistOutcome, SessionRecorder};
pub use sink::{ChannelSink, MemorySink, NullSink, RecordSink};
pub use worker::run_recorder_worker;
