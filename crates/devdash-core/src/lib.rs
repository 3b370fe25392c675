//! # DevDash Core Library
//!
//! This library provides the focus-timer side of the DevDash developer
//! dashboard: a work/break timer, durable recording of finished sessions to
//! the DevDash service, and the daily and weekly statistics the dashboard
//! shows. The `devdash` CLI is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A tick-driven state machine with an injectable
//!   [`TickScheduler`]; the caller (or [`runtime::TimerDriver`]) calls `tick()`
//!   once per second while it is armed
//! - **Recorder**: Posts finished sessions and keeps failed posts in a
//!   pending queue for later retry
//! - **Stats**: Pure per-day and per-week aggregation over session history
//!   and the commit feed
//! - **Storage**: TOML configuration and small JSON state files
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`SessionRecorder`]: Best-effort session persistence
//! - [`StatsService`]: Dashboard refresh
//! - [`Config`]: Application configuration management
//! - [`Transport`]: Boundary to the remote service

pub mod error;
pub mod events;
pub mod record;
pub mod recorder;
pub mod runtime;
pub mod stats;
pub mod storage;
pub mod timer;
pub mod transport;

pub use error::{ConfigError, CoreError, InvalidTransition, TransportError, ValidationError};
pub use events::{Event, TimerObserver};
pub use record::{SessionPayload, SessionRecord};
pub use recorder::{FlushReport, PendingQueue, PersistOutcome, RecordSink, SessionRecorder};
pub use stats::{
    compute_daily, weekly_totals, DailyAggregate, DailyReport, DashboardSummary, StatsService,
    StatsView, WeeklyTotals,
};
pub use storage::Config;
pub use timer::{
    PhaseDurations, SessionPhase, TickScheduler, TimerEngine, TimerOptions, TimerState,
    TimerStatus,
};
pub use transport::{CommitActivity, HttpTransport, SessionHistory, Transport};
