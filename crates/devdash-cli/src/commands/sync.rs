//! Inspect and retry session records the service has not acknowledged.

use clap::Subcommand;
use devdash_core::storage::TOKEN_ENV;
use serde_json::json;

use crate::context::Context;

#[derive(Subcommand)]
pub enum SyncAction {
    /// Show the pending queue
    Status,
    /// Retry every pending record now
    Flush,
}

pub async fn run(action: SyncAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load()?;
    match action {
        SyncAction::Status => {
            let entries = ctx.recorder.pending_entries();
            let status = json!({
                "pending": entries.len(),
                "entries": entries,
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        SyncAction::Flush => {
            let report = ctx.recorder.flush_pending().await;
            ctx.save_pending()?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if report.auth_rejected {
                eprintln!("the service rejected the API token; set {TOKEN_ENV} and retry");
            }
        }
    }
    Ok(())
}
