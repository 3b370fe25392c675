use chrono::Local;
use clap::Subcommand;
use devdash_core::stats::{StatsService, StatsView, MAX_WINDOW_DAYS};
use serde_json::json;

use crate::context::Context;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Daily focus hours and commits, oldest day first
    Daily {
        /// Number of days ending today (1-366)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_WINDOW_DAYS)))]
        days: Option<u32>,
    },
    /// Seven-day totals and current streak
    Week,
}

pub async fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load()?;
    let mut settings = ctx.config.stats_settings();
    if let StatsAction::Daily { days: Some(days) } = &action {
        settings.window_days = *days;
    }

    let service = StatsService::new(ctx.recorder.clone(), settings);
    let today = Local::now().date_naive();
    let summary = match service.refresh(today, &Local).await {
        StatsView::Available(summary) => summary,
        StatsView::Unavailable { reason } => {
            println!("stats unavailable: {reason}");
            return Ok(());
        }
    };

    match action {
        StatsAction::Daily { .. } => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        StatsAction::Week => {
            let week = json!({
                "reference_date": summary.reference_date,
                "week_focus_hours": summary.week_focus_hours,
                "week_commits": summary.week_commits,
                "streak": summary.streak,
                "pending_records": summary.pending_records,
                "commit_feed_available": summary.commit_feed_available,
            });
            println!("{}", serde_json::to_string_pretty(&week)?);
        }
    }
    Ok(())
}
