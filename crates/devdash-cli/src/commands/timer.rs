use std::sync::Arc;

use clap::Subcommand;
use devdash_core::recorder::{run_recorder_worker, ChannelSink, NullSink};
use devdash_core::runtime::{Command, TimerDriver, TokioTicker};
use devdash_core::storage::{load_timer_state, save_timer_state, timer_state_path};
use devdash_core::timer::ManualScheduler;
use devdash_core::{Config, Event, TimerEngine};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

use crate::context::Context;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the timer interactively. Reads commands from stdin:
    /// s = start, p = pause, r = reset, i = status, q = quit
    Run {
        /// Start the next phase automatically when one completes
        #[arg(long)]
        auto_continue: bool,
    },
    /// Print the saved timer state as JSON
    Status,
}

pub async fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run { auto_continue } => run_interactive(auto_continue).await,
        TimerAction::Status => {
            let config = Config::load()?;
            let mut engine = TimerEngine::new(
                config.timer_options(),
                ManualScheduler::new(),
                Box::new(NullSink),
            );
            if let Some(state) = load_timer_state(&timer_state_path()?)? {
                engine = engine.with_state(state);
            }
            println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
            Ok(())
        }
    }
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim() {
        "s" | "start" => Some(Command::Start),
        "p" | "pause" => Some(Command::Pause),
        "r" | "reset" => Some(Command::Reset),
        "i" | "status" => Some(Command::Snapshot),
        "q" | "quit" => Some(Command::Shutdown),
        _ => None,
    }
}

async fn run_interactive(auto_continue: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::load()?;
    let mut options = ctx.config.timer_options();
    options.auto_continue |= auto_continue;

    let (sink, records) = ChannelSink::new();
    let worker = tokio::spawn(run_recorder_worker(
        Arc::clone(&ctx.recorder),
        records,
        Some(ctx.pending_path.clone()),
    ));

    let (ticker, ticks) = TokioTicker::per_second();
    let mut engine = TimerEngine::new(options, ticker, Box::new(sink));
    let state_path = timer_state_path()?;
    match load_timer_state(&state_path) {
        Ok(Some(state)) => engine = engine.with_state(state),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "ignoring unreadable timer state"),
    }

    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (ev_tx, mut ev_rx) = mpsc::unbounded_channel::<Event>();

    let printer = tokio::spawn(async move {
        while let Some(event) = ev_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(error = %e, "failed to encode event"),
            }
        }
    });

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let command = match lines.next_line().await {
                Ok(Some(line)) => match parse_command(&line) {
                    Some(command) => command,
                    None => {
                        if !line.trim().is_empty() {
                            eprintln!("unknown command: {} (s/p/r/i/q)", line.trim());
                        }
                        continue;
                    }
                },
                Ok(None) | Err(_) => Command::Shutdown,
            };
            if cmd_tx.send(command).await.is_err() || command == Command::Shutdown {
                break;
            }
        }
    });

    let driver = TimerDriver::new(engine, ticks);
    let final_state = driver.run(cmd_rx, ev_tx).await;
    save_timer_state(&state_path, &final_state)?;

    // The engine (and with it the sink) is gone; let the worker finish the
    // records it already has.
    worker.await?;
    printer.await?;
    ctx.save_pending()?;
    Ok(())
}
