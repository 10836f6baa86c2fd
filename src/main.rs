//! Declarative system-state reconciliation and change-tracking engine.

use anyhow::Result;
use clap::Parser;

mod backup;
mod cancel;
mod cli;
mod commands;
mod config;
mod diff;
mod error;
mod logging;
mod operations;
mod platform;
mod reconcile;
mod registry;

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose);
    let log = logging::Logger::new(args.verbose);

    let token = cancel::CancelToken::new();
    let handler_token = token.clone();
    let _ = ctrlc::set_handler(move || handler_token.cancel());

    match args.command {
        cli::Command::Check => commands::check::run(&args.global, &log, &token),
        cli::Command::Tweak { action } => commands::tweak::run(&args.global, &action, &log),
        cli::Command::Backup { action } => {
            commands::backup::run(&args.global, &action, &log, &token)
        }
        cli::Command::Diff { action } => commands::diff::run(&args.global, &action, &log, &token),
        cli::Command::Version => {
            let version = option_env!("DRIFTWATCH_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
            println!("driftwatch {version}");
            Ok(())
        }
    }
}
