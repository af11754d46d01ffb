//! CLI binary.
//!
//! Entry point for the `pack` command: initializes logging via `tracing`,
//! parses arguments with `clap`, and dispatches to the command handler.

mod cli;
mod commands;

use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = cli::parse();
    commands::dispatch(args)
}
