// docket CLI entry point.

use std::process;

use clap::Parser;
use docket_engine::EngineConfig;
use tracing_subscriber::EnvFilter;

mod commands;
mod envelope;
mod exit_code;
mod output;

use exit_code::ExitCode;

#[derive(Parser)]
#[command(name = "docket", about = "Operation-log business documents")]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> process::ExitCode {
    let cli = Cli::parse();
    let config = EngineConfig::load();

    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match commands::run(cli.command, &config) {
        Ok(()) => ExitCode::Success.into(),
        Err(error) => ExitCode::from_error(&error).into(),
    }
}
