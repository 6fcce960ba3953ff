// CLI subcommand dispatch.

use clap::Subcommand;
use docket_engine::EngineConfig;

pub mod apply;
pub mod history;
pub mod log;
pub mod new;
pub mod verify;

#[derive(Subcommand)]
pub enum Command {
    /// Create a fresh document envelope
    New(new::NewArgs),
    /// Dispatch one action against an envelope file
    Apply(apply::ApplyArgs),
    /// List the operations in an envelope
    Log(log::LogArgs),
    /// Show state as of an earlier revision or time
    History(history::HistoryArgs),
    /// Check that replaying the log reproduces the stored state
    Verify(verify::VerifyArgs),
}

pub fn run(cmd: Command, config: &EngineConfig) -> anyhow::Result<()> {
    match cmd {
        Command::New(args) => new::run(args),
        Command::Apply(args) => apply::run(args),
        Command::Log(args) => log::run(args),
        Command::History(args) => history::run(args, config),
        Command::Verify(args) => verify::run(args),
    }
}
