//! CLI command definitions and dispatch.

pub mod generate;

use clap::{Parser, Subcommand};

/// Cradle — generate systemd units for containers.
#[derive(Parser, Debug)]
#[command(name = "cradle", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a systemd unit from container metadata.
    Generate(generate::GenerateArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Generate(args) => generate::execute(args),
    }
}
