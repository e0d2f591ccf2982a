mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, palette, seed, simulate, ApplyArgs, PaletteArgs, SeedArgs, SimulateArgs};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Blockpad CLI - block editor sessions from the terminal
#[derive(Parser, Debug)]
#[command(name = "blockpad")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List slash commands
    Commands(PaletteArgs),

    /// Print the content seed
    Seed(SeedArgs),

    /// Run a slash command against a document file
    Apply(ApplyArgs),

    /// Replay provider events against a live session
    Simulate(SimulateArgs),
}

fn run(cli: Cli, cwd: &Path) -> anyhow::Result<()> {
    match cli.command {
        Command::Commands(args) => palette(args, cwd),
        Command::Seed(args) => seed(args, cwd),
        Command::Apply(args) => apply(args, cwd),
        Command::Simulate(args) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(simulate(args, cwd))
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| run(cli, &cwd));

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
