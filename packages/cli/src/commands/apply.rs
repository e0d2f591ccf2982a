use anyhow::{Context, Result};
use blockpad_document::Document;
use blockpad_editor::{CommandRegistry, LiveSession, SessionOptions};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Document JSON file
    pub file: PathBuf,

    /// Command name or alias (e.g. "table", "h1")
    pub command: String,

    /// Start of the trigger text to replace
    #[arg(long)]
    pub from: usize,

    /// End of the trigger text to replace
    #[arg(long)]
    pub to: usize,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn apply(args: ApplyArgs, cwd: &Path) -> Result<()> {
    let input = cwd.join(&args.file);
    let document =
        Document::load(&input).with_context(|| format!("Cannot read {}", input.display()))?;

    let live = LiveSession::start(
        SessionOptions::new()
            .with_id(args.file.display().to_string())
            .with_document(document)
            .without_seed(),
    )?;

    let registry = CommandRegistry::builtin();
    live.execute(&registry, &args.command, args.from..args.to)?;

    let session = live.lock();
    match args.output {
        Some(path) => {
            let output = cwd.join(path);
            session.document().save(&output)?;
            println!(
                "  {} /{} applied, cursor at {} → {}",
                "✓".green(),
                args.command,
                session.selection().head,
                output.display()
            );
        }
        None => println!("{}", session.document().to_json_pretty()?),
    }

    Ok(())
}
