use crate::config::Config;
use anyhow::Result;
use blockpad_editor::{ContentSeed, SeedChoice};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct SeedArgs {
    /// Write the seed to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn seed(args: SeedArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let seed = match config.seed(cwd)? {
        SeedChoice::Custom(seed) => seed,
        SeedChoice::Builtin | SeedChoice::Disabled => ContentSeed::builtin()?,
    };

    let json = serde_json::to_string_pretty(seed.root())?;
    match args.output {
        Some(path) => {
            let output = cwd.join(path);
            fs::write(&output, json)?;
            println!("  {} Wrote {}", "✓".green(), output.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
