use crate::config::Config;
use anyhow::Result;
use blockpad_editor::CommandRegistry;
use clap::Args;
use colored::Colorize;
use std::path::Path;

#[derive(Debug, Args)]
pub struct PaletteArgs {
    /// Filter by what follows the slash (e.g. "tab")
    #[arg(short, long)]
    pub query: Option<String>,

    /// Print palette entries as JSON
    #[arg(long)]
    pub json: bool,

    /// Maximum rows to print (defaults to the config's paletteLimit)
    #[arg(short, long)]
    pub limit: Option<usize>,
}

pub fn palette(args: PaletteArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = CommandRegistry::builtin();
    registry.validate()?;

    let mut entries = registry.filter(args.query.as_deref().unwrap_or_default());
    let total = entries.len();
    entries.truncate(args.limit.unwrap_or(config.palette_limit));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No matching commands".yellow());
        return Ok(());
    }

    let mut current_group = "";
    for entry in &entries {
        if entry.group != current_group {
            current_group = entry.group;
            println!("{}", current_group.bright_blue().bold());
        }
        println!(
            "  {:<14} {:<16} {}",
            format!("/{}", entry.name).cyan(),
            entry.label,
            entry.description.dimmed()
        );
        if !entry.aliases.is_empty() {
            println!("  {:<14} {}", "", entry.aliases.join(", ").dimmed());
        }
    }

    if total > entries.len() {
        println!();
        println!("  ... {} more", total - entries.len());
    }

    Ok(())
}
