//! Replays a provider event script against a live session and reports
//! what the UI would see: connection status, presence badges and the
//! document after seeding.

use crate::config::Config;
use anyhow::{Context, Result};
use blockpad_document::Node;
use blockpad_editor::{
    CollaboratorPresence, ConnectionStatus, LiveSession, LocalProvider, RawCollaborator,
    SessionOptions,
};
use clap::Args;
use colored::Colorize;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// JSON script of provider steps (defaults to a built-in session)
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Print the final document
    #[arg(long)]
    pub print_document: bool,
}

/// One provider step
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum Step {
    Status {
        status: ConnectionStatus,
    },
    Synced,
    Content {
        document: Node,
    },
    #[serde(rename_all = "camelCase")]
    Join {
        client_id: u64,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        color: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Leave {
        client_id: u64,
    },
    Wait {
        ms: u64,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read script {}", path.display()))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Connect, sync an empty document, then a peer joins and leaves
    pub fn builtin() -> Self {
        Self {
            steps: vec![
                Step::Status {
                    status: ConnectionStatus::Connected,
                },
                Step::Wait { ms: 20 },
                Step::Synced,
                Step::Join {
                    client_id: 2,
                    name: Some("Grace Hopper".to_string()),
                    color: None,
                },
                Step::Wait { ms: 20 },
                Step::Join {
                    client_id: 3,
                    name: None,
                    color: Some("#70CFF8".to_string()),
                },
                Step::Wait { ms: 20 },
                Step::Leave { client_id: 2 },
                Step::Wait { ms: 20 },
                Step::Status {
                    status: ConnectionStatus::Disconnected,
                },
            ],
        }
    }
}

async fn play(provider: Arc<LocalProvider>, steps: Vec<Step>) {
    for step in steps {
        debug!(?step, "Playing step");
        match step {
            Step::Status { status } => {
                provider.set_status(status);
            }
            Step::Synced => {
                provider.mark_synced();
            }
            Step::Content { document } => {
                provider.push_content(document);
            }
            Step::Join {
                client_id,
                name,
                color,
            } => {
                provider.join(RawCollaborator {
                    client_id,
                    name,
                    color,
                });
            }
            Step::Leave { client_id } => {
                provider.leave(client_id);
            }
            Step::Wait { ms } => tokio::time::sleep(Duration::from_millis(ms)).await,
        }
        // let the session observe each step as its own batch
        tokio::task::yield_now().await;
    }
}

/// What the last report printed
#[derive(Default)]
struct Observed {
    status: Option<ConnectionStatus>,
    presence: Vec<CollaboratorPresence>,
    blocks: usize,
}

fn report(live: &LiveSession, observed: &mut Observed) {
    let status = live.status();
    if observed.status != Some(status) {
        let label = match status {
            ConnectionStatus::Synced => status.as_str().green(),
            ConnectionStatus::Connected => status.as_str().cyan(),
            ConnectionStatus::Connecting => status.as_str().yellow(),
            ConnectionStatus::Disconnected => status.as_str().red(),
        };
        println!("  {} {}", "status".dimmed(), label);
        observed.status = Some(status);
    }

    let presence = live.presence();
    if presence != observed.presence {
        let badges: Vec<String> = presence
            .iter()
            .map(|p| format!("{} ({})", p.initials.bold(), p.name))
            .collect();
        if badges.is_empty() {
            println!("  {} {}", "presence".dimmed(), "nobody".dimmed());
        } else {
            println!("  {} {}", "presence".dimmed(), badges.join(", "));
        }
        observed.presence = presence;
    }

    let blocks = live.document().blocks().len();
    if blocks != observed.blocks {
        println!("  {} {} block(s)", "document".dimmed(), blocks);
        observed.blocks = blocks;
    }
}

pub async fn simulate(args: SimulateArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let script = match &args.script {
        Some(path) => Script::load(&cwd.join(path))?,
        None => Script::builtin(),
    };

    let provider = Arc::new(LocalProvider::new());
    let mut options = SessionOptions::new().with_provider(provider.clone());
    options.seed = config.seed(cwd)?;
    if let Some(name) = &config.user_name {
        options = options.with_user_name(name.clone());
    }

    println!(
        "{}",
        format!("Simulating {} provider step(s)...", script.steps.len())
            .bright_blue()
            .bold()
    );

    let mut live = LiveSession::start(options)?;
    let mut observed = Observed::default();
    report(&live, &mut observed);

    let mut player = tokio::spawn(play(provider.clone(), script.steps));
    loop {
        tokio::select! {
            turn = live.next_turn() => {
                if !turn? {
                    break;
                }
                report(&live, &mut observed);
            }
            finished = &mut player => {
                finished?;
                live.pump()?;
                report(&live, &mut observed);
                break;
            }
        }
    }

    let seed_state = live.lock().seed_state();
    println!();
    println!(
        "{} seed {:?}, {} subscriber(s) attached",
        "Done:".green().bold(),
        seed_state,
        provider.subscriber_count()
    );

    if args.print_document {
        println!("{}", live.document().to_json_pretty()?);
    }

    live.close();
    debug!(subscribers = provider.subscriber_count(), "Session closed");

    Ok(())
}
