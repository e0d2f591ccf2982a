use anyhow::Context;
use blockpad_editor::{ContentSeed, SeedChoice};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "blockpad.config.json";

/// Blockpad configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Name published to collaborators
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    /// Seed document to use instead of the built-in one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_path: Option<String>,

    /// Maximum palette rows to print
    #[serde(default = "default_palette_limit")]
    pub palette_limit: usize,
}

fn default_palette_limit() -> usize {
    10
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid {}", config_path.display()))?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Seed path resolved against `cwd`
    pub fn get_seed_path(&self, cwd: &Path) -> Option<PathBuf> {
        self.seed_path.as_ref().map(|path| cwd.join(path))
    }

    /// Seed selection for new sessions
    pub fn seed(&self, cwd: &Path) -> anyhow::Result<SeedChoice> {
        match self.get_seed_path(cwd) {
            Some(path) => Ok(SeedChoice::Custom(ContentSeed::load(&path)?)),
            None => Ok(SeedChoice::Builtin),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_name: None,
            seed_path: None,
            palette_limit: default_palette_limit(),
        }
    }
}
