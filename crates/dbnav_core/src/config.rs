use crate::NavError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_INDENT: usize = 10;

/// When a reveal event should turn into a catalog load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPolicy {
    /// Every reveal loads, including branches restored from collapse memory.
    #[default]
    Always,

    /// Only reveals the user asked for directly load; restored branches keep
    /// what they already have.
    SkipRestored,

    /// Load only branches whose children have never been loaded.
    WhenMissing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigatorConfig {
    /// Horizontal offset per depth level, in the renderer's units.
    #[serde(default = "default_indent")]
    pub indent: usize,

    #[serde(default)]
    pub load_policy: LoadPolicy,
}

fn default_indent() -> usize {
    DEFAULT_INDENT
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            load_policy: LoadPolicy::default(),
        }
    }
}

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store rooted in the user config directory.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn new() -> Result<Self, NavError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            NavError::IoError(std::io::Error::other("Could not find config directory"))
        })?;

        let app_dir = config_dir.join("dbnav");
        fs::create_dir_all(&app_dir).map_err(NavError::IoError)?;

        Ok(Self {
            path: app_dir.join("navigator.json"),
        })
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the config, falling back to defaults when the file is missing.
    pub fn load(&self) -> Result<NavigatorConfig, NavError> {
        if !self.path.exists() {
            return Ok(NavigatorConfig::default());
        }

        let content = fs::read_to_string(&self.path).map_err(NavError::IoError)?;
        let config: NavigatorConfig =
            serde_json::from_str(&content).map_err(|e| NavError::InvalidConfig(e.to_string()))?;

        Ok(config)
    }

    pub fn save(&self, config: &NavigatorConfig) -> Result<(), NavError> {
        let content = serde_json::to_string_pretty(config)
            .map_err(|e| NavError::InvalidConfig(e.to_string()))?;

        fs::write(&self.path, content).map_err(NavError::IoError)?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
