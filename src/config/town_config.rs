//! Whaletown configuration file handling
//!
//! Loads and manages the ~/.config/whaletown/config.yaml file.

use crate::mail::Priority;
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The human running the town
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverseerConfig {
    /// Display name
    #[serde(default = "default_overseer_name")]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

fn default_overseer_name() -> String {
    "overseer".to_string()
}

impl Default for OverseerConfig {
    fn default() -> Self {
        Self {
            name: default_overseer_name(),
            email: None,
        }
    }
}

/// Mail settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailConfig {
    /// Priority for messages sent without one
    #[serde(default)]
    pub default_priority: Priority,
}

/// Whaletown configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TownConfig {
    /// Town root; overrides discovery from the working directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub town_root: Option<PathBuf>,

    /// Rigs known without scanning the town
    #[serde(default)]
    pub rigs: Vec<String>,

    #[serde(default)]
    pub overseer: OverseerConfig,

    #[serde(default)]
    pub mail: MailConfig,
}

impl TownConfig {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the default path (~/.config/whaletown/config.yaml)
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        Self::load(&path)
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::WhaletownError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading whaletown configuration");

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        tracing::debug!(
            rigs = config.rigs.len(),
            town_root = ?config.town_root,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Load the configuration, or the defaults if the file is missing
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }

        tracing::info!(path = %path.display(), "Saving whaletown configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    /// Get the default config path (~/.config/whaletown/config.yaml)
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("whaletown");
        path.push("config.yaml");
        path
    }

    /// Whether a rig is listed
    pub fn has_rig(&self, name: &str) -> bool {
        self.rigs.iter().any(|r| r == name)
    }

    /// Add a rig if not already listed
    pub fn add_rig(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.has_rig(&name) {
            self.rigs.push(name);
        }
    }
}
