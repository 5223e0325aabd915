//! Configuration file handling.
//!
//! The config file is resolved in order from `--config` (or `$CORRAL_CONFIG`),
//! then `<config_dir>/corral/config.toml`. A missing file at the default
//! location means built-in defaults.

use anyhow::{Context, Result, bail};
use corral_sim::ExperimentConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application name used for the config directory.
pub const PROJECT_NAME: &str = "corral";

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorralConfig {
    /// Defaults for experiments and single plays
    pub experiment: ExperimentConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive used when neither `-v`/`-q` nor `RUST_LOG` is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CorralConfig {
    /// Default location: `<config_dir>/corral/config.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(PROJECT_NAME).join("config.toml"))
    }

    /// The explicit path if given, else the default location.
    pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_config_path(),
        }
    }

    /// Loads the configuration.
    ///
    /// An explicit path must exist; a missing file at the default location
    /// yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let Some(path) = Self::resolve_config_path(explicit) else {
            return Ok(Self::default());
        };
        if !path.exists() {
            if explicit.is_some() {
                bail!("Config file {} does not exist", path.display());
            }
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    /// Reads and validates a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config
            .experiment
            .validate()
            .with_context(|| format!("Invalid [experiment] section in {}", path.display()))?;
        Ok(config)
    }

    /// Serializes to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}
