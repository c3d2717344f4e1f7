//! Configuration management for the esnn CLI

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CliError, CliResult};

/// Persisted CLI defaults, overridable by command-line flags
#[derive(Debug, Serialize, Deserialize)]
pub struct CliConfig {
    /// Default run mode when `--mode` is not given ("event" or "clock")
    pub default_mode: String,

    /// Default clock-driven step size, used only when mode is "clock"
    pub default_dt: Option<f64>,

    /// Default stop time
    pub default_t_max: f64,

    /// Default RNG seed
    pub default_seed: u64,

    /// Logging level passed to `tracing_subscriber::EnvFilter`
    pub log_level: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_mode: "event".to_string(),
            default_dt: None,
            default_t_max: 1000.0,
            default_seed: 0,
            log_level: Some("info".to_string()),
        }
    }
}

impl CliConfig {
    /// Load configuration from a TOML file, falling back to defaults if it
    /// doesn't exist
    pub fn load_from_file(path: &Path) -> CliResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed
    pub fn save_to_file(&self, path: &Path) -> CliResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::config(format!("failed to serialize config: {e}")))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// The default configuration file path, under the user's config directory
    pub fn default_config_path() -> CliResult<std::path::PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::config("could not determine config directory"))?;
        Ok(config_dir.join("esnn").join("config.toml"))
    }
}
