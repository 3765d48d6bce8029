//! Configuration IO helpers.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use dirs_next::{config_dir, home_dir};

use crate::config::{AdWizardConfig, validate_config};

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "ADWIZARD_CONFIG_PATH";

/// Returns the default path for the configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("adwizard")
        .join("config.json")
}

/// Loads and validates configuration from the default path.
pub fn load_config() -> anyhow::Result<AdWizardConfig> {
    let path = default_config_path();
    load_config_from_path(&path)
}

/// Loads and validates configuration from a specific path. A missing file
/// yields the defaults.
pub fn load_config_from_path(path: &Path) -> anyhow::Result<AdWizardConfig> {
    if !path.exists() {
        return Ok(AdWizardConfig::default());
    }

    let content = fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let mut config: AdWizardConfig =
        serde_json::from_str(&content).with_context(|| format!("parse config {}", path.display()))?;
    if let Some(data_dir) = config.data_dir.take() {
        config.data_dir = Some(expand_tilde(&data_dir.to_string_lossy()));
    }
    validate_config(&config)?;
    Ok(config)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    if trimmed == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(trimmed)
}
