//! Configuration module for vimkeys.
//!
//! Handles loading configuration from:
//! - Default values
//! - Config file (~/.config/vimkeys/config.toml)
//! - The `VIMKEYS_CONFIG_DIR` environment variable
//!
//! Writing the file back is left to the settings surface; see
//! [`ShortcutConfig::from_owners`].

mod schema;

pub use schema::{Config, ShortcutConfig};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "VIMKEYS_CONFIG_DIR";

/// Returns the config directory path.
///
/// Checks `VIMKEYS_CONFIG_DIR` environment variable first, then falls back
/// to the system default (~/.config/vimkeys on Linux).
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|p| p.join("vimkeys"))
}

/// Returns the default config file path (~/.config/vimkeys/config.toml)
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

/// Load configuration from the default path or return defaults
pub fn load_config() -> Result<Config> {
    if let Some(path) = config_path() {
        if path.exists() {
            return load_config_from(&path);
        }
    }
    tracing::debug!("no config file, using defaults");
    Ok(Config::default())
}

/// Load configuration from a specific path
pub fn load_config_from(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        owners = config.shortcuts.owners.len(),
        "loaded config"
    );
    Ok(config)
}
