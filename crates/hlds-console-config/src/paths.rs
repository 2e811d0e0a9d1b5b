//! Configuration and cache directory paths
//!
//! Uses XDG directories via `dirs` crate.
//!
//! Platform-specific locations:
//! - Linux: `~/.config/hlds-console/`, `~/.cache/hlds-console/`
//! - macOS: `~/Library/Application Support/hlds-console/`, `~/Library/Caches/hlds-console/`
//! - Windows: `%APPDATA%\hlds-console\`, `%LOCALAPPDATA%\hlds-console\`

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "hlds-console";

/// Get the application config directory without creating it
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join(APP_NAME))
}

/// Get the application cache directory, creating it if needed
/// Returns ~/.cache/hlds-console/ on Linux, ~/Library/Caches/hlds-console/ on macOS
pub fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine cache directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
    Ok(dir)
}

/// Get path to the app config file inside the config directory
pub fn app_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}
