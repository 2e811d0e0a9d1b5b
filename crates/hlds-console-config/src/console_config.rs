//! Console configuration
//!
//! Configuration loaded from .hlds-console.toml file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Console configuration loaded from .hlds-console.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Maximum number of entries kept in the log feed
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,

    /// Maximum number of submitted commands kept for up/down recall
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Directory below the game directory that holds map archives
    #[serde(default = "default_maps_subdir")]
    pub maps_subdir: String,

    /// Map archive extension, without the leading dot
    #[serde(default = "default_map_extension")]
    pub map_extension: String,

    /// How often server status is refreshed while the console is visible
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Maximum height of the map selector popup, in pixels
    #[serde(default = "default_popup_max_height")]
    pub popup_max_height: i32,

    /// Text size used by the map selector popup rows
    #[serde(default = "default_popup_text_size")]
    pub popup_text_size: i32,

    /// Mirror stdout/stderr into the log feed
    #[serde(default = "default_capture_output")]
    pub capture_output: bool,
}

fn default_log_capacity() -> usize {
    500
}

fn default_history_capacity() -> usize {
    30
}

fn default_maps_subdir() -> String {
    "maps".to_string()
}

fn default_map_extension() -> String {
    "bsp".to_string()
}

fn default_refresh_interval_ms() -> u64 {
    1000
}

fn default_popup_max_height() -> i32 {
    300
}

fn default_popup_text_size() -> i32 {
    11
}

fn default_capture_output() -> bool {
    true
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            log_capacity: default_log_capacity(),
            history_capacity: default_history_capacity(),
            maps_subdir: default_maps_subdir(),
            map_extension: default_map_extension(),
            refresh_interval_ms: default_refresh_interval_ms(),
            popup_max_height: default_popup_max_height(),
            popup_text_size: default_popup_text_size(),
            capture_output: default_capture_output(),
        }
    }
}

impl ConsoleConfig {
    /// Load config from CWD first, then home directory, or use defaults
    pub fn load() -> Self {
        if let Some(content) = crate::load_config_file() {
            match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded console config from file");
                    return config;
                }
                Err(e) => {
                    log::warn!("Failed to parse config file: {}", e);
                }
            }
        }

        log::debug!("Using default console config");
        Self::default()
    }

    /// Load config from an explicit path
    ///
    /// Unlike [`ConsoleConfig::load`], a missing or malformed file is an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}
