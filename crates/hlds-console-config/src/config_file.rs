use std::{env, path::PathBuf};

const CONFIG_FILE: &str = ".hlds-console.toml";

/// Load config file content from CWD first, then home directory, then the
/// platform config directory
///
/// Searches for the config in:
/// 1. Current working directory as .hlds-console.toml
/// 2. Home directory as .hlds-console.toml
/// 3. `<config_dir>/hlds-console/config.toml`
///
/// Returns the file content if found, None otherwise.
pub fn load_config_file() -> Option<String> {
    let candidates = [
        Some(PathBuf::from(CONFIG_FILE)),
        get_home_config_path(),
        crate::paths::app_config_path().ok(),
    ];

    candidates.into_iter().flatten().find_map(|path| {
        let content = std::fs::read_to_string(&path).ok()?;
        log::debug!("Loaded config from {}", path.display());
        Some(content)
    })
}

/// Get the path to the config file in the home directory
///
/// Returns ~/.hlds-console.toml if HOME environment variable is set.
fn get_home_config_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE))
}
