use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use tracing::debug;

use crate::config::AppConfig;

const CONFIG_DIR: &str = "lazyinfra";
const CONFIG_FILE: &str = "config.toml";

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR))
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Load the configuration.
///
/// An explicit `path` must exist. Without one the default location is used
/// and a missing file yields the defaults.
pub fn load(path: Option<&Path>) -> Result<AppConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match config_path() {
            Some(p) if p.exists() => p,
            Some(p) => {
                debug!("Config file not found at {}, using defaults", p.display());
                return Ok(AppConfig::default());
            }
            None => {
                debug!("No config directory found, using defaults");
                return Ok(AppConfig::default());
            }
        },
    };

    let content = fs::read_to_string(&path)
        .wrap_err_with(|| format!("Failed to read config {}", path.display()))?;
    let config: AppConfig = toml::from_str(&content)
        .wrap_err_with(|| format!("Invalid config {}", path.display()))?;
    config.validate()?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}
