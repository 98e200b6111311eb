//! Process-wide dependencies, built once in `main` and shared by handle.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::Theme;
use crate::config::{AppConfig, KeyResolver, loader};
use crate::repository::ResourceRepository;
use crate::theme::theme_from_name;

const INVENTORY_FILE: &str = "inventory.json";

pub struct Services {
    pub config: AppConfig,
    pub resolver: Arc<KeyResolver>,
    pub theme: Theme,
    pub repository: Arc<dyn ResourceRepository>,
    /// Inventory opened by the editor action
    pub inventory: PathBuf,
}

impl Services {
    pub fn new(
        config: AppConfig,
        inventory: PathBuf,
        repository: Arc<dyn ResourceRepository>,
    ) -> Arc<Self> {
        let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings.clone())));
        let theme = theme_from_name(&config.theme.name);
        Arc::new(Self {
            config,
            resolver,
            theme,
            repository,
            inventory,
        })
    }
}

/// The inventory to open: `--inventory`, then the config file, then the
/// config directory.
pub fn inventory_path(cli: Option<&Path>, config: &AppConfig) -> PathBuf {
    cli.map(Path::to_path_buf)
        .or_else(|| config.inventory.clone())
        .or_else(|| loader::config_dir().map(|dir| dir.join(INVENTORY_FILE)))
        .unwrap_or_else(|| PathBuf::from(INVENTORY_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_inventory_wins() {
        let config = AppConfig {
            inventory: Some(PathBuf::from("/etc/inv.json")),
            ..AppConfig::default()
        };
        assert_eq!(
            inventory_path(Some(Path::new("local.json")), &config),
            PathBuf::from("local.json")
        );
        assert_eq!(inventory_path(None, &config), PathBuf::from("/etc/inv.json"));
    }
}
