pub mod actions;
pub mod key;
pub mod keybindings;
pub mod loader;
pub mod resolver;

use std::path::PathBuf;

use color_eyre::Result;
use color_eyre::eyre::ensure;
use serde::{Deserialize, Serialize};

pub use actions::*;
pub use key::{Key, KeyBinding};
pub use keybindings::KeybindingsConfig;
pub use loader::load;
pub use resolver::KeyResolver;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

/// Layout and timing knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Animation ticks per second
    pub tick_rate: f64,
    /// Frames drawn per second
    pub frame_rate: f64,
    /// Columns taken by the log search pane while it is open
    pub search_pane_width: u16,
    /// Rows a list keeps visible even on tiny terminals
    pub min_page_size: u16,
    pub min_column_width: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate: 8.0,
            frame_rate: 30.0,
            search_pane_width: 36,
            min_page_size: 3,
            min_column_width: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub ui: UiConfig,
    /// Resource inventory file, overridden by `--inventory`
    #[serde(default)]
    pub inventory: Option<PathBuf>,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.ui.tick_rate > 0.0, "ui.tick_rate must be positive");
        ensure!(self.ui.frame_rate > 0.0, "ui.frame_rate must be positive");
        ensure!(self.ui.min_page_size > 0, "ui.min_page_size must be at least 1");
        Ok(())
    }
}
