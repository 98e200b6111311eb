use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

use crate::config::key::{Key, KeyBinding};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalKeybindings {
    pub quit: KeyBinding,
    pub back: KeyBinding,
    pub suspend: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationKeybindings {
    pub up: KeyBinding,
    pub down: KeyBinding,
    pub page_up: KeyBinding,
    pub page_down: KeyBinding,
    pub home: KeyBinding,
    pub end: KeyBinding,
    pub select: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchKeybindings {
    pub toggle: KeyBinding,
    pub exit: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogKeybindings {
    pub confirm: KeyBinding,
    pub cancel: KeyBinding,
    pub left: KeyBinding,
    pub right: KeyBinding,
    pub activate: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserKeybindings {
    pub reload: KeyBinding,
    pub copy: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceKeybindings {
    pub remove: KeyBinding,
    pub restart: KeyBinding,
    pub edit: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogKeybindings {
    pub follow: KeyBinding,
    pub top: KeyBinding,
    pub bottom: KeyBinding,
}

/// Every configurable key. Groups missing from the file keep their defaults,
/// and so do keys missing from a group.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub global: GlobalKeybindings,
    pub navigation: NavigationKeybindings,
    pub search: SearchKeybindings,
    pub dialog: DialogKeybindings,
    pub browser: BrowserKeybindings,
    pub resources: ResourceKeybindings,
    pub logs: LogKeybindings,
}

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::char('q').into(),
            back: Key::new(KeyCode::Esc).into(),
            suspend: Key::with_ctrl(KeyCode::Char('z')).into(),
        }
    }
}

impl Default for NavigationKeybindings {
    fn default() -> Self {
        Self {
            up: KeyBinding::multiple(vec![Key::char('k'), Key::new(KeyCode::Up)]),
            down: KeyBinding::multiple(vec![Key::char('j'), Key::new(KeyCode::Down)]),
            page_up: KeyBinding::multiple(vec![
                Key::new(KeyCode::PageUp),
                Key::with_ctrl(KeyCode::Char('u')),
            ]),
            page_down: KeyBinding::multiple(vec![
                Key::new(KeyCode::PageDown),
                Key::with_ctrl(KeyCode::Char('d')),
            ]),
            home: KeyBinding::multiple(vec![Key::char('g'), Key::new(KeyCode::Home)]),
            end: KeyBinding::multiple(vec![Key::char('G'), Key::new(KeyCode::End)]),
            select: Key::new(KeyCode::Enter).into(),
        }
    }
}

impl Default for SearchKeybindings {
    fn default() -> Self {
        Self {
            toggle: Key::char('/').into(),
            exit: Key::new(KeyCode::Esc).into(),
        }
    }
}

impl Default for DialogKeybindings {
    fn default() -> Self {
        Self {
            confirm: KeyBinding::multiple(vec![Key::char('y'), Key::char('Y')]),
            cancel: KeyBinding::multiple(vec![Key::char('n'), Key::char('N')]),
            left: KeyBinding::multiple(vec![Key::new(KeyCode::Left), Key::char('h')]),
            right: KeyBinding::multiple(vec![Key::new(KeyCode::Right), Key::char('l')]),
            activate: Key::new(KeyCode::Enter).into(),
        }
    }
}

impl Default for BrowserKeybindings {
    fn default() -> Self {
        Self {
            reload: Key::char('r').into(),
            copy: Key::char('y').into(),
        }
    }
}

impl Default for ResourceKeybindings {
    fn default() -> Self {
        Self {
            remove: KeyBinding::multiple(vec![Key::char('d'), Key::new(KeyCode::Delete)]),
            restart: Key::char('R').into(),
            edit: Key::char('e').into(),
        }
    }
}

impl Default for LogKeybindings {
    fn default() -> Self {
        Self {
            follow: Key::char('f').into(),
            top: Key::char('g').into(),
            bottom: Key::char('G').into(),
        }
    }
}
