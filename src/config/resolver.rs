use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::{
    BrowserAction, DialogAction, GlobalAction, LogsAction, NavAction, SearchAction,
};
use crate::config::keybindings::KeybindingsConfig;

/// Answers "does this key trigger that action" for every view.
pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    // Global actions
    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.matches(event),
            GlobalAction::Back => kb.back.matches(event),
            GlobalAction::Suspend => kb.suspend.matches(event),
        }
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => kb.quit.display(),
            GlobalAction::Back => kb.back.display(),
            GlobalAction::Suspend => kb.suspend.display(),
        }
    }

    // Navigation actions
    pub fn matches_nav(&self, event: &KeyEvent, action: NavAction) -> bool {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => kb.up.matches(event),
            NavAction::Down => kb.down.matches(event),
            NavAction::PageUp => kb.page_up.matches(event),
            NavAction::PageDown => kb.page_down.matches(event),
            NavAction::Home => kb.home.matches(event),
            NavAction::End => kb.end.matches(event),
            NavAction::Select => kb.select.matches(event),
        }
    }

    pub fn display_nav(&self, action: NavAction) -> String {
        let kb = &self.keybindings.navigation;
        match action {
            NavAction::Up => kb.up.display(),
            NavAction::Down => kb.down.display(),
            NavAction::PageUp => kb.page_up.display(),
            NavAction::PageDown => kb.page_down.display(),
            NavAction::Home => kb.home.display(),
            NavAction::End => kb.end.display(),
            NavAction::Select => kb.select.display(),
        }
    }

    // Search actions
    pub fn matches_search(&self, event: &KeyEvent, action: SearchAction) -> bool {
        let kb = &self.keybindings.search;
        match action {
            SearchAction::Toggle => kb.toggle.matches(event),
            SearchAction::Exit => kb.exit.matches(event),
        }
    }

    pub fn display_search(&self, action: SearchAction) -> String {
        let kb = &self.keybindings.search;
        match action {
            SearchAction::Toggle => kb.toggle.display(),
            SearchAction::Exit => kb.exit.display(),
        }
    }

    // Dialog actions
    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Confirm => kb.confirm.matches(event),
            DialogAction::Cancel => kb.cancel.matches(event),
            DialogAction::Left => kb.left.matches(event),
            DialogAction::Right => kb.right.matches(event),
            DialogAction::Activate => kb.activate.matches(event),
        }
    }

    pub fn display_dialog(&self, action: DialogAction) -> String {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Confirm => kb.confirm.display(),
            DialogAction::Cancel => kb.cancel.display(),
            DialogAction::Left => kb.left.display(),
            DialogAction::Right => kb.right.display(),
            DialogAction::Activate => kb.activate.display(),
        }
    }

    // Browser actions
    pub fn matches_browser(&self, event: &KeyEvent, action: BrowserAction) -> bool {
        let kb = &self.keybindings.browser;
        match action {
            BrowserAction::Reload => kb.reload.matches(event),
        }
    }

    pub fn display_browser(&self, action: BrowserAction) -> String {
        let kb = &self.keybindings.browser;
        match action {
            BrowserAction::Reload => kb.reload.display(),
        }
    }

    // Log actions
    pub fn matches_logs(&self, event: &KeyEvent, action: LogsAction) -> bool {
        let kb = &self.keybindings.logs;
        match action {
            LogsAction::Follow => kb.follow.matches(event),
            LogsAction::Top => kb.top.matches(event),
            LogsAction::Bottom => kb.bottom.matches(event),
        }
    }

    pub fn display_logs(&self, action: LogsAction) -> String {
        let kb = &self.keybindings.logs;
        match action {
            LogsAction::Follow => kb.follow.display(),
            LogsAction::Top => kb.top.display(),
            LogsAction::Bottom => kb.bottom.display(),
        }
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}
