use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use crate::Theme;
use crate::config::{GlobalAction, KeyResolver};
use crate::error::LoadError;
use crate::ui::{Component, EventResult, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorEvent {
    Back,
    Quit,
}

/// Full-area takeover shown in place of a view that failed.
pub struct ErrorView {
    title: String,
    message: String,
    resolver: Arc<KeyResolver>,
}

impl ErrorView {
    pub fn new(error: &LoadError, resolver: Arc<KeyResolver>) -> Self {
        Self {
            title: error.title().to_string(),
            message: error.message(),
            resolver,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Debug for ErrorView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorView")
            .field("title", &self.title)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl Component for ErrorView {
    type Output = ErrorEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.resolver.matches_global(&key, GlobalAction::Back) {
            return Ok(ErrorEvent::Back.into());
        }
        if self.resolver.matches_global(&key, GlobalAction::Quit) {
            return Ok(ErrorEvent::Quit.into());
        }
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup_area = area.centered(Constraint::Percentage(70), Constraint::Percentage(60));

        frame.render_widget(Clear, area);

        let title_style = Style::default()
            .fg(theme.red())
            .add_modifier(Modifier::BOLD);
        let hint_style = Style::default().fg(theme.overlay1());

        let hint = format!(
            "Press {} to go back, {} to quit",
            self.resolver.display_global(GlobalAction::Back),
            self.resolver.display_global(GlobalAction::Quit)
        );

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                self.message.as_str(),
                Style::default().fg(theme.text()),
            )),
            Line::from(""),
            Line::from(Span::styled(hint, hint_style)),
        ];

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(title_style)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.red()))
            .style(Style::default().bg(theme.base()));

        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, popup_area);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    #[test]
    fn test_only_back_and_quit_escape() {
        let mut view = ErrorView::new(
            &LoadError::failed("disk full"),
            Arc::new(KeyResolver::default()),
        );
        let press = |view: &mut ErrorView, code| {
            view.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
        };

        assert_eq!(press(&mut view, KeyCode::Esc), EventResult::Event(ErrorEvent::Back));
        assert_eq!(press(&mut view, KeyCode::Char('q')), EventResult::Event(ErrorEvent::Quit));
        assert_eq!(press(&mut view, KeyCode::Enter), EventResult::Consumed);
        assert_eq!(press(&mut view, KeyCode::Char('r')), EventResult::Consumed);
    }

    #[test]
    fn test_user_facing_title_is_kept() {
        let view = ErrorView::new(
            &LoadError::UserFacing {
                title: "Inventory missing".to_string(),
                message: "create inventory.json".to_string(),
            },
            Arc::new(KeyResolver::default()),
        );
        assert_eq!(view.title(), "Inventory missing");
        assert_eq!(view.message(), "create inventory.json");
    }
}
