use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use crate::Theme;
use crate::config::{DialogAction, KeyResolver};
use crate::ui::{Component, EventResult, Result};

const MIN_WIDTH: u16 = 30;
const MAX_WIDTH: u16 = 72;
const HEIGHT: u16 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmEvent {
    Confirmed,
    Cancelled,
}

#[derive(Default, Clone, Copy)]
enum ConfirmStyle {
    #[default]
    Normal,
    /// Shows red warning styling.
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Confirm,
    Cancel,
}

pub struct ConfirmDialog {
    title: String,
    message: String,
    confirm_text: String,
    cancel_text: String,
    style: ConfirmStyle,
    highlighted: Choice,
    /// Last known size of the area the dialog is centered in
    size: (u16, u16),
    resolver: Arc<KeyResolver>,
}

impl ConfirmDialog {
    pub fn new(message: impl Into<String>, resolver: Arc<KeyResolver>) -> Self {
        Self {
            title: "Confirm".to_string(),
            message: message.into(),
            confirm_text: "Yes".to_string(),
            cancel_text: "No".to_string(),
            style: ConfirmStyle::Normal,
            highlighted: Choice::Confirm,
            size: (0, 0),
            resolver,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Destructive prompt: red styling and "No" highlighted first.
    #[must_use]
    pub const fn danger(mut self) -> Self {
        self.style = ConfirmStyle::Danger;
        self.highlighted = Choice::Cancel;
        self
    }

    pub const fn set_size(&mut self, width: u16, height: u16) {
        self.size = (width, height);
    }

    pub const fn size(&self) -> (u16, u16) {
        self.size
    }

    #[cfg(test)]
    pub fn is_confirm_highlighted(&self) -> bool {
        self.highlighted == Choice::Confirm
    }

    const fn toggle(&mut self) {
        self.highlighted = match self.highlighted {
            Choice::Confirm => Choice::Cancel,
            Choice::Cancel => Choice::Confirm,
        };
    }

    /// Popup placement inside `area`, sized from the stored dimensions.
    fn popup_area(&self, area: Rect) -> Rect {
        let (width, _) = self.size;
        let reference = if width == 0 { area.width } else { width.min(area.width) };
        let popup_width = (reference / 2).clamp(MIN_WIDTH, MAX_WIDTH).min(area.width);
        area.centered(
            Constraint::Length(popup_width),
            Constraint::Length(HEIGHT.min(area.height)),
        )
    }

    fn button(&self, label: &str, choice: Choice, color: ratatui::style::Color, theme: &Theme) -> Span<'static> {
        let text = format!("  {label}  ");
        if self.highlighted == choice {
            Span::styled(
                text,
                Style::default()
                    .fg(theme.base())
                    .bg(color)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(text, Style::default().fg(color))
        }
    }
}

impl Component for ConfirmDialog {
    type Output = ConfirmEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.resolver.matches_dialog(&key, DialogAction::Confirm) {
            return Ok(ConfirmEvent::Confirmed.into());
        }
        if self.resolver.matches_dialog(&key, DialogAction::Cancel) {
            return Ok(ConfirmEvent::Cancelled.into());
        }
        if self.resolver.matches_dialog(&key, DialogAction::Left)
            || self.resolver.matches_dialog(&key, DialogAction::Right)
        {
            self.toggle();
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_dialog(&key, DialogAction::Activate) {
            return Ok(match self.highlighted {
                Choice::Confirm => ConfirmEvent::Confirmed,
                Choice::Cancel => ConfirmEvent::Cancelled,
            }
            .into());
        }
        // Consume all other keys to prevent propagation
        Ok(EventResult::Consumed)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let popup_area = self.popup_area(area);

        // Clear the area behind the popup
        frame.render_widget(Clear, popup_area);

        let (title_color, border_color, confirm_color) = match self.style {
            ConfirmStyle::Normal => (theme.mauve(), theme.lavender(), theme.green()),
            ConfirmStyle::Danger => (theme.red(), theme.red(), theme.red()),
        };

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(self.message.clone(), Style::default().fg(theme.text()))),
            Line::from(""),
            Line::from(vec![
                self.button(&self.confirm_text, Choice::Confirm, confirm_color, theme),
                Span::raw("    "),
                self.button(&self.cancel_text, Choice::Cancel, theme.overlay1(), theme),
            ]),
        ];

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(
                Style::default()
                    .fg(title_color)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color))
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

    fn dialog() -> ConfirmDialog {
        ConfirmDialog::new("Remove?", Arc::new(KeyResolver::default()))
    }

    fn press(dialog: &mut ConfirmDialog, code: KeyCode) -> EventResult<ConfirmEvent> {
        dialog
            .handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    #[test]
    fn test_arrows_toggle_highlight() {
        let mut dialog = dialog();
        assert!(dialog.is_confirm_highlighted());
        assert_eq!(press(&mut dialog, KeyCode::Right), EventResult::Consumed);
        assert!(!dialog.is_confirm_highlighted());
        assert_eq!(press(&mut dialog, KeyCode::Left), EventResult::Consumed);
        assert!(dialog.is_confirm_highlighted());
    }

    #[test]
    fn test_danger_starts_on_cancel() {
        let mut dialog = dialog().danger();
        assert_eq!(
            press(&mut dialog, KeyCode::Enter),
            EventResult::Event(ConfirmEvent::Cancelled)
        );
    }

    #[test]
    fn test_popup_follows_stored_size() {
        let mut dialog = dialog();
        let area = Rect::new(0, 0, 200, 50);
        dialog.set_size(100, 50);
        assert_eq!(dialog.popup_area(area).width, 50);
        dialog.set_size(200, 50);
        assert_eq!(dialog.popup_area(area).width, MAX_WIDTH);
        dialog.set_size(0, 0);
        assert_eq!(dialog.popup_area(Rect::new(0, 0, 20, 5)).width, 20);
    }
}
