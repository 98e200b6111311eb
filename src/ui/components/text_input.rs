use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::Theme;
use crate::ui::{Component, EventResult, Result};

pub enum TextInputEvent {
    Submitted(String),
    Cancelled,
    Changed(String),
}

/// Single-line inline text field.
///
/// The cursor counts characters, not bytes.
pub struct TextInput {
    label: String,
    value: String,
    cursor: usize,
    placeholder: Option<String>,
    focused: bool,
    error: Option<String>,
}

impl TextInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: String::new(),
            cursor: 0,
            placeholder: None,
            focused: false,
            error: None,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.cursor = self.len();
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Show `error` under the field until the next edit.
    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_offset(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    fn delete_char_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset(self.cursor);
            self.value.remove(at);
        }
    }

    fn delete_char_at_cursor(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_offset(self.cursor);
            self.value.remove(at);
        }
    }

    fn delete_word_before_cursor(&mut self) {
        let chars: Vec<char> = self.value.chars().collect();
        let mut pos = self.cursor;
        // Skip trailing spaces
        while pos > 0 && chars[pos - 1] == ' ' {
            pos -= 1;
        }
        // Skip word characters
        while pos > 0 && chars[pos - 1] != ' ' {
            pos -= 1;
        }
        let (start, end) = (self.byte_offset(pos), self.byte_offset(self.cursor));
        self.value.drain(start..end);
        self.cursor = pos;
    }

    fn clear_line(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn edited(&mut self) -> EventResult<TextInputEvent> {
        self.error = None;
        TextInputEvent::Changed(self.value.clone()).into()
    }
}

impl Component for TextInput {
    type Output = TextInputEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        Ok(match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => TextInputEvent::Submitted(self.value.clone()).into(),
            (KeyCode::Esc, _) => TextInputEvent::Cancelled.into(),

            // Delete
            (KeyCode::Backspace, KeyModifiers::ALT) => {
                self.delete_word_before_cursor();
                self.edited()
            }
            (KeyCode::Backspace, _) => {
                self.delete_char_before_cursor();
                self.edited()
            }
            (KeyCode::Delete, _) => {
                self.delete_char_at_cursor();
                self.edited()
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.clear_line();
                self.edited()
            }

            // Navigation
            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                EventResult::Consumed
            }
            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(self.len());
                EventResult::Consumed
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                EventResult::Consumed
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.len();
                EventResult::Consumed
            }

            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.insert_char(c);
                self.edited()
            }

            // Tab and friends belong to the enclosing form
            _ => EventResult::Ignored,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [field_area, error_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(area);

        let label_style = if self.focused {
            Style::default()
                .fg(theme.lavender())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.subtext0())
        };
        let input_style = Style::default().fg(theme.text());
        let cursor_style = Style::default()
            .fg(theme.base())
            .bg(theme.text())
            .add_modifier(Modifier::BOLD);

        let mut spans = vec![Span::styled(format!("{}: ", self.label), label_style)];

        match (&self.placeholder, self.value.is_empty()) {
            (Some(placeholder), true) => {
                if self.focused {
                    spans.push(Span::styled(" ", cursor_style));
                }
                spans.push(Span::styled(
                    placeholder.clone(),
                    Style::default().fg(theme.overlay0()),
                ));
            }
            _ if self.focused => {
                let before: String = self.value.chars().take(self.cursor).collect();
                let mut after = self.value.chars().skip(self.cursor);
                let at_cursor = after.next().unwrap_or(' ');
                let rest: String = after.collect();
                spans.push(Span::styled(before, input_style));
                spans.push(Span::styled(at_cursor.to_string(), cursor_style));
                spans.push(Span::styled(rest, input_style));
            }
            _ => spans.push(Span::styled(self.value.clone(), input_style)),
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), field_area);

        if let Some(error) = &self.error {
            let line = Line::from(Span::styled(
                format!("  {error}"),
                Style::default().fg(theme.error()),
            ));
            frame.render_widget(Paragraph::new(line), error_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(input: &mut TextInput, text: &str) {
        for c in text.chars() {
            input
                .handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
                .unwrap();
        }
    }

    fn press(input: &mut TextInput, code: KeyCode, modifiers: KeyModifiers) -> EventResult<TextInputEvent> {
        input.handle_key(KeyEvent::new(code, modifiers)).unwrap()
    }

    #[test]
    fn test_editing_handles_multibyte_characters() {
        let mut input = TextInput::new("Contains").with_value("héllo");
        press(&mut input, KeyCode::Left, KeyModifiers::NONE);
        press(&mut input, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(input.value(), "hélo");

        press(&mut input, KeyCode::Home, KeyModifiers::NONE);
        type_str(&mut input, "ü");
        assert_eq!(input.value(), "ühélo");
    }

    #[test]
    fn test_delete_word() {
        let mut input = TextInput::new("Contains").with_value("level=error  ");
        type_str(&mut input, "x");
        press(&mut input, KeyCode::Backspace, KeyModifiers::ALT);
        assert_eq!(input.value(), "level=error  ");
        press(&mut input, KeyCode::Backspace, KeyModifiers::ALT);
        assert_eq!(input.value(), "");
    }

    #[test]
    fn test_edit_clears_error() {
        let mut input = TextInput::new("Limit").with_value("x");
        input.set_error(Some("must be a number".to_string()));
        press(&mut input, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(input.error(), None);
    }

    #[test]
    fn test_tab_is_left_to_the_form() {
        let mut input = TextInput::new("Limit");
        assert!(matches!(
            press(&mut input, KeyCode::Tab, KeyModifiers::NONE),
            EventResult::Ignored
        ));
        assert!(matches!(
            press(&mut input, KeyCode::Enter, KeyModifiers::NONE),
            EventResult::Event(TextInputEvent::Submitted(v)) if v.is_empty()
        ));
    }
}
