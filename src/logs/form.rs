use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use super::LogQuery;
use crate::Theme;
use crate::config::{KeyResolver, NavAction, SearchAction};
use crate::error::ValidationError;
use crate::ui::{Component, EventResult, Result, TextInput, TextInputEvent};

pub enum SearchFormEvent {
    Submit(LogQuery),
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Contains,
    Limit,
    Follow,
}

impl Field {
    const fn next(self) -> Self {
        match self {
            Self::Contains => Self::Limit,
            Self::Limit => Self::Follow,
            Self::Follow => Self::Contains,
        }
    }

    const fn prev(self) -> Self {
        match self {
            Self::Contains => Self::Follow,
            Self::Limit => Self::Contains,
            Self::Follow => Self::Limit,
        }
    }
}

/// Side pane editing a [`LogQuery`].
pub struct LogSearchForm {
    contains: TextInput,
    limit: TextInput,
    follow: bool,
    focus: Field,
    resolver: Arc<KeyResolver>,
}

impl LogSearchForm {
    pub fn new(query: &LogQuery, resolver: Arc<KeyResolver>) -> Self {
        let mut form = Self {
            contains: TextInput::new("Contains")
                .with_value(query.contains.clone().unwrap_or_default())
                .with_placeholder("any text"),
            limit: TextInput::new("Limit").with_value(query.limit.to_string()),
            follow: query.follow,
            focus: Field::Contains,
            resolver,
        };
        form.focus(Field::Contains);
        form
    }

    fn focus(&mut self, field: Field) {
        self.focus = field;
        self.contains.set_focused(field == Field::Contains);
        self.limit.set_focused(field == Field::Limit);
    }

    /// Parse the fields. A bad field keeps its error inline until edited.
    pub fn parse(&mut self) -> std::result::Result<LogQuery, ValidationError> {
        let limit = match self.limit.value().trim() {
            "" => LogQuery::default().limit,
            raw => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    let err = ValidationError::new("limit", "must be a positive whole number");
                    self.limit.set_error(Some(err.reason.clone()));
                    self.focus(Field::Limit);
                    return Err(err);
                }
            },
        };

        let contains = self.contains.value().trim();
        Ok(LogQuery {
            contains: (!contains.is_empty()).then(|| contains.to_string()),
            limit,
            follow: self.follow,
        })
    }

    fn submit(&mut self) -> EventResult<SearchFormEvent> {
        match self.parse() {
            Ok(query) => SearchFormEvent::Submit(query).into(),
            Err(_) => EventResult::Consumed,
        }
    }

    fn input_event(&mut self, event: EventResult<TextInputEvent>) -> EventResult<SearchFormEvent> {
        match event {
            EventResult::Event(TextInputEvent::Submitted(_)) => self.submit(),
            EventResult::Event(TextInputEvent::Cancelled) => SearchFormEvent::Close.into(),
            EventResult::Event(TextInputEvent::Changed(_)) | EventResult::Consumed => {
                EventResult::Consumed
            }
            EventResult::Ignored => EventResult::Ignored,
        }
    }
}

impl Component for LogSearchForm {
    type Output = SearchFormEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        if self.resolver.matches_search(&key, SearchAction::Exit) {
            return Ok(SearchFormEvent::Close.into());
        }
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.focus(self.focus.next());
                return Ok(EventResult::Consumed);
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus(self.focus.prev());
                return Ok(EventResult::Consumed);
            }
            _ => {}
        }

        Ok(match self.focus {
            Field::Contains => {
                let event = self.contains.handle_key(key)?;
                self.input_event(event)
            }
            Field::Limit => {
                let event = self.limit.handle_key(key)?;
                self.input_event(event)
            }
            Field::Follow => {
                if self.resolver.matches_nav(&key, NavAction::Select) {
                    self.submit()
                } else if key.code == KeyCode::Char(' ') {
                    self.follow = !self.follow;
                    EventResult::Consumed
                } else {
                    EventResult::Consumed
                }
            }
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border_focused()))
            .title(" Search ")
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [contains_area, limit_area, follow_area, _, hint_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(inner);

        self.contains.render(frame, contains_area, theme);
        self.limit.render(frame, limit_area, theme);

        let label_style = if self.focus == Field::Follow {
            Style::default()
                .fg(theme.lavender())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.subtext0())
        };
        let (mark, mark_style) = if self.follow {
            ("[x]", Style::default().fg(theme.green()))
        } else {
            ("[ ]", Style::default().fg(theme.overlay1()))
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("Follow: ", label_style),
                Span::styled(mark, mark_style),
            ])),
            follow_area,
        );

        frame.render_widget(
            Paragraph::new("Tab next · Enter apply").style(Style::default().fg(theme.overlay1())),
            hint_area,
        );
    }
}
