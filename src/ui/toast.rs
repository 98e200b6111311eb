use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use super::Component;
use crate::Theme;

const MAX_VISIBLE: usize = 3;
const TOAST_HEIGHT: u16 = 3;
const TOAST_WIDTH: u16 = 50;
const SPACING: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastType {
    Success,
    Error,
}

/// A transient notice in the bottom-right corner of the body.
pub struct Toast {
    message: String,
    toast_type: ToastType,
    created_at: Instant,
    duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, toast_type: ToastType) -> Self {
        Self {
            message: message.into(),
            toast_type,
            created_at: Instant::now(),
            duration: match toast_type {
                ToastType::Error => Duration::from_secs(6),
                ToastType::Success => Duration::from_secs(3),
            },
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Success)
    }

    /// Failures stay up twice as long.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastType::Error)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn toast_type(&self) -> ToastType {
        self.toast_type
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }
}

/// Slots for `count` toasts, newest at the bottom. Slots that do not fit
/// are left out.
fn slots(area: Rect, count: usize) -> Vec<Rect> {
    let width = TOAST_WIDTH.min(area.width.saturating_sub(4));
    let x = area.x + area.width.saturating_sub(width + 2);
    (0u16..)
        .take(count)
        .map_while(|i| {
            let bottom = i * (TOAST_HEIGHT + SPACING) + TOAST_HEIGHT + 1;
            (bottom <= area.height)
                .then(|| Rect::new(x, area.y + area.height - bottom, width, TOAST_HEIGHT))
        })
        .collect()
}

/// Keeps the newest few toasts and drops them once they expire.
#[derive(Default)]
pub struct ToastManager {
    toasts: VecDeque<Toast>,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn show(&mut self, toast: Toast) {
        self.toasts.push_back(toast);
        while self.toasts.len() > MAX_VISIBLE {
            self.toasts.pop_front();
        }
    }
}

impl Component for ToastManager {
    type Output = ();

    fn handle_tick(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let areas = slots(area, self.toasts.len());
        for (toast, toast_area) in self.toasts.iter().rev().zip(areas) {
            let (color, icon) = match toast.toast_type {
                ToastType::Success => (theme.green(), "✓"),
                ToastType::Error => (theme.red(), "✗"),
            };

            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color))
                .style(Style::default().bg(theme.surface0()));
            let text = Paragraph::new(format!("{icon} {}", toast.message))
                .style(Style::default().fg(theme.text()).add_modifier(Modifier::BOLD))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);

            frame.render_widget(Clear, toast_area);
            frame.render_widget(text, toast_area);
        }
    }
}
