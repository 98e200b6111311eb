use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::config::{GlobalAction, KeyResolver};

const BREADCRUMB_SEPARATOR: &str = " › ";

/// A key hint shown in the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybinding {
    pub key: String,
    pub description: String,
    /// Shown in the footer; otherwise only listed.
    pub hint: bool,
}

impl Keybinding {
    pub fn new(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            hint: false,
        }
    }

    pub fn hint(key: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            hint: true,
            ..Self::new(key, description)
        }
    }
}

/// Breadcrumb header and key hint footer around the active frame.
pub struct StatusBar {
    app_name: &'static str,
    resolver: Arc<KeyResolver>,
}

impl StatusBar {
    pub const fn new(app_name: &'static str, resolver: Arc<KeyResolver>) -> Self {
        Self { app_name, resolver }
    }

    pub fn render_header(&self, frame: &mut Frame, area: Rect, theme: &Theme, breadcrumbs: &[&str]) {
        let mut spans = vec![Span::styled(
            format!(" {} ", self.app_name),
            Style::default()
                .fg(theme.base())
                .bg(theme.mauve())
                .add_modifier(Modifier::BOLD),
        )];
        spans.push(Span::raw(" "));

        let last = breadcrumbs.len().saturating_sub(1);
        for (i, crumb) in breadcrumbs.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(
                    BREADCRUMB_SEPARATOR,
                    Style::default().fg(theme.surface2()),
                ));
            }
            let style = if i == last {
                Style::default()
                    .fg(theme.lavender())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.subtext0())
            };
            spans.push(Span::styled((*crumb).to_string(), style));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    pub fn render_footer(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        local_keybindings: &[Keybinding],
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.surface1()));

        let inner_area = block.inner(area);
        frame.render_widget(block, area);

        let global_keybindings = self.global_keybindings();

        // Local first, then global
        let hints: Vec<&Keybinding> = local_keybindings
            .iter()
            .filter(|kb| kb.hint)
            .chain(global_keybindings.iter().filter(|kb| kb.hint))
            .collect();

        if hints.is_empty() {
            return;
        }

        // Compute alignment widths from actual content so the separator
        // forms a straight vertical line regardless of key length.
        let max_key_w = hints.iter().map(|kb| kb.key.chars().count()).max().unwrap_or(1);
        let max_desc_w = hints
            .iter()
            .map(|kb| kb.description.chars().count())
            .max()
            .unwrap_or(1);
        // key(right-aligned) + " │ " (3) + desc + gap(2)
        let col_width = u16::try_from(max_key_w + 3 + max_desc_w + 2).unwrap_or(u16::MAX);
        let num_cols = (inner_area.width / col_width.max(1)).max(1) as usize;
        let num_rows = (inner_area.height as usize).max(1);

        // Fill column by column
        let mut columns: Vec<Vec<Line>> = vec![Vec::new(); num_cols];

        for (i, kb) in hints.iter().enumerate() {
            let col_idx = i / num_rows;
            if col_idx >= num_cols {
                break;
            }

            let line = Line::from(vec![
                Span::styled(
                    format!("{:>width$}", kb.key, width = max_key_w),
                    Style::default().fg(theme.peach()),
                ),
                Span::styled(" │ ", Style::default().fg(theme.surface2())),
                Span::styled(
                    kb.description.clone(),
                    Style::default().fg(theme.subtext0()),
                ),
            ]);
            columns[col_idx].push(line);
        }

        let col_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Length(col_width); num_cols])
            .split(inner_area);

        for (col_lines, col_area) in columns.into_iter().zip(col_areas.iter()) {
            frame.render_widget(Paragraph::new(col_lines), *col_area);
        }
    }

    pub fn global_keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::hint(self.resolver.display_global(GlobalAction::Back), "Back"),
            Keybinding::hint(self.resolver.display_global(GlobalAction::Quit), "Quit"),
            Keybinding::new(self.resolver.display_global(GlobalAction::Suspend), "Suspend"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn test_header_joins_breadcrumbs() {
        let bar = StatusBar::new("lazyinfra", Arc::new(KeyResolver::default()));
        let mut terminal = Terminal::new(TestBackend::new(60, 1)).unwrap();
        terminal
            .draw(|f| bar.render_header(f, f.area(), &Theme::default(), &["Resources", "api"]))
            .unwrap();
        assert!(screen_text(&terminal).contains("Resources › api"));
    }

    #[test]
    fn test_footer_lists_local_hints_first() {
        let bar = StatusBar::new("lazyinfra", Arc::new(KeyResolver::default()));
        let mut terminal = Terminal::new(TestBackend::new(80, 5)).unwrap();
        let local = [Keybinding::hint("r", "Reload"), Keybinding::new("y", "Copy")];
        terminal
            .draw(|f| bar.render_footer(f, f.area(), &Theme::default(), &local))
            .unwrap();

        let text = screen_text(&terminal);
        let reload = text.find("Reload").unwrap();
        let back = text.find("Back").unwrap();
        assert!(reload < back);
        assert!(!text.contains("Copy"));
    }
}
