use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::prelude::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table as RatatuiTable, TableState};

use crate::Theme;
use crate::config::{KeyResolver, NavAction, SearchAction};
use crate::search::Matcher;
use crate::ui::{Component, EventResult, Result};

/// Rows taken by borders and the header.
const CHROME_HEIGHT: u16 = 4;

pub enum TableEvent<T> {
    Changed(T),
    Activated(T),
    FilterChanged(String),
}

pub struct ColumnDef {
    pub header: &'static str,
    pub constraint: Constraint,
}

impl ColumnDef {
    pub const fn new(header: &'static str, constraint: Constraint) -> Self {
        Self { header, constraint }
    }
}

pub trait TableRow {
    fn columns() -> &'static [ColumnDef];
    fn render_cells(&self, theme: &Theme) -> Vec<Cell<'static>>;

    /// The single string a row is filtered by.
    ///
    /// Rows that cannot be reduced to one unambiguous string return `None`,
    /// which disables filtering for the whole table.
    fn filter_value(&self) -> Option<String> {
        None
    }
}

pub struct Table<T: TableRow + Clone> {
    items: Vec<T>,
    filtered_indices: Vec<usize>,
    state: TableState,
    title: Option<String>,
    searching: bool,
    query: String,
    page_size: usize,
    column_width: u16,
    resolver: Arc<KeyResolver>,
}

impl<T: TableRow + Clone> Table<T> {
    pub fn new(items: Vec<T>, resolver: Arc<KeyResolver>) -> Self {
        let mut table = Self {
            items: Vec::new(),
            filtered_indices: Vec::new(),
            state: TableState::default(),
            title: None,
            searching: false,
            query: String::new(),
            page_size: 10,
            column_width: 0,
            resolver,
        };
        table.set_items(items);
        table
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replace the rows, keeping the filter and clamping the selection.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        if !self.filter_enabled() {
            self.searching = false;
            self.query.clear();
        }
        self.update_filter();
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Rows currently passing the filter, in display order.
    pub fn visible(&self) -> impl Iterator<Item = &T> {
        self.filtered_indices.iter().filter_map(|&idx| self.items.get(idx))
    }

    pub fn selected_item(&self) -> Option<&T> {
        let selected = self.state.selected()?;
        let idx = *self.filtered_indices.get(selected)?;
        self.items.get(idx)
    }

    pub fn filter_enabled(&self) -> bool {
        self.items.iter().all(|item| item.filter_value().is_some())
    }

    pub const fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Recompute page size and column width for a body of `width` x `height`.
    ///
    /// Degenerate sizes clamp to the given minimums.
    pub fn layout(&mut self, width: u16, height: u16, min_page_size: u16, min_column_width: u16) {
        let rows = height.saturating_sub(CHROME_HEIGHT).max(min_page_size).max(1);
        self.page_size = usize::from(rows);

        let columns = u16::try_from(T::columns().len()).unwrap_or(u16::MAX).max(1);
        self.column_width = (width.saturating_sub(4) / columns).max(min_column_width);
    }

    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    pub const fn column_width(&self) -> u16 {
        self.column_width
    }

    fn update_filter(&mut self) {
        let matcher = Matcher::new(&self.query);
        self.filtered_indices = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                matcher.is_empty() || item.filter_value().is_some_and(|v| matcher.matches(&v))
            })
            .map(|(i, _)| i)
            .collect();

        // Reset selection to first item if current selection is invalid
        if self.filtered_indices.is_empty() {
            self.state.select(None);
        } else if self
            .state
            .selected()
            .is_none_or(|i| i >= self.filtered_indices.len())
        {
            self.state.select(Some(0));
        }
    }

    fn last_index(&self) -> Option<usize> {
        self.filtered_indices.len().checked_sub(1)
    }

    fn select_offset(&mut self, delta: isize) {
        let Some(last) = self.last_index() else {
            return;
        };
        let current = self.state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(last);
        self.state.select(Some(next));
    }

    fn get_change_event(&self, before: Option<usize>) -> EventResult<TableEvent<T>> {
        if let Some(selected) = self.state.selected()
            && Some(selected) != before
            && let Some(&idx) = self.filtered_indices.get(selected)
        {
            return TableEvent::Changed(self.items[idx].clone()).into();
        }
        EventResult::Consumed
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> EventResult<TableEvent<T>> {
        // Exit search mode and clear filter
        if self.resolver.matches_search(&key, SearchAction::Exit) {
            self.searching = false;
            let had_query = !self.query.is_empty();
            self.query.clear();
            self.update_filter();
            return if had_query {
                TableEvent::FilterChanged(String::new()).into()
            } else {
                EventResult::Consumed
            };
        }

        // Select (Enter) exits search but keeps the filter
        if self.resolver.matches_nav(&key, NavAction::Select) {
            self.searching = false;
            return EventResult::Consumed;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Backspace, _) => {
                self.query.pop();
                self.update_filter();
                TableEvent::FilterChanged(self.query.clone()).into()
            }
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.query.push(c);
                self.update_filter();
                TableEvent::FilterChanged(self.query.clone()).into()
            }
            // Consume all other keys in search mode
            _ => EventResult::Consumed,
        }
    }

    fn handle_navigation_key(&mut self, key: KeyEvent) -> EventResult<TableEvent<T>> {
        let before = self.state.selected();
        let page = isize::try_from(self.page_size).unwrap_or(isize::MAX);

        if self.resolver.matches_nav(&key, NavAction::Down) {
            self.select_offset(1);
            return self.get_change_event(before);
        }
        if self.resolver.matches_nav(&key, NavAction::Up) {
            self.select_offset(-1);
            return self.get_change_event(before);
        }
        if self.resolver.matches_nav(&key, NavAction::Home) {
            if self.last_index().is_some() {
                self.state.select(Some(0));
            }
            return self.get_change_event(before);
        }
        if self.resolver.matches_nav(&key, NavAction::End) {
            if let Some(last) = self.last_index() {
                self.state.select(Some(last));
            }
            return self.get_change_event(before);
        }
        if self.resolver.matches_nav(&key, NavAction::PageDown) {
            self.select_offset(page);
            return self.get_change_event(before);
        }
        if self.resolver.matches_nav(&key, NavAction::PageUp) {
            self.select_offset(-page);
            return self.get_change_event(before);
        }
        if self.resolver.matches_nav(&key, NavAction::Select) {
            return self
                .selected_item()
                .map_or(EventResult::Ignored, |item| TableEvent::Activated(item.clone()).into());
        }
        if self.resolver.matches_search(&key, SearchAction::Toggle) && self.filter_enabled() {
            self.searching = true;
            return EventResult::Consumed;
        }
        if self.resolver.matches_search(&key, SearchAction::Exit) && !self.query.is_empty() {
            // Clear filter when not searching
            self.query.clear();
            self.update_filter();
            return TableEvent::FilterChanged(String::new()).into();
        }

        EventResult::Ignored
    }

    fn widths(&self) -> Vec<Constraint> {
        T::columns()
            .iter()
            .map(|c| match c.constraint {
                Constraint::Min(n) => Constraint::Min(n.max(self.column_width)),
                other => other,
            })
            .collect()
    }
}

impl<T: TableRow + Clone> Component for Table<T> {
    type Output = TableEvent<T>;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        Ok(if self.searching {
            self.handle_search_key(key)
        } else {
            self.handle_navigation_key(key)
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        // If searching or has active filter, reserve space for search bar
        let has_search_bar = self.searching || !self.query.is_empty();
        let (table_area, search_area) = if has_search_bar {
            let [table, search] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
            (table, Some(search))
        } else {
            (area, None)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()))
            .title(self.title.clone().unwrap_or_default())
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            );

        if self.filtered_indices.is_empty() {
            let text = if self.items.is_empty() {
                "Nothing here yet"
            } else {
                "No rows match the filter"
            };
            let empty = Paragraph::new(text)
                .style(Style::default().fg(theme.overlay1()))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, table_area);
        } else {
            let header_cells: Vec<Cell> = T::columns()
                .iter()
                .map(|c| {
                    Cell::from(c.header).style(
                        Style::default()
                            .fg(theme.header())
                            .add_modifier(Modifier::BOLD),
                    )
                })
                .collect();
            let header = Row::new(header_cells)
                .height(1)
                .style(Style::default().bg(theme.surface0()));

            let rows: Vec<Row> = self
                .filtered_indices
                .iter()
                .map(|&idx| {
                    Row::new(self.items[idx].render_cells(theme))
                        .style(Style::default().fg(theme.text()))
                })
                .collect();

            let table = RatatuiTable::new(rows, self.widths())
                .header(header)
                .block(block)
                .row_highlight_style(
                    Style::default()
                        .bg(theme.selection_bg())
                        .fg(theme.lavender())
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("▶ ");

            frame.render_stateful_widget(table, table_area, &mut self.state);
        }

        // Render search bar if needed
        if let Some(search_area) = search_area {
            let search_text = if self.searching {
                format!("/{}_", self.query)
            } else {
                format!("/{} ({} matches)", self.query, self.filtered_indices.len())
            };

            let search_style = if self.searching {
                Style::default().fg(theme.yellow())
            } else {
                Style::default().fg(theme.subtext0())
            };

            frame.render_widget(Paragraph::new(search_text).style(search_style), search_area);
        }
    }
}
