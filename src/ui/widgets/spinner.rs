use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use throbber_widgets_tui::WhichUse::Spin;
use throbber_widgets_tui::{BRAILLE_SIX, Throbber, ThrobberState};

use crate::Theme;
use crate::ui::Component;

/// Braille spinner with a label, centered in its area.
///
/// Only moves when ticked, so a view that stops forwarding ticks freezes it.
#[derive(Default)]
pub struct Spinner {
    state: ThrobberState,
    label: String,
}

impl Spinner {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            state: ThrobberState::default(),
            label: label.into(),
        }
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    fn width(&self) -> u16 {
        if self.label.is_empty() {
            return 1;
        }
        let label = u16::try_from(self.label.chars().count()).unwrap_or(u16::MAX);
        label.saturating_add(2)
    }
}

impl Component for Spinner {
    type Output = ();

    fn handle_tick(&mut self) {
        self.state.calc_next();
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let mut throbber = Throbber::default()
            .throbber_set(BRAILLE_SIX)
            .use_type(Spin)
            .throbber_style(Style::default().fg(theme.lavender()))
            .style(Style::default().fg(theme.subtext1()));
        if !self.label.is_empty() {
            throbber = throbber.label(self.label.clone());
        }

        let area = area.centered(
            Constraint::Length(self.width().min(area.width)),
            Constraint::Length(1),
        );
        frame.render_stateful_widget(throbber, area, &mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;

    fn draw(spinner: &mut Spinner) -> String {
        let mut terminal = Terminal::new(TestBackend::new(30, 3)).unwrap();
        terminal
            .draw(|f| spinner.render(f, f.area(), &Theme::default()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn test_label_is_drawn() {
        let mut spinner = Spinner::new("Loading hosts...");
        assert!(draw(&mut spinner).contains("Loading hosts..."));
    }

    #[test]
    fn test_frame_advances_only_on_tick() {
        let mut spinner = Spinner::new("Working");
        let first = draw(&mut spinner);
        assert_eq!(draw(&mut spinner), first);

        spinner.handle_tick();
        assert_ne!(draw(&mut spinner), first);
    }
}
