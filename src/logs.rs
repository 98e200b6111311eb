//! Log tail with an attached search pane.
//!
//! A [`LogTail`] loads a historical [`LogBatch`]. When the batch carries a
//! live channel, one reader task forwards every received line to the view's
//! inbox in arrival order and reports `StreamClosed` once the sender is gone.
//! Content is append-only: history first, then streamed lines.

mod form;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use form::{LogSearchForm, SearchFormEvent};

use crate::Theme;
use crate::command::{Cmd, Command, CommandEnv, TypedCommand};
use crate::config::{KeyResolver, LogsAction, NavAction, SearchAction, UiConfig};
use crate::message::Message;
use crate::search::Matcher;
use crate::ui::{Component, ErrorView, EventResult, Keybinding, Spinner};
use crate::view::{Ctx, Inbox, View};

/// Lines kept by a query without an explicit limit.
pub const DEFAULT_LIMIT: usize = 500;

/// Rows taken by the viewport borders.
const CHROME_HEIGHT: u16 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub timestamp: Option<DateTime<Local>>,
    pub text: String,
}

impl LogLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            timestamp: None,
            text: text.into(),
        }
    }

    /// Split a leading RFC 3339 timestamp off `raw`, if there is one.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim_end_matches(['\r', '\n']);
        if let Some((first, rest)) = raw.split_once(' ')
            && let Ok(ts) = DateTime::parse_from_rfc3339(first)
        {
            return Self {
                timestamp: Some(ts.with_timezone(&Local)),
                text: rest.to_string(),
            };
        }
        Self::new(raw)
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.timestamp {
            Some(ts) => write!(f, "{} {}", ts.format("%H:%M:%S"), self.text),
            None => write!(f, "{}", self.text),
        }
    }
}

/// Parameters of a log fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub contains: Option<String>,
    pub limit: usize,
    pub follow: bool,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            contains: None,
            limit: DEFAULT_LIMIT,
            follow: false,
        }
    }
}

impl LogQuery {
    pub fn matches(&self, line: &LogLine) -> bool {
        self.contains
            .as_deref()
            .is_none_or(|pattern| Matcher::new(pattern).matches(&line.text))
    }

    /// Keep the last `limit` matching lines.
    pub fn apply(&self, lines: impl IntoIterator<Item = LogLine>) -> Vec<LogLine> {
        let matcher = self.contains.as_deref().map(Matcher::new);
        let mut kept: Vec<LogLine> = lines
            .into_iter()
            .filter(|line| matcher.as_ref().is_none_or(|m| m.matches(&line.text)))
            .collect();
        let excess = kept.len().saturating_sub(self.limit);
        kept.drain(..excess);
        kept
    }
}

/// Result of a log fetch.
pub struct LogBatch {
    pub history: Vec<LogLine>,
    /// Present when the source keeps producing lines
    pub live: Option<UnboundedReceiver<LogLine>>,
}

impl fmt::Debug for LogBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogBatch")
            .field("history", &self.history.len())
            .field("live", &self.live.is_some())
            .finish()
    }
}

pub enum LogData {
    Loaded(LogBatch),
    Line(LogLine),
    StreamClosed,
}

/// The single consumer of a live log channel.
struct TailCmd {
    rx: UnboundedReceiver<LogLine>,
    inbox: Inbox<LogData>,
}

#[async_trait]
impl Command for TailCmd {
    fn name(&self) -> String {
        "Tailing logs".to_string()
    }

    async fn execute(mut self: Box<Self>, _env: CommandEnv) -> Result<()> {
        loop {
            // Dropping `rx` on return is what stops the producer
            let line = tokio::select! {
                () = self.inbox.closed() => {
                    debug!("Log frame is gone, stopping tail");
                    return Ok(());
                }
                line = self.rx.recv() => line,
            };
            let Some(line) = line else {
                self.inbox.send(Message::DataLoaded(LogData::StreamClosed));
                return Ok(());
            };
            if !self.inbox.send(Message::DataLoaded(LogData::Line(line))) {
                debug!("Log frame is gone, stopping tail");
                return Ok(());
            }
        }
    }
}

enum State {
    Loading,
    Ready,
    Failed(ErrorView),
}

type SearchHandler = Box<dyn Fn(LogQuery) -> Cmd + Send>;
type LogLoader = Box<dyn FnOnce(&CancellationToken) -> TypedCommand<LogBatch> + Send>;

pub struct LogTail {
    title: String,
    state: State,
    spinner: Spinner,
    loader: Option<LogLoader>,
    lines: Vec<LogLine>,
    live: bool,
    /// Index of the first visible line
    offset: usize,
    /// Keep the newest line in view as lines arrive
    follow: bool,
    searching: bool,
    form: LogSearchForm,
    on_search: SearchHandler,
    size: (u16, u16),
    viewport: (u16, u16),
    search_pane_width: u16,
    resolver: Arc<KeyResolver>,
}

impl LogTail {
    pub fn new(
        title: impl Into<String>,
        query: &LogQuery,
        loader: impl FnOnce(&CancellationToken) -> TypedCommand<LogBatch> + Send + 'static,
        on_search: impl Fn(LogQuery) -> Cmd + Send + 'static,
        resolver: Arc<KeyResolver>,
        ui: &UiConfig,
    ) -> Self {
        let spinner = Spinner::new("Loading logs...");
        Self {
            title: title.into(),
            state: State::Loading,
            spinner,
            loader: Some(Box::new(loader)),
            lines: Vec::new(),
            live: false,
            offset: 0,
            follow: query.follow,
            searching: false,
            form: LogSearchForm::new(query, Arc::clone(&resolver)),
            on_search: Box::new(on_search),
            size: (0, 0),
            viewport: (0, 0),
            search_pane_width: ui.search_pane_width,
            resolver,
        }
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    pub const fn is_searching(&self) -> bool {
        self.searching
    }

    #[cfg(test)]
    pub const fn is_live(&self) -> bool {
        self.live
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn viewport(&self) -> (u16, u16) {
        self.viewport
    }

    fn page(&self) -> usize {
        usize::from(self.viewport.1.max(1))
    }

    fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.page())
    }

    fn at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }

    fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    fn scroll_by(&mut self, delta: isize) {
        self.offset = self.offset.saturating_add_signed(delta).min(self.max_offset());
        if !self.at_bottom() {
            self.follow = false;
        }
    }

    /// Viewport follows the current size and whether the search pane is open.
    fn layout(&mut self) {
        let (width, height) = self.size;
        let width = if self.searching {
            width.saturating_sub(self.search_pane_width)
        } else {
            width
        };
        let pinned = self.at_bottom();
        self.viewport = (width.saturating_sub(2).max(1), height.saturating_sub(CHROME_HEIGHT).max(1));
        if pinned || self.follow {
            self.scroll_to_bottom();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    fn append(&mut self, line: LogLine) {
        let pinned = self.follow || self.at_bottom();
        self.lines.push(line);
        if pinned {
            self.scroll_to_bottom();
        }
    }

    fn loaded(&mut self, batch: LogBatch, ctx: &Ctx<LogData>) -> Cmd {
        info!(
            "Loaded {} log lines for '{}' (live: {})",
            batch.history.len(),
            self.title,
            batch.live.is_some()
        );
        self.lines = batch.history;
        self.state = State::Ready;
        self.scroll_to_bottom();

        match batch.live {
            Some(rx) => {
                self.live = true;
                Cmd::task(TailCmd {
                    rx,
                    inbox: ctx.inbox().clone(),
                })
            }
            None => Cmd::None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Cmd> {
        if self.searching {
            return Ok(match self.form.handle_key(key)? {
                EventResult::Event(SearchFormEvent::Submit(query)) => {
                    debug!("Searching '{}' with {query:?}", self.title);
                    (self.on_search)(query)
                }
                EventResult::Event(SearchFormEvent::Close) => {
                    self.searching = false;
                    self.layout();
                    Cmd::None
                }
                EventResult::Consumed | EventResult::Ignored => Cmd::None,
            });
        }

        if self.resolver.matches_search(&key, SearchAction::Toggle) {
            self.searching = true;
            self.layout();
            return Ok(Cmd::None);
        }
        if !matches!(self.state, State::Ready) {
            return Ok(Cmd::None);
        }

        let page = isize::try_from(self.page()).unwrap_or(isize::MAX);
        if self.resolver.matches_logs(&key, LogsAction::Follow) {
            self.follow = !self.follow;
            if self.follow {
                self.scroll_to_bottom();
            }
        } else if self.resolver.matches_logs(&key, LogsAction::Top) {
            self.offset = 0;
            self.follow = false;
        } else if self.resolver.matches_logs(&key, LogsAction::Bottom) {
            self.scroll_to_bottom();
        } else if self.resolver.matches_nav(&key, NavAction::Down) {
            self.scroll_by(1);
        } else if self.resolver.matches_nav(&key, NavAction::Up) {
            self.scroll_by(-1);
        } else if self.resolver.matches_nav(&key, NavAction::PageDown) {
            self.scroll_by(page);
        } else if self.resolver.matches_nav(&key, NavAction::PageUp) {
            self.scroll_by(-page);
        } else if self.resolver.matches_nav(&key, NavAction::Home) {
            self.offset = 0;
            self.follow = false;
        } else if self.resolver.matches_nav(&key, NavAction::End) {
            self.scroll_to_bottom();
        }
        Ok(Cmd::None)
    }

    fn render_viewport(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let mut title = vec![Span::styled(
            format!(" {} ", self.title),
            Style::default()
                .fg(theme.mauve())
                .add_modifier(Modifier::BOLD),
        )];
        if self.live {
            title.push(Span::styled("● live ", Style::default().fg(theme.green())));
        }
        if self.follow {
            title.push(Span::styled("following ", Style::default().fg(theme.sky())));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()))
            .title(Line::from(title));

        match &mut self.state {
            State::Loading => {
                let inner = block.inner(area);
                frame.render_widget(block, area);
                self.spinner.render(frame, inner, theme);
            }
            State::Failed(view) => view.render(frame, area, theme),
            State::Ready => {
                let time_style = Style::default().fg(theme.overlay1());
                let text_style = Style::default().fg(theme.text());
                let visible: Vec<Line> = self
                    .lines
                    .iter()
                    .skip(self.offset)
                    .take(usize::from(area.height.saturating_sub(CHROME_HEIGHT)))
                    .map(|line| match &line.timestamp {
                        Some(ts) => Line::from(vec![
                            Span::styled(ts.format("%H:%M:%S ").to_string(), time_style),
                            Span::styled(line.text.clone(), text_style),
                        ]),
                        None => Line::from(Span::styled(line.text.clone(), text_style)),
                    })
                    .collect();
                frame.render_widget(Paragraph::new(visible).block(block), area);
            }
        }
    }
}

impl View for LogTail {
    type Data = LogData;

    fn init(&mut self, ctx: &Ctx<LogData>) -> Cmd {
        let load = self
            .loader
            .take()
            .map_or(Cmd::None, |loader| {
                ctx.deliver(loader(ctx.token()).map(LogData::Loaded))
            });
        Cmd::batch([ctx.window_size(), load])
    }

    fn update(&mut self, msg: Message<LogData>, ctx: &Ctx<LogData>) -> Result<Cmd> {
        match msg {
            Message::Key(key) => self.handle_key(key),
            Message::Resize { width, height } => {
                self.size = (width, height);
                self.layout();
                Ok(Cmd::None)
            }
            Message::Tick => {
                if matches!(self.state, State::Loading) {
                    self.spinner.handle_tick();
                }
                Ok(Cmd::None)
            }
            Message::LoadStarted { label, cmd } => {
                self.state = State::Loading;
                self.spinner.set_label(label);
                Ok(cmd)
            }
            Message::DataLoaded(LogData::Loaded(batch)) => Ok(self.loaded(batch, ctx)),
            Message::DataLoaded(LogData::Line(line)) => {
                self.append(line);
                Ok(Cmd::None)
            }
            Message::DataLoaded(LogData::StreamClosed) => {
                info!("Log stream of '{}' closed", self.title);
                self.live = false;
                Ok(Cmd::None)
            }
            Message::LoadError(err) => {
                warn!("Loading logs of '{}' failed: {err}", self.title);
                self.state = State::Failed(ErrorView::new(&err, Arc::clone(&self.resolver)));
                Ok(Cmd::None)
            }
            Message::ShowConfirm(confirmation) => {
                warn!("Dropping confirmation '{}'", confirmation.message());
                Ok(Cmd::None)
            }
            Message::ExecFinished(_) => Ok(Cmd::None),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if self.searching {
            let [viewport, pane] = Layout::horizontal([
                Constraint::Min(0),
                Constraint::Length(self.search_pane_width),
            ])
            .areas(area);
            self.render_viewport(frame, viewport, theme);
            self.form.render(frame, pane, theme);
        } else {
            self.render_viewport(frame, area, theme);
        }
    }

    fn captures_text(&self) -> bool {
        self.searching
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        if self.searching {
            return vec![
                Keybinding::hint(self.resolver.display_nav(NavAction::Select), "Apply"),
                Keybinding::hint(self.resolver.display_search(SearchAction::Exit), "Close"),
            ];
        }
        vec![
            Keybinding::hint(self.resolver.display_search(SearchAction::Toggle), "Search"),
            Keybinding::hint(self.resolver.display_logs(LogsAction::Follow), "Follow"),
            Keybinding::hint(self.resolver.display_logs(LogsAction::Top), "Top"),
            Keybinding::hint(self.resolver.display_logs(LogsAction::Bottom), "Bottom"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyModifiers};
    use tokio::sync::mpsc::{self, UnboundedSender};

    use super::*;
    use crate::command::tests::test_env;
    use crate::view::tests::test_ctx;

    fn key(code: KeyCode) -> Message<LogData> {
        Message::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn tail(
        history: &[&str],
        live: Option<UnboundedReceiver<LogLine>>,
        query: &LogQuery,
    ) -> (LogTail, Arc<Mutex<Vec<LogQuery>>>) {
        let history: Vec<LogLine> = history.iter().map(|l| LogLine::new(*l)).collect();
        let searched = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&searched);
        let view = LogTail::new(
            "api",
            query,
            move |token: &CancellationToken| {
                TypedCommand::new(
                    "Loading logs",
                    token,
                    |_, (history, live)| async move { Ok(LogBatch { history, live }) },
                    (history, live),
                )
            },
            move |query| {
                log.lock().unwrap().push(query);
                Cmd::back()
            },
            Arc::new(KeyResolver::default()),
            &UiConfig::default(),
        );
        (view, searched)
    }

    async fn run(cmd: Cmd) {
        let (env, _app_rx) = test_env();
        cmd.run(env).await;
    }

    fn texts(view: &LogTail) -> Vec<&str> {
        view.lines().iter().map(|l| l.text.as_str()).collect()
    }

    fn stream() -> (UnboundedSender<LogLine>, UnboundedReceiver<LogLine>) {
        mpsc::unbounded_channel()
    }

    #[test]
    fn test_parse_splits_timestamp() {
        let line = LogLine::parse("2026-03-01T10:15:00Z GET /health 200\n");
        assert!(line.timestamp.is_some());
        assert_eq!(line.text, "GET /health 200");

        let plain = LogLine::parse("no timestamp here");
        assert_eq!(plain, LogLine::new("no timestamp here"));
    }

    #[test]
    fn test_query_keeps_last_matching_lines() {
        let query = LogQuery {
            contains: Some("ERR".to_string()),
            limit: 2,
            follow: false,
        };
        let lines = ["err 1", "ok", "err 2", "Err 3"].map(LogLine::new);
        let kept: Vec<_> = query.apply(lines).into_iter().map(|l| l.text).collect();
        assert_eq!(kept, vec!["err 2", "Err 3"]);
    }

    #[tokio::test]
    async fn test_streamed_lines_append_in_delivery_order() {
        let (tx, rx) = stream();
        let (mut view, _) = tail(&["boot", "ready"], Some(rx), &LogQuery::default());
        let (ctx, mut inbox, _wake) = test_ctx();

        run(view.init(&ctx)).await;
        let Ok(loaded) = inbox.try_recv() else {
            panic!("expected the batch");
        };
        let reader = view.update(loaded, &ctx).unwrap();
        assert!(view.is_live());

        for i in 0..5 {
            tx.send(LogLine::new(format!("line {i}"))).unwrap();
        }
        drop(tx);
        run(reader).await;

        // Interleave layout and search toggles with delivery
        let mut n = 0;
        while let Ok(msg) = inbox.try_recv() {
            view.update(msg, &ctx).unwrap();
            view.update(Message::Resize { width: 80 + n, height: 10 }, &ctx).unwrap();
            view.update(key(KeyCode::Char('/')), &ctx).unwrap();
            if n % 2 == 0 {
                view.update(key(KeyCode::Esc), &ctx).unwrap();
            }
            n += 1;
        }

        assert_eq!(
            texts(&view),
            vec!["boot", "ready", "line 0", "line 1", "line 2", "line 3", "line 4"]
        );
        assert!(!view.is_live());
    }

    #[tokio::test]
    async fn test_reader_stops_once_the_frame_is_gone() {
        let (tx, rx) = stream();
        let (ctx, inbox, _wake) = test_ctx::<LogData>();
        let reader = Cmd::task(TailCmd {
            rx,
            inbox: ctx.inbox().clone(),
        });

        // Back or Replace drops the frame's receiver while the source is quiet
        drop(inbox);
        tokio::time::timeout(Duration::from_secs(1), run(reader))
            .await
            .expect("reader kept running after its frame was dropped");
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn test_init_loads_history_into_ready() {
        let (mut view, _) = tail(&["boot", "ready"], None, &LogQuery::default());
        let (ctx, mut inbox, _wake) = test_ctx();
        run(view.init(&ctx)).await;

        while let Ok(msg) = inbox.try_recv() {
            view.update(msg, &ctx).unwrap();
        }
        assert!(matches!(view.state, State::Ready));
        assert_eq!(texts(&view), vec!["boot", "ready"]);
        assert!(!view.is_live());
    }

    #[tokio::test]
    async fn test_offset_is_kept_unless_pinned() {
        let history: Vec<String> = (0..20).map(|i| format!("h{i}")).collect();
        let history: Vec<&str> = history.iter().map(String::as_str).collect();
        let (mut view, _) = tail(&history, None, &LogQuery::default());
        let (ctx, mut inbox, _wake) = test_ctx();
        run(view.init(&ctx)).await;
        let loaded = inbox.try_recv().ok().unwrap();
        view.update(loaded, &ctx).unwrap();
        view.update(Message::Resize { width: 40, height: 7 }, &ctx).unwrap();

        // Pinned at the bottom: new lines keep the newest in view
        assert_eq!(view.offset(), 15);
        view.update(Message::DataLoaded(LogData::Line(LogLine::new("n1"))), &ctx).unwrap();
        assert_eq!(view.offset(), 16);

        // Scrolled up: the offset stays put
        view.update(key(KeyCode::Char('k')), &ctx).unwrap();
        view.update(key(KeyCode::Char('k')), &ctx).unwrap();
        assert_eq!(view.offset(), 14);
        view.update(Message::DataLoaded(LogData::Line(LogLine::new("n2"))), &ctx).unwrap();
        assert_eq!(view.offset(), 14);

        // Follow pins again
        view.update(key(KeyCode::Char('f')), &ctx).unwrap();
        assert_eq!(view.offset(), 17);
    }

    #[tokio::test]
    async fn test_search_pane_narrows_viewport() {
        let (mut view, _) = tail(&[], None, &LogQuery::default());
        let (ctx, _inbox, _wake) = test_ctx();
        let width = UiConfig::default().search_pane_width + 40;
        view.update(Message::Resize { width, height: 12 }, &ctx).unwrap();
        assert_eq!(view.viewport(), (width - 2, 10));

        view.update(key(KeyCode::Char('/')), &ctx).unwrap();
        assert!(view.captures_text());
        assert_eq!(view.viewport(), (38, 10));

        view.update(key(KeyCode::Esc), &ctx).unwrap();
        assert!(!view.is_searching());
        assert_eq!(view.viewport(), (width - 2, 10));
    }

    #[tokio::test]
    async fn test_enter_in_search_runs_the_search_action() {
        let (mut view, searched) = tail(&["a"], None, &LogQuery::default());
        let (ctx, _inbox, _wake) = test_ctx();
        view.update(key(KeyCode::Char('/')), &ctx).unwrap();
        for c in "panic".chars() {
            view.update(key(KeyCode::Char(c)), &ctx).unwrap();
        }
        let cmd = view.update(key(KeyCode::Enter), &ctx).unwrap();

        assert!(matches!(cmd, Cmd::App(crate::message::AppMessage::Back)));
        let searched = searched.lock().unwrap();
        assert_eq!(searched[0].contains.as_deref(), Some("panic"));
        assert_eq!(searched[0].limit, DEFAULT_LIMIT);
    }
}
