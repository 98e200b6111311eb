//! Generic browser over a loaded collection.
//!
//! A [`ListBrowser`] owns a [`Table`] and a loader factory. Every load gets
//! a generation number; results of an older generation are dropped, so rows
//! from before an action never reappear once the action fired.

mod sort;

use std::cmp::Ordering;
use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub use sort::compare_tiers;

use crate::Theme;
use crate::command::{Cmd, TypedCommand};
use crate::config::{BrowserAction, KeyBinding, KeyResolver, NavAction, SearchAction, UiConfig};
use crate::confirm::{Answer, Confirmation};
use crate::message::Message;
use crate::ui::{Component, ErrorView, EventResult, Keybinding, Spinner, Table, TableEvent, TableRow};
use crate::view::{Ctx, View};

type Loader<T> = Box<dyn Fn(&CancellationToken) -> TypedCommand<Vec<T>> + Send>;
type RowCmd<T> = Box<dyn Fn(&T) -> Cmd + Send>;

/// Payload of a list load, tagged with the load that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListData<T> {
    pub generation: u64,
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    Error,
}

enum State {
    Loading,
    Ready,
    Failed(ErrorView),
}

/// A keyed action run against the highlighted row.
pub struct ListAction<T> {
    binding: KeyBinding,
    label: String,
    progress: Option<String>,
    run: RowCmd<T>,
    confirm: Option<Box<dyn Fn(&T) -> String + Send>>,
    danger: bool,
    reloads: bool,
}

impl<T> ListAction<T> {
    /// An action that reloads the list once `run`'s command completed.
    pub fn new(
        binding: KeyBinding,
        label: impl Into<String>,
        run: impl Fn(&T) -> Cmd + Send + 'static,
    ) -> Self {
        Self {
            binding,
            label: label.into(),
            progress: None,
            run: Box::new(run),
            confirm: None,
            danger: false,
            reloads: true,
        }
    }

    /// Ask before running, with the prompt built from the row.
    #[must_use]
    pub fn confirm(mut self, prompt: impl Fn(&T) -> String + Send + 'static) -> Self {
        self.confirm = Some(Box::new(prompt));
        self
    }

    /// Spinner text while the action and its reload run.
    #[must_use]
    pub fn with_progress(mut self, text: impl Into<String>) -> Self {
        self.progress = Some(text.into());
        self
    }

    /// Highlight "No" in the confirmation.
    #[must_use]
    pub const fn danger(mut self) -> Self {
        self.danger = true;
        self
    }

    /// Leave the rows as they are after running.
    #[must_use]
    pub const fn without_reload(mut self) -> Self {
        self.reloads = false;
        self
    }
}

pub struct ListBrowser<T: TableRow + Clone + Send + 'static> {
    title: String,
    table: Table<T>,
    state: State,
    spinner: Spinner,
    loader: Loader<T>,
    on_select: Option<RowCmd<T>>,
    actions: Vec<ListAction<T>>,
    reinit: Option<Box<dyn Fn() -> Cmd + Send>>,
    order: Option<fn(&T, &T) -> Ordering>,
    generation: u64,
    resolver: Arc<KeyResolver>,
    min_page_size: u16,
    min_column_width: u16,
}

impl<T: TableRow + Clone + Send + 'static> ListBrowser<T> {
    pub fn new(
        title: impl Into<String>,
        loader: impl Fn(&CancellationToken) -> TypedCommand<Vec<T>> + Send + 'static,
        resolver: Arc<KeyResolver>,
        ui: &UiConfig,
    ) -> Self {
        let title = title.into();
        let spinner = Spinner::new(format!("Loading {}...", title.to_lowercase()));
        Self {
            table: Table::new(Vec::new(), Arc::clone(&resolver)).with_title(format!(" {title} ")),
            title,
            state: State::Loading,
            spinner,
            loader: Box::new(loader),
            on_select: None,
            actions: Vec::new(),
            reinit: None,
            order: None,
            generation: 0,
            resolver,
            min_page_size: ui.min_page_size,
            min_column_width: ui.min_column_width,
        }
    }

    #[must_use]
    pub fn on_select(mut self, f: impl Fn(&T) -> Cmd + Send + 'static) -> Self {
        self.on_select = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn action(mut self, action: ListAction<T>) -> Self {
        self.actions.push(action);
        self
    }

    /// Runs between an action and the reload that follows it.
    #[must_use]
    pub fn on_reinit(mut self, f: impl Fn() -> Cmd + Send + 'static) -> Self {
        self.reinit = Some(Box::new(f));
        self
    }

    /// Sort every loaded batch. The sort is stable.
    #[must_use]
    pub fn sorted_by(mut self, order: fn(&T, &T) -> Ordering) -> Self {
        self.order = Some(order);
        self
    }

    pub const fn phase(&self) -> Phase {
        match self.state {
            State::Loading => Phase::Loading,
            State::Ready => Phase::Ready,
            State::Failed(_) => Phase::Error,
        }
    }

    pub const fn table(&self) -> &Table<T> {
        &self.table
    }

    pub fn selected(&self) -> Option<&T> {
        match self.state {
            State::Ready => self.table.selected_item(),
            State::Loading | State::Failed(_) => None,
        }
    }

    fn load(&mut self, ctx: &Ctx<ListData<T>>) -> Cmd {
        self.generation += 1;
        let generation = self.generation;
        debug!("Loading '{}' (generation {generation})", self.title);
        ctx.deliver((self.loader)(ctx.token()).map(move |items| ListData { generation, items }))
    }

    /// Enter `Loading` and run `cmd`, then a load of a new generation.
    fn reload_after(&mut self, label: String, cmd: Cmd, ctx: &Ctx<ListData<T>>) -> Cmd {
        self.state = State::Loading;
        self.spinner.set_label(label);
        Cmd::sequence([cmd, self.load(ctx)])
    }

    fn reload(&mut self, ctx: &Ctx<ListData<T>>) -> Cmd {
        let label = format!("Loading {}...", self.title.to_lowercase());
        self.reload_after(label, Cmd::None, ctx)
    }

    fn trigger(&mut self, index: usize, ctx: &Ctx<ListData<T>>) -> Result<Cmd> {
        let Some(row) = self.table.selected_item().cloned() else {
            return Ok(Cmd::None);
        };
        let Some(action) = self.actions.get(index) else {
            return Ok(Cmd::None);
        };
        let cmd = (action.run)(&row);
        let answer = if action.reloads {
            let label = action
                .progress
                .clone()
                .unwrap_or_else(|| format!("{}...", action.label));
            let reinit = self.reinit.as_ref().map_or(Cmd::None, |f| f());
            // The reload's generation is taken when this message is handled,
            // so a press that never gets confirmed cannot outdate it
            Answer::Deliver(Message::LoadStarted {
                label,
                cmd: Cmd::sequence([cmd, reinit]),
            })
        } else {
            Answer::Run(cmd)
        };
        let prompt = action.confirm.as_ref().map(|prompt| prompt(&row));
        let danger = action.danger;

        let Some(text) = prompt else {
            return match answer {
                Answer::Run(cmd) => Ok(cmd),
                Answer::Deliver(msg) => self.update(msg, ctx),
            };
        };
        let mut confirmation = Confirmation::new(text, move || answer);
        if danger {
            confirmation = confirmation.danger();
        }
        Ok(ctx.post(Message::ShowConfirm(confirmation)))
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &Ctx<ListData<T>>) -> Result<Cmd> {
        match self.state {
            State::Ready => {}
            State::Failed(_) => {
                if self.resolver.matches_browser(&key, BrowserAction::Reload) {
                    return Ok(self.reload(ctx));
                }
                return Ok(Cmd::None);
            }
            State::Loading => return Ok(Cmd::None),
        }

        // The filter field owns every key while it has focus
        if !self.table.is_searching() {
            if self.resolver.matches_browser(&key, BrowserAction::Reload) {
                return Ok(self.reload(ctx));
            }
            if let Some(index) = self.actions.iter().position(|a| a.binding.matches(&key)) {
                return self.trigger(index, ctx);
            }
        }

        Ok(match self.table.handle_key(key)? {
            EventResult::Event(TableEvent::Activated(row)) => {
                self.on_select.as_ref().map_or(Cmd::None, |f| f(&row))
            }
            EventResult::Event(TableEvent::Changed(_) | TableEvent::FilterChanged(_))
            | EventResult::Consumed
            | EventResult::Ignored => Cmd::None,
        })
    }
}

impl<T: TableRow + Clone + Send + 'static> View for ListBrowser<T> {
    type Data = ListData<T>;

    fn init(&mut self, ctx: &Ctx<Self::Data>) -> Cmd {
        Cmd::batch([ctx.window_size(), self.load(ctx)])
    }

    fn update(&mut self, msg: Message<Self::Data>, ctx: &Ctx<Self::Data>) -> Result<Cmd> {
        match msg {
            Message::Key(key) => self.handle_key(key, ctx),
            Message::Resize { width, height } => {
                self.table
                    .layout(width, height, self.min_page_size, self.min_column_width);
                Ok(Cmd::None)
            }
            Message::Tick => {
                if self.phase() == Phase::Loading {
                    self.spinner.handle_tick();
                }
                Ok(Cmd::None)
            }
            Message::LoadStarted { label, cmd } => Ok(self.reload_after(label, cmd, ctx)),
            Message::DataLoaded(ListData { generation, mut items }) => {
                if generation != self.generation {
                    debug!(
                        "Dropping stale '{}' rows (generation {generation}, current {})",
                        self.title, self.generation
                    );
                    return Ok(Cmd::None);
                }
                if let Some(order) = self.order {
                    items.sort_by(order);
                }
                debug!("Loaded {} rows into '{}'", items.len(), self.title);
                self.table.set_items(items);
                self.state = State::Ready;
                Ok(Cmd::None)
            }
            Message::LoadError(err) => {
                warn!("Loading '{}' failed: {err}", self.title);
                self.state = State::Failed(ErrorView::new(&err, Arc::clone(&self.resolver)));
                Ok(Cmd::None)
            }
            Message::ShowConfirm(confirmation) => {
                warn!(
                    "Dropping confirmation '{}', '{}' has no overlay",
                    confirmation.message(),
                    self.title
                );
                Ok(Cmd::None)
            }
            Message::ExecFinished(result) => Ok(match result {
                Ok(()) => self.reload(ctx),
                Err(_) => Cmd::None,
            }),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        match &mut self.state {
            State::Ready => self.table.render(frame, area, theme),
            State::Loading => {
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(theme.border()))
                    .title(format!(" {} ", self.title))
                    .title_style(
                        Style::default()
                            .fg(theme.mauve())
                            .add_modifier(Modifier::BOLD),
                    );
                let inner = block.inner(area);
                frame.render_widget(block, area);
                self.spinner.render(frame, inner, theme);
            }
            State::Failed(view) => view.render(frame, area, theme),
        }
    }

    fn captures_text(&self) -> bool {
        self.table.is_searching()
    }

    fn handles_back(&self) -> bool {
        self.table.is_searching() || !self.table.query().is_empty()
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        let mut bindings = Vec::new();
        if self.on_select.is_some() {
            bindings.push(Keybinding::hint(
                self.resolver.display_nav(NavAction::Select),
                "Open",
            ));
        }
        for action in &self.actions {
            bindings.push(Keybinding::hint(action.binding.display(), action.label.clone()));
        }
        bindings.push(Keybinding::hint(
            self.resolver.display_browser(BrowserAction::Reload),
            "Reload",
        ));
        if self.table.filter_enabled() {
            bindings.push(Keybinding::hint(
                self.resolver.display_search(SearchAction::Toggle),
                "Filter",
            ));
        }
        bindings
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::layout::Constraint;
    use ratatui::widgets::Cell;
    use tokio::sync::mpsc::UnboundedReceiver;

    use super::*;
    use crate::command::tests::test_env;
    use crate::config::Key;
    use crate::confirm::ConfirmOverlay;
    use crate::ui::ColumnDef;
    use crate::view::tests::test_ctx;

    #[derive(Debug, Clone, PartialEq)]
    struct Host(String);

    impl TableRow for Host {
        fn columns() -> &'static [ColumnDef] {
            static COLUMNS: &[ColumnDef] = &[ColumnDef::new("Host", Constraint::Min(10))];
            COLUMNS
        }

        fn render_cells(&self, _theme: &Theme) -> Vec<Cell<'static>> {
            vec![Cell::from(self.0.clone())]
        }

        fn filter_value(&self) -> Option<String> {
            Some(self.0.clone())
        }
    }

    /// Returns `batches[n]` on the n-th load, repeating the last one.
    fn browser(batches: Vec<Vec<&'static str>>) -> (ListBrowser<Host>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let loader = move |token: &CancellationToken| {
            let n = counter.fetch_add(1, AtomicOrdering::SeqCst);
            let batch = batches[n.min(batches.len() - 1)].clone();
            TypedCommand::new(
                "Loading hosts",
                token,
                |_, batch: Vec<&'static str>| async move {
                    let hosts: Vec<Host> = batch.into_iter().map(|h| Host(h.to_string())).collect();
                    Ok(hosts)
                },
                batch,
            )
        };
        let list = ListBrowser::new(
            "Hosts",
            loader,
            Arc::new(KeyResolver::default()),
            &UiConfig::default(),
        );
        (list, calls)
    }

    fn key(c: char) -> Message<ListData<Host>> {
        Message::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    /// Run `cmd` and everything it leads to until the inbox is quiet.
    async fn settle<V: View>(
        view: &mut V,
        ctx: &Ctx<V::Data>,
        rx: &mut UnboundedReceiver<Message<V::Data>>,
        cmd: Cmd,
    ) {
        let (env, _app_rx) = test_env();
        let mut pending = vec![cmd];
        while let Some(cmd) = pending.pop() {
            cmd.run(env.clone()).await;
            while let Ok(msg) = rx.try_recv() {
                pending.push(view.update(msg, ctx).unwrap());
            }
        }
    }

    fn names(list: &ListBrowser<Host>) -> Vec<String> {
        list.table().visible().map(|h| h.0.clone()).collect()
    }

    fn rendered(view: &mut impl View) -> String {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal
            .draw(|f| view.render(f, f.area(), &Theme::default()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[tokio::test]
    async fn test_init_loads_into_ready() {
        let (mut list, _) = browser(vec![vec!["web-1", "db-1"]]);
        let (ctx, mut rx, _wake) = test_ctx();
        assert_eq!(list.phase(), Phase::Loading);

        let cmd = list.init(&ctx);
        settle(&mut list, &ctx, &mut rx, cmd).await;

        assert_eq!(list.phase(), Phase::Ready);
        assert_eq!(names(&list), vec!["web-1", "db-1"]);
    }

    #[tokio::test]
    async fn test_action_hides_old_rows_until_reload_lands() {
        let (list, calls) = browser(vec![vec!["web-1", "db-1"], vec!["web-2"]]);
        let mut list = list.action(ListAction::new(
            Key::char('x').into(),
            "Recycling",
            |_: &Host| Cmd::None,
        ));
        let (ctx, mut rx, _wake) = test_ctx();
        let cmd = list.init(&ctx);
        settle(&mut list, &ctx, &mut rx, cmd).await;
        assert!(rendered(&mut list).contains("web-1"));

        let cmd = list.update(key('x'), &ctx).unwrap();
        assert_eq!(list.phase(), Phase::Loading);
        let screen = rendered(&mut list);
        assert!(!screen.contains("web-1"));
        assert!(screen.contains("Recycling..."));

        settle(&mut list, &ctx, &mut rx, cmd).await;
        assert_eq!(list.phase(), Phase::Ready);
        assert_eq!(names(&list), vec!["web-2"]);
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reinit_runs_only_for_actions() {
        let (list, calls) = browser(vec![vec!["web-1"]]);
        let reinits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reinits);
        let mut list = list
            .action(ListAction::new(Key::char('x').into(), "Recycling", |_: &Host| Cmd::None))
            .on_reinit(move || {
                counter.fetch_add(1, AtomicOrdering::SeqCst);
                Cmd::None
            });
        let (ctx, mut rx, _wake) = test_ctx();
        let cmd = list.init(&ctx);
        settle(&mut list, &ctx, &mut rx, cmd).await;
        assert_eq!(reinits.load(AtomicOrdering::SeqCst), 0);

        let cmd = list.update(key('x'), &ctx).unwrap();
        settle(&mut list, &ctx, &mut rx, cmd).await;
        assert_eq!(reinits.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_confirmed_action_waits_for_the_choice() {
        let (list, _) = browser(vec![vec!["web-1"], vec![]]);
        let mut list = list.action(
            ListAction::new(Key::char('d').into(), "Removing", |_: &Host| Cmd::None)
                .confirm(|host: &Host| format!("Remove {}?", host.0)),
        );
        let (ctx, mut rx, _wake) = test_ctx();
        let cmd = list.init(&ctx);
        settle(&mut list, &ctx, &mut rx, cmd).await;

        let cmd = list.update(key('d'), &ctx).unwrap();
        assert_eq!(list.phase(), Phase::Ready);

        let (env, _app_rx) = test_env();
        cmd.run(env.clone()).await;
        let Ok(Message::ShowConfirm(confirmation)) = rx.try_recv() else {
            panic!("expected a confirmation");
        };
        assert_eq!(confirmation.message(), "Remove web-1?");
    }

    #[tokio::test]
    async fn test_confirmed_action_reloads_after_repeated_presses() {
        let (list, calls) = browser(vec![vec!["web-1", "db-1"], vec!["db-1"]]);
        let list = list.action(
            ListAction::new(Key::char('d').into(), "Removing", |_: &Host| Cmd::None)
                .confirm(|host: &Host| format!("Remove {}?", host.0))
                .danger(),
        );
        let mut overlay = ConfirmOverlay::new(list, Arc::new(KeyResolver::default()));
        let (ctx, mut rx, _wake) = test_ctx();
        let cmd = overlay.init(&ctx);
        settle(&mut overlay, &ctx, &mut rx, cmd).await;

        // Key repeat: the second press lands before the dialog is up
        let first = overlay.update(key('d'), &ctx).unwrap();
        let second = overlay.update(key('d'), &ctx).unwrap();
        settle(&mut overlay, &ctx, &mut rx, Cmd::batch([first, second])).await;
        assert!(overlay.is_awaiting());
        assert_eq!(overlay.inner().phase(), Phase::Ready);
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);

        let cmd = overlay.update(key('y'), &ctx).unwrap();
        assert_eq!(overlay.inner().phase(), Phase::Loading);
        let screen = rendered(&mut overlay);
        assert!(!screen.contains("web-1"));
        assert!(screen.contains("Removing..."));

        settle(&mut overlay, &ctx, &mut rx, cmd).await;
        assert_eq!(overlay.inner().phase(), Phase::Ready);
        assert_eq!(names(overlay.inner()), vec!["db-1"]);
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cancelled_action_keeps_rows() {
        let (list, calls) = browser(vec![vec!["web-1"], vec![]]);
        let list = list.action(
            ListAction::new(Key::char('d').into(), "Removing", |_: &Host| Cmd::None)
                .confirm(|host: &Host| format!("Remove {}?", host.0)),
        );
        let mut overlay = ConfirmOverlay::new(list, Arc::new(KeyResolver::default()));
        let (ctx, mut rx, _wake) = test_ctx();
        let cmd = overlay.init(&ctx);
        settle(&mut overlay, &ctx, &mut rx, cmd).await;

        let cmd = overlay.update(key('d'), &ctx).unwrap();
        settle(&mut overlay, &ctx, &mut rx, cmd).await;
        let cmd = overlay.update(key('n'), &ctx).unwrap();
        settle(&mut overlay, &ctx, &mut rx, cmd).await;

        assert_eq!(overlay.inner().phase(), Phase::Ready);
        assert_eq!(names(overlay.inner()), vec!["web-1"]);
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_generation_is_dropped() {
        let (mut list, _) = browser(vec![vec!["web-1"]]);
        let (ctx, mut rx, _wake) = test_ctx();
        let cmd = list.init(&ctx);
        settle(&mut list, &ctx, &mut rx, cmd).await;

        let stale = ListData {
            generation: 0,
            items: vec![Host("old".to_string())],
        };
        list.update(Message::DataLoaded(stale), &ctx).unwrap();
        assert_eq!(names(&list), vec!["web-1"]);
    }

    #[tokio::test]
    async fn test_load_error_then_reload_recovers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut list: ListBrowser<Host> = ListBrowser::new(
            "Hosts",
            move |token: &CancellationToken| {
                let fail = counter.fetch_add(1, AtomicOrdering::SeqCst) == 0;
                TypedCommand::new(
                    "Loading hosts",
                    token,
                    |_, fail: bool| async move {
                        if fail {
                            Err(color_eyre::eyre::eyre!("inventory unreadable"))
                        } else {
                            Ok(vec![Host("web-1".to_string())])
                        }
                    },
                    fail,
                )
            },
            Arc::new(KeyResolver::default()),
            &UiConfig::default(),
        );
        let (ctx, mut rx, _wake) = test_ctx();
        let cmd = list.init(&ctx);
        settle(&mut list, &ctx, &mut rx, cmd).await;
        assert_eq!(list.phase(), Phase::Error);
        assert!(rendered(&mut list).contains("inventory unreadable"));

        let cmd = list.update(key('r'), &ctx).unwrap();
        assert_eq!(list.phase(), Phase::Loading);
        settle(&mut list, &ctx, &mut rx, cmd).await;
        assert_eq!(list.phase(), Phase::Ready);
    }

    #[tokio::test]
    async fn test_filter_focus_blocks_actions() {
        let (list, calls) = browser(vec![vec!["web-1", "db-1"]]);
        let mut list = list.action(ListAction::new(Key::char('x').into(), "Recycling", |_: &Host| {
            Cmd::None
        }));
        let (ctx, mut rx, _wake) = test_ctx();
        let cmd = list.init(&ctx);
        settle(&mut list, &ctx, &mut rx, cmd).await;

        list.update(key('/'), &ctx).unwrap();
        assert!(list.captures_text());
        list.update(key('x'), &ctx).unwrap();
        assert_eq!(list.phase(), Phase::Ready);
        assert_eq!(list.table().query(), "x");
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_resize_clamps_degenerate_sizes() {
        let (mut list, _) = browser(vec![vec![]]);
        let (ctx, _rx, _wake) = test_ctx();
        list.update(Message::Resize { width: 0, height: 0 }, &ctx).unwrap();
        let ui = UiConfig::default();
        assert_eq!(list.table().page_size(), usize::from(ui.min_page_size));
        assert_eq!(list.table().column_width(), ui.min_column_width);
    }
}
