use std::sync::Arc;

use color_eyre::Result;
use ratatui::layout::{Constraint, Layout, Rect};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::{Cmd, CommandEnv, ExternalCommand, WindowSizeCmd};
use crate::config::GlobalAction;
use crate::message::AppMessage;
use crate::services::Services;
use crate::stack::{Flow, NavFrame, Stack};
use crate::tui::{Event, Tui};
use crate::ui::{Component, StatusBar, Toast, ToastManager};

const APP_NAME: &str = "lazyinfra";
const HEADER_HEIGHT: u16 = 1;
const FOOTER_HEIGHT: u16 = 4;

/// Area left for the top frame once header and footer are drawn.
const fn body_size(width: u16, height: u16) -> (u16, u16) {
    (width, height.saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT))
}

enum Next {
    Event(Option<Event>),
    Message(AppMessage),
}

pub struct App {
    services: Arc<Services>,
    stack: Stack,
    status_bar: StatusBar,
    toasts: ToastManager,
    env: CommandEnv,
    app_rx: UnboundedReceiver<AppMessage>,
    token: CancellationToken,
    /// Root init commands, spawned once the terminal is up
    startup: Option<Cmd>,
    should_quit: bool,
    should_suspend: bool,
}

impl App {
    pub fn new(services: Arc<Services>, root: NavFrame) -> Self {
        let (app_tx, app_rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let env = CommandEnv::new(app_tx, token.clone());
        let (stack, startup) = Stack::new(root, env.clone(), Arc::clone(&services.resolver));
        Self {
            status_bar: StatusBar::new(APP_NAME, Arc::clone(&services.resolver)),
            services,
            stack,
            toasts: ToastManager::new(),
            env,
            app_rx,
            token,
            startup: Some(startup),
            should_quit: false,
            should_suspend: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(&self.services.config.ui)?;
        tui.enter()?;

        if let Some(cmd) = self.startup.take() {
            self.spawn(cmd);
        }

        loop {
            let next = tokio::select! {
                event = tui.next_event() => Next::Event(event),
                Some(msg) = self.app_rx.recv() => Next::Message(msg),
            };
            match next {
                Next::Event(Some(event)) => self.handle_event(event, &mut tui)?,
                Next::Event(None) => break,
                Next::Message(msg) => self.handle_message(msg, &mut tui).await?,
            }

            if self.should_quit {
                break;
            }
            if self.should_suspend {
                self.should_suspend = false;
                tui.suspend()?;
                tui.resume()?;
                // The terminal may have been resized while we were stopped
                self.spawn(Cmd::task(WindowSizeCmd));
            }
        }

        info!("Shutting down");
        self.token.cancel();
        tui.exit()?;
        Ok(())
    }

    fn handle_event(&mut self, event: Event, tui: &mut Tui) -> Result<()> {
        match event {
            Event::Init => debug!("Terminal ready"),
            Event::Quit => self.should_quit = true,
            Event::Error(error) => {
                warn!("Terminal event error: {error}");
                self.toasts.show(Toast::error(error));
            }
            Event::Tick => {
                self.toasts.handle_tick();
                self.dispatch(AppMessage::Tick);
            }
            Event::Render => self.draw(tui)?,
            Event::Key(key) => {
                if self.services.resolver.matches_global(&key, GlobalAction::Suspend) {
                    self.route(AppMessage::Suspend);
                } else {
                    self.dispatch(AppMessage::Key(key));
                }
            }
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, width, height))?;
                self.route(AppMessage::Resize { width, height });
                self.draw(tui)?;
            }
        }
        Ok(())
    }

    async fn handle_message(&mut self, msg: AppMessage, tui: &mut Tui) -> Result<()> {
        match msg {
            AppMessage::Exec(command) => self.exec(&command, tui).await?,
            other => self.route(other),
        }
        Ok(())
    }

    /// Hand the terminal to `command` until it exits.
    async fn exec(&mut self, command: &ExternalCommand, tui: &mut Tui) -> Result<()> {
        tui.exit()?;
        let result = command.run().await;
        tui.resume()?;

        if let Err(error) = &result {
            warn!("{error}");
            self.toasts.show(Toast::error(error.to_string()));
        }
        self.dispatch(AppMessage::ExecFinished(result));
        self.spawn(Cmd::task(WindowSizeCmd));
        Ok(())
    }

    /// Loop-level messages that need no terminal access.
    fn route(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Resize { width, height } => {
                let (width, height) = body_size(width, height);
                self.dispatch(AppMessage::Resize { width, height });
            }
            AppMessage::Suspend => self.should_suspend = true,
            AppMessage::Done { text } => self.toasts.show(Toast::success(text)),
            AppMessage::CommandFailed { name, error } => {
                self.toasts.show(Toast::error(format!("{name} failed: {error}")));
            }
            other => self.dispatch(other),
        }
    }

    fn dispatch(&mut self, msg: AppMessage) {
        match self.stack.update(msg) {
            Flow::Continue(cmd) => self.spawn(cmd),
            Flow::Exit => self.should_quit = true,
        }
    }

    fn spawn(&self, cmd: Cmd) {
        if cmd.is_none() {
            return;
        }
        tokio::spawn(cmd.run(self.env.clone()));
    }

    fn draw(&mut self, tui: &mut Tui) -> Result<()> {
        let theme = self.services.theme;
        tui.draw(|frame| {
            let [header, body, footer] = Layout::vertical([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Fill(1),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .areas(frame.area());

            self.status_bar
                .render_header(frame, header, &theme, &self.stack.breadcrumbs());
            self.stack.render(frame, body, &theme);
            self.status_bar
                .render_footer(frame, footer, &theme, &self.stack.keybindings());
            self.toasts.render(frame, body, &theme);
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crossterm::event::{KeyCode, KeyEvent};

    use super::*;
    use crate::config::AppConfig;
    use crate::repository::InventoryRepository;
    use crate::ui::ToastType;
    use crate::view::tests::Probe;

    fn app() -> App {
        let inventory = PathBuf::from("missing-inventory.json");
        let repository = Arc::new(InventoryRepository::new(inventory.clone()));
        let services = Services::new(AppConfig::default(), inventory, repository);
        App::new(services, NavFrame::new(Probe::default()).with_breadcrumb("Probe"))
    }

    #[test]
    fn test_body_excludes_header_and_footer() {
        assert_eq!(body_size(80, 24), (80, 19));
        assert_eq!(body_size(80, 3), (80, 0));
    }

    #[tokio::test]
    async fn test_feedback_messages_become_toasts() {
        let mut app = app();
        app.route(AppMessage::Done {
            text: "Removed web".to_string(),
        });
        app.route(AppMessage::CommandFailed {
            name: "Removing web".to_string(),
            error: "Resource not found".to_string(),
        });

        let toasts: Vec<_> = app
            .toasts
            .toasts()
            .map(|t| (t.toast_type(), t.message().to_string()))
            .collect();
        assert_eq!(
            toasts,
            vec![
                (ToastType::Success, "Removed web".to_string()),
                (
                    ToastType::Error,
                    "Removing web failed: Resource not found".to_string()
                ),
            ]
        );
    }

    #[tokio::test]
    async fn test_popping_the_root_quits() {
        let mut app = app();
        app.dispatch(AppMessage::Key(KeyEvent::from(KeyCode::Esc)));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_suspend_request_sets_flag() {
        let mut app = app();
        app.route(AppMessage::Suspend);
        assert!(app.should_suspend);
        assert!(!app.should_quit);
    }
}
