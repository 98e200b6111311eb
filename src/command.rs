//! Deferred actions.
//!
//! Views never block. Every side effect is returned from `update` as a
//! [`Cmd`] and the App runs it on a tokio task. Results come back only as
//! messages: loop-level ones through the [`CommandEnv`] sender, typed ones
//! through the issuing view's inbox.

mod clipboard;
mod exec;
mod poll;
mod typed;
mod window;

use std::fmt;
use std::sync::{Arc, Mutex};

use arboard::Clipboard;
use async_trait::async_trait;
use color_eyre::Result;
use futures::future::{BoxFuture, join_all};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub use clipboard::CopyToClipboardCmd;
pub use exec::{ExternalCommand, editor_command};
pub use poll::poll_until;
pub use typed::TypedCommand;
pub use window::WindowSizeCmd;

use crate::message::AppMessage;
use crate::stack::NavFrame;

/// Async command that performs a side effect.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name for logs and failure toasts.
    fn name(&self) -> String;

    /// Execute the command.
    async fn execute(self: Box<Self>, env: CommandEnv) -> Result<()>;
}

/// A tree of deferred actions.
pub enum Cmd {
    None,
    Task(Box<dyn Command>),
    /// Loop-level message, handled in order by the App
    App(AppMessage),
    /// Start all children at once; completion order is unspecified
    Batch(Vec<Cmd>),
    /// Start each child only after the previous one completed
    Sequence(Vec<Cmd>),
}

impl Cmd {
    pub fn task(command: impl Command) -> Self {
        Self::Task(Box::new(command))
    }

    pub fn push(frame: NavFrame) -> Self {
        Self::App(AppMessage::Push(frame))
    }

    pub fn replace(frame: NavFrame) -> Self {
        Self::App(AppMessage::Replace(frame))
    }

    pub const fn back() -> Self {
        Self::App(AppMessage::Back)
    }

    pub const fn quit() -> Self {
        Self::App(AppMessage::Quit)
    }

    pub fn exec(command: ExternalCommand) -> Self {
        Self::App(AppMessage::Exec(command))
    }

    pub fn batch(cmds: impl IntoIterator<Item = Self>) -> Self {
        Self::collect(cmds, Self::Batch)
    }

    pub fn sequence(cmds: impl IntoIterator<Item = Self>) -> Self {
        Self::collect(cmds, Self::Sequence)
    }

    fn collect(cmds: impl IntoIterator<Item = Self>, wrap: fn(Vec<Self>) -> Self) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.remove(0),
            _ => wrap(cmds),
        }
    }

    /// Run `next` after this command completed.
    pub fn then(self, next: Self) -> Self {
        Self::sequence([self, next])
    }

    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Drive the command tree to completion.
    ///
    /// A failing task is reported as [`AppMessage::CommandFailed`] and does
    /// not stop an enclosing sequence. Nothing runs once the process token
    /// is cancelled.
    pub fn run(self, env: CommandEnv) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            if env.is_cancelled() {
                return;
            }
            match self {
                Self::None => {}
                Self::App(msg) => env.send(msg),
                Self::Task(command) => {
                    let name = command.name();
                    debug!("Running command: {name}");
                    let token = env.token.clone();
                    tokio::select! {
                        biased;
                        () = token.cancelled() => debug!("Abandoned command: {name}"),
                        result = command.execute(env.clone()) => {
                            if let Err(error) = result {
                                warn!("Command '{name}' failed: {error:#}");
                                env.send(AppMessage::CommandFailed {
                                    name,
                                    error: format!("{error:#}"),
                                });
                            }
                        }
                    }
                }
                Self::Batch(cmds) => {
                    join_all(cmds.into_iter().map(|cmd| cmd.run(env.clone()))).await;
                }
                Self::Sequence(cmds) => {
                    for cmd in cmds {
                        cmd.run(env.clone()).await;
                    }
                }
            }
        })
    }
}

impl fmt::Debug for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Task(command) => write!(f, "Task({})", command.name()),
            Self::App(msg) => f.debug_tuple("App").field(msg).finish(),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Sequence(cmds) => f.debug_tuple("Sequence").field(cmds).finish(),
        }
    }
}

/// Shared environment for running commands.
///
/// Clone is cheap (Arc-based) so it can be handed to every task.
#[derive(Clone)]
pub struct CommandEnv {
    app_tx: UnboundedSender<AppMessage>,
    token: CancellationToken,
    clipboard: Arc<Mutex<Option<Clipboard>>>,
}

impl CommandEnv {
    pub fn new(app_tx: UnboundedSender<AppMessage>, token: CancellationToken) -> Self {
        Self {
            app_tx,
            token,
            clipboard: Arc::new(Mutex::new(None)),
        }
    }

    /// Send a message to the loop. Dropped silently once the loop is gone.
    pub fn send(&self, msg: AppMessage) {
        let _ = self.app_tx.send(msg);
    }

    pub fn sender(&self) -> UnboundedSender<AppMessage> {
        self.app_tx.clone()
    }

    /// The process-wide lifetime of every command.
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Copy text to the system clipboard.
    ///
    /// On Linux, the clipboard is held by the application, so the text remains
    /// available until the next copy or app exit.
    pub fn set_clipboard(&self, text: &str) -> Result<()> {
        let mut guard = self
            .clipboard
            .lock()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to lock clipboard: {e}"))?;

        if guard.is_none() {
            *guard = Some(Clipboard::new()?);
        }

        if let Some(clipboard) = guard.as_mut() {
            clipboard.set_text(text)?;
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use color_eyre::eyre::eyre;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::*;

    pub(crate) fn test_env() -> (CommandEnv, UnboundedReceiver<AppMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (CommandEnv::new(tx, CancellationToken::new()), rx)
    }

    struct Record {
        log: Arc<Mutex<Vec<&'static str>>>,
        label: &'static str,
        delay: Duration,
        fail: bool,
    }

    #[async_trait]
    impl Command for Record {
        fn name(&self) -> String {
            self.label.to_string()
        }

        async fn execute(self: Box<Self>, _env: CommandEnv) -> Result<()> {
            tokio::time::sleep(self.delay).await;
            self.log.lock().unwrap().push(self.label);
            if self.fail {
                return Err(eyre!("{} broke", self.label));
            }
            Ok(())
        }
    }

    fn record(log: &Arc<Mutex<Vec<&'static str>>>, label: &'static str, ms: u64) -> Cmd {
        Cmd::task(Record {
            log: Arc::clone(log),
            label,
            delay: Duration::from_millis(ms),
            fail: false,
        })
    }

    #[test]
    fn test_batch_and_sequence_flatten() {
        assert!(Cmd::batch([Cmd::None, Cmd::None]).is_none());
        assert!(matches!(Cmd::sequence([Cmd::None, Cmd::back()]), Cmd::App(AppMessage::Back)));
        assert!(matches!(Cmd::batch([Cmd::back(), Cmd::quit()]), Cmd::Batch(v) if v.len() == 2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequence_gates_each_step() {
        let (env, _rx) = test_env();
        let log = Arc::new(Mutex::new(Vec::new()));
        let cmd = Cmd::sequence([record(&log, "slow", 50), record(&log, "fast", 1)]);
        cmd.run(env).await;
        assert_eq!(*log.lock().unwrap(), vec!["slow", "fast"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_starts_everything_at_once() {
        let (env, _rx) = test_env();
        let log = Arc::new(Mutex::new(Vec::new()));
        let started = tokio::time::Instant::now();
        Cmd::batch([record(&log, "a", 100), record(&log, "b", 100)])
            .run(env)
            .await;
        assert_eq!(log.lock().unwrap().len(), 2);
        assert!(started.elapsed() < Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_failed_step_is_reported_and_sequence_continues() {
        let (env, mut rx) = test_env();
        let log = Arc::new(Mutex::new(Vec::new()));
        let failing = Cmd::task(Record {
            log: Arc::clone(&log),
            label: "delete",
            delay: Duration::ZERO,
            fail: true,
        });
        Cmd::sequence([failing, record(&log, "reload", 0)]).run(env).await;

        assert_eq!(*log.lock().unwrap(), vec!["delete", "reload"]);
        match rx.try_recv() {
            Ok(AppMessage::CommandFailed { name, error }) => {
                assert_eq!(name, "delete");
                assert!(error.contains("delete broke"));
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_env_runs_nothing() {
        let (env, mut rx) = test_env();
        env.token().cancel();
        Cmd::sequence([Cmd::back(), Cmd::quit()]).run(env).await;
        assert!(rx.try_recv().is_err());
    }
}
