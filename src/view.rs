//! Views and the frames that host them.
//!
//! A [`View`] is a typed state machine: it receives [`Message`]s carrying the
//! payload type its own loaders produce, mutates itself and returns the next
//! [`Cmd`]. The [`Stack`](crate::stack::Stack) cannot hold views of different
//! payload types directly, so every view is mounted behind the object-safe
//! [`Screen`] trait. The mount owns the view's inbox: background results are
//! queued there and only drained while the frame is on top.

use std::future::Future;

use async_trait::async_trait;
use color_eyre::Result;
use color_eyre::eyre::bail;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;

use crate::Theme;
use crate::command::{Cmd, Command, CommandEnv, TypedCommand, WindowSizeCmd};
use crate::error::ProcessError;
use crate::message::{AppMessage, Message};
use crate::ui::Keybinding;

/// A navigable view.
///
/// The loop calls methods in this order:
///
/// 1. `init()` once when the frame is pushed
/// 2. `update()` for every message, one at a time
/// 3. `render()` whenever a frame is drawn and this view is on top
pub trait View: Send + 'static {
    /// Payload produced by this view's loaders.
    type Data: Send + 'static;

    /// Startup commands, typically a load and a window-size query.
    fn init(&mut self, ctx: &Ctx<Self::Data>) -> Cmd {
        _ = ctx;
        Cmd::None
    }

    /// Handle one message.
    ///
    /// # Errors
    /// Returning an error marks the frame as failed. It then renders an error
    /// view and accepts only back and quit.
    fn update(&mut self, msg: Message<Self::Data>, ctx: &Ctx<Self::Data>) -> Result<Cmd>;

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// True while a text field has focus, so plain character keys are input.
    fn captures_text(&self) -> bool {
        false
    }

    /// True while the view wants the back key for itself (closing a pane,
    /// clearing a filter). Otherwise back pops the frame.
    fn handles_back(&self) -> bool {
        self.captures_text()
    }

    /// Hints shown in the footer.
    fn keybindings(&self) -> Vec<Keybinding> {
        vec![]
    }
}

/// Typed mailbox of a mounted view.
///
/// Sending queues the message and wakes the loop. Once the frame has been
/// popped, sends fail and report `false`.
pub struct Inbox<D> {
    tx: UnboundedSender<Message<D>>,
    wake: UnboundedSender<AppMessage>,
}

impl<D> Clone for Inbox<D> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            wake: self.wake.clone(),
        }
    }
}

impl<D: Send + 'static> Inbox<D> {
    pub const fn new(tx: UnboundedSender<Message<D>>, wake: UnboundedSender<AppMessage>) -> Self {
        Self { tx, wake }
    }

    pub fn send(&self, msg: Message<D>) -> bool {
        if self.tx.send(msg).is_err() {
            return false;
        }
        let _ = self.wake.send(AppMessage::Wake);
        true
    }

    /// Deliver `msg` to this inbox once the returned command runs.
    pub fn post(&self, msg: Message<D>) -> Cmd {
        Cmd::task(PostCmd {
            inbox: self.clone(),
            msg,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Resolves once the frame owning this inbox has been dropped.
    pub async fn closed(&self) {
        self.tx.closed().await;
    }
}

struct PostCmd<D> {
    inbox: Inbox<D>,
    msg: Message<D>,
}

#[async_trait]
impl<D: Send + 'static> Command for PostCmd<D> {
    fn name(&self) -> String {
        format!("Posting {}", self.msg.kind())
    }

    async fn execute(self: Box<Self>, _env: CommandEnv) -> Result<()> {
        self.inbox.send(self.msg);
        Ok(())
    }
}

/// What a view gets alongside every message.
pub struct Ctx<D> {
    inbox: Inbox<D>,
    token: CancellationToken,
}

impl<D: Send + 'static> Ctx<D> {
    pub const fn new(inbox: Inbox<D>, token: CancellationToken) -> Self {
        Self { inbox, token }
    }

    pub const fn inbox(&self) -> &Inbox<D> {
        &self.inbox
    }

    /// Lifetime of the process. Bound into every loader.
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn send(&self, msg: Message<D>) -> bool {
        self.inbox.send(msg)
    }

    pub fn post(&self, msg: Message<D>) -> Cmd {
        self.inbox.post(msg)
    }

    /// Run `f(token, input)` in the background and deliver the outcome to
    /// this view as `DataLoaded` or `LoadError`.
    pub fn load<I, F, Fut>(&self, name: impl Into<String>, f: F, input: I) -> Cmd
    where
        I: Send + 'static,
        F: FnOnce(CancellationToken, I) -> Fut + Send + 'static,
        Fut: Future<Output = Result<D>> + Send + 'static,
    {
        TypedCommand::new(name, &self.token, f, input).deliver_to(self.inbox.clone())
    }

    /// Deliver a prepared command's outcome to this view.
    pub fn deliver(&self, command: TypedCommand<D>) -> Cmd {
        command.deliver_to(self.inbox.clone())
    }

    pub fn window_size(&self) -> Cmd {
        Cmd::task(WindowSizeCmd)
    }
}

/// Loop-level input routed to the top frame.
#[derive(Debug)]
pub enum Input {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    Tick,
    ExecFinished(std::result::Result<(), ProcessError>),
}

impl<D> From<Input> for Message<D> {
    fn from(input: Input) -> Self {
        match input {
            Input::Key(key) => Self::Key(key),
            Input::Resize { width, height } => Self::Resize { width, height },
            Input::Tick => Self::Tick,
            Input::ExecFinished(result) => Self::ExecFinished(result),
        }
    }
}

/// Object-safe face of a mounted view, as held by the Stack.
pub trait Screen: Send {
    /// Bind the view to the loop and run its `init`.
    fn init(&mut self, env: &CommandEnv) -> Cmd;

    fn handle(&mut self, input: Input) -> Result<Cmd>;

    /// Feed every queued inbox message to the view, in arrival order.
    ///
    /// Stops at the first failing update. Commands from the messages before
    /// it are returned either way.
    fn drain(&mut self) -> (Cmd, Result<()>);

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    fn handles_back(&self) -> bool;

    fn keybindings(&self) -> Vec<Keybinding>;
}

/// A view together with its inbox.
pub struct Mounted<V: View> {
    view: V,
    tx: UnboundedSender<Message<V::Data>>,
    rx: UnboundedReceiver<Message<V::Data>>,
    ctx: Option<Ctx<V::Data>>,
}

impl<V: View> Mounted<V> {
    pub fn new(view: V) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            view,
            tx,
            rx,
            ctx: None,
        }
    }

    fn deliver(&mut self, msg: Message<V::Data>) -> Result<Cmd> {
        let Some(ctx) = &self.ctx else {
            bail!("view received {} before init", msg.kind());
        };
        self.view.update(msg, ctx)
    }
}

impl<V: View> Screen for Mounted<V> {
    fn init(&mut self, env: &CommandEnv) -> Cmd {
        let inbox = Inbox::new(self.tx.clone(), env.sender());
        let ctx = Ctx::new(inbox, env.token().clone());
        let cmd = self.view.init(&ctx);
        self.ctx = Some(ctx);
        cmd
    }

    fn handle(&mut self, input: Input) -> Result<Cmd> {
        self.deliver(input.into())
    }

    fn drain(&mut self) -> (Cmd, Result<()>) {
        let mut cmds = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            match self.deliver(msg) {
                Ok(cmd) => cmds.push(cmd),
                Err(report) => return (Cmd::batch(cmds), Err(report)),
            }
        }
        (Cmd::batch(cmds), Ok(()))
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.view.render(frame, area, theme);
    }

    fn handles_back(&self) -> bool {
        self.view.handles_back()
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        self.view.keybindings()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::command::tests::test_env;

    /// A detached context. The receivers must be kept alive by the caller.
    pub(crate) fn test_ctx<D: Send + 'static>()
    -> (Ctx<D>, UnboundedReceiver<Message<D>>, UnboundedReceiver<AppMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (wake, wake_rx) = mpsc::unbounded_channel();
        let ctx = Ctx::new(Inbox::new(tx, wake), CancellationToken::new());
        (ctx, rx, wake_rx)
    }

    /// Records every message kind it receives.
    #[derive(Default)]
    pub(crate) struct Probe {
        pub(crate) seen: Vec<String>,
        pub(crate) fail_on_key: bool,
        pub(crate) typing: bool,
    }

    impl View for Probe {
        type Data = u32;

        fn update(&mut self, msg: Message<u32>, _ctx: &Ctx<u32>) -> Result<Cmd> {
            if let Message::DataLoaded(n) = &msg {
                self.seen.push(format!("DataLoaded({n})"));
            } else {
                self.seen.push(msg.kind().to_string());
            }
            if self.fail_on_key && matches!(msg, Message::Key(_)) {
                bail!("probe failed");
            }
            Ok(Cmd::None)
        }

        fn render(&mut self, _frame: &mut Frame, _area: Rect, _theme: &Theme) {}

        fn captures_text(&self) -> bool {
            self.typing
        }
    }

    #[tokio::test]
    async fn test_inbox_is_drained_in_arrival_order() {
        let (env, mut app_rx) = test_env();
        let mut mounted = Mounted::new(Probe::default());
        mounted.init(&env);

        let inbox = mounted.ctx.as_ref().map(|c| c.inbox().clone()).unwrap();
        assert!(inbox.send(Message::DataLoaded(1)));
        assert!(inbox.send(Message::Tick));
        assert!(inbox.send(Message::DataLoaded(2)));
        mounted.drain().1.unwrap();

        assert_eq!(mounted.view.seen, vec!["DataLoaded(1)", "Tick", "DataLoaded(2)"]);
        for _ in 0..3 {
            assert!(matches!(app_rx.try_recv(), Ok(AppMessage::Wake)));
        }
    }

    #[tokio::test]
    async fn test_posted_message_arrives_when_command_runs() {
        let (env, _app_rx) = test_env();
        let mut mounted = Mounted::new(Probe::default());
        mounted.init(&env);

        let cmd = mounted.ctx.as_ref().unwrap().post(Message::DataLoaded(9));
        mounted.drain().1.unwrap();
        assert!(mounted.view.seen.is_empty());

        cmd.run(env).await;
        mounted.drain().1.unwrap();
        assert_eq!(mounted.view.seen, vec!["DataLoaded(9)"]);
    }

    /// Goes back on data, fails on keys.
    struct Fragile;

    impl View for Fragile {
        type Data = u32;

        fn update(&mut self, msg: Message<u32>, _ctx: &Ctx<u32>) -> Result<Cmd> {
            match msg {
                Message::Key(_) => bail!("fragile view failed"),
                _ => Ok(Cmd::back()),
            }
        }

        fn render(&mut self, _frame: &mut Frame, _area: Rect, _theme: &Theme) {}
    }

    #[tokio::test]
    async fn test_failed_drain_keeps_earlier_commands() {
        let (env, mut app_rx) = test_env();
        let mut mounted = Mounted::new(Fragile);
        mounted.init(&env);

        let inbox = mounted.ctx.as_ref().map(|c| c.inbox().clone()).unwrap();
        inbox.send(Message::DataLoaded(1));
        inbox.send(Message::Key(KeyEvent::from(crossterm::event::KeyCode::Enter)));
        inbox.send(Message::DataLoaded(2));

        let (cmd, result) = mounted.drain();
        assert!(result.is_err());
        cmd.run(env).await;

        let backs = std::iter::from_fn(|| app_rx.try_recv().ok())
            .filter(|msg| matches!(msg, AppMessage::Back))
            .count();
        assert_eq!(backs, 1);
    }

    #[test]
    fn test_send_after_drop_reports_failure() {
        let (tx, rx) = mpsc::unbounded_channel::<Message<u32>>();
        let (wake, _wake_rx) = mpsc::unbounded_channel();
        let inbox = Inbox::new(tx, wake);
        drop(rx);
        assert!(!inbox.send(Message::Tick));
        assert!(inbox.is_closed());
    }
}
