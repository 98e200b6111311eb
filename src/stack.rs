//! The navigation stack.
//!
//! Holds every active frame in push order. Only the top frame receives
//! messages and only the top frame is drawn; frames below keep their state
//! untouched until they are uncovered again. The stack is never empty while
//! the program runs: popping the last frame ends the loop.

use std::fmt;
use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use tracing::{debug, error, info};

use crate::Theme;
use crate::command::{Cmd, CommandEnv};
use crate::config::{GlobalAction, KeyResolver};
use crate::error::LoadError;
use crate::message::AppMessage;
use crate::ui::{Component, ErrorEvent, ErrorView, EventResult, Keybinding};
use crate::view::{Input, Mounted, Screen, View};

/// A view instance on the stack plus its breadcrumb.
pub struct NavFrame {
    screen: Box<dyn Screen>,
    breadcrumb: Option<String>,
    failure: Option<ErrorView>,
}

impl NavFrame {
    pub fn new(view: impl View) -> Self {
        Self {
            screen: Box::new(Mounted::new(view)),
            breadcrumb: None,
            failure: None,
        }
    }

    #[must_use]
    pub fn with_breadcrumb(mut self, label: impl Into<String>) -> Self {
        self.breadcrumb = Some(label.into());
        self
    }

    pub fn breadcrumb(&self) -> Option<&str> {
        self.breadcrumb.as_deref()
    }

    pub const fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    fn label(&self) -> &str {
        self.breadcrumb.as_deref().unwrap_or("<unnamed>")
    }

    fn handle(&mut self, input: Input, resolver: &Arc<KeyResolver>) -> Cmd {
        if self.is_failed() {
            return Cmd::None;
        }
        let result = self.screen.handle(input);
        self.settle(result, resolver)
    }

    fn drain(&mut self, resolver: &Arc<KeyResolver>) -> Cmd {
        if self.is_failed() {
            return Cmd::None;
        }
        let (cmd, result) = self.screen.drain();
        let failed = self.settle(result.map(|()| Cmd::None), resolver);
        Cmd::batch([cmd, failed])
    }

    fn settle(&mut self, result: color_eyre::Result<Cmd>, resolver: &Arc<KeyResolver>) -> Cmd {
        match result {
            Ok(cmd) => cmd,
            Err(report) => {
                error!("Frame '{}' failed: {report:#}", self.label());
                let err = LoadError::from_report(&report);
                self.failure = Some(ErrorView::new(&err, Arc::clone(resolver)));
                Cmd::None
            }
        }
    }
}

impl fmt::Debug for NavFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavFrame")
            .field("breadcrumb", &self.breadcrumb)
            .field("failed", &self.is_failed())
            .finish_non_exhaustive()
    }
}

/// What the loop should do after a message.
#[derive(Debug)]
pub enum Flow {
    Continue(Cmd),
    Exit,
}

pub struct Stack {
    frames: Vec<NavFrame>,
    env: CommandEnv,
    resolver: Arc<KeyResolver>,
    /// Last known body size, replayed to frames that become visible
    size: Option<(u16, u16)>,
}

impl Stack {
    /// Create a stack holding `root` and return the root's init commands.
    pub fn new(root: NavFrame, env: CommandEnv, resolver: Arc<KeyResolver>) -> (Self, Cmd) {
        let mut stack = Self {
            frames: Vec::new(),
            env,
            resolver,
            size: None,
        };
        let cmd = stack.push(root);
        (stack, cmd)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Append `frame` and run its init.
    pub fn push(&mut self, mut frame: NavFrame) -> Cmd {
        info!("Pushing frame '{}' (depth {})", frame.label(), self.frames.len() + 1);
        let mut cmds = vec![frame.screen.init(&self.env)];
        if let Some((width, height)) = self.size {
            cmds.push(frame.handle(Input::Resize { width, height }, &self.resolver));
        }
        self.frames.push(frame);
        Cmd::batch(cmds)
    }

    /// Remove the top frame. Removing the last one ends the program.
    pub fn pop(&mut self) -> Flow {
        if let Some(frame) = self.frames.pop() {
            info!("Popped frame '{}'", frame.label());
        }
        let resolver = Arc::clone(&self.resolver);
        let size = self.size;
        let Some(top) = self.frames.last_mut() else {
            info!("Stack is empty, exiting");
            return Flow::Exit;
        };

        // Messages that arrived while the frame was covered are processed now
        let resize = size.map_or(Cmd::None, |(width, height)| {
            top.handle(Input::Resize { width, height }, &resolver)
        });
        let drained = top.drain(&resolver);
        Flow::Continue(Cmd::batch([resize, drained]))
    }

    pub fn update(&mut self, msg: AppMessage) -> Flow {
        match msg {
            AppMessage::Key(key) => self.handle_key(key),
            AppMessage::Resize { width, height } => {
                self.size = Some((width, height));
                self.with_top(|top, resolver| top.handle(Input::Resize { width, height }, resolver))
            }
            AppMessage::Tick => self.with_top(|top, resolver| top.handle(Input::Tick, resolver)),
            AppMessage::Wake => self.with_top(NavFrame::drain),
            AppMessage::ExecFinished(result) => {
                self.with_top(|top, resolver| top.handle(Input::ExecFinished(result), resolver))
            }
            AppMessage::Push(frame) => Flow::Continue(self.push(frame)),
            AppMessage::Replace(frame) => {
                if let Some(old) = self.frames.pop() {
                    info!("Replacing frame '{}'", old.label());
                }
                Flow::Continue(self.push(frame))
            }
            AppMessage::Back => self.pop(),
            AppMessage::Quit => Flow::Exit,
            other => {
                debug!("Stack ignores {other:?}");
                Flow::Continue(Cmd::None)
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        let Some(top) = self.frames.last_mut() else {
            return Flow::Exit;
        };

        if let Some(error_view) = &mut top.failure {
            return match error_view.handle_key(key) {
                Ok(EventResult::Event(ErrorEvent::Back)) => self.pop(),
                Ok(EventResult::Event(ErrorEvent::Quit)) => Flow::Exit,
                _ => Flow::Continue(Cmd::None),
            };
        }

        if self.resolver.matches_global(&key, GlobalAction::Quit) {
            return Flow::Exit;
        }
        if self.resolver.matches_global(&key, GlobalAction::Back) && !top.screen.handles_back() {
            return self.pop();
        }
        Flow::Continue(top.handle(Input::Key(key), &self.resolver))
    }

    fn with_top(&mut self, f: impl FnOnce(&mut NavFrame, &Arc<KeyResolver>) -> Cmd) -> Flow {
        match self.frames.last_mut() {
            Some(top) => Flow::Continue(f(top, &self.resolver)),
            None => Flow::Exit,
        }
    }

    /// Draw the top frame only.
    pub fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(top) = self.frames.last_mut() else {
            return;
        };
        match &mut top.failure {
            Some(error_view) => error_view.render(frame, area, theme),
            None => top.screen.render(frame, area, theme),
        }
    }

    pub fn breadcrumbs(&self) -> Vec<&str> {
        self.frames.iter().filter_map(NavFrame::breadcrumb).collect()
    }

    pub fn keybindings(&self) -> Vec<Keybinding> {
        match self.frames.last() {
            Some(top) if top.is_failed() => vec![],
            Some(top) => top.screen.keybindings(),
            None => vec![],
        }
    }
}
