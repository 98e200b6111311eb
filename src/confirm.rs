//! Yes/no confirmation layered over any view.
//!
//! [`ConfirmOverlay`] wraps a view and watches for `ShowConfirm`. While a
//! choice is pending the dialog captures all input and the wrapped view
//! receives nothing; messages for it are held back and replayed, in order,
//! once the user decides. An [`Answer`] either runs a command or hands a
//! message to the wrapped view in the same update, so the view can change
//! state before the next frame is drawn.

use std::fmt;
use std::sync::Arc;

use color_eyre::Result;
use ratatui::Frame;
use ratatui::layout::Rect;
use tracing::{debug, warn};

use crate::Theme;
use crate::command::Cmd;
use crate::config::{DialogAction, KeyResolver};
use crate::message::Message;
use crate::ui::{Component, ConfirmDialog, ConfirmEvent, EventResult, Keybinding};
use crate::view::{Ctx, View};

/// What a choice turns into.
pub enum Answer<D> {
    Run(Cmd),
    /// Handed to the wrapped view after the held messages
    Deliver(Message<D>),
}

impl<D> From<Cmd> for Answer<D> {
    fn from(cmd: Cmd) -> Self {
        Self::Run(cmd)
    }
}

impl<D> From<Message<D>> for Answer<D> {
    fn from(msg: Message<D>) -> Self {
        Self::Deliver(msg)
    }
}

type Continuation<D> = Box<dyn FnOnce() -> Answer<D> + Send>;

/// A pending question and what to do with each answer.
pub struct Confirmation<D> {
    title: String,
    message: String,
    on_confirm: Continuation<D>,
    on_cancel: Continuation<D>,
    danger: bool,
}

impl<D: 'static> Confirmation<D> {
    pub fn new<A>(message: impl Into<String>, on_confirm: impl FnOnce() -> A + Send + 'static) -> Self
    where
        A: Into<Answer<D>> + 'static,
    {
        Self {
            title: "Confirm".to_string(),
            message: message.into(),
            on_confirm: Box::new(move || on_confirm().into()),
            on_cancel: Box::new(|| Answer::Run(Cmd::None)),
            danger: false,
        }
    }

    #[must_use]
    pub fn on_cancel<A>(mut self, on_cancel: impl FnOnce() -> A + Send + 'static) -> Self
    where
        A: Into<Answer<D>> + 'static,
    {
        self.on_cancel = Box::new(move || on_cancel().into());
        self
    }

    /// Style the dialog as destructive.
    #[must_use]
    pub const fn danger(mut self) -> Self {
        self.danger = true;
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl<D> fmt::Debug for Confirmation<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Confirmation")
            .field("title", &self.title)
            .field("message", &self.message)
            .field("danger", &self.danger)
            .finish_non_exhaustive()
    }
}

struct Pending<D> {
    dialog: ConfirmDialog,
    on_confirm: Continuation<D>,
    on_cancel: Continuation<D>,
}

/// Wraps `V` with a confirmation dialog.
pub struct ConfirmOverlay<V: View> {
    inner: V,
    resolver: Arc<KeyResolver>,
    pending: Option<Pending<V::Data>>,
    held: Vec<Message<V::Data>>,
    held_resize: Option<(u16, u16)>,
    size: (u16, u16),
}

impl<V: View> ConfirmOverlay<V> {
    pub const fn new(inner: V, resolver: Arc<KeyResolver>) -> Self {
        Self {
            inner,
            resolver,
            pending: None,
            held: Vec::new(),
            held_resize: None,
            size: (0, 0),
        }
    }

    pub const fn inner(&self) -> &V {
        &self.inner
    }

    #[cfg(test)]
    pub const fn is_awaiting(&self) -> bool {
        self.pending.is_some()
    }

    fn open(&mut self, confirmation: Confirmation<V::Data>) {
        debug!("Awaiting confirmation: {}", confirmation.message);
        let mut dialog = ConfirmDialog::new(confirmation.message, Arc::clone(&self.resolver))
            .with_title(confirmation.title);
        if confirmation.danger {
            dialog = dialog.danger();
        }
        dialog.set_size(self.size.0, self.size.1);
        self.pending = Some(Pending {
            dialog,
            on_confirm: confirmation.on_confirm,
            on_cancel: confirmation.on_cancel,
        });
    }

    fn resolve(&mut self, confirmed: bool, ctx: &Ctx<V::Data>) -> Result<Cmd> {
        let Some(pending) = self.pending.take() else {
            return Ok(Cmd::None);
        };
        debug!("Confirmation resolved, confirmed: {confirmed}");
        let answer = if confirmed {
            (pending.on_confirm)()
        } else {
            (pending.on_cancel)()
        };

        let mut cmds = Vec::new();
        if let Some((width, height)) = self.held_resize.take() {
            cmds.push(self.inner.update(Message::Resize { width, height }, ctx)?);
        }
        for msg in std::mem::take(&mut self.held) {
            cmds.push(self.inner.update(msg, ctx)?);
        }
        cmds.push(match answer {
            Answer::Run(cmd) => cmd,
            Answer::Deliver(msg) => self.inner.update(msg, ctx)?,
        });
        Ok(Cmd::batch(cmds))
    }
}

impl<V: View> View for ConfirmOverlay<V> {
    type Data = V::Data;

    fn init(&mut self, ctx: &Ctx<Self::Data>) -> Cmd {
        self.inner.init(ctx)
    }

    fn update(&mut self, msg: Message<Self::Data>, ctx: &Ctx<Self::Data>) -> Result<Cmd> {
        if let Message::Resize { width, height } = msg {
            self.size = (width, height);
        }

        if self.pending.is_none() {
            return match msg {
                Message::ShowConfirm(confirmation) => {
                    self.open(confirmation);
                    Ok(Cmd::None)
                }
                msg => self.inner.update(msg, ctx),
            };
        }
        let Some(pending) = &mut self.pending else {
            return Ok(Cmd::None);
        };

        match msg {
            Message::Key(key) => match pending.dialog.handle_key(key)? {
                EventResult::Event(ConfirmEvent::Confirmed) => self.resolve(true, ctx),
                EventResult::Event(ConfirmEvent::Cancelled) => self.resolve(false, ctx),
                EventResult::Consumed | EventResult::Ignored => Ok(Cmd::None),
            },
            Message::Resize { width, height } => {
                pending.dialog.set_size(width, height);
                self.held_resize = Some((width, height));
                Ok(Cmd::None)
            }
            Message::ShowConfirm(confirmation) => {
                warn!(
                    "Ignoring confirmation '{}', another one is pending",
                    confirmation.message
                );
                Ok(Cmd::None)
            }
            Message::Tick => {
                pending.dialog.handle_tick();
                Ok(Cmd::None)
            }
            msg => {
                self.held.push(msg);
                Ok(Cmd::None)
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.inner.render(frame, area, theme);
        if let Some(pending) = &mut self.pending {
            pending.dialog.render(frame, area, theme);
        }
    }

    fn captures_text(&self) -> bool {
        self.pending.is_none() && self.inner.captures_text()
    }

    fn handles_back(&self) -> bool {
        self.pending.is_some() || self.inner.handles_back()
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        if self.pending.is_none() {
            return self.inner.keybindings();
        }
        vec![
            Keybinding::hint(self.resolver.display_dialog(DialogAction::Confirm), "Yes"),
            Keybinding::hint(self.resolver.display_dialog(DialogAction::Cancel), "No"),
            Keybinding::hint(
                format!(
                    "{}/{}",
                    self.resolver.display_dialog(DialogAction::Left),
                    self.resolver.display_dialog(DialogAction::Right)
                ),
                "Choose",
            ),
            Keybinding::hint(self.resolver.display_dialog(DialogAction::Activate), "Select"),
        ]
    }
}
