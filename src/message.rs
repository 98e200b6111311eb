//! Messages flowing through the event loop.
//!
//! # Terminology
//! - **Event**: input from the terminal, see [`crate::tui::Event`]
//! - **AppMessage**: loop-level control handled by the App and the [`Stack`]
//! - **Message**: what a single view receives, parameterized by the payload
//!   type its loaders produce
//!
//! Both enums are closed; adding a kind means every `match` has to handle it.
//!
//! [`Stack`]: crate::stack::Stack

use crossterm::event::KeyEvent;

use crate::command::{Cmd, ExternalCommand};
use crate::confirm::Confirmation;
use crate::error::{LoadError, ProcessError};
use crate::stack::NavFrame;

/// Loop-level messages.
#[derive(Debug)]
pub enum AppMessage {
    // === Input ===
    /// Key pressed
    Key(KeyEvent),
    /// Terminal changed size
    Resize { width: u16, height: u16 },
    /// Animation tick
    Tick,

    // === Navigation ===
    /// A frame has queued messages in its inbox
    Wake,
    /// Push a new frame and run its init
    Push(NavFrame),
    /// Pop the top frame and push a new one in its place
    Replace(NavFrame),
    /// Pop the top frame; popping the last one exits
    Back,
    /// Terminate immediately
    Quit,

    // === Process ===
    /// Suspend the application (Ctrl+Z)
    Suspend,
    /// Hand the terminal to an external program
    Exec(ExternalCommand),
    /// The external program exited
    ExecFinished(Result<(), ProcessError>),

    // === Feedback ===
    /// An operation finished, show its summary
    Done { text: String },
    /// A background command returned an error
    CommandFailed { name: String, error: String },
}

/// Messages delivered to a single view.
pub enum Message<T> {
    /// Key pressed while this view is on top
    Key(KeyEvent),
    /// Available area changed size
    Resize { width: u16, height: u16 },
    /// Animation tick
    Tick,
    /// Enter the loading state with `label` and run `cmd`. Lists follow
    /// `cmd` with a fresh load of their own.
    LoadStarted { label: String, cmd: Cmd },
    /// A loader resolved successfully
    DataLoaded(T),
    /// A loader failed
    LoadError(LoadError),
    /// Ask the user to confirm before running a continuation
    ShowConfirm(Confirmation<T>),
    /// An external program handed back the terminal
    ExecFinished(Result<(), ProcessError>),
}

impl<T> Message<T> {
    /// Short name used in log output.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Key(_) => "Key",
            Self::Resize { .. } => "Resize",
            Self::Tick => "Tick",
            Self::LoadStarted { .. } => "LoadStarted",
            Self::DataLoaded(_) => "DataLoaded",
            Self::LoadError(_) => "LoadError",
            Self::ShowConfirm(_) => "ShowConfirm",
            Self::ExecFinished(_) => "ExecFinished",
        }
    }
}

impl<T> From<LoadError> for Message<T> {
    fn from(err: LoadError) -> Self {
        Self::LoadError(err)
    }
}
