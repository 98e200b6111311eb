//! Error taxonomy of the engine.
//!
//! Every asynchronous failure is normalized into [`LoadError`] before it
//! reaches a view. Loaders that want a specific title return a
//! [`UserFacingError`] inside their report, form fields produce
//! [`ValidationError`]s that stay inside the form, and external programs
//! report a [`ProcessError`].

use std::any::Any;
use std::time::Duration;

use thiserror::Error;

/// A loader failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("{0}")]
    Failed(String),
    #[error("{title}: {message}")]
    UserFacing { title: String, message: String },
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    #[error("loader panicked: {0}")]
    Panicked(String),
}

impl LoadError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Normalize an eyre report, keeping typed errors intact.
    pub fn from_report(report: &color_eyre::Report) -> Self {
        if let Some(err) = report.downcast_ref::<Self>() {
            return err.clone();
        }
        if let Some(err) = report.downcast_ref::<UserFacingError>() {
            return Self::UserFacing {
                title: err.title.clone(),
                message: err.message.clone(),
            };
        }
        Self::Failed(format!("{report:#}"))
    }

    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Self::Panicked(message)
    }

    pub fn title(&self) -> &str {
        match self {
            Self::UserFacing { title, .. } => title,
            Self::TimedOut(_) => "Timed out",
            Self::Failed(_) | Self::Panicked(_) => "Error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::UserFacing { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Error with a title and message meant to be shown as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{title}: {message}")]
pub struct UserFacingError {
    pub title: String,
    pub message: String,
}

impl UserFacingError {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// A local input check failed. Rendered inline next to the field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// An external program failed to start or exited unsuccessfully.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    #[error("failed to start {program}: {reason}")]
    Spawn { program: String, reason: String },
    #[error("{program} exited with status {}", exit_label(.code))]
    Exit { program: String, code: Option<i32> },
}

fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| c.to_string())
}
