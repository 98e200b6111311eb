use async_trait::async_trait;
use color_eyre::Result;

use super::{Command, CommandEnv};
use crate::message::AppMessage;

/// Copy text to the system clipboard and report it with a toast.
pub struct CopyToClipboardCmd {
    text: String,
    label: String,
}

impl CopyToClipboardCmd {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

#[async_trait]
impl Command for CopyToClipboardCmd {
    fn name(&self) -> String {
        format!("Copying {}", self.label)
    }

    async fn execute(self: Box<Self>, env: CommandEnv) -> Result<()> {
        env.set_clipboard(&self.text)?;
        env.send(AppMessage::Done {
            text: format!("Copied {} to clipboard", self.label),
        });
        Ok(())
    }
}
