use async_trait::async_trait;
use color_eyre::Result;
use tracing::debug;

use super::{Command, CommandEnv};
use crate::message::AppMessage;

/// Ask the terminal for its current size and feed it back as a resize.
///
/// Views issue this from `init` so they can lay out before the first real
/// resize event arrives.
pub struct WindowSizeCmd;

#[async_trait]
impl Command for WindowSizeCmd {
    fn name(&self) -> String {
        "Querying window size".to_string()
    }

    async fn execute(self: Box<Self>, env: CommandEnv) -> Result<()> {
        match crossterm::terminal::size() {
            Ok((width, height)) => env.send(AppMessage::Resize { width, height }),
            Err(e) => debug!("Terminal size unavailable: {e}"),
        }
        Ok(())
    }
}
