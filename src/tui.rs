//! Terminal setup and the input task.
//!
//! [`Tui`] owns the ratatui terminal plus a background task that turns
//! crossterm events and two timers (tick and render) into [`Event`]s. The
//! task is stopped whenever the terminal is released, for a suspend or an
//! external program, and restarted on resume.

use std::io::Stdout;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

use crossterm::cursor;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, Event as CrosstermEvent, EventStream, KeyCode,
    KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use futures::{FutureExt, StreamExt};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::config::UiConfig;

/// After this the input task is aborted, after twice this we give up.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

pub type Backend = CrosstermBackend<Stdout>;

/// Input from the terminal and its timers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The input task started
    Init,
    /// Interrupt key or SIGTERM
    Quit,
    Error(String),
    Tick,
    Render,
    Key(KeyEvent),
    Resize(u16, u16),
}

/// Map a crossterm event onto a loop event. `None` means drop it.
fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind != KeyEventKind::Press => None,
        CrosstermEvent::Key(key)
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') =>
        {
            Some(Event::Quit)
        }
        CrosstermEvent::Key(key) => Some(Event::Key(key)),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        CrosstermEvent::Mouse(_)
        | CrosstermEvent::FocusGained
        | CrosstermEvent::FocusLost
        | CrosstermEvent::Paste(_) => None,
    }
}

pub struct Tui {
    terminal: Terminal<Backend>,
    task: Option<JoinHandle<()>>,
    token: CancellationToken,
    event_rx: UnboundedReceiver<Event>,
    event_tx: UnboundedSender<Event>,
    tick: Duration,
    frame: Duration,
}

impl Tui {
    pub fn new(ui: &UiConfig) -> color_eyre::Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Ok(Self {
            terminal: Terminal::new(Backend::new(std::io::stdout()))?,
            task: None,
            token: CancellationToken::new(),
            event_rx,
            event_tx,
            tick: Duration::from_secs_f64(1.0 / ui.tick_rate.max(0.1)),
            frame: Duration::from_secs_f64(1.0 / ui.frame_rate.max(0.1)),
        })
    }

    /// Take over the terminal: raw mode, alternate screen, input task.
    pub fn enter(&mut self) -> color_eyre::Result<()> {
        crossterm::terminal::enable_raw_mode()?;
        crossterm::execute!(
            std::io::stdout(),
            EnterAlternateScreen,
            cursor::Hide,
            EnableBracketedPaste
        )?;
        self.start();
        Ok(())
    }

    /// Give the terminal back in the state we found it.
    pub fn exit(&mut self) -> color_eyre::Result<()> {
        self.stop()?;
        if crossterm::terminal::is_raw_mode_enabled()? {
            self.flush()?;
            crossterm::execute!(
                std::io::stdout(),
                DisableBracketedPaste,
                LeaveAlternateScreen,
                cursor::Show
            )?;
            crossterm::terminal::disable_raw_mode()?;
        }
        Ok(())
    }

    /// Release the terminal and stop the process (Ctrl+Z).
    pub fn suspend(&mut self) -> color_eyre::Result<()> {
        self.exit()?;
        #[cfg(not(windows))]
        signal_hook::low_level::raise(signal_hook::consts::SIGTSTP)?;
        Ok(())
    }

    /// Take the terminal back after a suspend or an external program.
    pub fn resume(&mut self) -> color_eyre::Result<()> {
        self.enter()?;
        self.clear()?;
        Ok(())
    }

    pub async fn next_event(&mut self) -> Option<Event> {
        self.event_rx.recv().await
    }

    fn start(&mut self) {
        self.token.cancel();
        self.token = CancellationToken::new();
        self.task = Some(tokio::spawn(input_task(
            self.event_tx.clone(),
            self.token.clone(),
            self.tick,
            self.frame,
        )));
    }

    fn stop(&mut self) -> color_eyre::Result<()> {
        self.token.cancel();
        let Some(task) = self.task.take() else {
            return Ok(());
        };

        // Called from sync code paths (Drop), so poll instead of awaiting
        let mut waited = Duration::ZERO;
        while !task.is_finished() {
            std::thread::sleep(Duration::from_millis(1));
            waited += Duration::from_millis(1);
            if waited == SHUTDOWN_GRACE {
                warn!("Input task did not stop in time, aborting it");
                task.abort();
            }
            if waited >= SHUTDOWN_GRACE * 2 {
                return Err(color_eyre::eyre::eyre!("Failed to stop the input task"));
            }
        }
        Ok(())
    }
}

async fn input_task(
    event_tx: UnboundedSender<Event>,
    token: CancellationToken,
    tick: Duration,
    frame: Duration,
) {
    let mut events = EventStream::new();
    let mut tick_interval = interval(tick);
    let mut frame_interval = interval(frame);

    #[cfg(unix)]
    tokio::spawn(forward_sigterm(event_tx.clone(), token.clone()));

    if event_tx.send(Event::Init).is_err() {
        return;
    }

    loop {
        let event = tokio::select! {
            () = token.cancelled() => break,
            _ = tick_interval.tick() => Event::Tick,
            _ = frame_interval.tick() => Event::Render,
            next = events.next().fuse() => match next {
                Some(Ok(event)) => match translate(event) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(e)) => Event::Error(e.to_string()),
                None => break,
            },
        };
        if event_tx.send(event).is_err() {
            break;
        }
    }
    debug!("Input task stopped");
    token.cancel();
}

/// SIGTERM quits like the interrupt key.
#[cfg(unix)]
async fn forward_sigterm(event_tx: UnboundedSender<Event>, token: CancellationToken) {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(signal) => signal,
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {e}");
            return;
        }
    };
    tokio::select! {
        () = token.cancelled() => {}
        _ = sigterm.recv() => {
            let _ = event_tx.send(Event::Quit);
        }
    }
}

impl Deref for Tui {
    type Target = Terminal<Backend>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Tui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.exit() {
            error!("Failed to restore terminal: {e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventState;

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> CrosstermEvent {
        CrosstermEvent::Key(KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn test_interrupt_key_quits() {
        let event = key(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press);
        assert_eq!(translate(event), Some(Event::Quit));
    }

    #[test]
    fn test_only_presses_are_forwarded() {
        let release = key(KeyCode::Char('q'), KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(translate(release), None);

        let press = key(KeyCode::Char('q'), KeyModifiers::NONE, KeyEventKind::Press);
        assert!(matches!(translate(press), Some(Event::Key(k)) if k.code == KeyCode::Char('q')));
    }

    #[test]
    fn test_resize_and_focus() {
        assert_eq!(
            translate(CrosstermEvent::Resize(120, 40)),
            Some(Event::Resize(120, 40))
        );
        assert_eq!(translate(CrosstermEvent::FocusLost), None);
    }
}
