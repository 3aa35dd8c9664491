//! Terminal input pump
//!
//! crossterm's reader blocks, so it runs on its own thread. Only the input
//! the reflection screen acts on crosses over: key presses, wheel scrolls
//! and resizes. Key releases and mouse motion stay on the thread.

use std::time::Duration;

use crossterm::event::{self, KeyEvent, KeyEventKind, MouseEventKind};
use eyre::Result;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Lines moved per mouse wheel notch
const WHEEL_LINES: isize = 3;

/// How often the reader thread checks whether the screen has closed
const READ_TIMEOUT: Duration = Duration::from_millis(250);

/// Input the reflection screen reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Key(KeyEvent),
    /// Lines to scroll the reflections pane; negative is up
    Scroll(isize),
    Resize(u16, u16),
}

impl Input {
    /// Map a raw terminal event; None for events the screen ignores
    pub fn from_terminal(evt: event::Event) -> Option<Self> {
        match evt {
            event::Event::Key(key) if key.kind == KeyEventKind::Press => Some(Self::Key(key)),
            event::Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => Some(Self::Scroll(-WHEEL_LINES)),
                MouseEventKind::ScrollDown => Some(Self::Scroll(WHEEL_LINES)),
                _ => None,
            },
            event::Event::Resize(w, h) => Some(Self::Resize(w, h)),
            _ => None,
        }
    }
}

/// Receives terminal input from the reader thread
pub struct InputPump {
    rx: mpsc::UnboundedReceiver<Input>,
}

impl InputPump {
    /// Start the reader thread; it exits once the pump is dropped
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || {
            while !tx.is_closed() {
                match event::poll(READ_TIMEOUT) {
                    Ok(false) => continue,
                    Ok(true) => {}
                    Err(e) => {
                        warn!(error = %e, "InputPump: poll failed, stopping reader");
                        break;
                    }
                }
                match event::read() {
                    Ok(evt) => {
                        if let Some(input) = Input::from_terminal(evt)
                            && tx.send(input).is_err()
                        {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "InputPump: read failed, stopping reader");
                        break;
                    }
                }
            }
            debug!("InputPump: reader thread exiting");
        });

        Self { rx }
    }

    /// Next input from the terminal
    pub async fn next(&mut self) -> Result<Input> {
        self.rx.recv().await.ok_or_else(|| eyre::eyre!("Terminal input closed"))
    }
}
