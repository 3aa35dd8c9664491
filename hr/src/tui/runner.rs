//! TUI Runner - main loop that owns the terminal
//!
//! Redraws after every terminal input, every applied reflection and every
//! spinner step. The spinner only ticks while a call is outstanding.

use std::time::Duration;

use eyre::Result;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::app::App;
use super::events::{Input, InputPump};
use super::terminal::TerminalSession;
use crate::orchestrator::Driver;

/// Spinner frame interval while loading
const SPINNER_INTERVAL: Duration = Duration::from_millis(100);

/// TUI Runner that manages the terminal and event loop
pub struct TuiRunner {
    app: App,
    terminal: TerminalSession,
    input: InputPump,
}

impl TuiRunner {
    pub fn new(terminal: TerminalSession, driver: Driver) -> Self {
        debug!("TuiRunner::new: called");
        Self {
            app: App::new(driver),
            terminal,
            input: InputPump::spawn(),
        }
    }

    /// Run the main loop until the user quits
    pub async fn run(&mut self) -> Result<()> {
        debug!("TuiRunner::run: entering main loop");
        let mut spinner = tokio::time::interval(SPINNER_INTERVAL);
        spinner.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            self.terminal.draw(&mut self.app)?;

            tokio::select! {
                input = self.input.next() => match input? {
                    Input::Key(key) => {
                        if self.app.handle_key(key) {
                            break;
                        }
                    }
                    Input::Scroll(lines) => self.app.scroll_by(lines),
                    Input::Resize(width, height) => debug!(width, height, "TuiRunner::run: resize"),
                },
                applied = self.app.next_completion() => {
                    debug!(applied, phase = self.app.session().phase().label(), "TuiRunner::run: completion");
                }
                _ = spinner.tick(), if self.app.session().is_loading() => self.app.advance_spinner(),
            }

            if self.app.should_quit() {
                break;
            }
        }

        debug!("TuiRunner::run: exiting");
        Ok(())
    }
}
