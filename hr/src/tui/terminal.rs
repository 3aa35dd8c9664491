//! Terminal session: raw mode on the alternate screen, restored on drop

use std::io::{self, Stdout};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use eyre::Result;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, warn};

use super::app::App;
use super::views;

/// The terminal while the reflection screen owns it
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    /// Switch to raw mode and the alternate screen
    pub fn enter() -> Result<Self> {
        debug!("TerminalSession::enter: called");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }

    pub fn draw(&mut self, app: &mut App) -> Result<()> {
        self.terminal.draw(|frame| views::render(app, frame))?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        debug!("TerminalSession::drop: restoring terminal");
        if let Err(e) = disable_raw_mode() {
            warn!(error = %e, "TerminalSession::drop: failed to leave raw mode");
        }
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture);
        let _ = self.terminal.show_cursor();
    }
}
