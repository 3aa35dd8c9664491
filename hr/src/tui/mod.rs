//! Terminal User Interface
//!
//! Single-screen view of a reflection session: the concern input, the
//! error banner, and the initial and secondary reflections.

mod app;
mod events;
mod runner;
mod terminal;
mod views;

pub use app::App;
pub use events::{Input, InputPump};
pub use runner::TuiRunner;
pub use terminal::TerminalSession;

use eyre::Result;

use crate::orchestrator::Driver;

/// Run the TUI until the user quits
///
/// The terminal is restored and any call still in flight is aborted when
/// the runner is dropped, including on an early error.
pub async fn run(driver: Driver) -> Result<()> {
    let terminal = TerminalSession::enter()?;
    let mut runner = TuiRunner::new(terminal, driver);
    runner.run().await
}
