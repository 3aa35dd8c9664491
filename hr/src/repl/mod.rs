//! Line-oriented REPL for healing reflections
//!
//! Each input line is a concern; slash commands continue, show or cancel
//! the current reflection.

mod session;

pub use session::{ReplCommand, ReplSession, SlashResult};

use eyre::Result;

use crate::orchestrator::Driver;

/// Run the interactive REPL
///
/// This is the main entry point for `hr repl`.
pub async fn run_interactive(driver: Driver, initial: Option<String>) -> Result<()> {
    let mut session = ReplSession::new(driver);
    session.run(initial).await
}
