//! Two-stage reflection orchestration
//!
//! - [`Session`] - the state machine (idle, loading-initial, ready,
//!   loading-secondary, complete, error) with pure transitions
//! - [`Effect`] / [`Completion`] - calls the session asks for and their results
//! - [`Driver`] - runs effects on tokio tasks and applies their completions

mod driver;
mod effect;
mod session;

pub use driver::Driver;
pub use effect::{Completion, Effect, Rejected, Stage, Ticket};
pub use session::{
    ErrorBanner, ErrorKind, Phase, Reflection, Session, initial_failure_message, secondary_failure_message,
};
