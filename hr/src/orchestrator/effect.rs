//! Effects requested by the session and the results fed back into it

use std::fmt;

use thiserror::Error;

use crate::input::ValidationError;
use crate::reflection::GenerationError;

/// Identifies one issued generation call
///
/// Tickets increase monotonically within a session; a completion is only
/// applied if its ticket is the one the session is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub(crate) u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which of the two generation calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Initial,
    Secondary,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Initial => write!(f, "initial"),
            Stage::Secondary => write!(f, "secondary"),
        }
    }
}

/// A generation call the session wants issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    GenerateInitial {
        ticket: Ticket,
        description: String,
    },
    GenerateSecondary {
        ticket: Ticket,
        description: String,
        initial: String,
    },
}

impl Effect {
    pub fn ticket(&self) -> Ticket {
        match self {
            Effect::GenerateInitial { ticket, .. } | Effect::GenerateSecondary { ticket, .. } => *ticket,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Effect::GenerateInitial { .. } => Stage::Initial,
            Effect::GenerateSecondary { .. } => Stage::Secondary,
        }
    }
}

/// Outcome of an issued call, tagged with its ticket
#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub stage: Stage,
    pub result: Result<String, GenerationError>,
}

/// Why `submit` or `advance` did not issue a call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("A reflection is already being prepared.")]
    Busy,

    #[error(transparent)]
    Blank(#[from] ValidationError),

    #[error("There is no reflection to continue from yet.")]
    NotReady,
}
