//! Reflection session state machine
//!
//! Pure transitions: every method mutates the session and, when a network
//! call is needed, returns the [`Effect`] describing it. Nothing here does
//! I/O; the driver executes effects and feeds [`Completion`]s back.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::effect::{Completion, Effect, Rejected, Stage, Ticket};
use crate::input::{ValidationError, validate_description};

/// Wrapper phrase for a failed initial reflection
pub fn initial_failure_message(error: &str) -> String {
    format!(
        "A point for reflection: {} If the issue persists, remember the clarity you seek is always accessible.",
        error
    )
}

/// Wrapper phrase for a failed secondary reflection
pub fn secondary_failure_message(error: &str) -> String {
    format!("A point for reflection: {} The path to understanding is ever-present.", error)
}

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing requested yet, or the last submission was blank
    Idle,
    LoadingInitial,
    /// Initial reflection shown, secondary not requested
    Ready,
    LoadingSecondary,
    /// Both reflections shown
    Complete,
    /// A generation call failed
    Error,
}

impl Phase {
    pub fn is_loading(&self) -> bool {
        matches!(self, Phase::LoadingInitial | Phase::LoadingSecondary)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::LoadingInitial => "loading-initial",
            Phase::Ready => "ready",
            Phase::LoadingSecondary => "loading-secondary",
            Phase::Complete => "complete",
            Phase::Error => "error",
        }
    }
}

/// What the error banner is reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Initial,
    Secondary,
}

/// Text shown in the error region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub kind: ErrorKind,
    pub message: String,
}

/// A received reflection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reflection {
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl Reflection {
    fn now(text: String) -> Self {
        Self {
            text,
            received_at: Utc::now(),
        }
    }
}

/// In-memory state of one reflection session
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    lens: String,
    phase: Phase,
    description: String,
    initial: Option<Reflection>,
    secondary: Option<Reflection>,
    error: Option<ErrorBanner>,
    pending: Option<Ticket>,
    next_ticket: u64,
}

impl Session {
    pub fn new(lens: impl Into<String>) -> Self {
        let id = Uuid::now_v7();
        let lens = lens.into();
        debug!(%id, %lens, "Session::new: called");
        Self {
            id,
            lens,
            phase: Phase::Idle,
            description: String::new(),
            initial: None,
            secondary: None,
            error: None,
            pending: None,
            next_ticket: 1,
        }
    }

    // === Queries ===

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn lens(&self) -> &str {
        &self.lens
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The description behind the current reflections (trimmed)
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn initial(&self) -> Option<&Reflection> {
        self.initial.as_ref()
    }

    pub fn secondary(&self) -> Option<&Reflection> {
        self.secondary.as_ref()
    }

    pub fn initial_text(&self) -> Option<&str> {
        self.initial.as_ref().map(|r| r.text.as_str())
    }

    pub fn secondary_text(&self) -> Option<&str> {
        self.secondary.as_ref().map(|r| r.text.as_str())
    }

    pub fn error(&self) -> Option<&ErrorBanner> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    /// Ticket of the outstanding call, if any
    pub fn pending(&self) -> Option<Ticket> {
        self.pending
    }

    pub fn is_loading(&self) -> bool {
        self.phase.is_loading()
    }

    /// The "continue" affordance is offered only in `Ready`
    pub fn continue_visible(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Input is read-only while any request is outstanding
    pub fn input_enabled(&self) -> bool {
        !self.is_loading()
    }

    // === Transitions ===

    fn issue_ticket(&mut self) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.pending = Some(ticket);
        ticket
    }

    fn reset_responses(&mut self) {
        self.initial = None;
        self.secondary = None;
        self.error = None;
    }

    /// Submit a concern
    ///
    /// Rejected with `Busy` while a call is outstanding. A blank description
    /// clears the responses and returns to `Idle` with a validation error.
    /// Otherwise the previous responses are cleared and the initial call is
    /// issued.
    pub fn submit(&mut self, text: &str) -> Result<Effect, Rejected> {
        debug!(session = %self.id, phase = self.phase.label(), "submit: called");
        if self.is_loading() {
            debug!(session = %self.id, "submit: rejected, request outstanding");
            return Err(Rejected::Busy);
        }

        let description = match validate_description(text) {
            Ok(d) => d.to_string(),
            Err(e) => {
                self.record_validation_error(e);
                return Err(e.into());
            }
        };

        self.reset_responses();
        self.description = description.clone();
        self.phase = Phase::LoadingInitial;
        let ticket = self.issue_ticket();
        info!(session = %self.id, %ticket, "submit: requesting initial reflection");

        Ok(Effect::GenerateInitial { ticket, description })
    }

    /// Show the validation error for a blank submission
    ///
    /// Used when the input collector rejects the draft before the session
    /// sees it. Ignored while loading.
    pub fn record_validation_error(&mut self, error: ValidationError) {
        if self.is_loading() {
            return;
        }
        debug!(session = %self.id, "record_validation_error: called");
        self.reset_responses();
        self.phase = Phase::Idle;
        self.error = Some(ErrorBanner {
            kind: ErrorKind::Validation,
            message: error.to_string(),
        });
    }

    /// Request the secondary reflection
    ///
    /// Only valid in `Ready` with a non-empty description and initial
    /// reflection; anything else is rejected without changing state.
    pub fn advance(&mut self) -> Result<Effect, Rejected> {
        debug!(session = %self.id, phase = self.phase.label(), "advance: called");
        if self.is_loading() {
            return Err(Rejected::Busy);
        }
        if self.phase != Phase::Ready {
            return Err(Rejected::NotReady);
        }
        let initial = match self.initial_text() {
            Some(text) if !text.is_empty() && !self.description.is_empty() => text.to_string(),
            _ => {
                warn!(session = %self.id, "advance: ready without initial reflection");
                return Err(Rejected::NotReady);
            }
        };

        self.error = None;
        self.secondary = None;
        self.phase = Phase::LoadingSecondary;
        let ticket = self.issue_ticket();
        info!(session = %self.id, %ticket, lens = %self.lens, "advance: requesting secondary reflection");

        Ok(Effect::GenerateSecondary {
            ticket,
            description: self.description.clone(),
            initial,
        })
    }

    /// Apply the result of an issued call
    ///
    /// Returns false (state untouched) for completions whose ticket is not
    /// the outstanding one, e.g. a late result from a cancelled request.
    pub fn apply(&mut self, completion: Completion) -> bool {
        let Completion { ticket, stage, result } = completion;
        debug!(session = %self.id, %ticket, %stage, ok = result.is_ok(), "apply: called");

        if self.pending != Some(ticket) {
            debug!(session = %self.id, %ticket, pending = ?self.pending, "apply: stale completion discarded");
            return false;
        }
        let expected = match self.phase {
            Phase::LoadingInitial => Stage::Initial,
            Phase::LoadingSecondary => Stage::Secondary,
            _ => {
                warn!(session = %self.id, %ticket, phase = self.phase.label(), "apply: not loading");
                return false;
            }
        };
        if stage != expected {
            warn!(session = %self.id, %ticket, %stage, "apply: stage mismatch");
            return false;
        }

        self.pending = None;
        match (stage, result) {
            (Stage::Initial, Ok(text)) => {
                info!(session = %self.id, %ticket, "apply: initial reflection ready");
                self.initial = Some(Reflection::now(text));
                self.phase = Phase::Ready;
            }
            (Stage::Initial, Err(e)) => {
                warn!(session = %self.id, %ticket, error = %e, "apply: initial reflection failed");
                self.initial = None;
                self.secondary = None;
                self.error = Some(ErrorBanner {
                    kind: ErrorKind::Initial,
                    message: initial_failure_message(&e.to_string()),
                });
                self.phase = Phase::Error;
            }
            (Stage::Secondary, Ok(text)) => {
                info!(session = %self.id, %ticket, "apply: secondary reflection ready");
                self.secondary = Some(Reflection::now(text));
                self.phase = Phase::Complete;
            }
            (Stage::Secondary, Err(e)) => {
                warn!(session = %self.id, %ticket, error = %e, "apply: secondary reflection failed");
                self.error = Some(ErrorBanner {
                    kind: ErrorKind::Secondary,
                    message: secondary_failure_message(&e.to_string()),
                });
                self.phase = Phase::Error;
            }
        }
        true
    }

    /// Abandon the outstanding call
    ///
    /// `LoadingInitial` returns to `Idle`, `LoadingSecondary` to `Ready`.
    /// Returns the invalidated ticket, or `None` if nothing was outstanding.
    pub fn cancel(&mut self) -> Option<Ticket> {
        let ticket = self.pending?;
        match self.phase {
            Phase::LoadingInitial => self.phase = Phase::Idle,
            Phase::LoadingSecondary => self.phase = Phase::Ready,
            _ => {}
        }
        self.pending = None;
        info!(session = %self.id, %ticket, phase = self.phase.label(), "cancel: request abandoned");
        Some(ticket)
    }
}
