//! Driver - executes session effects as tokio tasks
//!
//! The driver is the only owner of the [`Session`]. Generation calls run on
//! spawned tasks and report back over an unbounded channel; the session's
//! ticket check drops anything that arrives after a cancel. A task that dies
//! without reporting fails its call instead of leaving the session loading.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

use super::effect::{Completion, Effect, Rejected, Stage, Ticket};
use super::session::Session;
use crate::input::ValidationError;
use crate::reflection::{GenerationError, Reflector};

/// The spawned call the session is waiting on
struct Outstanding {
    ticket: Ticket,
    stage: Stage,
    handle: JoinHandle<()>,
}

/// What woke `next_completion`
enum Wake {
    Sent(Completion),
    Joined(Result<(), JoinError>),
}

/// Owns a session and runs its generation calls
pub struct Driver {
    session: Session,
    reflector: Arc<Reflector>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    task: Option<Outstanding>,
    calls_issued: usize,
}

impl Driver {
    pub fn new(reflector: Arc<Reflector>) -> Self {
        let session = Session::new(reflector.lens());
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session,
            reflector,
            tx,
            rx,
            task: None,
            calls_issued: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn reflector(&self) -> &Reflector {
        &self.reflector
    }

    /// Number of generation calls issued so far
    pub fn calls_issued(&self) -> usize {
        self.calls_issued
    }

    /// True while a spawned call has not been applied or abandoned
    pub fn has_outstanding(&self) -> bool {
        self.task.is_some()
    }

    /// Submit a concern; spawns the initial call on success
    pub fn submit(&mut self, text: &str) -> Result<Ticket, Rejected> {
        let effect = self.session.submit(text)?;
        Ok(self.spawn(effect))
    }

    /// Show a validation error coming from the input collector
    pub fn record_validation_error(&mut self, error: ValidationError) {
        self.session.record_validation_error(error);
    }

    /// Continue to the secondary reflection
    pub fn advance(&mut self) -> Result<Ticket, Rejected> {
        let effect = self.session.advance()?;
        Ok(self.spawn(effect))
    }

    /// Abandon the outstanding call and abort its task
    pub fn cancel(&mut self) -> Option<Ticket> {
        let ticket = self.session.cancel()?;
        if let Some(task) = self.task.take() {
            debug!(ticket = %task.ticket, "cancel: aborting task");
            task.handle.abort();
        }
        Some(ticket)
    }

    fn spawn(&mut self, effect: Effect) -> Ticket {
        let ticket = effect.ticket();
        let stage = effect.stage();
        debug!(%ticket, %stage, "spawn: called");

        let reflector = Arc::clone(&self.reflector);
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let result = match &effect {
                Effect::GenerateInitial { description, .. } => reflector.generate_initial(description).await,
                Effect::GenerateSecondary {
                    description, initial, ..
                } => reflector.generate_secondary(description, initial).await,
            };
            // Receiver lives as long as the driver; a send error means it is gone
            let _ = tx.send(Completion { ticket, stage, result });
        });

        self.task = Some(Outstanding { ticket, stage, handle });
        self.calls_issued += 1;
        ticket
    }

    fn apply(&mut self, completion: Completion) -> bool {
        let ticket = completion.ticket;
        let applied = self.session.apply(completion);
        if applied && self.task.as_ref().is_some_and(|t| t.ticket == ticket) {
            self.task = None;
        }
        applied
    }

    /// Wait for the outstanding call and apply its result
    ///
    /// Completions left over from abandoned calls are discarded on the way.
    /// Never resolves while nothing is outstanding, so it can sit in a
    /// `select!` next to terminal input.
    pub async fn next_completion(&mut self) -> bool {
        loop {
            let Some(task) = self.task.as_mut() else {
                return std::future::pending().await;
            };

            let wake = tokio::select! {
                Some(completion) = self.rx.recv() => Wake::Sent(completion),
                joined = &mut task.handle => Wake::Joined(joined),
            };

            match wake {
                Wake::Sent(completion) => {
                    if self.apply(completion) {
                        return true;
                    }
                }
                Wake::Joined(joined) => return self.finish(joined),
            }
        }
    }

    /// The task exited; apply whatever it sent, or fail the call if it sent nothing
    fn finish(&mut self, joined: Result<(), JoinError>) -> bool {
        let Some(task) = self.task.take() else {
            return false;
        };

        // A task that returns normally has already queued its completion
        let mut changed = false;
        while let Ok(completion) = self.rx.try_recv() {
            changed |= self.apply(completion);
        }

        if self.session.pending() == Some(task.ticket) {
            let reason = match joined {
                Err(e) => e.to_string(),
                Ok(()) => "no result was sent".to_string(),
            };
            warn!(ticket = %task.ticket, stage = %task.stage, %reason, "finish: generation task failed");
            changed |= self.session.apply(Completion {
                ticket: task.ticket,
                stage: task.stage,
                result: Err(GenerationError::TaskFailed(reason)),
            });
        }
        changed
    }

    /// Wait for the outstanding call to finish and apply it
    ///
    /// Returns false immediately if nothing is outstanding.
    pub async fn wait(&mut self) -> bool {
        if !self.has_outstanding() {
            return false;
        }
        self.next_completion().await
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.handle.abort();
        }
    }
}
