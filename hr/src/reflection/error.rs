//! Reflection error types

use thiserror::Error;

use crate::llm::LlmError;

/// Failure from either generation call
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Upstream error, surfaced unmodified
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("The reflection came back empty.")]
    EmptyResponse,

    #[error("Prompt template error: {0}")]
    Prompt(String),

    /// The generation task ended without producing a result
    #[error("The reflection could not be completed ({0}).")]
    TaskFailed(String),
}
