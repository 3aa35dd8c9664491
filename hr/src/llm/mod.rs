//! LLM client module
//!
//! Provider-agnostic completion requests with Gemini and Anthropic backends.

use std::sync::Arc;

use tracing::debug;

mod anthropic;
pub mod client;
mod error;
mod gemini;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use error::LlmError;
pub use gemini::GeminiClient;
pub use types::{CompletionRequest, CompletionResponse, Message, Role, StopReason, TokenUsage};

use crate::config::{LlmConfig, ResolvedLlmConfig};

/// Create an LLM client based on the provider specified in config
///
/// Resolves provider defaults first. Supports "gemini" and "anthropic".
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    let resolved = config.resolve().map_err(|e| LlmError::Config(e.to_string()))?;

    create_client_from_resolved(&resolved)
}

/// Create an LLM client from a resolved configuration
pub fn create_client_from_resolved(config: &ResolvedLlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client_from_resolved: called");
    match config.provider.as_str() {
        "gemini" => {
            debug!("create_client_from_resolved: creating Gemini client");
            Ok(Arc::new(GeminiClient::from_config(config)?))
        }
        "anthropic" => {
            debug!("create_client_from_resolved: creating Anthropic client");
            Ok(Arc::new(AnthropicClient::from_config(config)?))
        }
        other => {
            debug!(provider = %other, "create_client_from_resolved: unknown provider");
            Err(LlmError::Config(format!(
                "Unknown LLM provider: '{}'. Supported: gemini, anthropic",
                other
            )))
        }
    }
}
