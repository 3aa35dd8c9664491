//! Healing Reflection - two-stage guidance for a personal concern
//!
//! A user describes a concern and receives an initial reflection from a
//! language model. On request, a secondary reflection reframes it through a
//! configured philosophical lens.
//!
//! # Modules
//!
//! - [`input`] - draft editing and description validation
//! - [`orchestrator`] - the session state machine and its async driver
//! - [`reflection`] - prompt rendering and generation calls
//! - [`llm`] - provider clients (Gemini, Anthropic)
//! - [`prompts`] - embedded and on-disk Handlebars templates
//! - [`tui`], [`repl`], [`ask`] - user surfaces
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod ask;
pub mod cli;
pub mod config;
pub mod input;
pub mod llm;
pub mod orchestrator;
pub mod prompts;
pub mod reflection;
pub mod repl;
pub mod tui;

pub use config::{Config, LlmConfig, ReflectionConfig};
pub use input::{InputCollector, InputError, ValidationError, validate_description};
pub use llm::{
    AnthropicClient, CompletionRequest, CompletionResponse, GeminiClient, LlmClient, LlmError, create_client,
};
pub use orchestrator::{Completion, Driver, Effect, Phase, Rejected, Session, Stage, Ticket};
pub use prompts::{PromptContext, PromptLoader};
pub use reflection::{GenerationError, Reflector};
