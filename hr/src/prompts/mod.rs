//! Prompt templates for the two reflection stages

pub mod embedded;
mod loader;

pub use loader::{INITIAL_SYSTEM, INITIAL_USER, PromptContext, PromptLoader, SECONDARY_SYSTEM, SECONDARY_USER};
