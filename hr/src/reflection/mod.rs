//! Text generation client for healing reflections
//!
//! [`Reflector`] turns a concern into an initial reflection and, on request,
//! a secondary reflection through the configured lens. Each call is a single
//! completion with no retries and no caching.

mod error;

pub use error::GenerationError;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ReflectionConfig;
use crate::llm::{CompletionRequest, LlmClient, Message, StopReason};
use crate::prompts::{
    INITIAL_SYSTEM, INITIAL_USER, PromptContext, PromptLoader, SECONDARY_SYSTEM, SECONDARY_USER,
};

/// Generates initial and secondary reflections
pub struct Reflector {
    llm: Arc<dyn LlmClient>,
    prompts: PromptLoader,
    lens: String,
    initial_max_tokens: u32,
    secondary_max_tokens: u32,
}

impl Reflector {
    /// Create a reflector from an LLM client and the reflection config
    pub fn new(llm: Arc<dyn LlmClient>, config: &ReflectionConfig) -> Self {
        let prompts_dir = config.expanded_prompts_dir();
        debug!(lens = %config.lens, ?prompts_dir, "Reflector::new: called");
        Self {
            llm,
            prompts: PromptLoader::from_dir(prompts_dir.as_deref()),
            lens: config.lens.clone(),
            initial_max_tokens: config.initial_max_tokens,
            secondary_max_tokens: config.secondary_max_tokens,
        }
    }

    /// Name of the philosophical lens used for secondary reflections
    pub fn lens(&self) -> &str {
        &self.lens
    }

    /// Provider/model label of the underlying client
    pub fn describe(&self) -> String {
        self.llm.describe()
    }

    /// Produce the initial reflection for a concern
    pub async fn generate_initial(&self, description: &str) -> Result<String, GenerationError> {
        debug!(description_len = description.len(), "generate_initial: called");
        let ctx = PromptContext::initial(description, &self.lens);
        let request = self.build_request(INITIAL_SYSTEM, INITIAL_USER, &ctx, self.initial_max_tokens)?;
        self.run(request, "initial").await
    }

    /// Produce the secondary reflection, reframing `initial_text` through the lens
    ///
    /// Both arguments are expected to be non-empty; the session checks this
    /// before issuing the call.
    pub async fn generate_secondary(&self, description: &str, initial_text: &str) -> Result<String, GenerationError> {
        debug!(
            description_len = description.len(),
            initial_len = initial_text.len(),
            "generate_secondary: called"
        );
        let ctx = PromptContext::secondary(description, initial_text, &self.lens);
        let request = self.build_request(SECONDARY_SYSTEM, SECONDARY_USER, &ctx, self.secondary_max_tokens)?;
        self.run(request, "secondary").await
    }

    fn build_request(
        &self,
        system_template: &str,
        user_template: &str,
        ctx: &PromptContext,
        max_tokens: u32,
    ) -> Result<CompletionRequest, GenerationError> {
        let render = |name: &str| {
            self.prompts
                .render(name, ctx)
                .map_err(|e| GenerationError::Prompt(e.to_string()))
        };

        Ok(CompletionRequest {
            system_prompt: render(system_template)?,
            messages: vec![Message::user(render(user_template)?)],
            max_tokens,
        })
    }

    async fn run(&self, request: CompletionRequest, stage: &str) -> Result<String, GenerationError> {
        let response = self.llm.complete(request).await.inspect_err(|e| {
            warn!(stage, status = ?e.status(), error = %e, "reflection request failed");
        })?;

        if response.stop_reason == StopReason::MaxTokens {
            warn!(stage, "reflection truncated at max tokens");
        }

        let text = response.content.as_deref().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            warn!(stage, stop_reason = ?response.stop_reason, "reflection came back empty");
            return Err(GenerationError::EmptyResponse);
        }

        info!(
            stage,
            chars = text.len(),
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "reflection received"
        );
        Ok(text.to_string())
    }
}
