//! Prompt Loader
//!
//! Loads prompt templates from an override directory or falls back to
//! embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;

/// Template for each reflection stage
pub const INITIAL_SYSTEM: &str = "initial-system";
pub const INITIAL_USER: &str = "initial-user";
pub const SECONDARY_SYSTEM: &str = "secondary-system";
pub const SECONDARY_USER: &str = "secondary-user";

/// Context for rendering prompt templates
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext {
    /// The user's description of their concern
    pub description: String,
    /// The initial reflection (empty for the initial stage)
    pub initial: String,
    /// Philosophical lens for the secondary stage
    pub lens: String,
}

impl PromptContext {
    /// Context for the initial reflection
    pub fn initial(description: &str, lens: &str) -> Self {
        Self {
            description: description.to_string(),
            initial: String::new(),
            lens: lens.to_string(),
        }
    }

    /// Context for the secondary reflection
    pub fn secondary(description: &str, initial: &str, lens: &str) -> Self {
        Self {
            description: description.to_string(),
            initial: initial.to_string(),
            lens: lens.to_string(),
        }
    }
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// Override directory with `{name}.hbs` files
    override_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that checks `dir` before the embedded prompts
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            hbs: Self::engine(),
            override_dir: if dir.exists() { Some(dir.to_path_buf()) } else { None },
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        Self {
            hbs: Self::engine(),
            override_dir: None,
        }
    }

    /// Loader for an optional override directory
    pub fn from_dir(dir: Option<&Path>) -> Self {
        match dir {
            Some(d) => Self::new(d),
            None => Self::embedded_only(),
        }
    }

    /// Strict, non-escaping engine: prompts are plain text, not HTML
    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(true);
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks `{override_dir}/{name}.hbs` first, then the embedded fallback.
    fn load_template(&self, name: &str) -> Result<String> {
        if let Some(ref dir) = self.override_dir {
            let path = dir.join(format!("{}.hbs", name));
            if path.exists() {
                debug!("Loading prompt from override: {:?}", path);
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!("Using embedded prompt: {}", name);
            return Ok(content.to_string());
        }

        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render(&self, template_name: &str, context: &PromptContext) -> Result<String> {
        let template = self.load_template(template_name)?;
        debug!(template_name, lens = %context.lens, "render: called");

        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_initial_user() {
        let loader = PromptLoader::embedded_only();
        let ctx = PromptContext::initial("I feel anxious & tired", "Divine Law");

        let rendered = loader.render(INITIAL_USER, &ctx).unwrap();
        assert!(rendered.contains("I feel anxious & tired"));
    }

    #[test]
    fn test_render_secondary_includes_lens_and_initial() {
        let loader = PromptLoader::embedded_only();
        let ctx = PromptContext::secondary("I feel anxious", "Reflection A", "Stoicism");

        let system = loader.render(SECONDARY_SYSTEM, &ctx).unwrap();
        assert!(system.contains("Stoicism"));

        let user = loader.render(SECONDARY_USER, &ctx).unwrap();
        assert!(user.contains("I feel anxious"));
        assert!(user.contains("Reflection A"));
    }

    #[test]
    fn test_unknown_template() {
        let loader = PromptLoader::embedded_only();
        assert!(loader.load_template("nonexistent-template").is_err());
    }

    #[test]
    fn test_override_dir_takes_precedence() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("initial-user.hbs"), "Concern: {{description}}").unwrap();

        let loader = PromptLoader::new(dir.path());
        let ctx = PromptContext::initial("grief", "Divine Law");

        assert_eq!(loader.render(INITIAL_USER, &ctx).unwrap(), "Concern: grief");
        // Templates not overridden still come from the embedded set
        assert!(loader.render(INITIAL_SYSTEM, &ctx).unwrap().contains("compassionate"));
    }

    #[test]
    fn test_strict_mode_rejects_unknown_variable() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("initial-user.hbs"), "{{mood}}").unwrap();

        let loader = PromptLoader::new(dir.path());
        let ctx = PromptContext::initial("grief", "Divine Law");

        assert!(loader.render(INITIAL_USER, &ctx).is_err());
    }

    #[test]
    fn test_missing_dir_falls_back_to_embedded() {
        let loader = PromptLoader::from_dir(Some(Path::new("/nonexistent/hr/prompts")));
        let ctx = PromptContext::initial("grief", "Divine Law");
        assert!(loader.render(INITIAL_USER, &ctx).unwrap().contains("grief"));
    }
}
