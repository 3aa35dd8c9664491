//! Configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the project-local config file
pub const LOCAL_CONFIG_FILE: &str = ".healing-reflection.yml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Reflection prompts and lens
    pub reflection: ReflectionConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// An explicit path must load; the local and user config files are
    /// skipped with a warning if they fail to parse.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        if let Some(user_config) = Self::user_config_path()
            && user_config.exists()
        {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// `~/.config/healing-reflection/healing-reflection.yml`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("healing-reflection").join("healing-reflection.yml"))
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Render the effective configuration as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }
}

/// LLM provider configuration
///
/// Fields left unset fall back to the selected provider's defaults when
/// [`LlmConfig::resolve`] is called.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("gemini" or "anthropic")
    pub provider: String,

    /// Model identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env", skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// API base URL
    #[serde(rename = "base-url", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: None,
            api_key_env: None,
            base_url: None,
            max_tokens: 4096,
            timeout_ms: 120_000,
        }
    }
}

/// Per-provider defaults: (model, api key env var, base url)
fn provider_defaults(provider: &str) -> Option<(&'static str, &'static str, &'static str)> {
    match provider {
        "gemini" => Some((
            "gemini-2.5-flash",
            "GEMINI_API_KEY",
            "https://generativelanguage.googleapis.com",
        )),
        "anthropic" => Some(("claude-sonnet-4-20250514", "ANTHROPIC_API_KEY", "https://api.anthropic.com")),
        _ => None,
    }
}

impl LlmConfig {
    /// Fill unset fields from the provider defaults
    pub fn resolve(&self) -> Result<ResolvedLlmConfig> {
        debug!(provider = %self.provider, "resolve: called");
        let (model, api_key_env, base_url) = provider_defaults(&self.provider).ok_or_else(|| {
            eyre::eyre!(
                "Unknown LLM provider: '{}'. Supported: gemini, anthropic",
                self.provider
            )
        })?;

        Ok(ResolvedLlmConfig {
            provider: self.provider.clone(),
            model: self.model.clone().unwrap_or_else(|| model.to_string()),
            api_key_env: self.api_key_env.clone().unwrap_or_else(|| api_key_env.to_string()),
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| base_url.to_string())
                .trim_end_matches('/')
                .to_string(),
            max_tokens: self.max_tokens,
            timeout_ms: self.timeout_ms,
        })
    }
}

/// LLM configuration with every field decided
#[derive(Debug, Clone)]
pub struct ResolvedLlmConfig {
    pub provider: String,
    pub model: String,
    pub api_key_env: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub timeout_ms: u64,
}

impl ResolvedLlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.api_key_env
            )),
        }
    }
}

/// Reflection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionConfig {
    /// Philosophical lens named in the secondary reflection
    pub lens: String,

    /// Directory with `.hbs` prompt overrides
    #[serde(rename = "prompts-dir", skip_serializing_if = "Option::is_none")]
    pub prompts_dir: Option<PathBuf>,

    /// Token cap for the initial reflection
    #[serde(rename = "initial-max-tokens")]
    pub initial_max_tokens: u32,

    /// Token cap for the secondary reflection
    #[serde(rename = "secondary-max-tokens")]
    pub secondary_max_tokens: u32,
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        Self {
            lens: "Divine Law".to_string(),
            prompts_dir: None,
            initial_max_tokens: 2048,
            secondary_max_tokens: 2048,
        }
    }
}

impl ReflectionConfig {
    /// Expand a leading `~/` in the prompts directory
    pub fn expanded_prompts_dir(&self) -> Option<PathBuf> {
        self.prompts_dir.as_ref().map(|p| match p.strip_prefix("~") {
            Ok(rest) => dirs::home_dir().map(|home| home.join(rest)).unwrap_or_else(|| p.clone()),
            Err(_) => p.clone(),
        })
    }
}
