//! One-shot reflection for `hr ask`

use colored::Colorize;
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::OutputFormat;
use crate::orchestrator::{Driver, Phase};

/// Outcome of a one-shot session
#[derive(Debug, Clone, Serialize)]
pub struct AskReport {
    pub session: String,
    pub lens: String,
    pub model: String,
    pub description: String,
    pub phase: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AskReport {
    fn from_driver(driver: &Driver) -> Self {
        let session = driver.session();
        Self {
            session: session.id().to_string(),
            lens: session.lens().to_string(),
            model: driver.reflector().describe(),
            description: session.description().to_string(),
            phase: session.phase().label(),
            initial: session.initial_text().map(str::to_string),
            secondary: session.secondary_text().map(str::to_string),
            error: session.error_message().map(str::to_string),
        }
    }

    /// Render for stdout; errors are left to the caller
    pub fn render(&self, format: OutputFormat) -> eyre::Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Text => {
                let mut out = String::new();
                if let Some(initial) = &self.initial {
                    out.push_str(&format!("{}\n{}\n", "Your Reflection".bright_blue().bold(), initial));
                }
                if let Some(secondary) = &self.secondary {
                    out.push_str(&format!(
                        "\n{}\n{}\n",
                        format!("Through the Lens of {}", self.lens).yellow().bold(),
                        secondary
                    ));
                }
                Ok(out)
            }
        }
    }
}

/// Run the initial reflection and, if asked, the secondary one
///
/// The secondary call is only made when the initial one succeeded.
pub async fn run(mut driver: Driver, description: &str, continue_: bool) -> AskReport {
    debug!(continue_, "ask::run: called");

    if let Err(e) = driver.submit(description) {
        debug!(error = %e, "ask::run: submit rejected");
        return AskReport::from_driver(&driver);
    }
    driver.wait().await;

    if continue_ && driver.session().phase() == Phase::Ready && driver.advance().is_ok() {
        driver.wait().await;
    }

    let report = AskReport::from_driver(&driver);
    info!(phase = report.phase, "ask::run: finished");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::ReflectionConfig;
    use crate::llm::LlmError;
    use crate::llm::client::mock::MockLlmClient;
    use crate::reflection::Reflector;

    fn driver(mock: Arc<MockLlmClient>) -> Driver {
        Driver::new(Arc::new(Reflector::new(mock, &ReflectionConfig::default())))
    }

    #[tokio::test]
    async fn test_ask_initial_only() {
        let mock = Arc::new(MockLlmClient::with_texts(&["Be gentle with yourself."]));
        let report = run(driver(mock.clone()), "I feel anxious", false).await;

        assert_eq!(report.phase, "ready");
        assert_eq!(report.initial.as_deref(), Some("Be gentle with yourself."));
        assert!(report.secondary.is_none());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_ask_with_continue() {
        let mock = Arc::new(MockLlmClient::with_texts(&["Initial.", "Secondary."]));
        let report = run(driver(mock.clone()), "grief", true).await;

        assert_eq!(report.phase, "complete");
        assert_eq!(report.secondary.as_deref(), Some("Secondary."));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_ask_initial_failure_skips_secondary() {
        let mock = Arc::new(MockLlmClient::new(vec![Err(LlmError::InvalidResponse("bad".to_string()))]));
        let report = run(driver(mock.clone()), "grief", true).await;

        assert_eq!(report.phase, "error");
        assert!(report.error.unwrap().starts_with("A point for reflection:"));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_ask_blank_makes_no_call() {
        let mock = Arc::new(MockLlmClient::new(vec![]));
        let report = run(driver(mock.clone()), "  \n ", false).await;

        assert_eq!(report.phase, "idle");
        assert_eq!(
            report.error.as_deref(),
            Some("Please describe the concern you wish to explore.")
        );
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_render_json() {
        let mock = Arc::new(MockLlmClient::with_texts(&["Initial."]));
        let report = run(driver(mock), "grief", false).await;

        let json: serde_json::Value = serde_json::from_str(&report.render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["phase"], "ready");
        assert_eq!(json["initial"], "Initial.");
        assert_eq!(json["lens"], "Divine Law");
        assert!(json.get("secondary").is_none());
    }
}
