//! Integration tests for Healing Reflection
//!
//! End-to-end sessions against a scripted LLM client, plus a few runs of
//! the `hr` binary that never reach the network.

use std::collections::VecDeque;
use std::fs;
use std::sync::{Arc, Mutex};

use assert_cmd::Command;
use async_trait::async_trait;
use healing_reflection::config::ReflectionConfig;
use healing_reflection::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, StopReason, TokenUsage};
use healing_reflection::orchestrator::{Driver, ErrorKind, Phase, Session};
use healing_reflection::reflection::Reflector;
use predicates::prelude::*;
use proptest::prelude::*;
use tempfile::TempDir;

const VALIDATION_MESSAGE: &str = "Please describe the concern you wish to explore.";

// =============================================================================
// Scripted client
// =============================================================================

/// Answers from a fixed script and records the user prompt of every call
struct ScriptedClient {
    script: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn new(script: Vec<Result<&str, &str>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn prompt(&self, index: usize) -> String {
        self.prompts.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let prompt = request.messages.last().map(|m| m.content.clone()).unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt);

        match self.script.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(CompletionResponse {
                content: Some(text),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            }),
            Some(Err(message)) => Err(LlmError::ApiError { status: 500, message }),
            None => Err(LlmError::InvalidResponse("script exhausted".to_string())),
        }
    }

    fn describe(&self) -> String {
        "scripted/test".to_string()
    }
}

fn driver_with(client: Arc<ScriptedClient>, lens: &str) -> Driver {
    let config = ReflectionConfig {
        lens: lens.to_string(),
        ..Default::default()
    };
    Driver::new(Arc::new(Reflector::new(client, &config)))
}

// =============================================================================
// Session flows
// =============================================================================

#[tokio::test]
async fn test_full_two_stage_session() {
    let client = ScriptedClient::new(vec![
        Ok("Anxiety often guards an old wound."),
        Ok("Under Divine Law, the wound becomes a guide."),
    ]);
    let mut driver = driver_with(client.clone(), "Divine Law");

    driver.submit("  I am experiencing persistent anxiety.  ").unwrap();
    assert_eq!(driver.session().phase(), Phase::LoadingInitial);
    assert!(driver.wait().await);

    assert_eq!(driver.session().phase(), Phase::Ready);
    assert!(driver.session().continue_visible());
    assert_eq!(driver.session().description(), "I am experiencing persistent anxiety.");
    assert!(client.prompt(0).contains("I am experiencing persistent anxiety."));

    driver.advance().unwrap();
    assert!(!driver.session().continue_visible());
    assert!(driver.wait().await);

    let session = driver.session();
    assert_eq!(session.phase(), Phase::Complete);
    assert_eq!(session.initial_text(), Some("Anxiety often guards an old wound."));
    assert_eq!(session.secondary_text(), Some("Under Divine Law, the wound becomes a guide."));

    // The secondary prompt carries the concern, the first reflection and the lens
    let secondary_prompt = client.prompt(1);
    assert!(secondary_prompt.contains("I am experiencing persistent anxiety."));
    assert!(secondary_prompt.contains("Anxiety often guards an old wound."));
    assert!(secondary_prompt.contains("Divine Law"));
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn test_blank_submission_makes_no_call() {
    let client = ScriptedClient::new(vec![]);
    let mut driver = driver_with(client.clone(), "Divine Law");

    assert!(driver.submit(" \t\n").is_err());

    let session = driver.session();
    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(session.error_message(), Some(VALIDATION_MESSAGE));
    assert!(session.initial().is_none());
    assert_eq!(client.calls(), 0);
    assert_eq!(driver.calls_issued(), 0);
}

#[tokio::test]
async fn test_initial_failure_then_recovery() {
    let client = ScriptedClient::new(vec![Err("upstream unavailable"), Ok("A gentler view.")]);
    let mut driver = driver_with(client.clone(), "Divine Law");

    driver.submit("grief").unwrap();
    driver.wait().await;

    let error = driver.session().error().unwrap();
    assert_eq!(error.kind, ErrorKind::Initial);
    assert!(error.message.starts_with("A point for reflection:"));
    assert!(error.message.contains("upstream unavailable"));
    assert!(error.message.ends_with("remember the clarity you seek is always accessible."));
    assert!(!driver.session().continue_visible());

    driver.submit("grief").unwrap();
    driver.wait().await;
    assert_eq!(driver.session().phase(), Phase::Ready);
    assert!(driver.session().error().is_none());
}

#[tokio::test]
async fn test_secondary_failure_keeps_initial() {
    let client = ScriptedClient::new(vec![Ok("First light."), Err("quota exceeded")]);
    let mut driver = driver_with(client, "Stoic Virtue");

    driver.submit("I cannot let go of anger").unwrap();
    driver.wait().await;
    driver.advance().unwrap();
    driver.wait().await;

    let session = driver.session();
    assert_eq!(session.phase(), Phase::Error);
    assert_eq!(session.initial_text(), Some("First light."));
    assert!(session.secondary().is_none());
    let message = session.error_message().unwrap();
    assert!(message.contains("quota exceeded"));
    assert!(message.ends_with("The path to understanding is ever-present."));
}

#[tokio::test]
async fn test_resubmit_replaces_previous_reflections() {
    let client = ScriptedClient::new(vec![Ok("One."), Ok("Two."), Ok("Three.")]);
    let mut driver = driver_with(client, "Divine Law");

    driver.submit("first concern").unwrap();
    driver.wait().await;
    driver.advance().unwrap();
    driver.wait().await;
    assert_eq!(driver.session().phase(), Phase::Complete);

    driver.submit("second concern").unwrap();
    assert!(driver.session().initial().is_none());
    assert!(driver.session().secondary().is_none());
    driver.wait().await;

    assert_eq!(driver.session().initial_text(), Some("Three."));
    assert!(driver.session().secondary().is_none());
    assert_eq!(driver.session().description(), "second concern");
}

#[tokio::test]
async fn test_cancel_initial_returns_to_idle() {
    let client = ScriptedClient::new(vec![Ok("Too late.")]);
    let mut driver = driver_with(client, "Divine Law");

    driver.submit("fear").unwrap();
    assert!(driver.cancel().is_some());
    assert_eq!(driver.session().phase(), Phase::Idle);

    // Nothing outstanding, so nothing is applied
    assert!(!driver.wait().await);
    assert!(driver.session().initial().is_none());
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn blank_input_never_issues_a_call(text in "[ \t\r\n]{0,16}") {
        let mut session = Session::new("Divine Law");
        prop_assert!(session.submit(&text).is_err());
        prop_assert_eq!(session.phase(), Phase::Idle);
        prop_assert!(session.pending().is_none());
        prop_assert_eq!(session.error_message(), Some(VALIDATION_MESSAGE));
    }

    #[test]
    fn submitted_description_is_trimmed(
        pad_left in "[ \t]{0,4}",
        body in "[a-z][a-z ]{0,30}[a-z]",
        pad_right in "[ \n]{0,4}",
    ) {
        let mut session = Session::new("Divine Law");
        let text = format!("{}{}{}", pad_left, body, pad_right);
        prop_assert!(session.submit(&text).is_ok());
        prop_assert_eq!(session.description(), body.as_str());
        prop_assert!(session.is_loading());
        prop_assert!(!session.input_enabled());
    }
}

// =============================================================================
// Binary
// =============================================================================

fn hr_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hr").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("XDG_DATA_HOME", home.path().join(".local/share"))
        .env_remove("GEMINI_API_KEY")
        .env_remove("ANTHROPIC_API_KEY");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    hr_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("repl"));
}

#[test]
fn test_ask_blank_fails_with_validation_message() {
    let home = TempDir::new().unwrap();
    hr_cmd(&home)
        .args(["ask", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains(VALIDATION_MESSAGE));
}

#[test]
fn test_ask_without_api_key_names_the_variable() {
    let home = TempDir::new().unwrap();
    hr_cmd(&home)
        .args(["ask", "I feel anxious"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn test_config_reads_local_file() {
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join(".healing-reflection.yml"),
        "llm:\n  provider: anthropic\nreflection:\n  lens: Stoic Virtue\n",
    )
    .unwrap();

    hr_cmd(&home)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stoic Virtue"))
        .stdout(predicate::str::contains("provider=anthropic"))
        .stdout(predicate::str::contains("ANTHROPIC_API_KEY"));
}
