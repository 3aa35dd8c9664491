//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// LLM client trait - abstracts provider-specific APIs
///
/// Each completion request is independent: no conversation state is kept
/// between calls, and each call issues exactly one outbound request.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Short provider/model label for logs and the TUI header
    fn describe(&self) -> String;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tracing::debug;

    use crate::llm::{StopReason, TokenUsage};

    /// Mock LLM client for unit tests
    ///
    /// Replies are consumed in order; every request is recorded.
    pub struct MockLlmClient {
        replies: Mutex<VecDeque<Result<CompletionResponse, LlmError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
        call_count: AtomicUsize,
        delay: Option<Duration>,
    }

    impl MockLlmClient {
        pub fn new(replies: Vec<Result<CompletionResponse, LlmError>>) -> Self {
            debug!(reply_count = %replies.len(), "MockLlmClient::new: called");
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
                call_count: AtomicUsize::new(0),
                delay: None,
            }
        }

        /// Convenience: successful text replies
        pub fn with_texts(texts: &[&str]) -> Self {
            Self::new(texts.iter().map(|t| Ok(text_response(t))).collect())
        }

        /// Sleep before answering each request
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().map(|r| r.clone()).unwrap_or_default()
        }
    }

    /// A plain text completion response
    pub fn text_response(text: &str) -> CompletionResponse {
        CompletionResponse {
            content: Some(text.to_string()),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            debug!("MockLlmClient::complete: called");
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request);
            }
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let reply = self.replies.lock().ok().and_then(|mut r| r.pop_front());
            reply.unwrap_or_else(|| Err(LlmError::InvalidResponse("No more mock responses".to_string())))
        }

        fn describe(&self) -> String {
            "mock".to_string()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::llm::Message;

        fn request() -> CompletionRequest {
            CompletionRequest {
                system_prompt: "Test".to_string(),
                messages: vec![Message::user("hi")],
                max_tokens: 1000,
            }
        }

        #[tokio::test]
        async fn test_mock_client_returns_responses() {
            let client = MockLlmClient::with_texts(&["Response 1", "Response 2"]);

            let resp1 = client.complete(request()).await.unwrap();
            assert_eq!(resp1.content, Some("Response 1".to_string()));

            let resp2 = client.complete(request()).await.unwrap();
            assert_eq!(resp2.content, Some("Response 2".to_string()));

            assert_eq!(client.call_count(), 2);
            assert_eq!(client.requests().len(), 2);
        }

        #[tokio::test]
        async fn test_mock_client_errors_when_exhausted() {
            let client = MockLlmClient::new(vec![]);

            let result = client.complete(request()).await;
            assert!(result.is_err());
        }
    }
}
