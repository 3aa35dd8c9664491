//! LLM error types

use thiserror::Error;

/// Errors that can occur during LLM operations
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// HTTP status for API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::ApiError { status, .. } => Some(*status),
            LlmError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Pull a human-readable message out of a provider error body
///
/// Both Gemini and Anthropic wrap failures as `{"error": {"message": ...}}`;
/// anything else is passed through as-is.
pub(crate) fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status() {
        let err = LlmError::ApiError {
            status: 403,
            message: "forbidden".to_string(),
        };
        assert_eq!(err.status(), Some(403));
        assert_eq!(LlmError::InvalidResponse("x".to_string()).status(), None);
    }

    #[test]
    fn test_display() {
        let err = LlmError::ApiError {
            status: 500,
            message: "Server error".to_string(),
        };
        assert_eq!(err.to_string(), "API error 500: Server error");
    }

    #[test]
    fn test_api_error_message_extracts_nested() {
        let body = r#"{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(body), "API key not valid");

        let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        assert_eq!(api_error_message(body), "Overloaded");
    }

    #[test]
    fn test_api_error_message_passthrough() {
        assert_eq!(api_error_message("  bad gateway \n"), "bad gateway");
    }
}
