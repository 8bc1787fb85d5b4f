use std::sync::atomic::{AtomicUsize, Ordering};

use super::QueryError;

/// Language-model client abstraction (allows mocking).
///
/// Receives the canonicalized query and the system prompt, returns raw text
/// that should contain a JSON object shaped like a search candidate.
pub trait LlmClient: Send + Sync {
    fn generate(&self, model: &str, prompt: &str, system: &str) -> Result<String, QueryError>;
}

/// Mock LLM client for tests and dry runs. Returns a fixed response or a fixed failure.
pub struct MockLlmClient {
    response: Result<String, QueryError>,
    calls: AtomicUsize,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Client whose every call fails with a transport error.
    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(QueryError::Llm(message.to_string())),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, _model: &str, _prompt: &str, _system: &str) -> Result<String, QueryError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.response.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_client_returns_configured_response() {
        let client = MockLlmClient::new("test response");
        let result = client.generate("model", "prompt", "system").unwrap();
        assert_eq!(result, "test response");
        assert_eq!(client.call_count(), 1);
    }

    #[test]
    fn failing_client_returns_llm_error() {
        let client = MockLlmClient::failing("connection refused");
        let err = client.generate("model", "prompt", "system").unwrap_err();
        assert_eq!(err.code(), "LLM_ERROR");
        assert_eq!(client.call_count(), 1);
    }
}
