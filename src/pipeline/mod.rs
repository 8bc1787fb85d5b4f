pub mod normalize;
pub mod canonicalize;
pub mod dates;
pub mod fallback;
pub mod sanitize;
pub mod validation;
pub mod llm;
pub mod prompt;
pub mod orchestrator;

pub use canonicalize::*;
pub use dates::*;
pub use fallback::*;
pub use sanitize::*;
pub use validation::*;
pub use llm::*;
pub use prompt::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Candidate is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Candidate is not a JSON object (got {0})")]
    Validation(String),

    #[error("LLM request failed: {0}")]
    Llm(String),
}

impl QueryError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) => "INVALID_JSON",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Llm(_) => "LLM_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(QueryError::InvalidJson("x".into()).code(), "INVALID_JSON");
        assert_eq!(QueryError::Validation("array".into()).code(), "VALIDATION_ERROR");
        assert_eq!(QueryError::Llm("timeout".into()).code(), "LLM_ERROR");
    }

    #[test]
    fn error_messages_include_detail() {
        let err = QueryError::Validation("array".into());
        assert_eq!(err.to_string(), "Candidate is not a JSON object (got array)");
    }
}
