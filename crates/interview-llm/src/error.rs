use std::fmt;

/// Errors surfaced by a [`crate::provider::CompletionProvider`]. Named and
/// shaped after spec §6's wire contract (`LLMTimeoutError`, `LLMError`)
/// rather than the generic `interview_types::CoreError`, since callers need
/// to distinguish a timeout (retryable, falls back to heuristic extraction
/// per §5) from any other failure.
#[derive(Debug)]
pub enum LlmError {
    /// The provider did not respond within the request's configured budget.
    Timeout { stage: String, timeout_ms: u64 },
    /// The provider responded but the response could not be used: a
    /// transport failure, a non-success status, or a malformed payload.
    Provider(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::Timeout { stage, timeout_ms } => {
                write!(f, "llm call for stage '{stage}' timed out after {timeout_ms}ms")
            }
            LlmError::Provider(msg) => write!(f, "llm provider error: {msg}"),
        }
    }
}

impl std::error::Error for LlmError {}

impl From<LlmError> for interview_types::CoreError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout { stage, timeout_ms } => {
                interview_types::CoreError::LlmTimeout { stage, timeout_ms }
            }
            LlmError::Provider(msg) => interview_types::CoreError::Llm(msg),
        }
    }
}

pub type LlmResult<T> = Result<T, LlmError>;
