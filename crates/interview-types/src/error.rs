//! Core error taxonomy (spec §7).
//!
//! Hand-rolled `Error` enum (`Display` + `Error` + `From` impls, no
//! `thiserror`): every crate boundary converts into this type via `From`,
//! so the taxonomy stays exhaustive and typed all the way out to the CLI.

use std::fmt;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug)]
pub enum CoreError {
    /// Invalid or missing methodology/concept/signal configuration. Fatal
    /// at startup or session creation.
    Configuration(String),

    /// A pipeline stage was invoked before a prerequisite stage produced
    /// its contract. Fatal to the turn.
    ContractViolation(String),

    /// Stage 6 observed graph state computed before extraction completed.
    /// Fatal to the turn; never silently uses stale state.
    FreshnessViolation { computed_at: String, extraction_at: String },

    /// Persistence failure. The turn fails atomically; each write is its
    /// own transaction, but partial-turn artifacts may remain.
    Repository(String),

    /// An LLM call exceeded its configured timeout.
    LlmTimeout { stage: String, timeout_ms: u64 },

    /// Any other LLM backend failure.
    Llm(String),

    /// The extractor returned malformed JSON. Recovered upstream as an
    /// empty extraction; this variant exists for callers that need to
    /// observe the failure (e.g. logging) before recovering.
    ExtractionParse(String),

    /// A domain invariant was violated (e.g. `node_count` inconsistent
    /// with `nodes_by_type`). Fatal; indicates a bug.
    Validation(String),

    /// IO failure underneath configuration loading or the CLI.
    Io(std::io::Error),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            CoreError::ContractViolation(msg) => write!(f, "contract violation: {msg}"),
            CoreError::FreshnessViolation { computed_at, extraction_at } => write!(
                f,
                "freshness violation: state computed_at {computed_at} is older than extraction timestamp {extraction_at}"
            ),
            CoreError::Repository(msg) => write!(f, "repository error: {msg}"),
            CoreError::LlmTimeout { stage, timeout_ms } => {
                write!(f, "LLM call in stage {stage} timed out after {timeout_ms}ms")
            }
            CoreError::Llm(msg) => write!(f, "LLM error: {msg}"),
            CoreError::ExtractionParse(msg) => write!(f, "extraction parse error: {msg}"),
            CoreError::Validation(msg) => write!(f, "validation error: {msg}"),
            CoreError::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoreError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freshness_violation_message_carries_both_timestamps() {
        let err = CoreError::FreshnessViolation {
            computed_at: "2026-01-01T00:00:00Z".into(),
            extraction_at: "2026-01-01T00:00:05Z".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2026-01-01T00:00:00Z"));
        assert!(msg.contains("2026-01-01T00:00:05Z"));
    }
}
