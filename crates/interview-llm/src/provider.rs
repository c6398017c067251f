use async_trait::async_trait;

use crate::error::LlmResult;
use crate::types::{CompletionRequest, CompletionResponse};

/// The one seam between the decision engine and a concrete LLM vendor
/// (spec §6). Extraction (stage 4) and question generation (stage 7) both
/// depend on this trait, never on a vendor SDK directly, so the engine can
/// run against [`crate::heuristic::HeuristicProvider`] in tests and
/// simulations without a network call.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse>;
}
