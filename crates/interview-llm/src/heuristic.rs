//! A deterministic, network-free [`CompletionProvider`] built on
//! `interview_core::text_heuristics`. This is the backend the simulation
//! harness (spec §4 component J) and the unit/integration test suites run
//! against: no vendor credentials, no network, and the same utterance
//! always produces the same extraction, so graph-state assertions in tests
//! are reproducible.

use async_trait::async_trait;
use interview_core::text_heuristics::{response_depth_label, sentiment_label};

use crate::error::LlmResult;
use crate::provider::CompletionProvider;
use crate::types::{CompletionRequest, CompletionResponse};

const UTTERANCE_MARKER: &str = "Utterance: \"";
const PURSUE_MARKER: &str = "pursue the \"";
const FOCUSED_ON_MARKER: &str = "focused on \"";

fn extract_between<'a>(haystack: &'a str, start_marker: &str) -> Option<&'a str> {
    let start = haystack.find(start_marker)? + start_marker.len();
    let rest = &haystack[start..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

fn stance_for(text: &str) -> i8 {
    match sentiment_label(text) {
        "positive" => 1,
        "negative" => -1,
        _ => 0,
    }
}

/// Builds a single-concept, single-relationship-free extraction from the
/// quoted utterance in an extraction prompt (see `prompts::extraction_prompt`).
/// The "concept" is the whole utterance, labeled by its own text — a
/// deliberately coarse stand-in for real NLP extraction, matching the
/// word-count/keyword heuristics this provider is built on.
fn heuristic_extraction_json(utterance_text: &str) -> String {
    let depth = response_depth_label(utterance_text);
    if depth == "surface" {
        return r#"{"concepts": [], "relationships": [], "discourse_markers": []}"#.to_string();
    }
    let stance = stance_for(utterance_text);
    let escaped = utterance_text.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        r#"{{"concepts": [{{"text": "{escaped}", "node_type": "statement", "confidence": 0.6, "source_quote": "{escaped}", "stance": {stance}}}], "relationships": [], "discourse_markers": []}}"#
    )
}

fn heuristic_question(strategy: &str, focus_label: &str) -> String {
    match strategy {
        "laddering" => format!("Why is {focus_label} important to you?"),
        "expansion" => format!("What else comes to mind when you think about {focus_label}?"),
        "contrast" => format!("How does {focus_label} compare to the alternatives you've mentioned?"),
        "closing" => "Is there anything else you'd like to add before we wrap up?".to_string(),
        _ => format!("Can you tell me more about {focus_label}?"),
    }
}

/// Deterministic, offline [`CompletionProvider`].
pub struct HeuristicProvider;

impl HeuristicProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HeuristicProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for HeuristicProvider {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        let content = if let Some(utterance) = extract_between(&request.prompt, UTTERANCE_MARKER) {
            heuristic_extraction_json(utterance)
        } else {
            let strategy = extract_between(&request.prompt, PURSUE_MARKER).unwrap_or("exploration");
            let focus = extract_between(&request.prompt, FOCUSED_ON_MARKER).unwrap_or("that");
            heuristic_question(strategy, focus)
        };
        let prompt_tokens = (request.prompt.split_whitespace().count()) as u32;
        let completion_tokens = (content.split_whitespace().count()) as u32;
        Ok(CompletionResponse {
            content,
            model: "heuristic-v1".to_string(),
            prompt_tokens,
            completion_tokens,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::{extraction_prompt, parse_extraction_response, question_generation_prompt};

    #[tokio::test]
    async fn heuristic_extraction_round_trips_through_parser() {
        let provider = HeuristicProvider::new();
        let prompt = extraction_prompt("I really love the creamy texture of oat milk", &[], &[]);
        let response = provider.complete(CompletionRequest::new(prompt)).await.unwrap();
        let extraction = parse_extraction_response(&response.content);
        assert!(extraction.is_extractable);
        assert_eq!(extraction.concepts.len(), 1);
        assert_eq!(extraction.concepts[0].stance, 1);
    }

    #[tokio::test]
    async fn heuristic_extraction_is_empty_for_surface_utterances() {
        let provider = HeuristicProvider::new();
        let prompt = extraction_prompt("ok", &[], &[]);
        let response = provider.complete(CompletionRequest::new(prompt)).await.unwrap();
        let extraction = parse_extraction_response(&response.content);
        assert!(extraction.concepts.is_empty());
    }

    #[tokio::test]
    async fn heuristic_question_reflects_requested_strategy() {
        let provider = HeuristicProvider::new();
        let prompt = question_generation_prompt("laddering", "creamy texture", None);
        let response = provider.complete(CompletionRequest::new(prompt)).await.unwrap();
        assert!(response.content.contains("creamy texture"));
        assert!(response.content.to_lowercase().contains("why"));
    }

    #[test]
    fn same_utterance_always_produces_same_extraction() {
        let a = heuristic_extraction_json("I like oat milk");
        let b = heuristic_extraction_json("I like oat milk");
        assert_eq!(a, b);
    }
}
