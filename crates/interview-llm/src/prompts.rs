//! Prompt construction and response parsing for the two LLM-backed stages
//! (spec §4.8 stage 3 Extraction, stage 7 QuestionGeneration). Both prompts
//! pin the model to a strict JSON-only output contract; parsing tolerates
//! the markdown code fences real providers tend to wrap JSON in.

use interview_types::{ExtractedConcept, ExtractedRelationship, ExtractionOutput};

/// Builds the extraction prompt for a single respondent utterance, given
/// the recent conversational context (spec §6 wire schema:
/// `{concepts, relationships, discourse_markers}`). `recent_utterances`
/// carries prior turns' text (oldest first) so a referential response
/// ("yes", "that one") has something to resolve against.
pub fn extraction_prompt(utterance_text: &str, recent_node_labels: &[String], recent_utterances: &[String]) -> String {
    let known = if recent_node_labels.is_empty() {
        "(none yet)".to_string()
    } else {
        recent_node_labels.join(", ")
    };
    let history = if recent_utterances.is_empty() {
        String::new()
    } else {
        let lines: Vec<String> = recent_utterances.iter().map(|u| format!("- {u}")).collect();
        format!("Recent conversation:\n{}\n\n", lines.join("\n"))
    };
    format!(
        "You are extracting concepts and relationships from a single respondent \
utterance in a qualitative interview.\n\n\
{history}Concepts already discussed: {known}\n\n\
Utterance: \"{utterance_text}\"\n\n\
Respond with a single JSON object and nothing else, matching exactly this shape:\n\
{{\n  \"concepts\": [{{\"text\": str, \"node_type\": str, \"confidence\": float 0-1, \
\"source_quote\": str, \"stance\": int -1|0|1}}],\n  \
\"relationships\": [{{\"source_text\": str, \"target_text\": str, \"relationship_type\": str, \
\"confidence\": float 0-1}}],\n  \"discourse_markers\": [str]\n}}\n\n\
If the utterance contains no extractable content (e.g. \"I don't know\", filler, \
off-topic), return empty arrays for concepts and relationships."
    )
}

const EXTRACTION_SYSTEM_PROMPT: &str =
    "You extract structured concepts and relationships from interview transcripts. \
You always respond with raw JSON, never prose, never markdown fences.";

pub fn extraction_system_prompt() -> &'static str {
    EXTRACTION_SYSTEM_PROMPT
}

/// Builds the question-generation prompt for the chosen strategy/focus
/// pair (spec §4.7, §4.8 stage 7).
pub fn question_generation_prompt(
    strategy: &str,
    focus_label: &str,
    technique_hint: Option<&str>,
) -> String {
    let hint = technique_hint
        .map(|t| format!(" using the \"{t}\" technique"))
        .unwrap_or_default();
    format!(
        "You are conducting a qualitative interview. The next question should pursue the \
\"{strategy}\" strategy, focused on \"{focus_label}\"{hint}.\n\n\
Respond with a single, natural follow-up question and nothing else — no preamble, \
no quotation marks around it."
    )
}

/// Strips a leading/trailing markdown code fence (with or without a
/// language tag) so `serde_json::from_str` sees raw JSON. Providers are
/// instructed not to fence their output but do it anyway often enough
/// that this is load-bearing, not defensive dead code.
pub fn strip_json_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_prefix = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_prefix.strip_suffix("```").unwrap_or(without_prefix).trim()
}

#[derive(serde::Deserialize)]
struct RawExtraction {
    #[serde(default)]
    concepts: Vec<ExtractedConcept>,
    #[serde(default)]
    relationships: Vec<ExtractedRelationship>,
    #[serde(default)]
    discourse_markers: Vec<String>,
}

/// Parses an extraction completion into an [`ExtractionOutput`]. On
/// malformed JSON this does not error: it returns the graceful-degradation
/// `empty_due_to` output spec §5 mandates, since a parse failure here must
/// never abort the turn.
pub fn parse_extraction_response(raw: &str) -> ExtractionOutput {
    match serde_json::from_str::<RawExtraction>(strip_json_fence(raw)) {
        Ok(parsed) => ExtractionOutput {
            is_extractable: true,
            concepts: parsed.concepts,
            relationships: parsed.relationships,
            extractability_reason: None,
            timestamp: chrono::Utc::now(),
        },
        Err(err) => ExtractionOutput::empty_due_to(format!("extraction parse failure: {err}")),
    }
}
