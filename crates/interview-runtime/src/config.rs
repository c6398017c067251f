//! Methodology/concept configuration loading (spec §4.5, §6).
//!
//! YAML anchors (`<<: *name` / `<<: [*a, *b]`) are resolved by `serde_yaml`
//! itself before deserialization reaches [`interview_types::Methodology`] —
//! no custom merge pass is needed. What this module adds on top is the
//! load-time validation spec §6 requires: every signal name a strategy
//! weights against must be a name some detector in
//! [`interview_signals`] actually produces, checked against a name, not a
//! live registry instance (loading happens before any session or
//! methodology-bound registry exists).

use std::path::Path;

use interview_types::{CoreError, Methodology, Result};

/// Base signal names every built-in detector can produce (spec §4.3).
/// A `signal_weights` key is valid if it equals one of these exactly, or
/// is `<name>.<qualifier>` for a string-valued one of these, or starts
/// with the `graph.depth_by_element.` dynamic-element prefix.
const KNOWN_SIGNAL_NAMES: &[&str] = &[
    "graph.node_count",
    "graph.edge_count",
    "graph.orphan_count",
    "graph.max_depth",
    "graph.avg_depth",
    "graph.chain_completion",
    "graph.coverage_breadth",
    "graph.missing_terminal_value",
    "graph.canonical_concept_count",
    "graph.canonical_edge_density",
    "graph.canonical_exhaustion_score",
    "graph.node.exhausted",
    "graph.node.exhaustion_score",
    "graph.node.yield_stagnation",
    "graph.node.focus_streak",
    "graph.node.is_current_focus",
    "graph.node.recency_score",
    "graph.node.is_orphan",
    "graph.node.edge_count",
    "graph.node.has_outgoing",
    "graph.node.type_priority",
    "graph.node.slot_saturation",
    "llm.response_depth",
    "llm.sentiment",
    "llm.uncertainty",
    "llm.ambiguity",
    "llm.hedging_language",
    "llm.global_response_trend",
    "temporal.strategy_repetition_count",
    "temporal.turns_since_strategy_change",
    "meta.interview_progress",
    "meta.interview.phase",
    "meta.node.opportunity",
];

const DYNAMIC_SIGNAL_PREFIXES: &[&str] = &["graph.depth_by_element."];

fn is_known_signal(key: &str) -> bool {
    if KNOWN_SIGNAL_NAMES.contains(&key) {
        return true;
    }
    if DYNAMIC_SIGNAL_PREFIXES.iter().any(|prefix| key.starts_with(prefix)) {
        return true;
    }
    if let Some(dot) = key.rfind('.') {
        if KNOWN_SIGNAL_NAMES.contains(&&key[..dot]) {
            return true;
        }
    }
    false
}

/// Parses a methodology from YAML text (anchors already resolved by
/// `serde_yaml`), then rejects unknown `signal_weights` keys before
/// returning — spec §6: "Unknown signal names ... are rejected at load
/// time against the signal registry."
pub fn parse_methodology(yaml: &str) -> Result<Methodology> {
    let methodology: Methodology =
        serde_yaml::from_str(yaml).map_err(|err| CoreError::Configuration(format!("methodology YAML: {err}")))?;
    validate_signal_weights(&methodology)?;
    Ok(methodology)
}

pub fn load_methodology(path: &Path) -> Result<Methodology> {
    let text = std::fs::read_to_string(path)?;
    parse_methodology(&text)
}

fn validate_signal_weights(methodology: &Methodology) -> Result<()> {
    for strategy in &methodology.strategies {
        for key in strategy.weights.keys() {
            if !is_known_signal(key) {
                return Err(CoreError::Configuration(format!(
                    "strategy '{}' references unknown signal '{key}'",
                    strategy.name
                )));
            }
        }
    }
    Ok(())
}

pub fn parse_concept(yaml: &str) -> Result<interview_types::ConceptConfig> {
    serde_yaml::from_str(yaml).map_err(|err| CoreError::Configuration(format!("concept YAML: {err}")))
}

pub fn load_concept(path: &Path) -> Result<interview_types::ConceptConfig> {
    let text = std::fs::read_to_string(path)?;
    parse_concept(&text)
}
