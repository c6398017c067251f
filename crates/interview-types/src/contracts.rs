//! Typed stage contracts (spec §4.1, §4.8).
//!
//! Every stage of the turn pipeline consumes the previous stage's contract
//! and produces its own. `StageContract::validate` enforces range/
//! non-negativity constraints; stages that read timestamps for freshness
//! (stage 6) find them on `StateComputationOutput`/`ExtractionOutput`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::graph::{CanonicalEdge, GraphState, KGEdge, KGNode, SurfaceToSlotMapping};
use crate::ids::{CanonicalSlotId, NodeId, SessionId, UtteranceId};
use crate::session::Session;
use crate::signal::{NodeSignalMap, SignalMap};
use crate::utterance::Utterance;
use crate::{CoreError, Result};

/// Shared validation contract every stage output implements.
pub trait StageContract {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Output of stage 1 (ContextLoading).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextLoadingOutput {
    pub session: Session,
    pub recent_utterances: Vec<Utterance>,
    pub recent_node_labels: Vec<String>,
}

impl StageContract for ContextLoadingOutput {}

/// Output of stage 2 (UtteranceSaving).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UtteranceSavingOutput {
    pub utterance_id: UtteranceId,
}

impl StageContract for UtteranceSavingOutput {}

/// Output of stage 2.5 (SrlPreprocessing), optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SrlPreprocessingOutput {
    pub discourse_markers: Vec<String>,
}

impl StageContract for SrlPreprocessingOutput {}

/// A single extracted concept from the extractor wire schema (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedConcept {
    pub text: String,
    pub node_type: String,
    pub confidence: f64,
    pub source_quote: String,
    #[serde(default)]
    pub linked_elements: Vec<i64>,
    #[serde(default)]
    pub stance: i8,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

/// A single extracted relationship from the extractor wire schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedRelationship {
    pub source_text: String,
    pub target_text: String,
    pub relationship_type: String,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// Output of stage 3 (Extraction). On LLM timeout or parse failure,
/// `is_extractable` stays true and both vectors are empty — this is the
/// graceful-degradation path of spec §5, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    pub is_extractable: bool,
    pub concepts: Vec<ExtractedConcept>,
    pub relationships: Vec<ExtractedRelationship>,
    pub extractability_reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ExtractionOutput {
    pub fn empty_due_to(reason: impl Into<String>) -> Self {
        Self {
            is_extractable: true,
            concepts: Vec::new(),
            relationships: Vec::new(),
            extractability_reason: Some(reason.into()),
            timestamp: Utc::now(),
        }
    }
}

impl StageContract for ExtractionOutput {}

/// Summary of graph changes produced by a turn, used by `NodeStateTracker`
/// yield detection (spec §4.4).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GraphChangeSummary {
    pub nodes_added: u32,
    pub edges_added: u32,
    pub nodes_modified: u32,
}

impl GraphChangeSummary {
    pub fn produced_yield(&self) -> bool {
        self.nodes_added + self.edges_added + self.nodes_modified > 0
    }
}

/// Output of stage 4 (GraphUpdate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphUpdateOutput {
    pub new_nodes: Vec<KGNode>,
    pub touched_nodes: Vec<NodeId>,
    pub new_edges: Vec<KGEdge>,
    pub changes: GraphChangeSummary,
    /// Nodes superseded this turn via REVISES, paired with their superseder.
    pub superseded: Vec<(NodeId, NodeId)>,
}

impl StageContract for GraphUpdateOutput {}

/// Output of stage 4.5 (SlotDiscovery).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotDiscoveryOutput {
    pub new_mappings: Vec<SurfaceToSlotMapping>,
    pub new_canonical_edges: Vec<CanonicalEdge>,
}

impl StageContract for SlotDiscoveryOutput {}

/// Output of stage 5 (StateComputation). Carries the timestamp stage 6
/// validates against the extraction timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateComputationOutput {
    pub graph_state: GraphState,
    pub global_signals: SignalMap,
    pub node_signals: NodeSignalMap,
    pub computed_at: DateTime<Utc>,
}

impl StageContract for StateComputationOutput {
    fn validate(&self) -> Result<()> {
        self.graph_state.validate()
    }
}

/// Input to stage 6 (StrategySelection) — carries both this stage's
/// inputs and the freshness pair it must check before doing any work.
#[derive(Debug, Clone)]
pub struct StrategySelectionInput<'a> {
    pub state: &'a StateComputationOutput,
    pub extraction_timestamp: DateTime<Utc>,
}

impl<'a> StrategySelectionInput<'a> {
    /// spec §4.8: `state_computation_output.computed_at >= extraction_output.timestamp`.
    pub fn check_freshness(&self) -> Result<()> {
        if self.state.computed_at < self.extraction_timestamp {
            return Err(CoreError::FreshnessViolation {
                computed_at: self.state.computed_at.to_rfc3339(),
                extraction_at: self.extraction_timestamp.to_rfc3339(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub strategy: String,
    pub node_id: Option<CanonicalSlotId>,
    pub contributions: HashMap<String, f64>,
    pub base: f64,
    pub phase_multiplier: f64,
    pub phase_bonus: f64,
    pub final_score: f64,
    pub rank: u32,
    pub selected: bool,
}

/// Output of stage 6 (StrategySelection).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySelectionOutput {
    pub strategy: String,
    pub focus_node_id: Option<CanonicalSlotId>,
    pub focus_label: String,
    pub ranked_candidates: Vec<ScoredCandidate>,
    pub generates_closing_question: bool,
}

impl StageContract for StrategySelectionOutput {}

/// Output of stage 7 (QuestionGeneration).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionGenerationOutput {
    pub question: String,
    pub technique: String,
}

impl StageContract for QuestionGenerationOutput {
    fn validate(&self) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(CoreError::Validation("generated question is empty".into()));
        }
        Ok(())
    }
}

/// Output of stage 8 (ResponseSaving).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseSavingOutput {
    pub utterance_id: UtteranceId,
}

impl StageContract for ResponseSavingOutput {}

/// Output of stage 9 (Continuation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuationOutput {
    pub should_continue: bool,
    pub reason: String,
}

impl StageContract for ContinuationOutput {}

/// Output of stage 10 (ScoringPersistence).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringPersistenceOutput {
    pub session_id: SessionId,
    pub turn_number: u32,
    pub persisted_candidate_count: usize,
}

impl StageContract for ScoringPersistenceOutput {}

/// The caller-facing aggregate result of a full turn (spec §2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResult {
    pub extraction: ExtractionOutput,
    pub graph_state: GraphState,
    pub next_question: String,
    pub should_continue: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state(computed_at: DateTime<Utc>) -> StateComputationOutput {
        StateComputationOutput {
            graph_state: GraphState {
                node_count: 0,
                edge_count: 0,
                nodes_by_type: HashMap::new(),
                edges_by_type: HashMap::new(),
                orphan_count: 0,
                depth_metrics: Default::default(),
                saturation_metrics: None,
                current_phase: crate::graph::Phase::Exploratory,
                turn_count: 1,
                strategy_history: crate::graph::BoundedRing::new(30),
                computed_at,
            },
            global_signals: HashMap::new(),
            node_signals: HashMap::new(),
            computed_at,
        }
    }

    #[test]
    fn freshness_check_rejects_stale_state() {
        let extraction_ts = Utc::now();
        let stale_state = sample_state(extraction_ts - chrono::Duration::seconds(5));
        let input = StrategySelectionInput { state: &stale_state, extraction_timestamp: extraction_ts };
        assert!(matches!(input.check_freshness(), Err(CoreError::FreshnessViolation { .. })));
    }

    #[test]
    fn freshness_check_accepts_equal_or_later_state() {
        let extraction_ts = Utc::now();
        let fresh_state = sample_state(extraction_ts);
        let input = StrategySelectionInput { state: &fresh_state, extraction_timestamp: extraction_ts };
        assert!(input.check_freshness().is_ok());
    }

    #[test]
    fn question_generation_rejects_empty_question() {
        let out = QuestionGenerationOutput { question: "   ".into(), technique: "laddering".into() };
        assert!(out.validate().is_err());
    }
}
