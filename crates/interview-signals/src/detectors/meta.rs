//! `meta.*` detectors (spec §4.3). These run in the second dispatch pass
//! and read the first pass's output via `ctx.global_signals_so_far` —
//! per-node opportunity also recomputes the same exhaustion/streak
//! formulas `graph.node` uses, since a per-node detector only ever sees
//! its own `NodeState`, not another detector's already-produced map.

use interview_types::{Methodology, NodeState, SignalMap};

use crate::detectors::graph::{exhaustion_score, focus_streak_bucket};
use crate::registry::{DetectorContext, GlobalSignalDetector, NodeSignalDetector, Pool, SignalRegistry};

pub fn register(registry: &mut SignalRegistry, methodology: Methodology) {
    registry.register_global(Box::new(ProgressDetector));
    registry.register_global(Box::new(PhaseDetector { methodology }));
    registry.register_node(Box::new(OpportunityDetector));
}

struct ProgressDetector;

impl GlobalSignalDetector for ProgressDetector {
    fn name(&self) -> &'static str {
        "meta.progress"
    }
    fn pool(&self) -> Pool {
        Pool::Meta
    }
    fn detect(&self, ctx: &DetectorContext) -> SignalMap {
        let chain_completion = ctx.global_signals_so_far.get("graph.chain_completion").and_then(|v| v.as_number()).unwrap_or(0.0);
        let max_depth = ctx.graph_state.depth_metrics.max_depth as f64;
        let node_count = ctx.graph_state.node_count as f64;

        let progress = 0.4 * chain_completion + 0.4 * (max_depth / 3.0).min(1.0) + 0.2 * (node_count / 10.0).min(1.0);

        let mut out = SignalMap::new();
        out.insert("meta.interview_progress".into(), progress.clamp(0.0, 1.0).into());
        out
    }
}

struct PhaseDetector {
    methodology: Methodology,
}

impl GlobalSignalDetector for PhaseDetector {
    fn name(&self) -> &'static str {
        "meta.phase"
    }
    fn pool(&self) -> Pool {
        Pool::Meta
    }
    fn detect(&self, ctx: &DetectorContext) -> SignalMap {
        let bounds = &self.methodology.phase_boundaries;
        let node_count = ctx.graph_state.node_count;
        let orphan_count = ctx.graph_state.orphan_count;

        let phase = if node_count < bounds.early_max {
            "early"
        } else if node_count < bounds.mid_max || orphan_count > bounds.orphan_mid {
            "mid"
        } else {
            "late"
        };

        let mut out = SignalMap::new();
        out.insert("meta.interview.phase".into(), phase.into());
        out
    }
}

struct OpportunityDetector;

impl NodeSignalDetector for OpportunityDetector {
    fn name(&self) -> &'static str {
        "meta.node"
    }
    fn pool(&self) -> Pool {
        Pool::Meta
    }
    fn detect(&self, ctx: &DetectorContext, node: &NodeState) -> SignalMap {
        let mut out = SignalMap::new();

        let exhausted = exhaustion_score(node) >= 0.7;
        let streak_bucket = focus_streak_bucket(node.current_focus_streak);
        let response_depth = ctx.global_signals_so_far.get("llm.response_depth").and_then(|v| v.as_text().map(String::from));

        let opportunity = if exhausted {
            "exhausted"
        } else if streak_bucket == "high" && response_depth.as_deref() == Some("deep") {
            "probe_deeper"
        } else {
            "fresh"
        };

        out.insert("meta.node.opportunity".into(), opportunity.into());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_types::{CanonicalSlotId, GraphState, PhaseBoundaries, Phase, SignalValue};

    fn graph_state(node_count: u32, orphan_count: u32) -> GraphState {
        GraphState {
            node_count,
            edge_count: 0,
            nodes_by_type: Default::default(),
            edges_by_type: Default::default(),
            orphan_count,
            depth_metrics: Default::default(),
            saturation_metrics: None,
            current_phase: Phase::Exploratory,
            turn_count: 0,
            strategy_history: Default::default(),
            computed_at: chrono::Utc::now(),
        }
    }

    fn methodology() -> Methodology {
        Methodology {
            id: "m".into(),
            name: "M".into(),
            node_types: vec![],
            edge_types: vec![],
            transitions: vec![],
            terminal_node_types: vec![],
            ladder_length: 5,
            similarity_threshold: 0.88,
            type_priority: Default::default(),
            phase_boundaries: PhaseBoundaries { early_max: 3, mid_max: 8, orphan_mid: 2 },
            strategies: vec![],
            closing_question_template: None,
            enable_srl_preprocessing: false,
        }
    }

    #[test]
    fn phase_boundaries_match_defaults() {
        let detector = PhaseDetector { methodology: methodology() };
        let empty_signals = SignalMap::new();
        let state = graph_state(1, 0);
        let ctx = DetectorContext {
            graph_state: &state,
            node_states: &[],
            strategy_history: &[],
            response_depths_window: &[],
            current_response_text: "",
            global_signals_so_far: &empty_signals,
        };
        assert_eq!(detector.detect(&ctx)["meta.interview.phase"].as_text(), Some("early"));

        let state = graph_state(5, 0);
        let ctx = DetectorContext { graph_state: &state, ..ctx_template(&state, &empty_signals) };
        assert_eq!(detector.detect(&ctx)["meta.interview.phase"].as_text(), Some("mid"));

        let state = graph_state(10, 0);
        let ctx = DetectorContext { graph_state: &state, ..ctx_template(&state, &empty_signals) };
        assert_eq!(detector.detect(&ctx)["meta.interview.phase"].as_text(), Some("late"));
    }

    fn ctx_template<'a>(state: &'a GraphState, empty_signals: &'a SignalMap) -> DetectorContext<'a> {
        DetectorContext {
            graph_state: state,
            node_states: &[],
            strategy_history: &[],
            response_depths_window: &[],
            current_response_text: "",
            global_signals_so_far: empty_signals,
        }
    }

    #[test]
    fn opportunity_falls_back_to_fresh_without_exhaustion_or_deep_streak() {
        let node = NodeState::new(CanonicalSlotId::generate(), "x", "attribute", 0);
        let state = graph_state(0, 0);
        let empty_signals = SignalMap::new();
        let ctx = ctx_template(&state, &empty_signals);
        let detector = OpportunityDetector;
        assert_eq!(detector.detect(&ctx, &node)["meta.node.opportunity"].as_text(), Some("fresh"));
    }

    #[test]
    fn opportunity_is_exhausted_when_score_crosses_threshold() {
        let mut node = NodeState::new(CanonicalSlotId::generate(), "x", "attribute", 0);
        node.focus_count = 5;
        node.turns_since_last_yield = 10;
        node.current_focus_streak = 5;
        node.response_depths = vec![interview_types::ResponseDepth::Surface; 3];
        let state = graph_state(0, 0);
        let empty_signals = SignalMap::new();
        let ctx = ctx_template(&state, &empty_signals);
        let detector = OpportunityDetector;
        assert_eq!(detector.detect(&ctx, &node)["meta.node.opportunity"].as_text(), Some("exhausted"));
    }

    #[test]
    fn opportunity_is_probe_deeper_on_high_streak_with_deep_response() {
        let mut node = NodeState::new(CanonicalSlotId::generate(), "x", "attribute", 0);
        node.current_focus_streak = 4;
        let state = graph_state(0, 0);
        let empty_signals = SignalMap::new();
        let mut globals = SignalMap::new();
        globals.insert("llm.response_depth".to_string(), SignalValue::Text("deep".to_string()));
        let ctx = DetectorContext { global_signals_so_far: &globals, ..ctx_template(&state, &empty_signals) };
        let detector = OpportunityDetector;
        assert_eq!(detector.detect(&ctx, &node)["meta.node.opportunity"].as_text(), Some("probe_deeper"));
    }
}
