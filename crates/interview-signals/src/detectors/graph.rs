//! `graph.*` detectors (spec §4.3): structure, depth, coverage, canonical
//! aggregate stats, and the per-slot `graph.node.*` family that backs
//! exhaustion-aware scoring.

use interview_types::{Methodology, NodeState, ResponseDepth, SignalMap};

use crate::registry::{DetectorContext, GlobalSignalDetector, NodeSignalDetector, Pool, SignalRegistry};

pub fn register(registry: &mut SignalRegistry, methodology: Methodology) {
    registry.register_global(Box::new(StructureDetector));
    registry.register_global(Box::new(DepthDetector));
    registry.register_global(Box::new(CoverageDetector { methodology: methodology.clone() }));
    registry.register_global(Box::new(CanonicalDetector));
    registry.register_node(Box::new(NodeExhaustionDetector { methodology }));
}

struct StructureDetector;

impl GlobalSignalDetector for StructureDetector {
    fn name(&self) -> &'static str {
        "graph.structure"
    }
    fn pool(&self) -> Pool {
        Pool::Graph
    }
    fn detect(&self, ctx: &DetectorContext) -> SignalMap {
        let mut out = SignalMap::new();
        out.insert("graph.node_count".into(), (ctx.graph_state.node_count as f64).into());
        out.insert("graph.edge_count".into(), (ctx.graph_state.edge_count as f64).into());
        out.insert("graph.orphan_count".into(), (ctx.graph_state.orphan_count as f64).into());
        out
    }
}

struct DepthDetector;

impl GlobalSignalDetector for DepthDetector {
    fn name(&self) -> &'static str {
        "graph.depth"
    }
    fn pool(&self) -> Pool {
        Pool::Graph
    }
    fn detect(&self, ctx: &DetectorContext) -> SignalMap {
        let metrics = &ctx.graph_state.depth_metrics;
        let mut out = SignalMap::new();
        out.insert("graph.max_depth".into(), (metrics.max_depth as f64).into());
        out.insert("graph.avg_depth".into(), metrics.avg_depth.into());
        let chain_completion = metrics.depth_by_element.values().cloned().fold(0.0_f64, f64::max);
        out.insert("graph.chain_completion".into(), chain_completion.into());
        for (element, depth) in &metrics.depth_by_element {
            out.insert(format!("graph.depth_by_element.{element}"), (*depth).into());
        }
        out
    }
}

/// Needs the methodology's category list (for `coverage_breadth`) and
/// terminal types (for `missing_terminal_value`), so unlike the other
/// stateless detectors this one carries config captured at registration.
struct CoverageDetector {
    methodology: Methodology,
}

impl GlobalSignalDetector for CoverageDetector {
    fn name(&self) -> &'static str {
        "graph.coverage"
    }
    fn pool(&self) -> Pool {
        Pool::Graph
    }
    fn detect(&self, ctx: &DetectorContext) -> SignalMap {
        let mut out = SignalMap::new();
        let categories = &self.methodology.node_types;
        let terminal_types = &self.methodology.terminal_node_types;

        let coverage_breadth = if categories.is_empty() {
            0.0
        } else {
            let covered = categories.iter().filter(|c| ctx.graph_state.nodes_by_type.get(*c).copied().unwrap_or(0) > 0).count();
            covered as f64 / categories.len() as f64
        };
        out.insert("graph.coverage_breadth".into(), coverage_breadth.into());

        let has_depth = ctx.graph_state.depth_metrics.max_depth > 0;
        let has_terminal = terminal_types.iter().any(|t| ctx.graph_state.nodes_by_type.get(t).copied().unwrap_or(0) > 0);
        out.insert("graph.missing_terminal_value".into(), (has_depth && !has_terminal).into());
        out
    }
}

struct CanonicalDetector;

impl GlobalSignalDetector for CanonicalDetector {
    fn name(&self) -> &'static str {
        "graph.canonical"
    }
    fn pool(&self) -> Pool {
        Pool::Graph
    }
    fn detect(&self, ctx: &DetectorContext) -> SignalMap {
        let mut out = SignalMap::new();
        let concept_count = ctx.node_states.len() as f64;
        out.insert("graph.canonical_concept_count".into(), concept_count.into());

        let edge_density = if concept_count == 0.0 { 0.0 } else { ctx.graph_state.edge_count as f64 / concept_count };
        out.insert("graph.canonical_edge_density".into(), edge_density.into());

        if !ctx.node_states.is_empty() {
            let mean_exhaustion =
                ctx.node_states.iter().map(exhaustion_score).sum::<f64>() / ctx.node_states.len() as f64;
            out.insert("graph.canonical_exhaustion_score".into(), mean_exhaustion.into());
        }
        out
    }
}

/// `support(s)` = total surface mentions routed into slot `s`
/// (`NodeState::mention_count`); unmapped slots (`mention_count == 0`)
/// score `1.0` per spec.
fn slot_saturation(node: &NodeState, max_support: u32) -> f64 {
    if node.mention_count == 0 || max_support == 0 {
        return 1.0;
    }
    (1.0 - node.mention_count as f64 / max_support as f64).clamp(0.0, 1.0)
}

pub fn exhaustion_score(node: &NodeState) -> f64 {
    if node.focus_count == 0 {
        return 0.0;
    }
    let tslv = node.turns_since_last_yield.min(10) as f64 / 10.0;
    let streak = node.current_focus_streak.min(5) as f64 / 5.0;
    let shallow_ratio = {
        let window: Vec<&ResponseDepth> = node.response_depths.iter().rev().take(3).collect();
        if window.is_empty() {
            0.0
        } else {
            window.iter().filter(|d| d.is_shallow_ish()).count() as f64 / window.len() as f64
        }
    };
    (0.4 * tslv + 0.3 * streak + 0.3 * shallow_ratio).clamp(0.0, 1.0)
}

pub fn focus_streak_bucket(streak: u32) -> &'static str {
    match streak {
        0 => "none",
        1 => "low",
        2..=3 => "medium",
        _ => "high",
    }
}

struct NodeExhaustionDetector {
    methodology: Methodology,
}

impl NodeSignalDetector for NodeExhaustionDetector {
    fn name(&self) -> &'static str {
        "graph.node"
    }
    fn pool(&self) -> Pool {
        Pool::Graph
    }
    fn detect(&self, ctx: &DetectorContext, node: &NodeState) -> SignalMap {
        let mut out = SignalMap::new();
        let score = exhaustion_score(node);
        let exhausted = score >= 0.7;
        out.insert("graph.node.exhausted".into(), exhausted.to_string().as_str().into());
        out.insert("graph.node.exhaustion_score".into(), score.into());

        let yield_stagnation = node.focus_count >= 1 && node.turns_since_last_yield >= 3;
        out.insert("graph.node.yield_stagnation".into(), yield_stagnation.into());

        out.insert("graph.node.focus_streak".into(), focus_streak_bucket(node.current_focus_streak).into());
        out.insert("graph.node.is_current_focus".into(), (node.turns_since_last_focus == 0 && node.focus_count > 0).into());
        out.insert("graph.node.recency_score".into(), (1.0 - node.turns_since_last_focus as f64 / 20.0).max(0.0).into());
        out.insert("graph.node.is_orphan".into(), node.is_orphan().into());
        out.insert("graph.node.edge_count".into(), ((node.edge_count_out + node.edge_count_in) as f64).into());
        out.insert("graph.node.has_outgoing".into(), (node.edge_count_out > 0).into());

        let priority = self.methodology.type_priority_for(&node.node_type);
        out.insert("graph.node.type_priority".into(), priority.into());

        let max_support = ctx.node_states.iter().map(|n| n.mention_count).max().unwrap_or(0);
        out.insert("graph.node.slot_saturation".into(), slot_saturation(node, max_support).into());

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_types::{CanonicalSlotId, GraphState, Phase, PhaseBoundaries};

    fn test_methodology() -> Methodology {
        Methodology {
            id: "test".into(),
            name: "Test".into(),
            node_types: vec!["attribute".into()],
            edge_types: vec![],
            transitions: vec![],
            terminal_node_types: vec![],
            ladder_length: 5,
            similarity_threshold: 0.88,
            type_priority: Default::default(),
            phase_boundaries: PhaseBoundaries::default(),
            strategies: vec![],
            closing_question_template: None,
            enable_srl_preprocessing: false,
        }
    }

    fn node(focus_count: u32, tslv: u32, streak: u32, depths: Vec<ResponseDepth>) -> NodeState {
        let mut n = NodeState::new(CanonicalSlotId::generate(), "x", "attribute", 0);
        n.focus_count = focus_count;
        n.turns_since_last_yield = tslv;
        n.current_focus_streak = streak;
        n.response_depths = depths;
        n
    }

    #[test]
    fn exhaustion_score_is_zero_without_focus() {
        let n = node(0, 0, 0, vec![]);
        assert_eq!(exhaustion_score(&n), 0.0);
    }

    #[test]
    fn exhaustion_score_rises_with_stagnation_and_shallow_responses() {
        let n = node(5, 10, 5, vec![ResponseDepth::Surface, ResponseDepth::Shallow, ResponseDepth::Surface]);
        let score = exhaustion_score(&n);
        assert!((score - 1.0).abs() < 1e-9, "expected fully exhausted, got {score}");
    }

    #[test]
    fn focus_streak_bucket_matches_spec_boundaries() {
        assert_eq!(focus_streak_bucket(0), "none");
        assert_eq!(focus_streak_bucket(1), "low");
        assert_eq!(focus_streak_bucket(2), "medium");
        assert_eq!(focus_streak_bucket(3), "medium");
        assert_eq!(focus_streak_bucket(4), "high");
    }

    #[test]
    fn unmapped_slot_saturation_scores_one() {
        let n = node(0, 0, 0, vec![]);
        assert_eq!(slot_saturation(&n, 5), 1.0);
    }

    fn graph_state() -> GraphState {
        GraphState {
            node_count: 0,
            edge_count: 0,
            nodes_by_type: Default::default(),
            edges_by_type: Default::default(),
            orphan_count: 0,
            depth_metrics: Default::default(),
            saturation_metrics: None,
            current_phase: Phase::Exploratory,
            turn_count: 0,
            strategy_history: Default::default(),
            computed_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn node_detector_emits_full_signal_set() {
        let detector = NodeExhaustionDetector { methodology: test_methodology() };
        let state = graph_state();
        let n = node(2, 1, 1, vec![ResponseDepth::Deep]);
        let ctx = DetectorContext {
            graph_state: &state,
            node_states: std::slice::from_ref(&n),
            strategy_history: &[],
            response_depths_window: &[],
            current_response_text: "",
            global_signals_so_far: &Default::default(),
        };
        let signals = detector.detect(&ctx, &n);
        assert!(signals.contains_key("graph.node.exhausted"));
        assert!(signals.contains_key("graph.node.exhaustion_score"));
        assert!(signals.contains_key("graph.node.slot_saturation"));
    }
}
