//! Signal detector registry and two-pass dispatch (spec §4.3).
//!
//! Detectors fall into two passes: ordinary pool detectors run first and
//! populate `global_signals`/`node_signals`; `meta.*` detectors run second
//! because they read the outputs of the first pass (`meta.interview_progress`
//! folds in `graph.chain_completion`, `meta.node.opportunity` reads
//! `graph.node.exhausted`). Running meta detectors before the first pass
//! completes would read stale or missing keys.

use interview_types::{GraphState, NodeState, SignalMap};

/// A pool a detector belongs to, matching the namespace prefix of every
/// key it produces (spec §4.3: `graph`, `llm`, `temporal`, `meta`, `technique`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Graph,
    Llm,
    Temporal,
    Meta,
    Technique,
}

impl Pool {
    pub fn is_meta(&self) -> bool {
        matches!(self, Pool::Meta)
    }
}

/// Shared read-only view every detector receives. Detectors never mutate
/// this — they return fresh contributions that the caller folds in.
pub struct DetectorContext<'a> {
    pub graph_state: &'a GraphState,
    pub node_states: &'a [NodeState],
    pub strategy_history: &'a [String],
    /// Bounded (capacity `N=10`) session-scoped window of recent response
    /// depth labels, most recent last — backs `llm.global_response_trend`.
    pub response_depths_window: &'a [interview_types::ResponseDepth],
    /// This turn's raw participant response text. `llm.*` detectors must
    /// be recomputed from it every turn, never cached (spec §4.3).
    pub current_response_text: &'a str,
    pub global_signals_so_far: &'a SignalMap,
}

/// A detector that contributes to the shared `global_signals` map.
pub trait GlobalSignalDetector: Send + Sync {
    fn name(&self) -> &'static str;
    fn pool(&self) -> Pool;
    fn detect(&self, ctx: &DetectorContext) -> SignalMap;
}

/// A detector that contributes per-slot signals, one `SignalMap` per
/// `NodeState` in `ctx.node_states`.
pub trait NodeSignalDetector: Send + Sync {
    fn name(&self) -> &'static str;
    fn pool(&self) -> Pool;
    fn detect(&self, ctx: &DetectorContext, node: &NodeState) -> SignalMap;
}

#[derive(Default)]
pub struct SignalRegistry {
    global: Vec<Box<dyn GlobalSignalDetector>>,
    node: Vec<Box<dyn NodeSignalDetector>>,
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_global(&mut self, detector: Box<dyn GlobalSignalDetector>) -> &mut Self {
        self.global.push(detector);
        self
    }

    pub fn register_node(&mut self, detector: Box<dyn NodeSignalDetector>) -> &mut Self {
        self.node.push(detector);
        self
    }

    /// Builds the required built-in detector set (spec §4.3), bound to
    /// one session's methodology — composed once per session per §4.7.
    pub fn with_builtins(methodology: &interview_types::Methodology) -> Self {
        let mut registry = Self::new();
        crate::detectors::graph::register(&mut registry, methodology.clone());
        crate::detectors::llm::register(&mut registry);
        crate::detectors::temporal::register(&mut registry);
        crate::detectors::meta::register(&mut registry, methodology.clone());
        registry
    }

    /// Runs non-meta global detectors, then non-meta node detectors, then
    /// meta detectors of both kinds — the two-pass order spec §4.3
    /// requires so `meta.*` can read everything else's output.
    pub fn compose(
        &self,
        graph_state: &GraphState,
        node_states: &[NodeState],
        strategy_history: &[String],
        response_depths_window: &[interview_types::ResponseDepth],
        current_response_text: &str,
    ) -> (SignalMap, interview_types::NodeSignalMap) {
        let mut global_signals = SignalMap::new();
        let mut node_signals: interview_types::NodeSignalMap = node_states
            .iter()
            .map(|n| (n.slot_id.to_string(), SignalMap::new()))
            .collect();

        for pass_wants_meta in [false, true] {
            for detector in self.global.iter().filter(|d| d.pool().is_meta() == pass_wants_meta) {
                let ctx = DetectorContext {
                    graph_state,
                    node_states,
                    strategy_history,
                    response_depths_window,
                    current_response_text,
                    global_signals_so_far: &global_signals,
                };
                let contributions = detector.detect(&ctx);
                global_signals.extend(contributions);
            }

            for detector in self.node.iter().filter(|d| d.pool().is_meta() == pass_wants_meta) {
                let ctx = DetectorContext {
                    graph_state,
                    node_states,
                    strategy_history,
                    response_depths_window,
                    current_response_text,
                    global_signals_so_far: &global_signals,
                };
                for node in node_states {
                    let slot_key = node.slot_id.to_string();
                    let contributions = detector.detect(&ctx, node);
                    node_signals.entry(slot_key).or_default().extend(contributions);
                }
            }
        }

        (global_signals, node_signals)
    }
}
