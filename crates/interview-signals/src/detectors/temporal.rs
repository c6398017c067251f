//! `temporal.*` detectors (spec §4.3): repetition pressure on the current
//! strategy, read from the session's bounded strategy history.

use interview_types::SignalMap;

use crate::registry::{DetectorContext, GlobalSignalDetector, Pool, SignalRegistry};

pub fn register(registry: &mut SignalRegistry) {
    registry.register_global(Box::new(RepetitionDetector));
}

struct RepetitionDetector;

impl GlobalSignalDetector for RepetitionDetector {
    fn name(&self) -> &'static str {
        "temporal.repetition"
    }
    fn pool(&self) -> Pool {
        Pool::Temporal
    }
    fn detect(&self, ctx: &DetectorContext) -> SignalMap {
        let mut out = SignalMap::new();
        let Some(current) = ctx.strategy_history.last() else {
            out.insert("temporal.strategy_repetition_count".into(), 0.0.into());
            out.insert("temporal.turns_since_strategy_change".into(), 0.0.into());
            return out;
        };

        let last_five = ctx.strategy_history.iter().rev().take(5);
        let repetition_count = last_five.filter(|s| *s == current).count();
        out.insert("temporal.strategy_repetition_count".into(), (repetition_count as f64).into());

        let turns_since_change =
            ctx.strategy_history.iter().rev().take_while(|s| *s == current).count().saturating_sub(1);
        out.insert("temporal.turns_since_strategy_change".into(), (turns_since_change as f64).into());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_types::{GraphState, Phase};

    fn ctx<'a>(
        graph_state: &'a GraphState,
        history: &'a [String],
        empty_signals: &'a SignalMap,
    ) -> DetectorContext<'a> {
        DetectorContext {
            graph_state,
            node_states: &[],
            strategy_history: history,
            response_depths_window: &[],
            current_response_text: "",
            global_signals_so_far: empty_signals,
        }
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
    fn counts_occurrences_in_last_five_entries_only() {
        let state = graph_state();
        let history: Vec<String> = ["deepen", "broaden", "deepen", "deepen", "deepen", "deepen"]
            .into_iter()
            .map(String::from)
            .collect();
        let detector = RepetitionDetector;
        let empty_signals = SignalMap::new();
        let signals = detector.detect(&ctx(&state, &history, &empty_signals));
        assert_eq!(signals["temporal.strategy_repetition_count"].as_number(), Some(4.0));
    }

    #[test]
    fn turns_since_change_counts_the_tail_run() {
        let state = graph_state();
        let history: Vec<String> =
            ["broaden", "deepen", "deepen", "deepen"].into_iter().map(String::from).collect();
        let detector = RepetitionDetector;
        let empty_signals = SignalMap::new();
        let signals = detector.detect(&ctx(&state, &history, &empty_signals));
        assert_eq!(signals["temporal.turns_since_strategy_change"].as_number(), Some(2.0));
    }
}
