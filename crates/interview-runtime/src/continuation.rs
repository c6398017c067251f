//! Continuation policy (spec §4.9, stage 9).

use interview_types::{ContinuationOutput, GraphState};

pub fn evaluate(
    turn_number: u32,
    max_turns: u32,
    generates_closing_question: bool,
    graph_state: &GraphState,
) -> ContinuationOutput {
    if turn_number >= max_turns {
        return ContinuationOutput { should_continue: false, reason: "max_turns reached".into() };
    }

    if generates_closing_question {
        return ContinuationOutput { should_continue: false, reason: "strategy generates a closing question".into() };
    }

    if let Some(saturation) = &graph_state.saturation_metrics {
        if saturation.is_saturated() {
            return ContinuationOutput { should_continue: false, reason: "information saturation reached".into() };
        }
    }

    ContinuationOutput { should_continue: true, reason: "interview in progress".into() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_types::{Phase, SaturationMetrics};

    fn graph_state(saturation: Option<SaturationMetrics>) -> GraphState {
        GraphState {
            node_count: 0,
            edge_count: 0,
            nodes_by_type: Default::default(),
            edges_by_type: Default::default(),
            orphan_count: 0,
            depth_metrics: Default::default(),
            saturation_metrics: saturation,
            current_phase: Phase::Exploratory,
            turn_count: 0,
            strategy_history: Default::default(),
            computed_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn stops_at_max_turns() {
        let out = evaluate(10, 10, false, &graph_state(None));
        assert!(!out.should_continue);
    }

    #[test]
    fn stops_on_closing_strategy() {
        let out = evaluate(2, 10, true, &graph_state(None));
        assert!(!out.should_continue);
    }

    #[test]
    fn stops_on_saturation() {
        let saturation = SaturationMetrics { chao1_ratio: 0.95, consecutive_low_info: 0, new_info_rate: 0.5 };
        let out = evaluate(2, 10, false, &graph_state(Some(saturation)));
        assert!(!out.should_continue);
    }

    #[test]
    fn continues_otherwise() {
        let out = evaluate(2, 10, false, &graph_state(None));
        assert!(out.should_continue);
    }
}
