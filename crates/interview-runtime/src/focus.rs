//! Focus resolution (spec §4.7 step 4): turns a scored candidate into the
//! human-readable concept the next question will be about.

use interview_graph::NodeStateTracker;
use interview_types::{Methodology, ScoredCandidate};

/// Resolution order: (a) the selected candidate's node, looked up by id
/// in the tracker; (b) the strategy's declared `focus_description`; (c) a
/// heuristic keyed by strategy name.
pub fn resolve_focus(
    candidate: &ScoredCandidate,
    methodology: &Methodology,
    tracker: &NodeStateTracker,
) -> String {
    if let Some(slot_id) = candidate.node_id.clone() {
        if let Some(state) = tracker.get_state(&slot_id) {
            return state.label.clone();
        }
    }

    if let Some(strategy) = methodology.strategy(&candidate.strategy) {
        if let Some(description) = &strategy.focus_description {
            return description.clone();
        }
    }

    heuristic_focus(&candidate.strategy, tracker)
}

fn heuristic_focus(strategy_name: &str, tracker: &NodeStateTracker) -> String {
    if strategy_name == "close" {
        return "what we've discussed".to_string();
    }

    let most_recent = tracker
        .get_all_states()
        .into_iter()
        .max_by_key(|state| state.last_focus_turn.unwrap_or(0));

    match most_recent {
        Some(state) => state.label.clone(),
        None => "the topic".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_types::{CanonicalSlotId, PhaseBoundaries, StrategyDefinition};
    use std::collections::HashMap;

    fn methodology(strategies: Vec<StrategyDefinition>) -> Methodology {
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
            phase_boundaries: PhaseBoundaries::default(),
            strategies,
            closing_question_template: None,
            enable_srl_preprocessing: false,
        }
    }

    fn candidate(strategy: &str, node_id: Option<CanonicalSlotId>) -> ScoredCandidate {
        ScoredCandidate {
            strategy: strategy.to_string(),
            node_id,
            contributions: HashMap::new(),
            base: 0.0,
            phase_multiplier: 1.0,
            phase_bonus: 0.0,
            final_score: 0.0,
            rank: 1,
            selected: true,
        }
    }

    #[test]
    fn prefers_the_candidates_own_node_label() {
        let mut tracker = NodeStateTracker::new();
        let slot_id = CanonicalSlotId::generate();
        tracker.register_node(&slot_id, "oat milk texture", "attribute", 0);
        let c = candidate("deepen", Some(slot_id));
        assert_eq!(resolve_focus(&c, &methodology(vec![]), &tracker), "oat milk texture");
    }

    #[test]
    fn falls_back_to_strategy_focus_description() {
        let tracker = NodeStateTracker::new();
        let mut strategy = StrategyDefinition {
            name: "broaden".into(),
            technique: None,
            weights: Default::default(),
            phase_bonus: Default::default(),
            phase_multiplier: Default::default(),
            generates_closing_question: false,
            focus_description: Some("new attributes".into()),
        };
        strategy.name = "broaden".into();
        let c = candidate("broaden", None);
        assert_eq!(resolve_focus(&c, &methodology(vec![strategy]), &tracker), "new attributes");
    }

    #[test]
    fn close_strategy_heuristic_is_literal() {
        let tracker = NodeStateTracker::new();
        let c = candidate("close", None);
        assert_eq!(resolve_focus(&c, &methodology(vec![]), &tracker), "what we've discussed");
    }

    #[test]
    fn no_nodes_falls_back_to_the_topic() {
        let tracker = NodeStateTracker::new();
        let c = candidate("deepen", None);
        assert_eq!(resolve_focus(&c, &methodology(vec![]), &tracker), "the topic");
    }
}
