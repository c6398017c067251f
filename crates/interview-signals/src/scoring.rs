//! Joint strategy x node scoring engine (spec §4.6).

use std::collections::HashMap;

use interview_types::{Methodology, NodeSignalMap, NodeState, ScoredCandidate, SignalMap, SignalValue};

pub struct ScoringEngine {
    methodology: Methodology,
}

impl ScoringEngine {
    pub fn new(methodology: Methodology) -> Self {
        Self { methodology }
    }

    /// Scores every `(strategy, node)` pair and returns the full ranked
    /// list, most preferred first, with `rank`/`selected` already filled
    /// in. Falls back to a single placeholder node (`node_id = None`) when
    /// `node_states` is empty (spec §4.6 "Candidate set scope").
    pub fn score(
        &self,
        global_signals: &SignalMap,
        node_signals: &NodeSignalMap,
        node_states: &[NodeState],
        current_phase: &str,
        strategy_history: &[String],
    ) -> Vec<ScoredCandidate> {
        let mut candidates: Vec<ScoredCandidate> = Vec::new();

        for strategy in &self.methodology.strategies {
            if node_states.is_empty() {
                candidates.push(self.score_one(strategy, global_signals, None, current_phase));
                continue;
            }

            for node in node_states {
                let node_overlay = node_signals.get(&node.slot_id.to_string());
                let effective = merge_signals(global_signals, node_overlay);
                let candidate = self.score_one(strategy, &effective, Some(node.slot_id.clone()), current_phase);
                candidates.push(candidate);
            }
        }

        // Stable sort descending by final score; ties broken by fewer
        // recent repetitions, then input order (already stable-preserved).
        candidates.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| recent_repetitions(strategy_history, &a.strategy).cmp(&recent_repetitions(strategy_history, &b.strategy)))
        });

        for (idx, candidate) in candidates.iter_mut().enumerate() {
            candidate.rank = idx as u32 + 1;
            candidate.selected = idx == 0;
        }

        candidates
    }

    fn score_one(
        &self,
        strategy: &interview_types::StrategyDefinition,
        effective: &SignalMap,
        node_id: Option<interview_types::CanonicalSlotId>,
        current_phase: &str,
    ) -> ScoredCandidate {
        let mut contributions = HashMap::new();
        let mut base = 0.0;
        for key in strategy.weights.keys() {
            let weight = strategy.weight_for(key);
            let contribution = weight * indicator(key, effective);
            contributions.insert(key.clone(), contribution);
            base += contribution;
        }

        let phase_bonus = strategy.phase_bonus_for(current_phase);
        let phase_multiplier = strategy.phase_multiplier_for(current_phase);
        let final_score = (base + phase_bonus) * phase_multiplier;

        ScoredCandidate {
            strategy: strategy.name.clone(),
            node_id,
            contributions,
            base,
            phase_multiplier,
            phase_bonus,
            final_score,
            rank: 0,
            selected: false,
        }
    }
}

fn merge_signals(global: &SignalMap, node_overlay: Option<&SignalMap>) -> SignalMap {
    let mut effective = global.clone();
    if let Some(overlay) = node_overlay {
        effective.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    effective
}

/// `indicator(key, effective)` (spec §4.6): a qualifier-suffixed weight
/// key (`graph.node.focus_streak.high`) matches 1 iff the signal named by
/// the part before the last dot is text equal to the suffix; otherwise
/// the key names a signal directly (boolean truthy / numeric `[0,1]`
/// value).
fn indicator(key: &str, effective: &SignalMap) -> f64 {
    if let Some(dot) = key.rfind('.') {
        let (signal_name, qualifier) = (&key[..dot], &key[dot + 1..]);
        if let Some(SignalValue::Text(value)) = effective.get(signal_name) {
            return if value == qualifier { 1.0 } else { 0.0 };
        }
    }

    match effective.get(key) {
        Some(SignalValue::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(SignalValue::Number(n)) => n.clamp(0.0, 1.0),
        Some(SignalValue::Text(t)) => {
            if t.is_empty() {
                0.0
            } else {
                1.0
            }
        }
        None => 0.0,
    }
}

fn recent_repetitions(history: &[String], strategy_name: &str) -> u32 {
    history.iter().rev().take(5).filter(|s| s.as_str() == strategy_name).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_types::{CanonicalSlotId, PhaseBoundaries, StrategyDefinition};

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

    fn strategy(name: &str, weights: Vec<(&str, f64)>) -> StrategyDefinition {
        StrategyDefinition {
            name: name.to_string(),
            technique: None,
            weights: weights.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            phase_bonus: Default::default(),
            phase_multiplier: [("exploratory".to_string(), 1.0)].into_iter().collect(),
            generates_closing_question: false,
            focus_description: None,
        }
    }

    #[test]
    fn qualifier_suffixed_weight_matches_only_exact_text_value() {
        let mut signals = SignalMap::new();
        signals.insert("graph.node.focus_streak".into(), SignalValue::Text("high".into()));
        assert_eq!(indicator("graph.node.focus_streak.high", &signals), 1.0);
        assert_eq!(indicator("graph.node.focus_streak.low", &signals), 0.0);
    }

    #[test]
    fn numeric_weight_is_used_directly_and_clamped() {
        let mut signals = SignalMap::new();
        signals.insert("graph.node.exhaustion_score".into(), SignalValue::Number(1.4));
        assert_eq!(indicator("graph.node.exhaustion_score", &signals), 1.0);
    }

    #[test]
    fn final_score_is_base_plus_bonus_times_multiplier() {
        let mut s = strategy("deepen", vec![("graph.node.is_current_focus", 1.0)]);
        s.phase_bonus.insert("exploratory".into(), 0.5);
        s.phase_multiplier.insert("exploratory".into(), 2.0);
        let engine = ScoringEngine::new(methodology(vec![s]));

        let mut globals = SignalMap::new();
        globals.insert("graph.node.is_current_focus".into(), SignalValue::Bool(true));

        let node_signals = NodeSignalMap::new();
        let node = NodeState::new(CanonicalSlotId::generate(), "x", "attribute", 0);
        let scored = engine.score(&globals, &node_signals, std::slice::from_ref(&node), "exploratory", &[]);

        let candidate = &scored[0];
        assert_eq!(candidate.base, 1.0);
        assert_eq!(candidate.final_score, (1.0 + 0.5) * 2.0);
        assert!(candidate.selected);
        assert_eq!(candidate.rank, 1);
    }

    #[test]
    fn empty_node_states_falls_back_to_placeholder_candidate() {
        let s = strategy("broaden", vec![]);
        let engine = ScoringEngine::new(methodology(vec![s]));
        let scored = engine.score(&SignalMap::new(), &NodeSignalMap::new(), &[], "exploratory", &[]);
        assert_eq!(scored.len(), 1);
        assert!(scored[0].node_id.is_none());
    }

    #[test]
    fn ties_break_toward_fewer_recent_repetitions() {
        let a = strategy("deepen", vec![]);
        let b = strategy("broaden", vec![]);
        let engine = ScoringEngine::new(methodology(vec![a, b]));
        let history = vec!["deepen".to_string(), "deepen".to_string(), "deepen".to_string()];
        let scored = engine.score(&SignalMap::new(), &NodeSignalMap::new(), &[], "exploratory", &history);
        assert_eq!(scored[0].strategy, "broaden");
    }
}
