//! Sample methodology/concept fixtures (spec §8 scenarios S1-S6), returning
//! typed structs directly rather than files on disk — the simulation
//! harness and unit tests across the workspace build sessions from these.

use std::collections::HashMap;

use interview_types::{ConceptConfig, ConceptContext, ConceptElement, Methodology, PhaseBoundaries, StrategyDefinition};

fn strategy(
    name: &str,
    technique: &str,
    weights: &[(&str, f64)],
    phase_bonus: &[(&str, f64)],
    phase_multiplier: &[(&str, f64)],
    generates_closing_question: bool,
    focus_description: Option<&str>,
) -> StrategyDefinition {
    StrategyDefinition {
        name: name.to_string(),
        technique: Some(technique.to_string()),
        weights: weights.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        phase_bonus: phase_bonus.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        phase_multiplier: phase_multiplier.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        generates_closing_question,
        focus_description: focus_description.map(str::to_string),
    }
}

/// A five-rung means-end chain (attribute -> functional consequence ->
/// psychosocial consequence -> instrumental value -> terminal value), the
/// methodology every scenario in spec §8 runs against.
pub fn means_end_chain_methodology() -> Methodology {
    Methodology {
        id: "means_end_chain".into(),
        name: "Means-End Chain".into(),
        node_types: vec![
            "statement".into(),
            "attribute".into(),
            "functional_consequence".into(),
            "psychosocial_consequence".into(),
            "instrumental_value".into(),
            "terminal_value".into(),
        ],
        edge_types: vec!["leads_to".into(), "revises".into()],
        transitions: vec![
            ("leads_to".into(), "statement".into(), "attribute".into()),
            ("leads_to".into(), "attribute".into(), "functional_consequence".into()),
            ("leads_to".into(), "functional_consequence".into(), "psychosocial_consequence".into()),
            ("leads_to".into(), "psychosocial_consequence".into(), "instrumental_value".into()),
            ("leads_to".into(), "instrumental_value".into(), "terminal_value".into()),
            ("revises".into(), "attribute".into(), "attribute".into()),
        ],
        terminal_node_types: vec!["terminal_value".into()],
        ladder_length: 5,
        similarity_threshold: 0.88,
        type_priority: HashMap::new(),
        phase_boundaries: PhaseBoundaries::default(),
        strategies: vec![
            strategy(
                "deepen",
                "laddering",
                &[("meta.node.opportunity.probe_deeper", 0.6), ("graph.node.exhausted.true", -0.6)],
                &[],
                &[("exploratory", 1.0), ("focused", 1.2), ("closing", 0.8)],
                false,
                None,
            ),
            strategy(
                "broaden",
                "expansion",
                &[("meta.node.opportunity.fresh", 0.6), ("graph.node.exhausted.true", -0.5)],
                &[],
                &[("exploratory", 1.2), ("focused", 1.0), ("closing", 0.7)],
                false,
                None,
            ),
            strategy(
                "contrast",
                "contrast",
                &[("llm.sentiment.positive", 0.3), ("graph.node.is_current_focus", 0.4)],
                &[],
                &[("exploratory", 0.9), ("focused", 1.1), ("closing", 0.8)],
                false,
                None,
            ),
            strategy(
                "close",
                "closing",
                &[("meta.interview.phase.closing", 1.0)],
                &[("closing", 0.5)],
                &[("exploratory", 0.2), ("focused", 0.5), ("closing", 2.0)],
                true,
                Some("what we've discussed"),
            ),
        ],
        closing_question_template: Some(
            "Thinking about everything we've discussed, what matters most to you here?".into(),
        ),
        enable_srl_preprocessing: false,
    }
}

/// The S1-S6 concept pack: oat milk, a plant-based dairy alternative.
pub fn oat_milk_concept() -> ConceptConfig {
    ConceptConfig {
        id: "oat_milk_v2".into(),
        name: "Oat Milk".into(),
        methodology: "means_end_chain".into(),
        context: ConceptContext {
            objective: Some("Understand what drives preference for oat milk over dairy and other plant milks".into()),
            topic: Some("oat milk".into()),
            insight: None,
        },
        elements: vec![
            ConceptElement { id: 1, label: "creamy texture".into(), aliases: vec!["creaminess".into()] },
            ConceptElement { id: 2, label: "oat flavor".into(), aliases: vec!["oaty taste".into()] },
            ConceptElement { id: 3, label: "sustainability".into(), aliases: vec!["eco-friendly".into()] },
        ],
    }
}
