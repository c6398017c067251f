//! Methodology configuration schema (spec §4.5, §4.6, §4.8; §6 "YAML
//! methodology loading ... treated as parsed configuration"). This crate
//! only owns the shape; parsing YAML (with anchor-merge support) into it
//! is `interview-runtime`'s job.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// `(edge_type, source_node_type, target_node_type)` — one row of the
/// methodology's allowed transition table.
pub type Transition = (String, String, String);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyDefinition {
    pub name: String,
    /// Question-generation hint (e.g. "laddering", "contrast") — passed
    /// through to the LLM prompt, distinct from `name` which the scoring
    /// engine and tracker key on.
    #[serde(default)]
    pub technique: Option<String>,
    #[serde(default)]
    pub weights: HashMap<String, f64>,
    #[serde(default)]
    pub phase_bonus: HashMap<String, f64>,
    #[serde(default = "default_phase_multiplier")]
    pub phase_multiplier: HashMap<String, f64>,
    #[serde(default)]
    pub generates_closing_question: bool,
    #[serde(default)]
    pub focus_description: Option<String>,
}

fn default_phase_multiplier() -> HashMap<String, f64> {
    [("exploratory", 1.0), ("focused", 1.0), ("closing", 1.0)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

impl StrategyDefinition {
    pub fn weight_for(&self, key: &str) -> f64 {
        self.weights.get(key).copied().unwrap_or(0.0)
    }

    pub fn phase_bonus_for(&self, phase: &str) -> f64 {
        self.phase_bonus.get(phase).copied().unwrap_or(0.0)
    }

    pub fn phase_multiplier_for(&self, phase: &str) -> f64 {
        self.phase_multiplier.get(phase).copied().unwrap_or(1.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseBoundaries {
    #[serde(default = "default_early_max")]
    pub early_max: u32,
    #[serde(default = "default_mid_max")]
    pub mid_max: u32,
    #[serde(default = "default_orphan_mid")]
    pub orphan_mid: u32,
}

fn default_early_max() -> u32 {
    3
}
fn default_mid_max() -> u32 {
    8
}
fn default_orphan_mid() -> u32 {
    2
}

impl Default for PhaseBoundaries {
    fn default() -> Self {
        Self { early_max: default_early_max(), mid_max: default_mid_max(), orphan_mid: default_orphan_mid() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Methodology {
    pub id: String,
    pub name: String,

    /// Surface/canonical node types this methodology recognizes. A concept
    /// whose `node_type` is outside this set is dropped at ingestion.
    pub node_types: Vec<String>,
    /// Surface edge types this methodology recognizes.
    pub edge_types: Vec<String>,
    /// Allowed `(edge_type, source_type, target_type)` transitions. A
    /// relationship outside this table is dropped at ingestion.
    pub transitions: Vec<Transition>,

    /// Node types considered "terminal" for `missing_terminal_value`.
    #[serde(default)]
    pub terminal_node_types: Vec<String>,

    /// Reasoning-chain rungs (e.g. 5 for a means-end chain: attribute ->
    /// functional consequence -> psychosocial consequence -> instrumental
    /// value -> terminal value). No default — callers must fail loudly
    /// when a methodology omits it (spec §9 Open Question 1).
    pub ladder_length: u32,

    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    #[serde(default)]
    pub type_priority: HashMap<String, f64>,

    #[serde(default)]
    pub phase_boundaries: PhaseBoundaries,

    pub strategies: Vec<StrategyDefinition>,

    #[serde(default)]
    pub closing_question_template: Option<String>,

    /// Gates stage 2.5 SRL preprocessing (spec §4.8). Off by default: no
    /// methodology in this crate relies on discourse markers yet.
    #[serde(default)]
    pub enable_srl_preprocessing: bool,
}

fn default_similarity_threshold() -> f64 {
    0.88
}

impl Methodology {
    pub fn allows_node_type(&self, node_type: &str) -> bool {
        self.node_types.iter().any(|t| t == node_type)
    }

    pub fn allows_transition(&self, edge_type: &str, source_type: &str, target_type: &str) -> bool {
        self.transitions
            .iter()
            .any(|(e, s, t)| e == edge_type && s == source_type && t == target_type)
    }

    pub fn type_priority_for(&self, node_type: &str) -> f64 {
        self.type_priority.get(node_type).copied().unwrap_or(0.5)
    }

    pub fn strategy(&self, name: &str) -> Option<&StrategyDefinition> {
        self.strategies.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptElement {
    pub id: i64,
    pub label: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConceptContext {
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub insight: Option<String>,
}

/// Loaded once per process and cached (spec §4.3 component definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConceptConfig {
    pub id: String,
    pub name: String,
    pub methodology: String,
    #[serde(default)]
    pub context: ConceptContext,
    pub elements: Vec<ConceptElement>,
}
