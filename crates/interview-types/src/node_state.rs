use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::CanonicalSlotId;

/// Response-depth label; the fixed vocabulary `llm.response_depth` emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseDepth {
    Surface,
    Shallow,
    Moderate,
    Deep,
}

impl ResponseDepth {
    pub fn is_shallow_ish(&self) -> bool {
        matches!(self, ResponseDepth::Surface | ResponseDepth::Shallow)
    }
}

/// Per-slot engagement/yield/exhaustion state, keyed by `CanonicalSlotId`
/// (or the surface `NodeId` string directly when canonical slots are
/// disabled — the tracker is agnostic to which id space the key comes
/// from). Persists across turns inside `Session.state`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeState {
    pub slot_id: CanonicalSlotId,
    pub label: String,
    pub node_type: String,
    pub created_at_turn: u32,

    // Engagement
    pub focus_count: u32,
    pub last_focus_turn: Option<u32>,
    pub turns_since_last_focus: u32,
    pub current_focus_streak: u32,

    // Yield
    pub yield_count: u32,
    pub last_yield_turn: Option<u32>,
    pub turns_since_last_yield: u32,
    pub yield_rate: f64,

    // Response-depth log, ordered oldest-first.
    pub response_depths: Vec<ResponseDepth>,

    // Edge degree
    pub edge_count_out: u32,
    pub edge_count_in: u32,

    /// Total surface mentions (creations + merges + paraphrase re-mentions)
    /// routed into this slot — the `support(s)` scoring uses for
    /// `slot_saturation` (spec §4.3).
    pub mention_count: u32,

    // Strategy usage
    pub strategy_usage_count: HashMap<String, u32>,
    pub last_strategy: Option<String>,
    pub consecutive_same_strategy: u32,
}

impl NodeState {
    pub fn new(slot_id: CanonicalSlotId, label: impl Into<String>, node_type: impl Into<String>, turn: u32) -> Self {
        Self {
            slot_id,
            label: label.into(),
            node_type: node_type.into(),
            created_at_turn: turn,
            focus_count: 0,
            last_focus_turn: None,
            turns_since_last_focus: 0,
            current_focus_streak: 0,
            yield_count: 0,
            last_yield_turn: None,
            turns_since_last_yield: 0,
            yield_rate: 0.0,
            response_depths: Vec::new(),
            edge_count_out: 0,
            edge_count_in: 0,
            mention_count: 0,
            strategy_usage_count: HashMap::new(),
            last_strategy: None,
            consecutive_same_strategy: 0,
        }
    }

    /// `is_orphan ⇔ out+in = 0`
    pub fn is_orphan(&self) -> bool {
        self.edge_count_out + self.edge_count_in == 0
    }

    pub fn recompute_yield_rate(&mut self) {
        self.yield_rate = self.yield_count as f64 / self.focus_count.max(1) as f64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_orphan_reflects_total_degree() {
        let mut s = NodeState::new(CanonicalSlotId::generate(), "x", "attribute", 0);
        assert!(s.is_orphan());
        s.edge_count_out = 1;
        assert!(!s.is_orphan());
    }

    #[test]
    fn yield_rate_uses_focus_count_floor_of_one() {
        let mut s = NodeState::new(CanonicalSlotId::generate(), "x", "attribute", 0);
        s.yield_count = 2;
        s.focus_count = 0;
        s.recompute_yield_rate();
        assert_eq!(s.yield_rate, 2.0);
        s.focus_count = 4;
        s.recompute_yield_rate();
        assert_eq!(s.yield_rate, 0.5);
    }
}
