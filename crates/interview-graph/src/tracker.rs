//! Per-canonical-slot engagement/yield/exhaustion state machine (spec
//! §4.4). Every method is a synchronous, pure mutation over an in-memory
//! map — callers resolve the surface `NodeId` to a `CanonicalSlotId`
//! (or fall back to the surface id verbatim) before calling in, matching
//! the split in `node_state_tracker.py` between the async slot-resolution
//! wrapper and this pure core.

use std::collections::HashMap;

use interview_types::{CanonicalSlotId, GraphChangeSummary, NodeState, ResponseDepth};

#[derive(Debug, Default)]
pub struct NodeStateTracker {
    states: HashMap<CanonicalSlotId, NodeState>,
    current_focus: Option<CanonicalSlotId>,
}

impl NodeStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_states(states: Vec<NodeState>) -> Self {
        Self {
            states: states.into_iter().map(|s| (s.slot_id.clone(), s)).collect(),
            current_focus: None,
        }
    }

    /// Creates a `NodeState` if absent, preserving `created_at_turn` on
    /// replay (idempotent under repeated registration of the same slot).
    pub fn register_node(&mut self, slot_id: &CanonicalSlotId, label: &str, node_type: &str, turn: u32) {
        self.states
            .entry(slot_id.clone())
            .or_insert_with(|| NodeState::new(slot_id.clone(), label, node_type, turn));
    }

    /// Increments `focus_count` for `slot_id`, resets its streak relative
    /// to the previous focus, and ages every *other* tracked slot's
    /// `turns_since_last_focus` by one.
    pub fn update_focus(&mut self, slot_id: &CanonicalSlotId, turn: u32, strategy: &str) {
        let previous_focus = self.current_focus.clone();

        for (id, state) in self.states.iter_mut() {
            if id != slot_id {
                state.turns_since_last_focus += 1;
            }
        }

        if let Some(state) = self.states.get_mut(slot_id) {
            state.focus_count += 1;
            state.last_focus_turn = Some(turn);
            state.turns_since_last_focus = 0;
            state.current_focus_streak =
                if previous_focus.as_ref() == Some(slot_id) { state.current_focus_streak + 1 } else { 1 };

            *state.strategy_usage_count.entry(strategy.to_string()).or_insert(0) += 1;
            state.consecutive_same_strategy =
                if state.last_strategy.as_deref() == Some(strategy) { state.consecutive_same_strategy + 1 } else { 1 };
            state.last_strategy = Some(strategy.to_string());
        }

        self.current_focus = Some(slot_id.clone());
    }

    /// Records a yield iff `changes` produced any net graph delta. Yielding
    /// resets the focus streak — sustained engagement that produces
    /// nothing new does not count as a "deepening" streak.
    pub fn record_yield(&mut self, slot_id: &CanonicalSlotId, turn: u32, changes: &GraphChangeSummary) {
        if !changes.produced_yield() {
            return;
        }
        if let Some(state) = self.states.get_mut(slot_id) {
            state.yield_count += 1;
            state.last_yield_turn = Some(turn);
            state.turns_since_last_yield = 0;
            state.recompute_yield_rate();
            state.current_focus_streak = 0;
        }
    }

    /// Appends a response-depth observation to the slot that was focused
    /// when the question producing this response was asked.
    pub fn append_response_signal(&mut self, slot_id: &CanonicalSlotId, depth: ResponseDepth) {
        if let Some(state) = self.states.get_mut(slot_id) {
            state.response_depths.push(depth);
        }
    }

    /// Counts one surface mention (creation, merge, or paraphrase
    /// re-mention) routed into `slot_id` this turn — feeds `slot_saturation`.
    pub fn record_mention(&mut self, slot_id: &CanonicalSlotId) {
        if let Some(state) = self.states.get_mut(slot_id) {
            state.mention_count += 1;
        }
    }

    pub fn update_edge_counts(&mut self, slot_id: &CanonicalSlotId, delta_out: i32, delta_in: i32) {
        if let Some(state) = self.states.get_mut(slot_id) {
            state.edge_count_out = (state.edge_count_out as i64 + delta_out as i64).max(0) as u32;
            state.edge_count_in = (state.edge_count_in as i64 + delta_in as i64).max(0) as u32;
        }
    }

    pub fn get_state(&self, slot_id: &CanonicalSlotId) -> Option<&NodeState> {
        self.states.get(slot_id)
    }

    pub fn get_all_states(&self) -> Vec<&NodeState> {
        self.states.values().collect()
    }

    pub fn into_states(self) -> Vec<NodeState> {
        self.states.into_values().collect()
    }
}
