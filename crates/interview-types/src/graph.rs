use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::{CanonicalSlotId, EdgeId, NodeId, SessionId, UtteranceId};

/// Stance a node's speaker holds toward its content.
pub type Stance = i8; // one of -1, 0, 1; validated at construction sites.

/// Raw extracted concept, keyed by free-form label. See spec §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KGNode {
    pub id: NodeId,
    pub session_id: SessionId,
    pub label: String,
    /// Methodology-defined node type (e.g. `attribute`, `terminal_value`).
    pub node_type: String,
    pub confidence: f64,
    pub stance: Stance,
    pub properties: HashMap<String, serde_json::Value>,
    pub source_utterance_ids: Vec<UtteranceId>,
    pub source_quotes: Vec<String>,
    pub recorded_at: DateTime<Utc>,
    /// Set when a later REVISES relationship supersedes this node.
    pub superseded_by: Option<NodeId>,
}

impl KGNode {
    pub fn new(
        session_id: SessionId,
        label: impl Into<String>,
        node_type: impl Into<String>,
        confidence: f64,
        stance: Stance,
    ) -> Self {
        Self {
            id: NodeId::generate(),
            session_id,
            label: label.into(),
            node_type: node_type.into(),
            confidence,
            stance,
            properties: HashMap::new(),
            source_utterance_ids: Vec::new(),
            source_quotes: Vec::new(),
            recorded_at: Utc::now(),
            superseded_by: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.superseded_by.is_none()
    }

    /// Add provenance for a node that was re-mentioned. Set-like: an
    /// already-present utterance id or an empty-string quote is a no-op
    /// (spec §4.2 idempotent writes, §8 round-trip properties).
    pub fn add_source_utterance(&mut self, utterance_id: UtteranceId, quote: Option<&str>) {
        if !self.source_utterance_ids.contains(&utterance_id) {
            self.source_utterance_ids.push(utterance_id);
        }
        if let Some(quote) = quote {
            if !quote.is_empty() && !self.source_quotes.iter().any(|q| q == quote) {
                self.source_quotes.push(quote.to_string());
            }
        }
    }

    pub fn linked_elements(&self) -> Vec<i64> {
        self.properties
            .get("linked_elements")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|v| v.as_i64()).collect())
            .unwrap_or_default()
    }
}

/// Edge between two active surface nodes in the same session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KGEdge {
    pub id: EdgeId,
    pub session_id: SessionId,
    pub source_node_id: NodeId,
    pub target_node_id: NodeId,
    /// Methodology-defined edge type (e.g. `leads_to`, `revises`, `is_a`).
    pub edge_type: String,
    pub confidence: f64,
    pub properties: HashMap<String, serde_json::Value>,
    pub source_utterance_ids: Vec<UtteranceId>,
    pub recorded_at: DateTime<Utc>,
}

impl KGEdge {
    pub fn new(
        session_id: SessionId,
        source_node_id: NodeId,
        target_node_id: NodeId,
        edge_type: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            id: EdgeId::generate(),
            session_id,
            source_node_id,
            target_node_id,
            edge_type: edge_type.into(),
            confidence,
            properties: HashMap::new(),
            source_utterance_ids: Vec::new(),
            recorded_at: Utc::now(),
        }
    }

    pub fn matches_triple(&self, source: &NodeId, target: &NodeId, edge_type: &str) -> bool {
        &self.source_node_id == source && &self.target_node_id == target && self.edge_type == edge_type
    }

    pub fn add_source_utterance(&mut self, utterance_id: UtteranceId) {
        if !self.source_utterance_ids.contains(&utterance_id) {
            self.source_utterance_ids.push(utterance_id);
        }
    }
}

/// The stable concept identity behind possibly many paraphrased surface
/// labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalSlot {
    pub id: CanonicalSlotId,
    pub session_id: SessionId,
    pub slot_name: String,
    pub node_type: String,
    pub created_at: DateTime<Utc>,
}

impl CanonicalSlot {
    pub fn new(session_id: SessionId, slot_name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: CanonicalSlotId::generate(),
            session_id,
            slot_name: slot_name.into(),
            node_type: node_type.into(),
            created_at: Utc::now(),
        }
    }
}

/// At most one mapping per surface node; created the moment a node enters
/// the graph (stage 4.5) and never re-targeted once set within a turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceToSlotMapping {
    pub surface_node_id: NodeId,
    pub canonical_slot_id: CanonicalSlotId,
    pub similarity_score: f64,
}

/// Edge between canonical slots, derived from surface edges by projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalEdge {
    pub session_id: SessionId,
    pub source_slot_id: CanonicalSlotId,
    pub target_slot_id: CanonicalSlotId,
    pub edge_type: String,
    pub confidence: f64,
}

/// Coarse interview stage driving score multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Exploratory,
    Focused,
    Closing,
}

/// Per-element depth ladder score.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepthMetrics {
    pub max_depth: u32,
    pub avg_depth: f64,
    pub depth_by_element: HashMap<String, f64>,
    pub longest_chain_path: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaturationMetrics {
    pub chao1_ratio: f64,
    pub consecutive_low_info: u32,
    pub new_info_rate: f64,
}

impl SaturationMetrics {
    /// `(chao1_ratio >= 0.90) or (consecutive_low_info >= 3 and new_info_rate < 0.1)`
    pub fn is_saturated(&self) -> bool {
        self.chao1_ratio >= 0.90 || (self.consecutive_low_info >= 3 && self.new_info_rate < 0.1)
    }
}

/// A fixed-capacity ring buffer that silently drops the oldest entry when
/// pushed past capacity (spec invariant: `strategy_history.len <= 30`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundedRing<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> Default for BoundedRing<T> {
    fn default() -> Self {
        Self { items: Vec::new(), capacity: 0 }
    }
}

impl<T> BoundedRing<T> {
    pub fn new(capacity: usize) -> Self {
        Self { items: Vec::with_capacity(capacity), capacity }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
        if self.items.len() > self.capacity {
            self.items.remove(0);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn tail(&self, n: usize) -> &[T] {
        let start = self.items.len().saturating_sub(n);
        &self.items[start..]
    }
}

/// Aggregate graph metrics, recomputed fresh every turn in stage 5, never
/// mutated outside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphState {
    pub node_count: u32,
    pub edge_count: u32,
    pub nodes_by_type: HashMap<String, u32>,
    pub edges_by_type: HashMap<String, u32>,
    pub orphan_count: u32,
    pub depth_metrics: DepthMetrics,
    pub saturation_metrics: Option<SaturationMetrics>,
    pub current_phase: Phase,
    pub turn_count: u32,
    pub strategy_history: BoundedRing<String>,
    /// Stamped when this state was computed; stage 6 validates this is
    /// `>=` the extraction timestamp that produced the underlying graph.
    pub computed_at: DateTime<Utc>,
}

impl GraphState {
    pub fn validate(&self) -> crate::Result<()> {
        let sum: u32 = self.nodes_by_type.values().sum();
        if sum != self.node_count {
            return Err(crate::CoreError::Validation(format!(
                "node_count {} != sum(nodes_by_type) {}",
                self.node_count, sum
            )));
        }
        if self.orphan_count > self.node_count {
            return Err(crate::CoreError::Validation(format!(
                "orphan_count {} exceeds node_count {}",
                self.orphan_count, self.node_count
            )));
        }
        if self.strategy_history.len() > 30 {
            return Err(crate::CoreError::Validation(
                "strategy_history exceeds capacity 30".to_string(),
            ));
        }
        Ok(())
    }
}
