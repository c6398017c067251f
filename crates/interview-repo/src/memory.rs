use std::collections::HashMap;

use async_trait::async_trait;
use interview_core::label_key;
use interview_types::{
    CanonicalEdge, CanonicalSlot, CanonicalSlotId, KGEdge, KGNode, NodeId, NodeState,
    ScoredCandidate, Session, SessionId, SurfaceToSlotMapping, Utterance, UtteranceId,
};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::traits::{
    CanonicalRepository, NodeStateRepository, ScoringRepository, SessionRepository,
    SurfaceGraphRepository, UtteranceRepository,
};

#[derive(Default)]
struct State {
    sessions: HashMap<SessionId, Session>,
    utterances: HashMap<UtteranceId, (SessionId, u64, Utterance)>,
    next_seq: u64,
    nodes: HashMap<NodeId, KGNode>,
    edges: HashMap<interview_types::EdgeId, KGEdge>,
    slots: HashMap<CanonicalSlotId, CanonicalSlot>,
    mappings: HashMap<NodeId, SurfaceToSlotMapping>,
    canonical_edges: HashMap<(SessionId, CanonicalSlotId, CanonicalSlotId, String), CanonicalEdge>,
    node_states: HashMap<(SessionId, CanonicalSlotId), NodeState>,
    scored_candidates: HashMap<(SessionId, u32), Vec<ScoredCandidate>>,
}

/// A pure in-process store, used by the test suite and the simulation
/// harness so neither depends on a filesystem database (spec §4 component
/// J). Mirrors the SQLite store's semantics exactly: idempotent upserts,
/// case-insensitive active-label lookup, insertion-ordered recent reads.
#[derive(Default)]
pub struct InMemoryRepositories {
    state: Mutex<State>,
}

impl InMemoryRepositories {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepositories {
    async fn create_session(&self, session: &Session) -> Result<()> {
        self.save_session(session).await
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>> {
        Ok(self.state.lock().await.sessions.get(id).cloned())
    }

    async fn save_session(&self, session: &Session) -> Result<()> {
        self.state.lock().await.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }
}

#[async_trait]
impl UtteranceRepository for InMemoryRepositories {
    async fn save_utterance(&self, session_id: &SessionId, utterance: &Utterance) -> Result<()> {
        let mut state = self.state.lock().await;
        let seq = state.next_seq;
        state.next_seq += 1;
        state
            .utterances
            .insert(utterance.id.clone(), (session_id.clone(), seq, utterance.clone()));
        Ok(())
    }

    async fn get_utterance(&self, id: &UtteranceId) -> Result<Option<Utterance>> {
        Ok(self.state.lock().await.utterances.get(id).map(|(_, _, u)| u.clone()))
    }

    async fn recent_utterances(&self, session_id: &SessionId, limit: usize) -> Result<Vec<Utterance>> {
        let state = self.state.lock().await;
        let mut matching: Vec<&(SessionId, u64, Utterance)> =
            state.utterances.values().filter(|(sid, _, _)| sid == session_id).collect();
        matching.sort_by_key(|(_, seq, _)| *seq);
        Ok(matching.into_iter().rev().take(limit).rev().map(|(_, _, u)| u.clone()).collect())
    }
}

#[async_trait]
impl SurfaceGraphRepository for InMemoryRepositories {
    async fn upsert_node(&self, node: &KGNode) -> Result<()> {
        self.state.lock().await.nodes.insert(node.id.clone(), node.clone());
        Ok(())
    }

    async fn upsert_edge(&self, edge: &KGEdge) -> Result<()> {
        self.state.lock().await.edges.insert(edge.id.clone(), edge.clone());
        Ok(())
    }

    async fn get_node(&self, id: &NodeId) -> Result<Option<KGNode>> {
        Ok(self.state.lock().await.nodes.get(id).cloned())
    }

    async fn find_active_node_by_label(&self, session_id: &SessionId, label: &str) -> Result<Option<KGNode>> {
        let key = label_key(label);
        let state = self.state.lock().await;
        Ok(state
            .nodes
            .values()
            .find(|n| &n.session_id == session_id && n.is_active() && label_key(&n.label) == key)
            .cloned())
    }

    async fn active_nodes(&self, session_id: &SessionId) -> Result<Vec<KGNode>> {
        let state = self.state.lock().await;
        Ok(state
            .nodes
            .values()
            .filter(|n| &n.session_id == session_id && n.is_active())
            .cloned()
            .collect())
    }

    async fn edges_for_session(&self, session_id: &SessionId) -> Result<Vec<KGEdge>> {
        let state = self.state.lock().await;
        Ok(state.edges.values().filter(|e| &e.session_id == session_id).cloned().collect())
    }
}

#[async_trait]
impl CanonicalRepository for InMemoryRepositories {
    async fn upsert_slot(&self, slot: &CanonicalSlot) -> Result<()> {
        self.state.lock().await.slots.insert(slot.id.clone(), slot.clone());
        Ok(())
    }

    async fn get_slot(&self, id: &CanonicalSlotId) -> Result<Option<CanonicalSlot>> {
        Ok(self.state.lock().await.slots.get(id).cloned())
    }

    async fn slots_for_session(&self, session_id: &SessionId) -> Result<Vec<CanonicalSlot>> {
        let state = self.state.lock().await;
        Ok(state.slots.values().filter(|s| &s.session_id == session_id).cloned().collect())
    }

    async fn save_mapping(&self, mapping: &SurfaceToSlotMapping) -> Result<()> {
        self.state.lock().await.mappings.insert(mapping.surface_node_id.clone(), mapping.clone());
        Ok(())
    }

    async fn get_mapping(&self, surface_node_id: &NodeId) -> Result<Option<SurfaceToSlotMapping>> {
        Ok(self.state.lock().await.mappings.get(surface_node_id).cloned())
    }

    async fn upsert_canonical_edge(&self, edge: &CanonicalEdge) -> Result<()> {
        let key = (edge.session_id.clone(), edge.source_slot_id.clone(), edge.target_slot_id.clone(), edge.edge_type.clone());
        self.state.lock().await.canonical_edges.insert(key, edge.clone());
        Ok(())
    }

    async fn canonical_edges(&self, session_id: &SessionId) -> Result<Vec<CanonicalEdge>> {
        let state = self.state.lock().await;
        Ok(state
            .canonical_edges
            .values()
            .filter(|e| &e.session_id == session_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NodeStateRepository for InMemoryRepositories {
    async fn upsert_node_state(&self, session_id: &SessionId, state: &NodeState) -> Result<()> {
        self.state
            .lock()
            .await
            .node_states
            .insert((session_id.clone(), state.slot_id.clone()), state.clone());
        Ok(())
    }

    async fn get_node_state(&self, session_id: &SessionId, slot_id: &CanonicalSlotId) -> Result<Option<NodeState>> {
        Ok(self
            .state
            .lock()
            .await
            .node_states
            .get(&(session_id.clone(), slot_id.clone()))
            .cloned())
    }

    async fn node_states_for_session(&self, session_id: &SessionId) -> Result<Vec<NodeState>> {
        let state = self.state.lock().await;
        Ok(state
            .node_states
            .iter()
            .filter(|((sid, _), _)| sid == session_id)
            .map(|(_, v)| v.clone())
            .collect())
    }
}

#[async_trait]
impl ScoringRepository for InMemoryRepositories {
    async fn persist_candidates(
        &self,
        session_id: &SessionId,
        turn_number: u32,
        candidates: &[ScoredCandidate],
    ) -> Result<()> {
        self.state
            .lock()
            .await
            .scored_candidates
            .insert((session_id.clone(), turn_number), candidates.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_types::Speaker;

    #[tokio::test]
    async fn active_node_lookup_is_case_insensitive() {
        let repo = InMemoryRepositories::new();
        let session_id = SessionId::generate();
        let node = KGNode::new(session_id.clone(), "Creamy Texture", "attribute", 0.8, 1);
        repo.upsert_node(&node).await.unwrap();
        let found = repo.find_active_node_by_label(&session_id, "creamy texture").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn recent_utterances_respect_insertion_order_and_limit() {
        let repo = InMemoryRepositories::new();
        let session_id = SessionId::generate();
        for (turn, text) in ["a", "b", "c"].into_iter().enumerate() {
            let utt = Utterance::new(session_id.clone(), turn as u32, Speaker::User, text);
            repo.save_utterance(&session_id, &utt).await.unwrap();
        }
        let recent = repo.recent_utterances(&session_id, 2).await.unwrap();
        assert_eq!(recent.iter().map(|u| u.text.as_str()).collect::<Vec<_>>(), vec!["b", "c"]);
    }
}
