//! Repository traits the runtime depends on (spec §4.2, §6). Every method
//! is `async` even though the SQLite implementation is internally
//! synchronous, so a future remote store (or the in-process in-memory
//! store used by tests) can implement the same seam without forcing a
//! sync/async split at the call sites in `interview-runtime`.

use async_trait::async_trait;
use interview_types::{
    CanonicalEdge, CanonicalSlot, CanonicalSlotId, KGEdge, KGNode, NodeId, NodeState,
    ScoredCandidate, Session, SessionId, SurfaceToSlotMapping, Utterance, UtteranceId,
};

use crate::error::Result;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, session: &Session) -> Result<()>;
    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>>;
    /// Full overwrite of the session row. The engine always reads a
    /// session, mutates its owned copy, and writes it back atomically
    /// per turn (spec §7: each write is its own transaction).
    async fn save_session(&self, session: &Session) -> Result<()>;
}

#[async_trait]
pub trait UtteranceRepository: Send + Sync {
    async fn save_utterance(&self, session_id: &SessionId, utterance: &Utterance) -> Result<()>;
    async fn get_utterance(&self, id: &UtteranceId) -> Result<Option<Utterance>>;
    /// Most recent `limit` utterances for a session, oldest first (the
    /// order stage 1's context-loading contract expects).
    async fn recent_utterances(&self, session_id: &SessionId, limit: usize) -> Result<Vec<Utterance>>;
}

#[async_trait]
pub trait SurfaceGraphRepository: Send + Sync {
    /// Insert-or-update by id (spec §4.2 idempotent writes).
    async fn upsert_node(&self, node: &KGNode) -> Result<()>;
    async fn upsert_edge(&self, edge: &KGEdge) -> Result<()>;
    async fn get_node(&self, id: &NodeId) -> Result<Option<KGNode>>;
    /// Case-insensitive label lookup among active (non-superseded) nodes
    /// in a session — the merge key for re-mentioned concepts (spec §4.2).
    async fn find_active_node_by_label(&self, session_id: &SessionId, label: &str) -> Result<Option<KGNode>>;
    async fn active_nodes(&self, session_id: &SessionId) -> Result<Vec<KGNode>>;
    async fn edges_for_session(&self, session_id: &SessionId) -> Result<Vec<KGEdge>>;
}

#[async_trait]
pub trait CanonicalRepository: Send + Sync {
    async fn upsert_slot(&self, slot: &CanonicalSlot) -> Result<()>;
    async fn get_slot(&self, id: &CanonicalSlotId) -> Result<Option<CanonicalSlot>>;
    async fn slots_for_session(&self, session_id: &SessionId) -> Result<Vec<CanonicalSlot>>;
    async fn save_mapping(&self, mapping: &SurfaceToSlotMapping) -> Result<()>;
    async fn get_mapping(&self, surface_node_id: &NodeId) -> Result<Option<SurfaceToSlotMapping>>;
    async fn upsert_canonical_edge(&self, edge: &CanonicalEdge) -> Result<()>;
    async fn canonical_edges(&self, session_id: &SessionId) -> Result<Vec<CanonicalEdge>>;
}

#[async_trait]
pub trait NodeStateRepository: Send + Sync {
    async fn upsert_node_state(&self, session_id: &SessionId, state: &NodeState) -> Result<()>;
    async fn get_node_state(&self, session_id: &SessionId, slot_id: &CanonicalSlotId) -> Result<Option<NodeState>>;
    async fn node_states_for_session(&self, session_id: &SessionId) -> Result<Vec<NodeState>>;
}

#[async_trait]
pub trait ScoringRepository: Send + Sync {
    async fn persist_candidates(
        &self,
        session_id: &SessionId,
        turn_number: u32,
        candidates: &[ScoredCandidate],
    ) -> Result<()>;
}

/// A store that implements every repository seam — what the runtime
/// actually holds a handle to, so it doesn't need six separate trait
/// objects wired through its constructor.
pub trait Repositories:
    SessionRepository
    + UtteranceRepository
    + SurfaceGraphRepository
    + CanonicalRepository
    + NodeStateRepository
    + ScoringRepository
{
}

impl<T> Repositories for T where
    T: SessionRepository
        + UtteranceRepository
        + SurfaceGraphRepository
        + CanonicalRepository
        + NodeStateRepository
        + ScoringRepository
{
}
