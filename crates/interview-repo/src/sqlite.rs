use std::path::Path;

use async_trait::async_trait;
use interview_core::label_key;
use interview_types::{
    CanonicalEdge, CanonicalSlot, CanonicalSlotId, KGEdge, KGNode, NodeId, NodeState,
    ScoredCandidate, Session, SessionId, SurfaceToSlotMapping, Utterance, UtteranceId,
};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::schema::init_schema;
use crate::traits::{
    CanonicalRepository, NodeStateRepository, ScoringRepository, SessionRepository,
    SurfaceGraphRepository, UtteranceRepository,
};

/// SQLite-backed store. A single [`Connection`] guarded by a `tokio::Mutex`
/// — every method holds the lock for the duration of one statement, safe
/// to share across the async runtime's worker threads.
pub struct SqliteRepositories {
    conn: Mutex<Connection>,
}

impl SqliteRepositories {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn from_json<T: serde::de::DeserializeOwned>(raw: String) -> Result<T> {
    Ok(serde_json::from_str(&raw)?)
}

#[async_trait]
impl SessionRepository for SqliteRepositories {
    async fn create_session(&self, session: &Session) -> Result<()> {
        self.save_session(session).await
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<Session>> {
        let conn = self.conn.lock().await;
        let row: Option<String> = conn
            .query_row("SELECT data FROM sessions WHERE id = ?1", [id.as_str()], |r| r.get(0))
            .optional()?;
        row.map(from_json).transpose()
    }

    async fn save_session(&self, session: &Session) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO sessions (id, data) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET data = ?2",
            params![session.id.as_str(), to_json(session)?],
        )?;
        Ok(())
    }
}

#[async_trait]
impl UtteranceRepository for SqliteRepositories {
    async fn save_utterance(&self, session_id: &SessionId, utterance: &Utterance) -> Result<()> {
        let conn = self.conn.lock().await;
        let seq: i64 = conn.query_row(
            "SELECT COALESCE(MAX(seq), -1) + 1 FROM utterances WHERE session_id = ?1",
            [session_id.as_str()],
            |r| r.get(0),
        )?;
        conn.execute(
            "INSERT INTO utterances (id, session_id, seq, data) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET data = ?4",
            params![utterance.id.as_str(), session_id.as_str(), seq, to_json(utterance)?],
        )?;
        Ok(())
    }

    async fn get_utterance(&self, id: &UtteranceId) -> Result<Option<Utterance>> {
        let conn = self.conn.lock().await;
        let row: Option<String> = conn
            .query_row("SELECT data FROM utterances WHERE id = ?1", [id.as_str()], |r| r.get(0))
            .optional()?;
        row.map(from_json).transpose()
    }

    async fn recent_utterances(&self, session_id: &SessionId, limit: usize) -> Result<Vec<Utterance>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT data FROM utterances WHERE session_id = ?1 ORDER BY seq DESC LIMIT ?2",
        )?;
        let mut rows: Vec<Utterance> = stmt
            .query_map(params![session_id.as_str(), limit as i64], |r| r.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .map(from_json)
            .collect::<Result<Vec<_>>>()?;
        rows.reverse();
        Ok(rows)
    }
}

#[async_trait]
impl SurfaceGraphRepository for SqliteRepositories {
    async fn upsert_node(&self, node: &KGNode) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO surface_nodes (id, session_id, label_key, is_active, data)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET label_key = ?3, is_active = ?4, data = ?5",
            params![
                node.id.as_str(),
                node.session_id.as_str(),
                label_key(&node.label),
                node.is_active(),
                to_json(node)?
            ],
        )?;
        Ok(())
    }

    async fn upsert_edge(&self, edge: &KGEdge) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO surface_edges (id, session_id, data) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET data = ?3",
            params![edge.id.as_str(), edge.session_id.as_str(), to_json(edge)?],
        )?;
        Ok(())
    }

    async fn get_node(&self, id: &NodeId) -> Result<Option<KGNode>> {
        let conn = self.conn.lock().await;
        let row: Option<String> = conn
            .query_row("SELECT data FROM surface_nodes WHERE id = ?1", [id.as_str()], |r| r.get(0))
            .optional()?;
        row.map(from_json).transpose()
    }

    async fn find_active_node_by_label(&self, session_id: &SessionId, label: &str) -> Result<Option<KGNode>> {
        let conn = self.conn.lock().await;
        let row: Option<String> = conn
            .query_row(
                "SELECT data FROM surface_nodes WHERE session_id = ?1 AND label_key = ?2 AND is_active = 1",
                params![session_id.as_str(), label_key(label)],
                |r| r.get(0),
            )
            .optional()?;
        row.map(from_json).transpose()
    }

    async fn active_nodes(&self, session_id: &SessionId) -> Result<Vec<KGNode>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT data FROM surface_nodes WHERE session_id = ?1 AND is_active = 1",
        )?;
        stmt.query_map([session_id.as_str()], |r| r.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .map(from_json)
            .collect()
    }

    async fn edges_for_session(&self, session_id: &SessionId) -> Result<Vec<KGEdge>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT data FROM surface_edges WHERE session_id = ?1")?;
        stmt.query_map([session_id.as_str()], |r| r.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .map(from_json)
            .collect()
    }
}

#[async_trait]
impl CanonicalRepository for SqliteRepositories {
    async fn upsert_slot(&self, slot: &CanonicalSlot) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO canonical_slots (id, session_id, data) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET data = ?3",
            params![slot.id.as_str(), slot.session_id.as_str(), to_json(slot)?],
        )?;
        Ok(())
    }

    async fn get_slot(&self, id: &CanonicalSlotId) -> Result<Option<CanonicalSlot>> {
        let conn = self.conn.lock().await;
        let row: Option<String> = conn
            .query_row("SELECT data FROM canonical_slots WHERE id = ?1", [id.as_str()], |r| r.get(0))
            .optional()?;
        row.map(from_json).transpose()
    }

    async fn slots_for_session(&self, session_id: &SessionId) -> Result<Vec<CanonicalSlot>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT data FROM canonical_slots WHERE session_id = ?1")?;
        stmt.query_map([session_id.as_str()], |r| r.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .map(from_json)
            .collect()
    }

    async fn save_mapping(&self, mapping: &SurfaceToSlotMapping) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO surface_slot_mappings (surface_node_id, data) VALUES (?1, ?2)
             ON CONFLICT(surface_node_id) DO UPDATE SET data = ?2",
            params![mapping.surface_node_id.as_str(), to_json(mapping)?],
        )?;
        Ok(())
    }

    async fn get_mapping(&self, surface_node_id: &NodeId) -> Result<Option<SurfaceToSlotMapping>> {
        let conn = self.conn.lock().await;
        let row: Option<String> = conn
            .query_row(
                "SELECT data FROM surface_slot_mappings WHERE surface_node_id = ?1",
                [surface_node_id.as_str()],
                |r| r.get(0),
            )
            .optional()?;
        row.map(from_json).transpose()
    }

    async fn upsert_canonical_edge(&self, edge: &CanonicalEdge) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO canonical_edges (session_id, source_slot_id, target_slot_id, edge_type, data)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(session_id, source_slot_id, target_slot_id, edge_type) DO UPDATE SET data = ?5",
            params![
                edge.session_id.as_str(),
                edge.source_slot_id.as_str(),
                edge.target_slot_id.as_str(),
                edge.edge_type,
                to_json(edge)?
            ],
        )?;
        Ok(())
    }

    async fn canonical_edges(&self, session_id: &SessionId) -> Result<Vec<CanonicalEdge>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT data FROM canonical_edges WHERE session_id = ?1")?;
        stmt.query_map([session_id.as_str()], |r| r.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .map(from_json)
            .collect()
    }
}

#[async_trait]
impl NodeStateRepository for SqliteRepositories {
    async fn upsert_node_state(&self, session_id: &SessionId, state: &NodeState) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO node_states (session_id, slot_id, data) VALUES (?1, ?2, ?3)
             ON CONFLICT(session_id, slot_id) DO UPDATE SET data = ?3",
            params![session_id.as_str(), state.slot_id.as_str(), to_json(state)?],
        )?;
        Ok(())
    }

    async fn get_node_state(&self, session_id: &SessionId, slot_id: &CanonicalSlotId) -> Result<Option<NodeState>> {
        let conn = self.conn.lock().await;
        let row: Option<String> = conn
            .query_row(
                "SELECT data FROM node_states WHERE session_id = ?1 AND slot_id = ?2",
                params![session_id.as_str(), slot_id.as_str()],
                |r| r.get(0),
            )
            .optional()?;
        row.map(from_json).transpose()
    }

    async fn node_states_for_session(&self, session_id: &SessionId) -> Result<Vec<NodeState>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT data FROM node_states WHERE session_id = ?1")?;
        stmt.query_map([session_id.as_str()], |r| r.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .map(from_json)
            .collect()
    }
}

#[async_trait]
impl ScoringRepository for SqliteRepositories {
    async fn persist_candidates(
        &self,
        session_id: &SessionId,
        turn_number: u32,
        candidates: &[ScoredCandidate],
    ) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        for candidate in candidates {
            tx.execute(
                "INSERT INTO scored_candidates (session_id, turn_number, rank, data)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(session_id, turn_number, rank) DO UPDATE SET data = ?4",
                params![session_id.as_str(), turn_number, candidate.rank, to_json(candidate)?],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_types::Utterance as Utt;
    use interview_types::Speaker;

    fn sample_session() -> Session {
        Session::new("means_end_chain", "oat_milk_v2", "Oat Milk", 20)
    }

    #[tokio::test]
    async fn session_round_trips_through_sqlite() {
        let repo = SqliteRepositories::open_in_memory().unwrap();
        let session = sample_session();
        repo.create_session(&session).await.unwrap();
        let loaded = repo.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.concept_id, "oat_milk_v2");
    }

    #[tokio::test]
    async fn recent_utterances_preserve_insertion_order() {
        let repo = SqliteRepositories::open_in_memory().unwrap();
        let session_id = SessionId::generate();
        for (turn, text) in ["first", "second", "third"].into_iter().enumerate() {
            let utt = Utt::new(session_id.clone(), turn as u32, Speaker::User, text);
            repo.save_utterance(&session_id, &utt).await.unwrap();
        }
        let recent = repo.recent_utterances(&session_id, 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].text, "second");
        assert_eq!(recent[1].text, "third");
    }

    #[tokio::test]
    async fn node_upsert_is_idempotent_and_findable_by_label() {
        let repo = SqliteRepositories::open_in_memory().unwrap();
        let session_id = SessionId::generate();
        let node = KGNode::new(session_id.clone(), "Creamy Texture", "attribute", 0.8, 1);
        repo.upsert_node(&node).await.unwrap();
        repo.upsert_node(&node).await.unwrap();

        let found = repo
            .find_active_node_by_label(&session_id, "creamy texture")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, node.id);
        assert_eq!(repo.active_nodes(&session_id).await.unwrap().len(), 1);
    }
}
