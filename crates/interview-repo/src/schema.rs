use rusqlite::Connection;

use crate::error::Result;

// Schema-on-read: domain records are nested and still evolving across the
// pipeline's stage contracts, so each table stores its row key plus a JSON
// blob rather than a column per field. Queries that need to filter or
// order stay on plain indexed columns (session_id, turn ordering).
pub const SCHEMA_VERSION: i32 = 1;

pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if current_version != SCHEMA_VERSION {
        drop_all_tables(conn)?;
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            data TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS utterances (
            id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL,
            seq INTEGER NOT NULL,
            data TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_utterances_session ON utterances(session_id, seq);

        CREATE TABLE IF NOT EXISTS surface_nodes (
            id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL,
            label_key TEXT NOT NULL,
            is_active BOOLEAN NOT NULL,
            data TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_nodes_session ON surface_nodes(session_id);
        CREATE INDEX IF NOT EXISTS idx_nodes_label ON surface_nodes(session_id, label_key, is_active);

        CREATE TABLE IF NOT EXISTS surface_edges (
            id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL,
            data TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_edges_session ON surface_edges(session_id);

        CREATE TABLE IF NOT EXISTS canonical_slots (
            id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL,
            data TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_slots_session ON canonical_slots(session_id);

        CREATE TABLE IF NOT EXISTS surface_slot_mappings (
            surface_node_id TEXT PRIMARY KEY,
            data TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS canonical_edges (
            session_id TEXT NOT NULL,
            source_slot_id TEXT NOT NULL,
            target_slot_id TEXT NOT NULL,
            edge_type TEXT NOT NULL,
            data TEXT NOT NULL,
            PRIMARY KEY (session_id, source_slot_id, target_slot_id, edge_type)
        );

        CREATE TABLE IF NOT EXISTS node_states (
            session_id TEXT NOT NULL,
            slot_id TEXT NOT NULL,
            data TEXT NOT NULL,
            PRIMARY KEY (session_id, slot_id)
        );

        CREATE TABLE IF NOT EXISTS scored_candidates (
            session_id TEXT NOT NULL,
            turn_number INTEGER NOT NULL,
            rank INTEGER NOT NULL,
            data TEXT NOT NULL,
            PRIMARY KEY (session_id, turn_number, rank)
        );
        "#,
    )?;

    conn.execute(&format!("PRAGMA user_version = {SCHEMA_VERSION}"), [])?;
    Ok(())
}

fn drop_all_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DROP TABLE IF EXISTS scored_candidates;
        DROP TABLE IF EXISTS node_states;
        DROP TABLE IF EXISTS canonical_edges;
        DROP TABLE IF EXISTS surface_slot_mappings;
        DROP TABLE IF EXISTS canonical_slots;
        DROP TABLE IF EXISTS surface_edges;
        DROP TABLE IF EXISTS surface_nodes;
        DROP TABLE IF EXISTS utterances;
        DROP TABLE IF EXISTS sessions;
        "#,
    )?;
    Ok(())
}
