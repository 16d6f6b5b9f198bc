use rusqlite::Connection;
use serde::Serialize;

use super::{dynamic_store, static_store};

/// Store-wide counts shown by `finsage stats` and the `knowledge_stats` tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeStats {
    pub static_entries: u64,
    pub approved_dynamic: u64,
    pub pending_dynamic: u64,
    pub projection_records: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
}

pub fn knowledge_stats(conn: &Connection) -> rusqlite::Result<KnowledgeStats> {
    let static_entries = static_store::count_entries(conn)?;
    let (approved_dynamic, pending_dynamic) = dynamic_store::count_by_status(conn)?;
    let projection_records: i64 =
        conn.query_row("SELECT COUNT(*) FROM projection_log", [], |row| row.get(0))?;
    let embedding_model = crate::db::migrations::get_embedding_model(conn)?;

    Ok(KnowledgeStats {
        static_entries,
        approved_dynamic,
        pending_dynamic,
        projection_records: projection_records as u64,
        embedding_model,
    })
}
