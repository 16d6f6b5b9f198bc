//! SQL DDL for the finsage tables.
//!
//! Defines `faq_static` (curated answers with their embeddings), `faq_dynamic`
//! (AI answers awaiting or holding moderation approval), `projection_log`
//! (append-only projection audit trail) and `schema_meta`. All DDL uses
//! `IF NOT EXISTS` for idempotent initialization.

use rusqlite::Connection;

const SCHEMA_SQL: &str = r#"
-- Curated, pre-approved answers
CREATE TABLE IF NOT EXISTS faq_static (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category TEXT,
    question TEXT NOT NULL UNIQUE,
    answer TEXT NOT NULL,
    source_url TEXT,
    embedding BLOB NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- AI answers queued for moderation
CREATE TABLE IF NOT EXISTS faq_dynamic (
    id TEXT PRIMARY KEY,
    question TEXT NOT NULL,
    answer TEXT NOT NULL,
    approved INTEGER NOT NULL DEFAULT 0 CHECK(approved IN (0, 1)),
    asked_by TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_faq_dynamic_approved ON faq_dynamic(approved);

-- Projection audit trail
CREATE TABLE IF NOT EXISTS projection_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    kind TEXT NOT NULL CHECK(kind IN ('savings','portfolio')),
    request TEXT NOT NULL,
    result TEXT NOT NULL,
    narrative TEXT,
    created_at TEXT NOT NULL
);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
