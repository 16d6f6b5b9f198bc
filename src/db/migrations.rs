//! Forward-only schema migration framework.
//!
//! Tracks the schema version in `schema_meta` and runs sequential migrations
//! to bring the database up to [`CURRENT_SCHEMA_VERSION`].

use rusqlite::{params, Connection};

use crate::knowledge::dynamic_store::question_key;

/// The schema version that the current binary expects.
pub const CURRENT_SCHEMA_VERSION: u32 = 4;

/// Get the current schema version from the database.
pub fn get_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'schema_version'",
        [],
        |row| {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().unwrap_or(0))
        },
    )
}

fn update_schema_version(conn: &Connection, version: u32) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE schema_meta SET value = ?1 WHERE key = 'schema_version'",
        [version.to_string()],
    )?;
    Ok(())
}

/// Get the model identifier the static embeddings were produced with, if any.
pub fn get_embedding_model(conn: &Connection) -> rusqlite::Result<Option<String>> {
    match conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'embedding_model'",
        [],
        |row| row.get::<_, String>(0),
    ) {
        Ok(val) => Ok(Some(val)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Set the stored embedding model identifier.
pub fn set_embedding_model(conn: &Connection, model: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_meta (key, value) VALUES ('embedding_model', ?1)",
        [model],
    )?;
    Ok(())
}

/// Run any pending forward-only migrations. Each migration runs in a transaction.
pub fn run_migrations(conn: &mut Connection) -> rusqlite::Result<()> {
    let mut version = get_schema_version(conn)?;
    tracing::debug!(schema_version = version, target = CURRENT_SCHEMA_VERSION, "checking migrations");

    while version < CURRENT_SCHEMA_VERSION {
        let next = version + 1;
        tracing::info!(from = version, to = next, "running migration");

        let tx = conn.transaction()?;
        match next {
            2 => migrate_v1_to_v2(&tx)?,
            3 => migrate_v2_to_v3(&tx)?,
            4 => migrate_v3_to_v4(&tx)?,
            _ => {
                tracing::error!(version = next, "unknown migration target");
                break;
            }
        }
        update_schema_version(&tx, next)?;
        tx.commit()?;
        version = next;
    }

    Ok(())
}

/// Migration v1 → v2: record which model produced the static embeddings.
fn migrate_v1_to_v2(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('embedding_model', 'all-MiniLM-L6-v2')",
        [],
    )?;
    Ok(())
}

/// Migration v2 → v3: idempotency key and approval timestamp on dynamic answers.
fn migrate_v2_to_v3(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "ALTER TABLE faq_dynamic ADD COLUMN question_key TEXT NOT NULL DEFAULT '';
         ALTER TABLE faq_dynamic ADD COLUMN approved_at TEXT;
         CREATE INDEX IF NOT EXISTS idx_faq_dynamic_key ON faq_dynamic(question_key, approved);",
    )?;

    let rows: Vec<(String, String)> = conn
        .prepare("SELECT id, question FROM faq_dynamic")?
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare("UPDATE faq_dynamic SET question_key = ?1 WHERE id = ?2")?;
    for (id, question) in &rows {
        stmt.execute(params![question_key(question), id])?;
    }
    Ok(())
}

/// Migration v3 → v4: remember moderator rejections. Rows revoked before
/// this version cannot be told apart from unreviewed ones and stay pending.
fn migrate_v3_to_v4(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("ALTER TABLE faq_dynamic ADD COLUMN revoked_at TEXT;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        crate::db::schema::init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn get_schema_version_returns_1_on_fresh_db() {
        let conn = test_db();
        assert_eq!(get_schema_version(&conn).unwrap(), 1);
    }

    #[test]
    fn run_migrations_upgrades_to_current() {
        let mut conn = test_db();
        run_migrations(&mut conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn migration_v1_to_v2_adds_embedding_model() {
        let mut conn = test_db();
        assert!(get_embedding_model(&conn).unwrap().is_none());

        run_migrations(&mut conn).unwrap();

        let model = get_embedding_model(&conn).unwrap();
        assert_eq!(model, Some("all-MiniLM-L6-v2".to_string()));
    }

    #[test]
    fn migration_v2_to_v3_backfills_question_keys() {
        let mut conn = test_db();
        conn.execute(
            "INSERT INTO faq_dynamic (id, question, answer, approved, created_at) \
             VALUES ('legacy', '  How do  I SAVE? ', 'a', 0, '2026-01-01T00:00:00Z')",
            [],
        )
        .unwrap();

        run_migrations(&mut conn).unwrap();

        let key: String = conn
            .query_row(
                "SELECT question_key FROM faq_dynamic WHERE id = 'legacy'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(key, question_key("how do i save?"));
    }

    #[test]
    fn migration_v3_to_v4_adds_revoked_at() {
        let mut conn = test_db();
        run_migrations(&mut conn).unwrap();

        let has_column: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM pragma_table_info('faq_dynamic') WHERE name = 'revoked_at'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(has_column);
    }

    #[test]
    fn migrations_are_idempotent() {
        let mut conn = test_db();
        run_migrations(&mut conn).unwrap();
        run_migrations(&mut conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn set_and_get_embedding_model() {
        let mut conn = test_db();
        run_migrations(&mut conn).unwrap();

        set_embedding_model(&conn, "hash-384").unwrap();
        assert_eq!(get_embedding_model(&conn).unwrap(), Some("hash-384".to_string()));
    }
}
