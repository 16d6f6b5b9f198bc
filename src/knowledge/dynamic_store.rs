//! AI-generated answers and their moderation lifecycle.
//!
//! Every fallback generation appends one unapproved row. Only a moderation
//! action flips `approved`; rows are never deleted here. Lookups that answer
//! questions ([`find_approved_containing`]) only ever see approved rows.
//! A revoked row carries `revoked_at` and drops out of the pending queue, so
//! it is never handed out again as a reusable pending answer.

use rusqlite::{params, Connection, OptionalExtension, Row};
use sha2::{Digest, Sha256};

use super::types::DynamicEntry;

const COLUMNS: &str =
    "id, question, answer, approved, asked_by, created_at, approved_at, revoked_at";

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<DynamicEntry> {
    Ok(DynamicEntry {
        id: row.get(0)?,
        question: row.get(1)?,
        answer: row.get(2)?,
        approved: row.get(3)?,
        asked_by: row.get(4)?,
        created_at: row.get(5)?,
        approved_at: row.get(6)?,
        revoked_at: row.get(7)?,
    })
}

/// Idempotency key for a question: SHA-256 of the trimmed, lowercased,
/// whitespace-collapsed text.
pub fn question_key(question: &str) -> String {
    let normalized = question
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    hex::encode(Sha256::digest(normalized.as_bytes()))
}

/// Append a new unapproved answer.
pub fn insert_pending(
    conn: &Connection,
    question: &str,
    answer: &str,
    asked_by: Option<&str>,
) -> rusqlite::Result<DynamicEntry> {
    let id = uuid::Uuid::now_v7().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO faq_dynamic (id, question, answer, approved, asked_by, created_at, question_key) \
         VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6)",
        params![id, question, answer, asked_by, now, question_key(question)],
    )?;

    Ok(DynamicEntry {
        id,
        question: question.to_string(),
        answer: answer.to_string(),
        approved: false,
        asked_by: asked_by.map(str::to_string),
        created_at: now,
        approved_at: None,
        revoked_at: None,
    })
}

/// First approved entry, in insertion order, whose question contains `query`
/// as a case-insensitive substring.
pub fn find_approved_containing(
    conn: &Connection,
    query: &str,
) -> rusqlite::Result<Option<DynamicEntry>> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return Ok(None);
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM faq_dynamic WHERE approved = 1 ORDER BY rowid"
    ))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let question: String = row.get(1)?;
        // Unicode-aware folding; SQLite's LIKE only folds ASCII
        if question.to_lowercase().contains(&needle) {
            return row_to_entry(row).map(Some);
        }
    }
    Ok(None)
}

/// Oldest entry still awaiting review for the same normalized question.
pub fn find_pending_by_key(conn: &Connection, key: &str) -> rusqlite::Result<Option<DynamicEntry>> {
    conn.query_row(
        &format!(
            "SELECT {COLUMNS} FROM faq_dynamic \
             WHERE question_key = ?1 AND approved = 0 AND revoked_at IS NULL \
             ORDER BY rowid LIMIT 1"
        ),
        params![key],
        row_to_entry,
    )
    .optional()
}

pub fn get_entry(conn: &Connection, id: &str) -> rusqlite::Result<Option<DynamicEntry>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM faq_dynamic WHERE id = ?1"),
        params![id],
        row_to_entry,
    )
    .optional()
}

/// Set the moderation flag. Approving stamps `approved_at`; revoking stamps
/// `revoked_at`. Returns the updated entry, or `None` for an unknown id.
pub fn set_approval(
    conn: &Connection,
    id: &str,
    approved: bool,
) -> rusqlite::Result<Option<DynamicEntry>> {
    let now = chrono::Utc::now().to_rfc3339();
    let (approved_at, revoked_at) = if approved {
        (Some(now), None)
    } else {
        (None, Some(now))
    };
    let rows = conn.execute(
        "UPDATE faq_dynamic SET approved = ?1, approved_at = ?2, revoked_at = ?3 WHERE id = ?4",
        params![approved, approved_at, revoked_at, id],
    )?;
    if rows == 0 {
        return Ok(None);
    }
    get_entry(conn, id)
}

/// Entries awaiting review, oldest first. Revoked entries are excluded.
pub fn list_pending(conn: &Connection, limit: usize) -> rusqlite::Result<Vec<DynamicEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM faq_dynamic \
         WHERE approved = 0 AND revoked_at IS NULL ORDER BY rowid LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit as i64], row_to_entry)?;
    rows.collect()
}

/// `(approved, pending)` counts. Revoked entries count as neither.
pub fn count_by_status(conn: &Connection) -> rusqlite::Result<(u64, u64)> {
    let (approved, pending): (i64, i64) = conn.query_row(
        "SELECT COALESCE(SUM(approved = 1), 0), \
                COALESCE(SUM(approved = 0 AND revoked_at IS NULL), 0) \
         FROM faq_dynamic",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok((approved as u64, pending as u64))
}
