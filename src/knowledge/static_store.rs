//! Curated static answers.
//!
//! Entries are written only at curation time (corpus import and re-embedding).
//! The resolution pipeline reads them once, through [`load_entries`], to build
//! the static index.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;

use super::types::{KnowledgeEntry, NewStaticEntry};
use super::{blob_to_embedding, embedding_to_blob};

/// On-disk corpus format: a list of `[[faq]]` tables.
#[derive(Debug, Deserialize)]
struct StaticCorpus {
    #[serde(default)]
    faq: Vec<NewStaticEntry>,
}

/// Parse a TOML corpus file. Blank questions or answers are rejected.
pub fn parse_corpus(contents: &str) -> Result<Vec<NewStaticEntry>> {
    let corpus: StaticCorpus = toml::from_str(contents).context("failed to parse FAQ corpus TOML")?;
    for (i, entry) in corpus.faq.iter().enumerate() {
        anyhow::ensure!(
            !entry.question.trim().is_empty(),
            "faq entry {} has an empty question",
            i + 1
        );
        anyhow::ensure!(
            !entry.answer.trim().is_empty(),
            "faq entry {} ({}) has an empty answer",
            i + 1,
            entry.question
        );
    }
    Ok(corpus.faq)
}

/// All static entries in id order.
pub fn load_entries(conn: &Connection) -> rusqlite::Result<Vec<KnowledgeEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, category, question, answer, source_url, embedding FROM faq_static ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        let blob: Vec<u8> = row.get(5)?;
        Ok(KnowledgeEntry {
            id: row.get(0)?,
            category: row.get(1)?,
            question: row.get(2)?,
            answer: row.get(3)?,
            source_url: row.get(4)?,
            embedding: blob_to_embedding(&blob),
        })
    })?;
    rows.collect()
}

/// Insert a curated entry, or refresh the existing entry with the same question.
/// Returns the entry id.
pub fn upsert_entry(
    conn: &Connection,
    entry: &NewStaticEntry,
    embedding: &[f32],
) -> rusqlite::Result<i64> {
    let now = chrono::Utc::now().to_rfc3339();
    conn.query_row(
        "INSERT INTO faq_static (category, question, answer, source_url, embedding, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) \
         ON CONFLICT(question) DO UPDATE SET \
             category = excluded.category, \
             answer = excluded.answer, \
             source_url = excluded.source_url, \
             embedding = excluded.embedding, \
             updated_at = excluded.updated_at \
         RETURNING id",
        params![
            entry.category,
            entry.question.trim(),
            entry.answer.trim(),
            entry.source_url,
            embedding_to_blob(embedding),
            now,
        ],
        |row| row.get(0),
    )
}

/// Replace the stored embedding for one entry.
pub fn update_embedding(conn: &Connection, id: i64, embedding: &[f32]) -> rusqlite::Result<bool> {
    let now = chrono::Utc::now().to_rfc3339();
    let rows = conn.execute(
        "UPDATE faq_static SET embedding = ?1, updated_at = ?2 WHERE id = ?3",
        params![embedding_to_blob(embedding), now, id],
    )?;
    Ok(rows > 0)
}

pub fn get_entry(conn: &Connection, id: i64) -> rusqlite::Result<Option<KnowledgeEntry>> {
    conn.query_row(
        "SELECT id, category, question, answer, source_url, embedding FROM faq_static WHERE id = ?1",
        params![id],
        |row| {
            let blob: Vec<u8> = row.get(5)?;
            Ok(KnowledgeEntry {
                id: row.get(0)?,
                category: row.get(1)?,
                question: row.get(2)?,
                answer: row.get(3)?,
                source_url: row.get(4)?,
                embedding: blob_to_embedding(&blob),
            })
        },
    )
    .optional()
}

pub fn count_entries(conn: &Connection) -> rusqlite::Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM faq_static", [], |row| row.get(0))?;
    Ok(count as u64)
}
