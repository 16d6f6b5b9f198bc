#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use finsage::db::{self, SharedConnection};
use finsage::embedding::EmbeddingProvider;
use finsage::generation::{GenerationError, GenerationRequest, NarrativeGenerator};
use finsage::knowledge::index::{Metric, StaticIndex};
use finsage::knowledge::pipeline::{ResolutionPipeline, ResolutionSettings};
use finsage::knowledge::static_store;
use finsage::knowledge::types::NewStaticEntry;
use rusqlite::Connection;

pub const DIM: usize = 384;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    db::schema::init_schema(&conn).unwrap();
    db::migrations::run_migrations(&mut conn).unwrap();
    conn
}

pub fn shared(conn: Connection) -> SharedConnection {
    Arc::new(Mutex::new(conn))
}

/// Generate a deterministic 384-dim embedding with a spike at position `seed`.
/// Each seed produces a distinct, orthogonal vector.
pub fn test_embedding(seed: u16) -> Vec<f32> {
    let mut v = vec![0.0f32; DIM];
    v[seed as usize % DIM] = 1.0;
    v
}

/// Embeds known texts to fixed vectors; anything else lands at `fallback`.
pub struct TableEmbedder {
    table: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
}

impl TableEmbedder {
    pub fn new(entries: &[(&str, Vec<f32>)], fallback: Vec<f32>) -> Self {
        Self {
            table: entries
                .iter()
                .map(|(text, v)| (text.to_string(), v.clone()))
                .collect(),
            fallback,
        }
    }
}

impl EmbeddingProvider for TableEmbedder {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(self.table.get(text).cloned().unwrap_or_else(|| self.fallback.clone()))
    }

    fn model_id(&self) -> &str {
        "table"
    }
}

/// Insert a static entry with the given embedding. Returns its id.
pub fn insert_static(conn: &Connection, question: &str, answer: &str, embedding: &[f32]) -> i64 {
    let entry = NewStaticEntry {
        category: None,
        question: question.to_string(),
        answer: answer.to_string(),
        source_url: None,
    };
    static_store::upsert_entry(conn, &entry, embedding).unwrap()
}

/// Generator that returns a fixed reply (or fails) and counts calls.
pub struct ScriptedGenerator {
    pub calls: AtomicUsize,
    reply: Option<String>,
    delay: Duration,
}

impl ScriptedGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reply: Some(text.to_string()),
            delay: Duration::ZERO,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            reply: None,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NarrativeGenerator for ScriptedGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(GenerationError::Server {
                status: 503,
                body: "overloaded".into(),
            }),
        }
    }
}

/// Build a pipeline over `conn`, indexing whatever static entries it holds.
pub fn pipeline(
    conn: Connection,
    embedder: TableEmbedder,
    generator: Arc<dyn NarrativeGenerator>,
    settings: ResolutionSettings,
) -> (ResolutionPipeline, SharedConnection) {
    let entries = static_store::load_entries(&conn).unwrap();
    let index = StaticIndex::build(entries, DIM, Metric::L2);
    let db = shared(conn);
    let pipeline = ResolutionPipeline::new(
        Arc::clone(&db),
        Arc::new(embedder),
        Arc::new(index),
        generator,
        settings,
    );
    (pipeline, db)
}
