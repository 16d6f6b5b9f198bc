//! Question resolution: static match, then approved dynamic answer, then AI fallback.
//!
//! The pipeline never writes to the static store. The only write it makes is
//! appending an unapproved dynamic entry after a successful generation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::FinsageConfig;
use crate::db::{run_blocking, SharedConnection};
use crate::embedding::EmbeddingProvider;
use crate::error::{AdvisorError, AdvisorResult, ValidationError};
use crate::generation::prompts::{self, PromptSettings};
use crate::generation::{GenerationError, NarrativeGenerator};

use super::dynamic_store;
use super::index::StaticIndex;
use super::types::{DynamicEntry, Resolution};

/// Runtime knobs for [`ResolutionPipeline`].
#[derive(Debug, Clone)]
pub struct ResolutionSettings {
    /// Static matches farther than this fall through. `None` accepts the
    /// nearest entry whatever its distance.
    pub max_distance: Option<f32>,
    /// Allow at most one in-flight generation per normalized question, and
    /// reuse an existing pending answer instead of generating again.
    pub dedupe_pending: bool,
    pub timeout: Duration,
    pub prompts: PromptSettings,
}

impl ResolutionSettings {
    pub fn from_config(config: &FinsageConfig) -> Self {
        Self {
            max_distance: config.resolution.max_distance,
            dedupe_pending: config.resolution.dedupe_pending,
            timeout: Duration::from_secs(config.generation.timeout_secs),
            prompts: PromptSettings::from_config(&config.generation),
        }
    }
}

impl Default for ResolutionSettings {
    fn default() -> Self {
        Self::from_config(&FinsageConfig::default())
    }
}

type InFlight = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// Removes a question key's map slot when dropped, including when the
/// resolving future is cancelled, once no other caller holds or waits on it.
struct KeySlot<'a> {
    in_flight: &'a InFlight,
    key: String,
}

impl Drop for KeySlot<'_> {
    fn drop(&mut self) {
        let mut map = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if map.get(&self.key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            map.remove(&self.key);
        }
    }
}

pub struct ResolutionPipeline {
    db: SharedConnection,
    embedding: Arc<dyn EmbeddingProvider>,
    index: Arc<StaticIndex>,
    generator: Arc<dyn NarrativeGenerator>,
    settings: ResolutionSettings,
    in_flight: InFlight,
}

impl ResolutionPipeline {
    pub fn new(
        db: SharedConnection,
        embedding: Arc<dyn EmbeddingProvider>,
        index: Arc<StaticIndex>,
        generator: Arc<dyn NarrativeGenerator>,
        settings: ResolutionSettings,
    ) -> Self {
        Self {
            db,
            embedding,
            index,
            generator,
            settings,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &ResolutionSettings {
        &self.settings
    }

    pub fn index(&self) -> &StaticIndex {
        &self.index
    }

    /// Resolve one question through the three tiers.
    pub async fn resolve(&self, question: &str, asked_by: Option<&str>) -> AdvisorResult<Resolution> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ValidationError::new("question", "must not be empty").into());
        }

        if let Some(resolution) = self.match_static(question).await? {
            tracing::info!(
                source = %resolution.source,
                distance = ?resolution.distance,
                matched = ?resolution.matched_question,
                "question resolved"
            );
            return Ok(resolution);
        }

        if let Some(resolution) = self.match_dynamic(question).await? {
            tracing::info!(source = %resolution.source, "question resolved");
            return Ok(resolution);
        }

        let resolution = if self.settings.dedupe_pending {
            self.generate_deduplicated(question, asked_by).await?
        } else {
            self.generate_and_queue(question, asked_by).await?
        };
        tracing::info!(
            source = %resolution.source,
            entry_id = ?resolution.entry_id,
            "question resolved"
        );
        Ok(resolution)
    }

    async fn match_static(&self, question: &str) -> AdvisorResult<Option<Resolution>> {
        if self.index.is_empty() {
            tracing::debug!("static index empty, skipping static tier");
            return Ok(None);
        }

        let embedding = Arc::clone(&self.embedding);
        let text = question.to_string();
        let vector = tokio::task::spawn_blocking(move || embedding.embed(&text))
            .await
            .map_err(|e| anyhow::anyhow!("embedding task failed: {e}"))??;

        let Some(hit) = self.index.nearest(&vector) else {
            return Ok(None);
        };
        if let Some(max) = self.settings.max_distance {
            if hit.distance > max {
                tracing::debug!(distance = hit.distance, max, "nearest static entry beyond cutoff");
                return Ok(None);
            }
        }

        Ok(self
            .index
            .entry(hit.position)
            .map(|entry| {
                Resolution::from_static(
                    entry.id,
                    entry.question.clone(),
                    entry.answer.clone(),
                    hit.distance,
                )
            }))
    }

    async fn match_dynamic(&self, question: &str) -> AdvisorResult<Option<Resolution>> {
        let query = question.to_string();
        let found = run_blocking(&self.db, move |conn| {
            dynamic_store::find_approved_containing(conn, &query)
        })
        .await?;
        Ok(found.map(Resolution::from_dynamic))
    }

    async fn generate_deduplicated(
        &self,
        question: &str,
        asked_by: Option<&str>,
    ) -> AdvisorResult<Resolution> {
        let key = dynamic_store::question_key(question);
        // declared first so it drops after `lock`
        let _slot = KeySlot {
            in_flight: &self.in_flight,
            key: key.clone(),
        };
        let lock = self.key_lock(&key);
        let _guard = lock.lock().await;
        let resolution = self.reuse_or_generate(&key, question, asked_by).await;
        resolution
    }

    async fn reuse_or_generate(
        &self,
        key: &str,
        question: &str,
        asked_by: Option<&str>,
    ) -> AdvisorResult<Resolution> {
        let lookup_key = key.to_string();
        let pending = run_blocking(&self.db, move |conn| {
            dynamic_store::find_pending_by_key(conn, &lookup_key)
        })
        .await;

        match pending {
            Ok(Some(entry)) => {
                tracing::debug!(entry_id = %entry.id, "reusing pending answer");
                return Ok(Resolution::generated(entry.answer, Some(entry.id)));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "pending lookup failed, generating anew"),
        }

        self.generate_and_queue(question, asked_by).await
    }

    async fn generate_and_queue(
        &self,
        question: &str,
        asked_by: Option<&str>,
    ) -> AdvisorResult<Resolution> {
        let request = prompts::faq_request(question, &self.settings.prompts);
        let timeout = self.settings.timeout;

        let answer = match tokio::time::timeout(timeout, self.generator.generate(&request)).await {
            Ok(Ok(text)) => text.trim().to_string(),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "fallback generation failed");
                return Err(e.into());
            }
            Err(_) => {
                tracing::error!(?timeout, "fallback generation timed out");
                return Err(GenerationError::Timeout(timeout).into());
            }
        };
        if answer.is_empty() {
            return Err(GenerationError::EmptyResponse.into());
        }

        let q = question.to_string();
        let a = answer.clone();
        let who = asked_by.map(str::to_string);
        let stored = run_blocking(&self.db, move |conn| {
            dynamic_store::insert_pending(conn, &q, &a, who.as_deref())
        })
        .await;

        match stored {
            Ok(entry) => Ok(Resolution::generated(answer, Some(entry.id))),
            Err(e) => {
                tracing::warn!(error = %e, "failed to queue generated answer for moderation");
                Ok(Resolution::generated(answer, None))
            }
        }
    }

    fn key_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(map.entry(key.to_string()).or_default())
    }


    // Moderation

    pub async fn approve(&self, id: &str) -> AdvisorResult<DynamicEntry> {
        self.set_approval(id, true).await
    }

    pub async fn revoke(&self, id: &str) -> AdvisorResult<DynamicEntry> {
        self.set_approval(id, false).await
    }

    async fn set_approval(&self, id: &str, approved: bool) -> AdvisorResult<DynamicEntry> {
        let key = id.to_string();
        let entry = run_blocking(&self.db, move |conn| {
            dynamic_store::set_approval(conn, &key, approved)
        })
        .await?
        .ok_or_else(|| AdvisorError::NotFound(format!("dynamic entry {id}")))?;
        tracing::info!(id = %entry.id, approved, "moderation updated");
        Ok(entry)
    }

    pub async fn list_pending(&self, limit: usize) -> AdvisorResult<Vec<DynamicEntry>> {
        run_blocking(&self.db, move |conn| dynamic_store::list_pending(conn, limit)).await
    }

    pub async fn get(&self, id: &str) -> AdvisorResult<DynamicEntry> {
        let key = id.to_string();
        run_blocking(&self.db, move |conn| dynamic_store::get_entry(conn, &key))
            .await?
            .ok_or_else(|| AdvisorError::NotFound(format!("dynamic entry {id}")))
    }
}
