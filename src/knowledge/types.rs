//! Knowledge record types.
//!
//! [`KnowledgeEntry`] is a curated static answer, [`DynamicEntry`] an AI answer
//! under moderation, and [`Resolution`] the outcome handed back for a question.

use serde::{Deserialize, Serialize};

/// A curated, pre-approved question/answer pair. Immutable to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeEntry {
    pub id: i64,
    pub category: Option<String>,
    pub question: String,
    pub answer: String,
    pub source_url: Option<String>,
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

/// A static entry as written in a corpus file, before it has an id or embedding.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewStaticEntry {
    #[serde(default)]
    pub category: Option<String>,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub source_url: Option<String>,
}

/// An AI-generated answer. Only `approved` entries may answer later questions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicEntry {
    /// UUID v7 (time-sortable) primary key.
    pub id: String,
    pub question: String,
    pub answer: String,
    pub approved: bool,
    /// User who asked the question that produced this answer, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asked_by: Option<String>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<String>,
    /// Set when a moderator rejected the answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<String>,
}

/// Which tier produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnswerSource {
    Static,
    Dynamic,
    Generated,
}

impl AnswerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "STATIC",
            Self::Dynamic => "DYNAMIC",
            Self::Generated => "GENERATED",
        }
    }
}

impl std::fmt::Display for AnswerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub answer: String,
    pub source: AnswerSource,
    /// `true` only for generated answers still awaiting moderation.
    pub pending_approval: bool,
    /// Static id, dynamic id, or the queued entry's id. `None` when a generated
    /// answer could not be queued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
    /// Distance to the matched static entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
    /// Curated question the static answer belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_question: Option<String>,
}

impl Resolution {
    pub fn from_static(id: i64, question: String, answer: String, distance: f32) -> Self {
        Self {
            answer,
            source: AnswerSource::Static,
            pending_approval: false,
            entry_id: Some(id.to_string()),
            distance: Some(distance),
            matched_question: Some(question),
        }
    }

    pub fn from_dynamic(entry: DynamicEntry) -> Self {
        Self {
            answer: entry.answer,
            source: AnswerSource::Dynamic,
            pending_approval: false,
            entry_id: Some(entry.id),
            distance: None,
            matched_question: None,
        }
    }

    pub fn generated(answer: String, entry_id: Option<String>) -> Self {
        Self {
            answer,
            source: AnswerSource::Generated,
            pending_approval: true,
            entry_id,
            distance: None,
            matched_question: None,
        }
    }

    /// Note shown next to answers that have not been reviewed yet.
    pub fn moderation_note(&self) -> Option<&'static str> {
        self.pending_approval
            .then_some("AI-generated response, pending approval")
    }
}
