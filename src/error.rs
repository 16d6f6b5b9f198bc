//! Error taxonomy shared by the resolution pipeline and the projection engine.
//!
//! Validation problems name the violated constraint. Generation failures keep
//! their provider detail as the error source but display a generic message, so
//! callers never see raw provider output in place of an answer.

use crate::generation::GenerationError;

/// A rejected input value, naming the field and the constraint it broke.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field} {constraint}")]
pub struct ValidationError {
    pub field: &'static str,
    pub constraint: String,
}

impl ValidationError {
    pub fn new(field: &'static str, constraint: impl Into<String>) -> Self {
        Self {
            field,
            constraint: constraint.into(),
        }
    }
}

/// Top-level error for advisor operations.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("the advisory service is temporarily unavailable, please try again later")]
    Generation(#[source] GenerationError),

    #[error("storage error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AdvisorError {
    /// Whether the caller sent something wrong (a 4xx-equivalent).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}

impl From<GenerationError> for AdvisorError {
    fn from(err: GenerationError) -> Self {
        Self::Generation(err)
    }
}

pub type AdvisorResult<T> = std::result::Result<T, AdvisorError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn validation_message_names_the_constraint() {
        let err: AdvisorError = ValidationError::new("goal_amount", "must be greater than 0").into();
        assert_eq!(err.to_string(), "invalid input: goal_amount must be greater than 0");
        assert!(err.is_client_error());
    }

    #[test]
    fn generation_message_is_generic() {
        let err: AdvisorError = GenerationError::Server {
            status: 500,
            body: "upstream stack trace with secrets".into(),
        }
        .into();
        let msg = err.to_string();
        assert!(!msg.contains("stack trace"));
        assert!(!err.is_client_error());

        let source = std::error::Error::source(&err).unwrap().to_string();
        assert!(source.contains("500"));
    }

    #[test]
    fn timeout_is_not_a_client_error() {
        let err: AdvisorError = GenerationError::Timeout(Duration::from_secs(30)).into();
        assert!(!err.is_client_error());
    }
}
