//! Text generation capability used for AI fallback answers and projection narratives.
//!
//! The pipeline only sees the [`NarrativeGenerator`] trait. The concrete client is
//! built once by the composition root via [`create_generator`] and passed in.

pub mod openai;
pub mod prompts;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::GenerationConfig;

/// A single generation call: system framing, user prompt, and sampling knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Failure of the external generator. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider error: HTTP {status} - {body}")]
    Server { status: u16, body: String },

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider returned an empty response")]
    EmptyResponse,

    #[error("generator unavailable: {0}")]
    Unavailable(String),
}

/// Opaque `generate(prompt) -> text` capability.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

/// Generator used when no provider is configured. Every call fails.
pub struct DisabledGenerator {
    reason: String,
}

impl DisabledGenerator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl NarrativeGenerator for DisabledGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        Err(GenerationError::Unavailable(self.reason.clone()))
    }
}

/// Create the generator from config.
///
/// `"openai"` needs an API key in the env var named by `api_key_env`. A missing
/// key does not stop startup: static and approved answers still resolve, and
/// only the fallback path reports the generator as unavailable.
pub fn create_generator(config: &GenerationConfig) -> Result<Box<dyn NarrativeGenerator>> {
    match config.provider.as_str() {
        "openai" => match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => {
                let client = openai::OpenAiClient::new(config, key)?;
                tracing::info!(model = %config.model, endpoint = %config.endpoint, "generator ready");
                Ok(Box::new(client))
            }
            _ => {
                tracing::warn!(
                    env = %config.api_key_env,
                    "no API key set, AI fallback answers are disabled"
                );
                Ok(Box::new(DisabledGenerator::new(format!(
                    "{} is not set",
                    config.api_key_env
                ))))
            }
        },
        "disabled" => Ok(Box::new(DisabledGenerator::new("generation is disabled in config"))),
        other => anyhow::bail!("unknown generation provider: {other}. Supported: openai, disabled"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            system_prompt: "sys".into(),
            user_prompt: "hi".into(),
            max_tokens: 10,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn disabled_generator_always_fails() {
        let generator = DisabledGenerator::new("off");
        let err = generator.generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Unavailable(ref r) if r == "off"));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let config = GenerationConfig {
            provider: "carrier-pigeon".into(),
            ..GenerationConfig::default()
        };
        let err = create_generator(&config).err().unwrap();
        assert!(err.to_string().contains("unknown generation provider"));
    }

    #[tokio::test]
    async fn missing_api_key_yields_disabled_generator() {
        let config = GenerationConfig {
            api_key_env: "FINSAGE_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..GenerationConfig::default()
        };
        let generator = create_generator(&config).unwrap();
        let err = generator.generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Unavailable(_)));
    }
}
