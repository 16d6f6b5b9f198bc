use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FinsageConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub resolution: ResolutionConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub cache_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Largest static-match distance still accepted. Unset accepts any nearest entry.
    pub max_distance: Option<f32>,
    pub metric: String,
    pub dedupe_pending: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GenerationConfig {
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub language: String,
    pub faq_max_tokens: u32,
    pub narrative_max_tokens: u32,
    pub temperature: f32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            host: "127.0.0.1".into(),
            port: 8808,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_finsage_dir()
            .join("finsage.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_finsage_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: "all-MiniLM-L6-v2".into(),
            cache_dir,
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            max_distance: None,
            metric: "l2".into(),
            dedupe_pending: true,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            endpoint: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            timeout_secs: 30,
            language: "vi".into(),
            faq_max_tokens: 500,
            narrative_max_tokens: 400,
            temperature: 0.7,
        }
    }
}

/// Returns `~/.finsage/`, or `./.finsage/` when no home directory is known.
pub fn default_finsage_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".finsage")
}

/// Returns the default config file path: `~/.finsage/config.toml`
pub fn default_config_path() -> PathBuf {
    default_finsage_dir().join("config.toml")
}

impl FinsageConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            FinsageConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (FINSAGE_DB, FINSAGE_LOG_LEVEL, FINSAGE_MAX_DISTANCE, FINSAGE_GENERATION_ENDPOINT).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("FINSAGE_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("FINSAGE_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("FINSAGE_MAX_DISTANCE") {
            match val.parse::<f32>() {
                Ok(d) if d.is_finite() && d >= 0.0 => self.resolution.max_distance = Some(d),
                _ => warn!(value = %val, "ignoring invalid FINSAGE_MAX_DISTANCE"),
            }
        }
        if let Ok(val) = std::env::var("FINSAGE_GENERATION_ENDPOINT") {
            self.generation.endpoint = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
