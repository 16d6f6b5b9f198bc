//! Text-to-vector embedding.
//!
//! Provides the [`EmbeddingProvider`] trait, a local ONNX implementation
//! (all-MiniLM-L6-v2, 384 dimensions) and a hashed bag-of-words fallback that
//! needs no model files. The provider is created via [`create_provider`].

pub mod hash;
pub mod local;

use anyhow::Result;

/// Number of dimensions in the embedding vectors (all-MiniLM-L6-v2).
pub const EMBEDDING_DIM: usize = 384;

/// Trait for embedding text into vectors.
///
/// The same input must always produce the same vector. All methods are
/// synchronous; callers in async contexts should use `tokio::task::spawn_blocking`.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }

    /// Identifier stored alongside the static embeddings.
    fn model_id(&self) -> &str;
}

/// Create an embedding provider from config.
///
/// `"local"` loads ONNX Runtime + all-MiniLM-L6-v2 and fails if the model files
/// are missing (run `finsage model download` first). `"hash"` needs nothing.
pub fn create_provider(
    config: &crate::config::EmbeddingConfig,
) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "local" => {
            let provider = local::LocalEmbeddingProvider::new(config)?;
            Ok(Box::new(provider))
        }
        "hash" => Ok(Box::new(hash::HashEmbeddingProvider::new(EMBEDDING_DIM))),
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: local, hash"),
    }
}

/// L2-normalize a vector. Returns the input unchanged if its norm is zero.
pub(crate) fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_normalize() {
        let normalized = l2_normalize(&[3.0, 4.0]);
        assert!((normalized[0] - 0.6).abs() < 1e-6);
        assert!((normalized[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_l2_normalize_zero_vector() {
        assert_eq!(l2_normalize(&[0.0, 0.0, 0.0]), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn hash_provider_is_selectable() {
        let config = crate::config::EmbeddingConfig {
            provider: "hash".into(),
            ..Default::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.dimensions(), EMBEDDING_DIM);
        assert_eq!(provider.embed("hello").unwrap().len(), EMBEDDING_DIM);
    }

    #[test]
    fn unknown_provider_errors() {
        let config = crate::config::EmbeddingConfig {
            provider: "remote".into(),
            ..Default::default()
        };
        assert!(create_provider(&config).is_err());
    }
}
