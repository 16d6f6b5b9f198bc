//! Hashed bag-of-words embeddings.
//!
//! Each lowercase word is hashed with SHA-256; the digest picks a dimension and
//! a sign. Texts sharing words land near each other, identical texts land on
//! the same vector, and no model files are needed.

use anyhow::Result;
use sha2::{Digest, Sha256};

use super::{l2_normalize, EmbeddingProvider};

pub struct HashEmbeddingProvider {
    dim: usize,
    model_id: String,
}

impl HashEmbeddingProvider {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            model_id: format!("hash-bow-{dim}"),
        }
    }
}

impl EmbeddingProvider for HashEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; self.dim];
        let lowered = text.to_lowercase();
        let words = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty());

        for word in words {
            let digest = Sha256::digest(word.as_bytes());
            let bucket = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize;
            let sign = if digest[4] & 1 == 0 { 1.0 } else { -1.0 };
            v[bucket % self.dim] += sign;
        }

        Ok(l2_normalize(&v))
    }

    fn dimensions(&self) -> usize {
        self.dim
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
