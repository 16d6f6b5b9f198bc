//! Local ONNX Runtime embedding provider (all-MiniLM-L6-v2 via `ort`).
//!
//! The same sentence-transformer family the curated FAQ corpus was indexed
//! with: tokenize, run the encoder, mean-pool over the attention mask, then
//! L2-normalize.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;

use super::{l2_normalize, EmbeddingProvider, EMBEDDING_DIM};
use crate::config::EmbeddingConfig;

/// Questions are short; the model was trained at 256 tokens.
const MAX_SEQ_LEN: usize = 256;

pub struct LocalEmbeddingProvider {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    model_id: String,
}

// Safety: Tokenizer is Send+Sync and the Session is only touched behind the Mutex.
unsafe impl Send for LocalEmbeddingProvider {}
unsafe impl Sync for LocalEmbeddingProvider {}

/// Paths of the model and tokenizer inside the configured cache directory.
pub fn model_files(config: &EmbeddingConfig) -> (PathBuf, PathBuf) {
    let cache_dir = crate::config::expand_tilde(&config.cache_dir);
    (cache_dir.join("model.onnx"), cache_dir.join("tokenizer.json"))
}

impl LocalEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let (model_path, tokenizer_path) = model_files(config);

        anyhow::ensure!(
            model_path.exists(),
            "ONNX model not found at {}. Run `finsage model download` first.",
            model_path.display()
        );
        anyhow::ensure!(
            tokenizer_path.exists(),
            "Tokenizer not found at {}. Run `finsage model download` first.",
            tokenizer_path.display()
        );

        let session = Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_intra_threads(2)?
            .commit_from_file(&model_path)
            .context("failed to load ONNX model")?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("failed to load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("failed to set truncation: {e}"))?;
        tokenizer.with_padding(Some(tokenizers::PaddingParams {
            strategy: tokenizers::PaddingStrategy::BatchLongest,
            ..Default::default()
        }));

        tracing::info!(
            model = %model_path.display(),
            tokenizer = %tokenizer_path.display(),
            "local embedding model loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            model_id: config.model.clone(),
        })
    }
}

impl EmbeddingProvider for LocalEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .context("embedding batch returned no vectors")
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("tokenization failed: {e}"))?;

        let batch = encodings.len();
        let seq_len = encodings[0].get_ids().len();

        let input_ids: Vec<i64> = encodings
            .iter()
            .flat_map(|e| e.get_ids().iter().map(|&id| id as i64))
            .collect();
        let attention_mask: Vec<i64> = encodings
            .iter()
            .flat_map(|e| e.get_attention_mask().iter().map(|&m| m as i64))
            .collect();
        // single-segment input
        let token_type_ids = vec![0i64; batch * seq_len];

        let shape = vec![batch as i64, seq_len as i64];
        let ids_tensor = Tensor::from_array((shape.clone(), input_ids.into_boxed_slice()))?;
        let mask_tensor =
            Tensor::from_array((shape.clone(), attention_mask.clone().into_boxed_slice()))?;
        let type_tensor = Tensor::from_array((shape, token_type_ids.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("session lock poisoned: {e}"))?;

        let outputs = session.run(ort::inputs! {
            "input_ids" => ids_tensor,
            "attention_mask" => mask_tensor,
            "token_type_ids" => type_tensor,
        })?;

        // Output naming differs between exports
        let hidden = outputs
            .get("token_embeddings")
            .or_else(|| outputs.get("last_hidden_state"))
            .unwrap_or_else(|| &outputs[0]);

        let (dims, data) = hidden
            .try_extract_tensor::<f32>()
            .context("failed to extract token embeddings")?;
        let dims: &[i64] = &dims;
        anyhow::ensure!(
            dims.len() == 3 && dims[2] == EMBEDDING_DIM as i64,
            "unexpected token embedding shape {dims:?}, expected [batch, seq, {EMBEDDING_DIM}]"
        );

        let out_seq = dims[1] as usize;
        Ok((0..batch)
            .map(|b| {
                let mask = &attention_mask[b * seq_len..b * seq_len + out_seq.min(seq_len)];
                let tokens = &data[b * out_seq * EMBEDDING_DIM..(b + 1) * out_seq * EMBEDDING_DIM];
                l2_normalize(&mean_pool(tokens, mask, EMBEDDING_DIM))
            })
            .collect())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Average the token vectors whose attention mask is set.
fn mean_pool(tokens: &[f32], mask: &[i64], dim: usize) -> Vec<f32> {
    let mut sum = vec![0.0f32; dim];
    let mut count = 0.0f32;
    for (token, &m) in tokens.chunks_exact(dim).zip(mask) {
        if m > 0 {
            for (acc, x) in sum.iter_mut().zip(token) {
                *acc += x;
            }
            count += 1.0;
        }
    }
    if count > 0.0 {
        sum.iter_mut().for_each(|x| *x /= count);
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_pool_ignores_padding() {
        let tokens = [1.0, 2.0, 3.0, 4.0, 100.0, 100.0];
        let pooled = mean_pool(&tokens, &[1, 1, 0], 2);
        assert_eq!(pooled, vec![2.0, 3.0]);
    }

    #[test]
    fn mean_pool_all_masked_is_zero() {
        assert_eq!(mean_pool(&[5.0, 5.0], &[0], 2), vec![0.0, 0.0]);
    }

    #[test]
    fn missing_model_files_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = EmbeddingConfig {
            provider: "local".into(),
            model: "all-MiniLM-L6-v2".into(),
            cache_dir: tmp.path().to_string_lossy().into_owned(),
        };
        let err = LocalEmbeddingProvider::new(&config).err().unwrap();
        assert!(err.to_string().contains("finsage model download"));
    }

    #[test]
    #[ignore] // needs model files: cargo test -- --ignored
    fn similar_questions_embed_close() {
        let provider = LocalEmbeddingProvider::new(&EmbeddingConfig::default()).unwrap();
        let a = provider.embed("What is a savings account?").unwrap();
        let b = provider.embed("How does a savings account work?").unwrap();
        let c = provider.embed("How do I buy gold coins?").unwrap();
        let dot = |x: &[f32], y: &[f32]| x.iter().zip(y).map(|(p, q)| p * q).sum::<f32>();
        assert_eq!(a.len(), EMBEDDING_DIM);
        assert!(dot(&a, &b) > dot(&a, &c));
    }
}
