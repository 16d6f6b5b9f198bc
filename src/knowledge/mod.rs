//! Tiered knowledge resolution: curated static answers, moderated dynamic
//! answers, and the pipeline that falls back to AI generation.

pub mod dynamic_store;
pub mod index;
pub mod pipeline;
pub mod static_store;
pub mod stats;
pub mod types;

/// Encode an embedding as little-endian f32 bytes for BLOB storage.
pub fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|x| x.to_le_bytes()).collect()
}

/// Decode a BLOB written by [`embedding_to_blob`]. Trailing partial bytes are ignored.
pub fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_preserves_values() {
        let v = vec![0.25f32, -1.5, f32::MIN_POSITIVE];
        assert_eq!(blob_to_embedding(&embedding_to_blob(&v)), v);
        assert_eq!(embedding_to_blob(&v).len(), 12);
    }
}
