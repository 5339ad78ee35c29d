//! Embedding generation.
//!
//! The engine depends only on the [`EmbeddingProvider`] trait; the
//! concrete provider talks to an OpenAI-compatible HTTP endpoint.

mod openai;

use async_trait::async_trait;

pub use openai::OpenAiProvider;

use crate::Result;

/// Text-to-vector provider contract.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Encode one text into a fixed-length vector.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an unusable response.
    async fn encode(&self, text: &str) -> Result<Vec<f32>>;

    /// Encode several texts. The default implementation loops over
    /// [`encode`](Self::encode); providers with a native batch endpoint
    /// can override it.
    ///
    /// # Errors
    ///
    /// Returns an error if any encoding fails.
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.encode(text).await?);
        }
        Ok(vectors)
    }
}

/// Deterministic embedding derived from the text's hash. For tests and
/// offline runs; carries no semantic signal.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn placeholder_embedding(text: &str, dim: usize) -> Vec<f32> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    let hash = hasher.finish();

    let mut embedding = Vec::with_capacity(dim);
    let mut seed = hash;
    for _ in 0..dim {
        seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        let value = (((seed >> 33) as f32) / (u32::MAX as f32)).mul_add(2.0, -1.0);
        embedding.push(value);
    }

    // L2 normalize
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut embedding {
            *v /= norm;
        }
    }

    embedding
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_deterministic() {
        let a = placeholder_embedding("hello world", 8);
        let b = placeholder_embedding("hello world", 8);
        let c = placeholder_embedding("different", 8);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 8);
    }

    #[test]
    fn test_placeholder_normalized() {
        let emb = placeholder_embedding("some text", 64);
        let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_default_batch_loops_encode() {
        struct Fixed;

        #[async_trait]
        impl EmbeddingProvider for Fixed {
            async fn encode(&self, text: &str) -> Result<Vec<f32>> {
                Ok(vec![text.len() as f32])
            }
        }

        let provider = Fixed;
        let out = provider
            .encode_batch(&["ab".to_string(), "abcd".to_string()])
            .await
            .unwrap();
        assert_eq!(out, vec![vec![2.0], vec![4.0]]);
    }
}
