//! Offline embedder: a feature-hashed bag of words.
//!
//! Produces deterministic, L2-normalised vectors without any network or
//! model download. Texts that share words land close together, which is
//! enough for local runs of the indexing and search pipelines and for
//! tests.

use async_trait::async_trait;
use pipewright_core::error::ProviderError;
use pipewright_core::provider::{EmbeddingRequest, EmbeddingResponse, Embedder};

pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed one text synchronously.
    pub fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimensions];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            let hash = fnv1a(token.as_bytes());
            let slot = (hash % self.dimensions as u64) as usize;
            // The high bit picks the sign so collisions partly cancel.
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            v[slot] += sign;
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf29ce484222325u64, |acc, b| {
        (acc ^ *b as u64).wrapping_mul(0x100000001b3)
    })
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing"
    }

    fn model(&self) -> &str {
        "hashing-bow"
    }

    async fn embed(
        &self,
        request: EmbeddingRequest,
    ) -> std::result::Result<EmbeddingResponse, ProviderError> {
        Ok(EmbeddingResponse {
            embeddings: request.inputs.iter().map(|t| self.vectorize(t)).collect(),
            model: request.model,
            usage: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn vectors_are_normalised() {
        let e = HashingEmbedder::new(64);
        let v = e.vectorize("Leonardo da Vinci was born in Vinci");
        assert_eq!(v.len(), 64);
        let norm = dot(&v, &v).sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let v = HashingEmbedder::new(8).vectorize("  ,, ");
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn case_insensitive_and_deterministic() {
        let e = HashingEmbedder::new(128);
        assert_eq!(e.vectorize("Cohere Haystack"), e.vectorize("cohere haystack"));
    }

    #[test]
    fn shared_words_score_higher() {
        let e = HashingEmbedder::new(256);
        let q = e.vectorize("where was davinci born");
        let near = e.vectorize("davinci was born in the town of vinci");
        let far = e.vectorize("pipelines combine components");
        assert!(dot(&q, &near) > dot(&q, &far));
    }

    #[tokio::test]
    async fn embed_keeps_input_order() {
        let e = HashingEmbedder::new(32);
        let resp = e
            .embed(EmbeddingRequest {
                model: "hashing-bow".into(),
                inputs: vec!["alpha".into(), "beta".into()],
            })
            .await
            .unwrap();
        assert_eq!(resp.embeddings.len(), 2);
        assert_eq!(resp.embeddings[0], e.vectorize("alpha"));
    }
}
