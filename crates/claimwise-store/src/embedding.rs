//! Embedding support for text vectorization
//!
//! Production deployments plug a model service in behind the
//! `claimwise_domain::traits::Embedder` trait. This module provides the
//! deterministic [`MockEmbedder`] used by tests and offline runs: a hashed
//! bag-of-words vectorizer, so texts sharing vocabulary genuinely score
//! closer under cosine similarity.

use claimwise_domain::traits::Embedder;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors that can occur during embedding generation
#[derive(Error, Debug, PartialEq)]
pub enum EmbeddingError {
    /// Invalid input text
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Deterministic hashed bag-of-words embedder
///
/// Each lowercased alphanumeric token is hashed into one of `dimension`
/// buckets; the count vector is normalized to unit length for cosine
/// similarity. The embeddings are:
///
/// - **Deterministic**: same text always produces the same vector
/// - **Normalized**: unit length
/// - **Overlap-sensitive**: texts sharing tokens have positive similarity
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimension: usize,
}

impl MockEmbedder {
    /// Create a new embedder with the given dimension
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn bucket(&self, token: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        (hasher.finish() % self.dimension as u64) as usize
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Embedder for MockEmbedder {
    type Error = EmbeddingError;

    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "cannot embed empty text".to_string(),
            ));
        }

        let mut counts = vec![0.0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            counts[self.bucket(&token.to_lowercase())] += 1.0;
        }

        let norm = counts.iter().fold(0.0f32, |acc, v| acc + v * v).sqrt();
        if norm > 0.0 {
            counts.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(counts)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Calculate cosine similarity between two embedding vectors
///
/// Returns a value in [-1, 1]: 1.0 for identical direction, 0.0 for
/// orthogonal, -1.0 for opposite. Zero-magnitude vectors score 0.0.
///
/// # Panics
///
/// Panics if the vectors have different lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "vector lengths differ");

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0f32, 0.0f32, 0.0f32),
        |(dot, na, nb), (x, y)| (dot + x * y, na + x * x, nb + y * y),
    );

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_deterministic() {
        let embedder = MockEmbedder::default();
        let text = "cataract surgery waiting period";
        assert_eq!(embedder.embed(text).unwrap(), embedder.embed(text).unwrap());
    }

    #[test]
    fn test_embedding_normalized() {
        let embedder = MockEmbedder::default();
        let embedding = embedder.embed("dental treatment in Mumbai").unwrap();
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_shared_vocabulary_scores_closer() {
        let embedder = MockEmbedder::default();
        let query = embedder.embed("dental treatment claim").unwrap();
        let on_topic = embedder
            .embed("dental treatment is covered up to the sum insured")
            .unwrap();
        let off_topic = embedder
            .embed("premium payment grace period thirty days")
            .unwrap();

        assert!(
            cosine_similarity(&query, &on_topic) > cosine_similarity(&query, &off_topic),
            "overlapping vocabulary should rank higher"
        );
    }

    #[test]
    fn test_empty_text_rejected() {
        let embedder = MockEmbedder::default();
        assert!(embedder.embed("  ").is_err());
    }

    #[test]
    fn test_cosine_similarity_extremes() {
        let x = [1.0, 0.0, 0.0];
        let y = [0.0, 1.0, 0.0];
        assert!((cosine_similarity(&x, &x) - 1.0).abs() < 0.0001);
        assert!(cosine_similarity(&x, &y).abs() < 0.0001);
        assert_eq!(cosine_similarity(&[0.0, 0.0, 0.0], &x), 0.0);
    }

    #[test]
    fn test_dimension_reported() {
        let embedder = MockEmbedder::new(64);
        assert_eq!(embedder.dimension(), 64);
        assert_eq!(embedder.embed("test").unwrap().len(), 64);
    }
}
