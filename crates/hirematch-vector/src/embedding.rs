//! Embedding provider trait and mock implementation.
//!
//! This module defines the `EmbeddingProvider` trait that abstracts over
//! embedding generation backends. Every provider returns unit-length
//! vectors so that inner-product search over the pool indices behaves as
//! cosine similarity.
//!
//! # Providers
//!
//! - `MockEmbeddingProvider`: Deterministic hashed bag-of-words vectors
//! - `FastEmbedProvider`: Local embedding via fastembed (requires `fastembed` feature)

use async_trait::async_trait;
use hirematch_core::Result;

/// Trait for generating text embeddings.
///
/// Implementations wrap specific embedding libraries and provide a uniform
/// async interface. The trait requires `Send + Sync` so a single loaded
/// model can be shared by concurrent queries.
///
/// # Thread Safety
///
/// Implementations should handle internal synchronization (e.g., `Arc<Mutex<>>`)
/// for thread-unsafe underlying libraries.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate a unit-length embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate unit-length embeddings for a batch of texts.
    ///
    /// Default implementation calls `embed` for each text sequentially.
    /// Backends that support native batching should override this.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// The embedding dimension.
    fn dimension(&self) -> usize;

    /// The provider name for diagnostics.
    fn name(&self) -> &str;
}

/// Scale `vector` to unit L2 norm in place.
///
/// A zero vector is left untouched.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for val in vector.iter_mut() {
            *val /= norm;
        }
    }
}

/// Lowercased alphanumeric tokens of `text`.
pub(crate) fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// A mock embedding provider for testing and offline runs.
///
/// Each lowercased token is hashed with Blake3 into one signed bucket of
/// the output vector (feature hashing), so texts sharing words land close
/// together and identical texts produce identical vectors.
pub struct MockEmbeddingProvider {
    dimension: usize,
}

impl MockEmbeddingProvider {
    /// Create a new mock provider with the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Generate a deterministic embedding from text.
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];
        if self.dimension == 0 {
            return embedding;
        }

        for token in tokens(text) {
            let hash = blake3::hash(token.as_bytes());
            let bytes = hash.as_bytes();
            let bucket = u64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ]) as usize
                % self.dimension;
            let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
        }

        l2_normalize(&mut embedding);
        embedding
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_sync(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Tests
// ============================================================================
