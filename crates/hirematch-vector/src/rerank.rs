//! Pairwise reranker trait and mock implementation.
//!
//! A reranker jointly scores (query, candidate) text pairs. It is far more
//! expensive per comparison than the embedding provider, so the pipeline
//! sends the whole shortlist in one batched call.
//!
//! Scores leave the reranker as calibrated probabilities: the model's raw
//! logit passed through [`sigmoid`].

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use hirematch_core::Result;

use crate::embedding::tokens;

/// Trait for cross-encoder style relevance scoring.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Score each `(query, candidate)` pair.
    ///
    /// Returns one probability in `[0, 1]` per pair, in input order.
    async fn score(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>>;

    /// Which model variant is loaded (e.g. "finetuned" or a baseline name).
    fn variant(&self) -> &str;
}

/// Logistic function, evaluated without overflowing for large `|logit|`.
pub fn sigmoid(logit: f32) -> f32 {
    if logit >= 0.0 {
        1.0 / (1.0 + (-logit).exp())
    } else {
        let e = logit.exp();
        e / (1.0 + e)
    }
}

/// Deterministic reranker for tests and offline runs.
///
/// The logit is the fraction of query tokens found in the candidate,
/// mapped linearly onto `[-4, 4]`. Every call is counted.
#[derive(Debug, Default)]
pub struct MockReranker {
    calls: AtomicUsize,
}

impl MockReranker {
    /// Create a new mock reranker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `score` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Raw logit for one pair.
    pub fn logit(query: &str, candidate: &str) -> f32 {
        let query_tokens: Vec<String> = tokens(query).collect();
        if query_tokens.is_empty() {
            return -4.0;
        }
        let candidate_tokens: Vec<String> = tokens(candidate).collect();
        let hits = query_tokens
            .iter()
            .filter(|t| candidate_tokens.contains(t))
            .count();
        let overlap = hits as f32 / query_tokens.len() as f32;
        8.0 * overlap - 4.0
    }
}

#[async_trait]
impl Reranker for MockReranker {
    async fn score(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(pairs
            .iter()
            .map(|(query, candidate)| sigmoid(Self::logit(query, candidate)))
            .collect())
    }

    fn variant(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_known_values() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-7);
        assert!((sigmoid(2.0) - 0.880_797).abs() < 1e-5);
        assert!((sigmoid(-2.0) - 0.119_203).abs() < 1e-5);
    }

    #[test]
    fn test_sigmoid_extremes_are_finite() {
        let hi = sigmoid(1000.0);
        let lo = sigmoid(-1000.0);
        assert!(hi.is_finite() && lo.is_finite());
        assert!((hi - 1.0).abs() < 1e-7);
        assert!(lo >= 0.0 && lo < 1e-7);
    }

    #[test]
    fn test_sigmoid_is_monotonic() {
        let xs = [-10.0, -1.0, -0.1, 0.0, 0.1, 1.0, 10.0];
        for pair in xs.windows(2) {
            assert!(sigmoid(pair[0]) < sigmoid(pair[1]));
        }
    }

    #[tokio::test]
    async fn test_mock_preserves_order_and_counts_calls() {
        let reranker = MockReranker::new();
        let query = "senior backend engineer";
        let pairs = [
            (query, "Intern marketing assistant"),
            (query, "Senior Backend Engineer with 5 years Go experience"),
        ];

        let probs = reranker.score(&pairs).await.unwrap();

        assert_eq!(probs.len(), 2);
        assert!(probs[0] < 0.05);
        assert!(probs[1] > 0.95);
        assert_eq!(reranker.calls(), 1);
        assert_eq!(reranker.variant(), "mock");
    }

    #[tokio::test]
    async fn test_mock_empty_batch() {
        let reranker = MockReranker::new();
        let probs = reranker.score(&[]).await.unwrap();
        assert!(probs.is_empty());
        assert_eq!(reranker.calls(), 1);
    }

    #[test]
    fn test_trait_object_safety() {
        fn _assert_object_safe(_: &dyn Reranker) {}
    }
}
