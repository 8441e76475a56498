//! Common types for the vector crate.
//!
//! These types are shared by every backend and are always available
//! regardless of feature flags.

use serde::{Deserialize, Serialize};

// ============================================================================
// Search types
// ============================================================================

/// A single nearest-neighbor hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Row position in the index, and in the aligned metadata table.
    pub id: usize,

    /// Inner-product similarity (cosine for unit vectors).
    pub score: f32,
}

// ============================================================================
// Model settings
// ============================================================================

/// Embedding model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding model name (e.g., "all-minilm-l6-v2").
    pub model: String,

    /// Directory for downloaded model files.
    pub cache_path: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "all-minilm-l6-v2".to_string(),
            cache_path: None,
        }
    }
}

/// Cross-encoder reranker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankerSettings {
    /// Public model used when no fine-tuned model is present.
    pub baseline_model: String,

    /// Override for the fine-tuned model directory.
    ///
    /// Defaults to `ce_hr_finetuned` inside the artifacts directory.
    pub finetuned_dir: Option<String>,

    /// Maximum tokenized length of a (query, candidate) pair.
    #[serde(deserialize_with = "hirematch_core::serde_ext::usize_from_any")]
    pub max_length: usize,

    /// Directory for downloaded model files.
    pub cache_path: Option<String>,
}

impl Default for RerankerSettings {
    fn default() -> Self {
        Self {
            baseline_model: "bge-reranker-base".to_string(),
            finetuned_dir: None,
            max_length: 512,
            cache_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let embedding = EmbeddingSettings::default();
        assert_eq!(embedding.model, "all-minilm-l6-v2");
        assert!(embedding.cache_path.is_none());

        let reranker = RerankerSettings::default();
        assert_eq!(reranker.baseline_model, "bge-reranker-base");
        assert_eq!(reranker.max_length, 512);
    }

    #[test]
    fn test_settings_partial_deserialize() {
        let reranker: RerankerSettings =
            serde_json::from_str(r#"{"max_length": 256}"#).unwrap();
        assert_eq!(reranker.max_length, 256);
        assert_eq!(reranker.baseline_model, "bge-reranker-base");
    }

    #[test]
    fn test_max_length_accepts_text() {
        let reranker: RerankerSettings =
            serde_json::from_str(r#"{"max_length": "384"}"#).unwrap();
        assert_eq!(reranker.max_length, 384);
    }
}
