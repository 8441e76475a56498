//! FastEmbed embedding provider.
//!
//! Wraps the `fastembed` crate to provide local embedding generation
//! via pre-trained sentence-transformer models (e.g., AllMiniLM, BGE-small).
//!
//! # Thread Safety
//!
//! `fastembed::TextEmbedding` needs exclusive access for inference, so we
//! wrap it in `Arc<Mutex<>>` and use `tokio::task::spawn_blocking` for
//! embedding calls.
//!
//! # Feature Gate
//!
//! This module requires the `fastembed` feature.

use crate::embedding::{EmbeddingProvider, l2_normalize};
use crate::types::EmbeddingSettings;
use async_trait::async_trait;
use hirematch_core::{Error, Result};
use std::sync::{Arc, Mutex};

/// Map a model name string to a fastembed `EmbeddingModel` enum variant.
fn resolve_model(name: &str) -> Result<fastembed::EmbeddingModel> {
    match name {
        "all-minilm-l6-v2" | "AllMiniLML6V2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
        "all-minilm-l12-v2" | "AllMiniLML12V2" => Ok(fastembed::EmbeddingModel::AllMiniLML12V2),
        "bge-small-en-v1.5" | "BGESmallENV15" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" | "BGEBaseENV15" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        other => Err(Error::config(format!(
            "Unknown embedding model: '{other}'. Supported: all-minilm-l6-v2, all-minilm-l12-v2, bge-small-en-v1.5, bge-base-en-v1.5"
        ))),
    }
}

/// FastEmbed-based embedding provider.
///
/// The model is loaded once and reused for all subsequent calls. Output
/// vectors are re-normalized to unit length.
///
/// # Supported Models
///
/// | Name | Dimension |
/// |------|-----------|
/// | `all-minilm-l6-v2` | 384 |
/// | `all-minilm-l12-v2` | 384 |
/// | `bge-small-en-v1.5` | 384 |
/// | `bge-base-en-v1.5` | 768 |
pub struct FastEmbedProvider {
    model: Arc<Mutex<fastembed::TextEmbedding>>,
    dimension: usize,
    model_name: String,
}

impl FastEmbedProvider {
    /// Create a new FastEmbed provider.
    ///
    /// Downloads the model if it is not cached locally. This blocks; call
    /// it from a blocking context.
    pub fn new(settings: &EmbeddingSettings) -> Result<Self> {
        let model_enum = resolve_model(&settings.model)?;

        let mut init =
            fastembed::InitOptions::new(model_enum).with_show_download_progress(false);
        if let Some(path) = &settings.cache_path {
            init = init.with_cache_dir(std::path::PathBuf::from(path));
        }

        let mut text_embedding = fastembed::TextEmbedding::try_new(init)
            .map_err(|e| Error::resource_load(format!("Failed to initialize fastembed model: {e}")))?;

        // Read the dimension off a sample embedding
        let sample = text_embedding
            .embed(vec!["dimension check"], None)
            .map_err(|e| Error::resource_load(format!("Failed to determine embedding dimension: {e}")))?;

        let dimension = sample
            .first()
            .map(|v| v.len())
            .ok_or_else(|| Error::resource_load("Empty sample embedding"))?;

        log::info!(
            "Loaded embedding model {} ({dimension} dimensions)",
            settings.model
        );

        Ok(Self {
            model: Arc::new(Mutex::new(text_embedding)),
            dimension,
            model_name: settings.model.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::operation("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let model = self.model.clone();
        let texts: Vec<String> = texts.iter().map(|t| t.to_string()).collect();

        tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|e| Error::operation(format!("Mutex poisoned: {e}")))?;
            let mut embeddings = model
                .embed(texts, None)
                .map_err(|e| Error::operation(format!("Batch embedding failed: {e}")))?;
            for embedding in &mut embeddings {
                l2_normalize(embedding);
            }
            Ok(embeddings)
        })
        .await
        .map_err(|e| Error::operation(format!("spawn_blocking failed: {e}")))?
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

impl std::fmt::Debug for FastEmbedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedProvider")
            .field("model", &self.model_name)
            .field("dimension", &self.dimension)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
