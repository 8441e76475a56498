//! FastEmbed cross-encoder reranker.
//!
//! Loads either a fine-tuned cross-encoder exported to ONNX (when its
//! directory exists) or a public baseline reranker from the fastembed
//! model registry.
//!
//! A fine-tuned model directory must contain:
//!
//! - `model.onnx`
//! - `tokenizer.json`
//! - `config.json`
//! - `special_tokens_map.json`
//! - `tokenizer_config.json`
//!
//! # Feature Gate
//!
//! This module requires the `fastembed` feature.

use crate::rerank::{Reranker, sigmoid};
use crate::types::RerankerSettings;
use async_trait::async_trait;
use hirematch_core::{Error, Result};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Variant label reported for a fine-tuned model.
pub const FINETUNED_VARIANT: &str = "finetuned";

/// Map a baseline model name to a fastembed `RerankerModel` variant.
fn resolve_model(name: &str) -> Result<fastembed::RerankerModel> {
    match name {
        "bge-reranker-base" | "BGERerankerBase" => Ok(fastembed::RerankerModel::BGERerankerBase),
        "bge-reranker-v2-m3" | "BGERerankerV2M3" => Ok(fastembed::RerankerModel::BGERerankerV2M3),
        "jina-reranker-v1-turbo-en" | "JINARerankerV1TurboEn" => {
            Ok(fastembed::RerankerModel::JINARerankerV1TurboEn)
        }
        other => Err(Error::config(format!(
            "Unknown reranker model: '{other}'. Supported: bge-reranker-base, bge-reranker-v2-m3, jina-reranker-v1-turbo-en"
        ))),
    }
}

fn read_model_file(dir: &Path, name: &str) -> Result<Vec<u8>> {
    let path = dir.join(name);
    std::fs::read(&path).map_err(|e| Error::io_with_path(e, &path))
}

/// Cross-encoder reranker backed by fastembed.
pub struct FastEmbedReranker {
    model: Arc<Mutex<fastembed::TextRerank>>,
    variant: String,
}

impl FastEmbedReranker {
    /// Load the reranker, preferring the fine-tuned model in
    /// `finetuned_dir` when that directory exists.
    ///
    /// Blocks while the model loads; call it from a blocking context.
    pub fn load(settings: &RerankerSettings, finetuned_dir: &Path) -> Result<Self> {
        if finetuned_dir.is_dir() {
            Self::load_finetuned(settings, finetuned_dir)
        } else {
            Self::load_baseline(settings)
        }
    }

    /// Load a public baseline reranker by name.
    pub fn load_baseline(settings: &RerankerSettings) -> Result<Self> {
        let model_enum = resolve_model(&settings.baseline_model)?;

        let mut init = fastembed::RerankInitOptions::new(model_enum)
            .with_max_length(settings.max_length)
            .with_show_download_progress(false);
        if let Some(path) = &settings.cache_path {
            init = init.with_cache_dir(std::path::PathBuf::from(path));
        }

        let model = fastembed::TextRerank::try_new(init)
            .map_err(|e| Error::resource_load(format!("Failed to initialize reranker: {e}")))?;

        log::info!("Loaded baseline reranker {}", settings.baseline_model);

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            variant: settings.baseline_model.clone(),
        })
    }

    /// Load a fine-tuned ONNX reranker from `dir`.
    pub fn load_finetuned(settings: &RerankerSettings, dir: &Path) -> Result<Self> {
        let tokenizer_files = fastembed::TokenizerFiles {
            tokenizer_file: read_model_file(dir, "tokenizer.json")?,
            config_file: read_model_file(dir, "config.json")?,
            special_tokens_map_file: read_model_file(dir, "special_tokens_map.json")?,
            tokenizer_config_file: read_model_file(dir, "tokenizer_config.json")?,
        };
        let user_model = fastembed::UserDefinedRerankingModel::new(
            read_model_file(dir, "model.onnx")?,
            tokenizer_files,
        );
        let init = fastembed::RerankInitOptionsUserDefined::default()
            .with_max_length(settings.max_length);

        let model = fastembed::TextRerank::try_new_from_user_defined(user_model, init)
            .map_err(|e| {
                Error::resource_load(format!(
                    "Failed to initialize fine-tuned reranker at {}: {e}",
                    dir.display()
                ))
            })?;

        log::info!("Loaded fine-tuned reranker from {}", dir.display());

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            variant: FINETUNED_VARIANT.to_string(),
        })
    }
}

/// Group consecutive pairs that share a query: `(query, start, end)`.
fn query_runs<'a>(pairs: &[(&'a str, &str)]) -> Vec<(&'a str, usize, usize)> {
    let mut runs: Vec<(&str, usize, usize)> = Vec::new();
    for (i, &(query, _)) in pairs.iter().enumerate() {
        match runs.last_mut() {
            Some(run) if run.0 == query => run.2 = i + 1,
            _ => runs.push((query, i, i + 1)),
        }
    }
    runs
}

#[async_trait]
impl Reranker for FastEmbedReranker {
    async fn score(&self, pairs: &[(&str, &str)]) -> Result<Vec<f32>> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let runs: Vec<(String, Vec<String>)> = query_runs(pairs)
            .into_iter()
            .map(|(query, start, end)| {
                let docs = pairs[start..end]
                    .iter()
                    .map(|(_, doc)| doc.to_string())
                    .collect();
                (query.to_string(), docs)
            })
            .collect();
        let model = self.model.clone();

        tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|e| Error::operation(format!("Mutex poisoned: {e}")))?;

            let mut probs = Vec::new();
            for (query, docs) in runs {
                let docs: Vec<&str> = docs.iter().map(String::as_str).collect();
                let results = model
                    .rerank(query.as_str(), docs.as_slice(), false, None)
                    .map_err(|e| Error::operation(format!("Reranking failed: {e}")))?;

                // Results come back sorted by score; place them by original index.
                let mut logits = vec![None; docs.len()];
                for result in results {
                    if let Some(slot) = logits.get_mut(result.index) {
                        *slot = Some(result.score);
                    }
                }
                for logit in logits {
                    let logit =
                        logit.ok_or_else(|| Error::operation("Reranker skipped a candidate"))?;
                    probs.push(sigmoid(logit));
                }
            }
            Ok(probs)
        })
        .await
        .map_err(|e| Error::operation(format!("spawn_blocking failed: {e}")))?
    }

    fn variant(&self) -> &str {
        &self.variant
    }
}

impl std::fmt::Debug for FastEmbedReranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedReranker")
            .field("variant", &self.variant)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_model_known() {
        assert!(resolve_model("bge-reranker-base").is_ok());
        assert!(resolve_model("bge-reranker-v2-m3").is_ok());
        assert!(resolve_model("jina-reranker-v1-turbo-en").is_ok());
        assert!(resolve_model("BGERerankerBase").is_ok());
    }

    #[test]
    fn test_resolve_model_unknown() {
        let err = match resolve_model("ms-marco-unknown") {
            Err(e) => e,
            Ok(_) => panic!("unknown model resolved"),
        };
        assert!(err.to_string().contains("Unknown reranker model"));
    }

    #[test]
    fn test_query_runs_single_query_is_one_run() {
        let pairs = [("q", "a"), ("q", "b"), ("q", "c")];
        assert_eq!(query_runs(&pairs), vec![("q", 0, 3)]);
    }

    #[test]
    fn test_query_runs_splits_on_query_change() {
        let pairs = [("q1", "a"), ("q1", "b"), ("q2", "c"), ("q1", "d")];
        assert_eq!(
            query_runs(&pairs),
            vec![("q1", 0, 2), ("q2", 2, 3), ("q1", 3, 4)]
        );
    }

    #[test]
    fn test_finetuned_dir_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = match FastEmbedReranker::load_finetuned(&RerankerSettings::default(), dir.path())
        {
            Err(e) => e,
            Ok(_) => panic!("loaded from an empty directory"),
        };
        assert!(err.to_string().contains("tokenizer.json"));
    }

    #[tokio::test]
    #[ignore = "requires model download (~1GB)"]
    async fn test_baseline_scores_in_input_order() {
        let reranker = FastEmbedReranker::load_baseline(&RerankerSettings::default()).unwrap();
        let query = "senior backend engineer";
        let probs = reranker
            .score(&[
                (query, "Intern marketing assistant"),
                (query, "Senior Backend Engineer with 5 years Go experience"),
            ])
            .await
            .unwrap();
        assert_eq!(probs.len(), 2);
        assert!(probs[1] > probs[0]);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
    }
}
