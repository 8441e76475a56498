//! Configuration for the hirematch CLI.
//!
//! Provides the [`HirematchConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `HIREMATCH_CONFIG` environment variable
//! 3. XDG default: `~/.config/hirematch/config.toml`
//! 4. Built-in defaults
//!
//! Values under the `HIREMATCH_` prefix (e.g. `HIREMATCH_EMBEDDING_MODEL`,
//! `HIREMATCH_SEARCH_DEFAULT_K`) override the file. Numeric settings accept
//! the decimal text the environment provides, so `config export` output can
//! be sourced back in.

use std::path::PathBuf;

use confyg::{Confygery, env};
use hirematch_core::{ConfigProvider, Error, Result};
use hirematch_engine::SearchSettings;
use hirematch_vector::{EmbeddingSettings, RerankerSettings};
use serde::{Deserialize, Serialize};

/// Fallback environment variable for the artifacts directory.
pub const ARTIFACTS_DIR_ENV: &str = "ARTIFACTS_DIR";

/// Artifacts directory used when nothing else is configured.
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the hirematch CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HirematchConfig {
    /// Project name, used for env var prefixes and default paths.
    pub project_name: String,

    /// Directory holding the index and metadata artifacts.
    pub artifacts_dir: Option<String>,

    /// Embedding encoder configuration.
    pub embedding: EmbeddingSettings,

    /// Reranker configuration.
    pub reranker: RerankerSettings,

    /// Default shortlist and result sizes.
    pub search: SearchSettings,
}

impl Default for HirematchConfig {
    fn default() -> Self {
        Self {
            project_name: "hirematch".to_string(),
            artifacts_dir: None,
            embedding: EmbeddingSettings::default(),
            reranker: RerankerSettings::default(),
            search: SearchSettings::default(),
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl HirematchConfig {
    /// Load configuration from file, environment, and defaults.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path)
            && path.exists()
        {
            builder
                .add_file(&path.to_string_lossy())
                .map_err(|e| Error::config(format!("config file: {e}")))?;
        }

        let mut env_opts = env::Options::with_top_level("HIREMATCH");
        env_opts.add_section("embedding");
        env_opts.add_section("reranker");
        env_opts.add_section("search");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("HIREMATCH_CONFIG") {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("hirematch").join("config.toml"))
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Flatten this config into environment variable pairs with `HIREMATCH_` prefix.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        let value: toml::Value =
            toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut vars = Vec::new();
        flatten_toml_value(&value, "HIREMATCH", &mut vars);
        Ok(vars)
    }

    /// Resolve the artifacts directory: config, then `ARTIFACTS_DIR`, then
    /// `./artifacts`.
    fn resolve_artifacts_dir(&self, env_value: Option<String>) -> PathBuf {
        self.artifacts_dir
            .clone()
            .or(env_value)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR))
    }
}

// ============================================================================
// ConfigProvider implementation
// ============================================================================

impl ConfigProvider for HirematchConfig {
    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn artifacts_dir(&self) -> Result<PathBuf> {
        Ok(self.resolve_artifacts_dir(std::env::var(ARTIFACTS_DIR_ENV).ok()))
    }

    fn finetuned_reranker_dir(&self) -> Result<PathBuf> {
        match &self.reranker.finetuned_dir {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => Ok(self.artifacts_dir()?.join("ce_hr_finetuned")),
        }
    }
}

// ============================================================================
// Helper: flatten TOML to env vars
// ============================================================================

/// Recursively flatten a TOML value into `KEY=value` pairs.
fn flatten_toml_value(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let env_key = format!("{}_{}", prefix, key.to_uppercase());
                flatten_toml_value(val, &env_key, out);
            }
        }
        toml::Value::Array(arr) => {
            if let Ok(json) = serde_json::to_string(arr) {
                out.push((prefix.to_string(), json));
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        toml::Value::Integer(i) => out.push((prefix.to_string(), i.to_string())),
        toml::Value::Float(f) => out.push((prefix.to_string(), f.to_string())),
        toml::Value::Boolean(b) => out.push((prefix.to_string(), b.to_string())),
        toml::Value::Datetime(dt) => out.push((prefix.to_string(), dt.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================
