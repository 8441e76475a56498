//! Core traits for hirematch.
//!
//! The primary trait is [`ConfigProvider`], which abstracts where the
//! matching engine finds its artifacts and which models it loads.

use std::path::PathBuf;

use crate::Result;
use crate::pool::Pool;

/// Trait for application configuration consumed by the engine.
///
/// # Bounds
///
/// - `Send + Sync`: Configuration must be shareable across threads
/// - `Clone`: Configuration can be duplicated for passing to subsystems
/// - `'static`: Configuration lifetime is not borrowed
///
/// # Example
///
/// ```
/// use std::path::PathBuf;
/// use hirematch_core::traits::ConfigProvider;
/// use hirematch_core::Result;
///
/// #[derive(Clone)]
/// struct StaticConfig {
///     dir: PathBuf,
/// }
///
/// impl ConfigProvider for StaticConfig {
///     fn project_name(&self) -> &str {
///         "hirematch"
///     }
///
///     fn artifacts_dir(&self) -> Result<PathBuf> {
///         Ok(self.dir.clone())
///     }
/// }
/// ```
pub trait ConfigProvider: Send + Sync + Clone + 'static {
    /// The project name, used for env var prefixes and default paths.
    fn project_name(&self) -> &str;

    /// Directory holding the index artifacts and metadata tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be determined.
    fn artifacts_dir(&self) -> Result<PathBuf>;

    /// Path of a pool's vector index artifact.
    fn index_path(&self, pool: Pool) -> Result<PathBuf> {
        Ok(self.artifacts_dir()?.join(pool.index_file_name()))
    }

    /// Path of a pool's metadata table.
    fn metadata_path(&self, pool: Pool) -> Result<PathBuf> {
        Ok(self.artifacts_dir()?.join(pool.metadata_file_name()))
    }

    /// Directory that may hold a fine-tuned reranker model.
    fn finetuned_reranker_dir(&self) -> Result<PathBuf> {
        Ok(self.artifacts_dir()?.join("ce_hr_finetuned"))
    }
}
