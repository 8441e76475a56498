//! Process-wide resource set and its one-time loader.
//!
//! The [`ResourceLoader`] moves from "unloaded" to either "loaded" or
//! "failed" exactly once. Concurrent first callers wait on the same load;
//! later callers get the stored outcome. A pool whose index file is absent
//! is simply unavailable and only fails when that pool is queried.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hirematch_core::{ConfigProvider, Error, Pool, Result};
use hirematch_vector::{EmbeddingProvider, FlatIpIndex, Reranker, VectorIndex};
use tokio::sync::OnceCell;

use crate::metadata::{JobRow, MetadataStore, PoolRow, ResumeRow};
use crate::models::ModelLoader;

// ============================================================================
// Artifact paths
// ============================================================================

/// Locations of every artifact the loader reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Jobs vector index.
    pub jobs_index: PathBuf,
    /// Jobs metadata table.
    pub jobs_metadata: PathBuf,
    /// Resumes vector index.
    pub resumes_index: PathBuf,
    /// Resumes metadata table.
    pub resumes_metadata: PathBuf,
    /// Optional fine-tuned reranker directory.
    pub finetuned_reranker: PathBuf,
}

impl ArtifactPaths {
    /// Standard file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            jobs_index: dir.join(Pool::Jobs.index_file_name()),
            jobs_metadata: dir.join(Pool::Jobs.metadata_file_name()),
            resumes_index: dir.join(Pool::Resumes.index_file_name()),
            resumes_metadata: dir.join(Pool::Resumes.metadata_file_name()),
            finetuned_reranker: dir.join("ce_hr_finetuned"),
        }
    }

    /// Paths resolved through a [`ConfigProvider`].
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Ok(Self {
            jobs_index: config.index_path(Pool::Jobs)?,
            jobs_metadata: config.metadata_path(Pool::Jobs)?,
            resumes_index: config.index_path(Pool::Resumes)?,
            resumes_metadata: config.metadata_path(Pool::Resumes)?,
            finetuned_reranker: config.finetuned_reranker_dir()?,
        })
    }

    /// Override the fine-tuned reranker directory.
    pub fn with_finetuned_reranker(mut self, dir: impl Into<PathBuf>) -> Self {
        self.finetuned_reranker = dir.into();
        self
    }

    fn pool(&self, pool: Pool) -> (&Path, &Path) {
        match pool {
            Pool::Jobs => (&self.jobs_index, &self.jobs_metadata),
            Pool::Resumes => (&self.resumes_index, &self.resumes_metadata),
        }
    }
}

// ============================================================================
// Resource set
// ============================================================================

/// A pool's vector index and its row-aligned metadata table.
pub struct PoolResources<R> {
    index: Box<dyn VectorIndex>,
    store: MetadataStore<R>,
}

impl<R: PoolRow> PoolResources<R> {
    /// Pair an index with its metadata table.
    ///
    /// Fails unless both hold the same number of rows.
    pub fn new(index: Box<dyn VectorIndex>, store: MetadataStore<R>) -> Result<Self> {
        if index.len() != store.len() {
            return Err(Error::invalid_data(format!(
                "{} index has {} vectors but its metadata table has {} rows",
                R::POOL,
                index.len(),
                store.len()
            )));
        }
        Ok(Self { index, store })
    }

    /// Load a pool from its artifacts, or `None` when the index file is
    /// absent.
    pub fn load(index_path: &Path, metadata_path: &Path) -> Result<Option<Self>> {
        if !index_path.exists() {
            log::info!(
                "{} index not found at {}; pool unavailable",
                R::POOL,
                index_path.display()
            );
            return Ok(None);
        }

        let index = FlatIpIndex::load(index_path)?;
        let store = MetadataStore::<R>::load(metadata_path)?;
        let pool = Self::new(Box::new(index), store)?;
        log::info!(
            "Loaded {} pool: {} vectors, dimension {}",
            R::POOL,
            pool.index.len(),
            pool.index.dimension()
        );
        Ok(Some(pool))
    }

    /// The vector index.
    pub fn index(&self) -> &dyn VectorIndex {
        self.index.as_ref()
    }

    /// The metadata table.
    pub fn store(&self) -> &MetadataStore<R> {
        &self.store
    }
}

/// Everything a query needs, loaded once and read-only afterwards.
pub struct ResourceSet {
    encoder: Arc<dyn EmbeddingProvider>,
    reranker: Arc<dyn Reranker>,
    jobs: Option<PoolResources<JobRow>>,
    resumes: Option<PoolResources<ResumeRow>>,
}

impl ResourceSet {
    /// Assemble a resource set with no pools.
    pub fn new(encoder: Arc<dyn EmbeddingProvider>, reranker: Arc<dyn Reranker>) -> Self {
        Self {
            encoder,
            reranker,
            jobs: None,
            resumes: None,
        }
    }

    /// Attach the jobs pool.
    pub fn with_jobs(mut self, jobs: PoolResources<JobRow>) -> Result<Self> {
        check_dimension(self.encoder.as_ref(), Pool::Jobs, jobs.index())?;
        self.jobs = Some(jobs);
        Ok(self)
    }

    /// Attach the resumes pool.
    pub fn with_resumes(mut self, resumes: PoolResources<ResumeRow>) -> Result<Self> {
        check_dimension(self.encoder.as_ref(), Pool::Resumes, resumes.index())?;
        self.resumes = Some(resumes);
        Ok(self)
    }

    /// Load every resource. Blocks.
    pub fn load(paths: &ArtifactPaths, models: &dyn ModelLoader) -> Result<Self> {
        let encoder = models.load_encoder()?;
        let reranker = models.load_reranker(&paths.finetuned_reranker)?;
        log::info!(
            "Loaded encoder {} and reranker {}",
            encoder.name(),
            reranker.variant()
        );

        let mut set = Self::new(encoder, reranker);

        let (index, metadata) = paths.pool(Pool::Jobs);
        if let Some(jobs) = PoolResources::<JobRow>::load(index, metadata)? {
            set = set.with_jobs(jobs)?;
        }

        let (index, metadata) = paths.pool(Pool::Resumes);
        if let Some(resumes) = PoolResources::<ResumeRow>::load(index, metadata)? {
            set = set.with_resumes(resumes)?;
        }

        Ok(set)
    }

    /// The embedding encoder.
    pub fn encoder(&self) -> &dyn EmbeddingProvider {
        self.encoder.as_ref()
    }

    /// The pairwise reranker.
    pub fn reranker(&self) -> &dyn Reranker {
        self.reranker.as_ref()
    }

    /// The jobs pool, or [`Error::PoolUnavailable`].
    pub fn jobs(&self) -> Result<&PoolResources<JobRow>> {
        self.jobs.as_ref().ok_or(Error::PoolUnavailable(Pool::Jobs))
    }

    /// The resumes pool, or [`Error::PoolUnavailable`].
    pub fn resumes(&self) -> Result<&PoolResources<ResumeRow>> {
        self.resumes
            .as_ref()
            .ok_or(Error::PoolUnavailable(Pool::Resumes))
    }

    /// Vector count of a pool, 0 when unavailable.
    pub fn vector_count(&self, pool: Pool) -> usize {
        match pool {
            Pool::Jobs => self.jobs.as_ref().map_or(0, |p| p.index.len()),
            Pool::Resumes => self.resumes.as_ref().map_or(0, |p| p.index.len()),
        }
    }

    /// Dimension of the loaded indices: jobs first, then resumes.
    pub fn embedding_dim(&self) -> Option<usize> {
        self.jobs
            .as_ref()
            .map(|p| p.index.dimension())
            .or_else(|| self.resumes.as_ref().map(|p| p.index.dimension()))
    }
}

fn check_dimension(encoder: &dyn EmbeddingProvider, pool: Pool, index: &dyn VectorIndex) -> Result<()> {
    if index.dimension() != encoder.dimension() {
        return Err(Error::invalid_data(format!(
            "{pool} index dimension {} does not match encoder {} dimension {}",
            index.dimension(),
            encoder.name(),
            encoder.dimension()
        )));
    }
    Ok(())
}

// ============================================================================
// Loader
// ============================================================================

type LoadOutcome = std::result::Result<Arc<ResourceSet>, String>;

/// One-time, concurrency-safe loader for the [`ResourceSet`].
pub struct ResourceLoader {
    paths: Option<ArtifactPaths>,
    models: Arc<dyn ModelLoader>,
    state: Arc<OnceCell<LoadOutcome>>,
}

impl ResourceLoader {
    /// Create an unloaded loader.
    pub fn new(paths: ArtifactPaths, models: Arc<dyn ModelLoader>) -> Self {
        Self {
            paths: Some(paths),
            models,
            state: Arc::new(OnceCell::new()),
        }
    }

    /// Create a loader that already holds `set` and never reads artifacts.
    pub fn preloaded(set: ResourceSet, models: Arc<dyn ModelLoader>) -> Self {
        Self {
            paths: None,
            models,
            state: Arc::new(OnceCell::new_with(Some(Ok(Arc::new(set))))),
        }
    }

    /// Artifact locations this loader reads, if it reads any.
    pub fn paths(&self) -> Option<&ArtifactPaths> {
        self.paths.as_ref()
    }

    /// Whether a load has completed (successfully or not).
    pub fn is_initialized(&self) -> bool {
        self.state.initialized()
    }

    /// Load everything on first call; return the shared set afterwards.
    ///
    /// A failed load is remembered and reported again on every call. The
    /// load runs on its own task, so a caller that stops waiting (for
    /// example under a timeout) does not abandon it: later callers wait
    /// for that same load instead of starting another.
    pub async fn ensure_loaded(&self) -> Result<Arc<ResourceSet>> {
        let outcome = match self.state.get() {
            Some(outcome) => outcome,
            None => {
                self.run_load().await?;
                self.state
                    .get()
                    .ok_or_else(|| Error::resource_load("loader finished without a result"))?
            }
        };

        match outcome {
            Ok(set) => Ok(Arc::clone(set)),
            Err(msg) => Err(Error::resource_load(msg.clone())),
        }
    }

    async fn run_load(&self) -> Result<()> {
        let paths = self
            .paths
            .clone()
            .ok_or_else(|| Error::resource_load("no artifact paths configured"))?;
        let models = Arc::clone(&self.models);
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            state.get_or_init(|| load_outcome(paths, models)).await;
        })
        .await
        .map_err(|e| Error::resource_load(format!("loader task failed: {e}")))
    }
}

async fn load_outcome(paths: ArtifactPaths, models: Arc<dyn ModelLoader>) -> LoadOutcome {
    let joined =
        tokio::task::spawn_blocking(move || ResourceSet::load(&paths, models.as_ref())).await;

    match joined {
        Ok(Ok(set)) => Ok(Arc::new(set)),
        Ok(Err(Error::ResourceLoad(msg))) => {
            log::error!("Resource load failed: {msg}");
            Err(msg)
        }
        Ok(Err(e)) => {
            log::error!("Resource load failed: {e}");
            Err(e.to_string())
        }
        Err(e) => {
            log::error!("Resource load task failed: {e}");
            Err(format!("loader task failed: {e}"))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
