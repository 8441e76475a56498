//! Model loading.
//!
//! The [`ModelLoader`] trait is the seam between the resource loader and
//! the concrete encoder/reranker backends. Both methods block (model files
//! are read and possibly downloaded) and are only called from the
//! blocking thread pool.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use hirematch_core::{Error, Result};
use hirematch_vector::{EmbeddingProvider, MockEmbeddingProvider, MockReranker, Reranker};

/// Loads the shared encoder and reranker models.
pub trait ModelLoader: Send + Sync {
    /// Load the embedding encoder.
    fn load_encoder(&self) -> Result<Arc<dyn EmbeddingProvider>>;

    /// Load the reranker, preferring a fine-tuned model in
    /// `finetuned_dir` when present.
    fn load_reranker(&self, finetuned_dir: &Path) -> Result<Arc<dyn Reranker>>;
}

/// Loader for the mock encoder and reranker.
///
/// Counts loads and can be told to fail, which makes it suitable for
/// exercising the resource loader's once-only and failure semantics.
#[derive(Debug)]
pub struct MockModelLoader {
    dimension: usize,
    reranker: Arc<MockReranker>,
    fail_encoder: bool,
    load_delay: Option<Duration>,
    encoder_loads: AtomicUsize,
    reranker_loads: AtomicUsize,
}

impl MockModelLoader {
    /// Create a loader producing `dimension`-sized mock embeddings.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            reranker: Arc::new(MockReranker::new()),
            fail_encoder: false,
            load_delay: None,
            encoder_loads: AtomicUsize::new(0),
            reranker_loads: AtomicUsize::new(0),
        }
    }

    /// Make every encoder load fail.
    pub fn failing_encoder(mut self) -> Self {
        self.fail_encoder = true;
        self
    }

    /// Block each encoder load for `delay`, like a slow model download.
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = Some(delay);
        self
    }

    /// The shared mock reranker, for inspecting call counts.
    pub fn reranker(&self) -> Arc<MockReranker> {
        Arc::clone(&self.reranker)
    }

    /// Number of encoder loads attempted.
    pub fn encoder_loads(&self) -> usize {
        self.encoder_loads.load(Ordering::SeqCst)
    }

    /// Number of reranker loads attempted.
    pub fn reranker_loads(&self) -> usize {
        self.reranker_loads.load(Ordering::SeqCst)
    }
}

impl ModelLoader for MockModelLoader {
    fn load_encoder(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        self.encoder_loads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.load_delay {
            std::thread::sleep(delay);
        }
        if self.fail_encoder {
            return Err(Error::resource_load("mock encoder unavailable"));
        }
        Ok(Arc::new(MockEmbeddingProvider::new(self.dimension)))
    }

    fn load_reranker(&self, _finetuned_dir: &Path) -> Result<Arc<dyn Reranker>> {
        self.reranker_loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.reranker.clone())
    }
}

#[cfg(feature = "fastembed")]
pub use fastembed_loader::FastEmbedModelLoader;

#[cfg(feature = "fastembed")]
mod fastembed_loader {
    use super::*;
    use hirematch_vector::{
        EmbeddingSettings, FastEmbedProvider, FastEmbedReranker, RerankerSettings,
    };

    /// Loader for the fastembed encoder and cross-encoder.
    #[derive(Debug, Clone, Default)]
    pub struct FastEmbedModelLoader {
        embedding: EmbeddingSettings,
        reranker: RerankerSettings,
    }

    impl FastEmbedModelLoader {
        /// Create a loader from model settings.
        pub fn new(embedding: EmbeddingSettings, reranker: RerankerSettings) -> Self {
            Self {
                embedding,
                reranker,
            }
        }
    }

    impl ModelLoader for FastEmbedModelLoader {
        fn load_encoder(&self) -> Result<Arc<dyn EmbeddingProvider>> {
            Ok(Arc::new(FastEmbedProvider::new(&self.embedding)?))
        }

        fn load_reranker(&self, finetuned_dir: &Path) -> Result<Arc<dyn Reranker>> {
            Ok(Arc::new(FastEmbedReranker::load(&self.reranker, finetuned_dir)?))
        }
    }
}
