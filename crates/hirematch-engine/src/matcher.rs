//! The two-stage matcher.
//!
//! Every query runs the same pipeline against one pool: encode the query,
//! shortlist `k` rows from the vector index, score each shortlisted row
//! against the query with the reranker in a single call, fuse the two
//! scores and keep the best `top_m`.

use std::sync::Arc;

use hirematch_core::{Error, Pool, Result};

use crate::fusion::{Scored, fuse_and_select, preview};
use crate::metadata::PoolRow;
use crate::resources::{PoolResources, ResourceLoader, ResourceSet};
use crate::types::{
    CandidateRecord, CandidateSearchRequest, Health, JobHit, JobMatch, JobSearchRequest,
    ResumeMatch, SearchSettings,
};

/// Query front end over a lazily loaded [`ResourceSet`].
pub struct Matcher {
    loader: Arc<ResourceLoader>,
    search: SearchSettings,
}

impl Matcher {
    /// Create a matcher with default search settings.
    pub fn new(loader: Arc<ResourceLoader>) -> Self {
        Self {
            loader,
            search: SearchSettings::default(),
        }
    }

    /// Replace the default `k`/`top_m`.
    pub fn with_search_settings(mut self, search: SearchSettings) -> Self {
        self.search = search;
        self
    }

    /// The underlying loader.
    pub fn loader(&self) -> &ResourceLoader {
        &self.loader
    }

    /// Counts and model information of the loaded resources.
    pub async fn health(&self) -> Result<Health> {
        let set = self.loader.ensure_loaded().await?;
        Ok(Health {
            jd_vector_count: set.vector_count(Pool::Jobs),
            resume_vector_count: set.vector_count(Pool::Resumes),
            embedding_dim: set.embedding_dim(),
            reranker_variant: set.reranker().variant().to_string(),
        })
    }

    /// Rank rows of `pool` against `query`.
    pub async fn rank_candidates_for_query(
        &self,
        query: &str,
        k: usize,
        top_m: usize,
        pool: Pool,
    ) -> Result<Vec<CandidateRecord>> {
        validate_query(query, k)?;
        let set = self.loader.ensure_loaded().await?;

        let scored = match pool {
            Pool::Jobs => into_records(rank_in_pool(&set, set.jobs()?, query, k, top_m).await?),
            Pool::Resumes => {
                into_records(rank_in_pool(&set, set.resumes()?, query, k, top_m).await?)
            }
        };
        Ok(scored)
    }

    /// First stored job whose title or description contains `keywords`.
    ///
    /// Yields `None` when nothing matches or the jobs pool is not loaded.
    pub async fn find_by_keywords(&self, keywords: &str) -> Result<Option<JobHit>> {
        if keywords.trim().is_empty() {
            return Err(Error::invalid_input("keywords must not be empty"));
        }

        let set = self.loader.ensure_loaded().await?;
        let Ok(jobs) = set.jobs() else {
            log::debug!("Keyword lookup with no jobs pool loaded");
            return Ok(None);
        };

        Ok(jobs.store().find_by_keywords(keywords).map(|row| JobHit {
            title: row.title.clone(),
            text: row.text.clone(),
        }))
    }

    /// Rank resumes against a job description, given directly or found by
    /// keywords.
    pub async fn search_candidates(
        &self,
        request: &CandidateSearchRequest,
    ) -> Result<Vec<ResumeMatch>> {
        let k = request.k.unwrap_or(self.search.default_k);
        let top_m = request.top_m.unwrap_or(self.search.default_top_m);

        let query = match (non_blank(&request.jd_text), non_blank(&request.keywords)) {
            (Some(text), _) => text.to_string(),
            (None, Some(keywords)) => {
                validate_k(k)?;
                match self.find_by_keywords(keywords).await? {
                    Some(hit) => {
                        log::debug!("Keywords '{keywords}' resolved to '{}'", hit.title);
                        hit.text
                    }
                    None => {
                        return Err(Error::not_found(format!(
                            "No job description matches keywords '{keywords}'"
                        )));
                    }
                }
            }
            (None, None) => {
                return Err(Error::invalid_input("Provide jd_text or keywords"));
            }
        };

        validate_query(&query, k)?;
        let set = self.loader.ensure_loaded().await?;
        let ranked = rank_in_pool(&set, set.resumes()?, &query, k, top_m).await?;

        Ok(ranked
            .into_iter()
            .map(|s| ResumeMatch {
                resume_preview: preview(s.item.1.preview_source()),
                category: s.item.1.category,
                bi_score: s.bi_score,
                ce_prob: s.ce_prob,
                score: s.score,
            })
            .collect())
    }

    /// Rank job descriptions against a resume.
    pub async fn search_jobs(&self, request: &JobSearchRequest) -> Result<Vec<JobMatch>> {
        let k = request.k.unwrap_or(self.search.default_k);
        let top_m = request.top_m.unwrap_or(self.search.default_top_m);
        if request.resume_text.trim().is_empty() {
            return Err(Error::invalid_input("resume_text must not be empty"));
        }

        validate_query(&request.resume_text, k)?;
        let set = self.loader.ensure_loaded().await?;
        let ranked = rank_in_pool(&set, set.jobs()?, &request.resume_text, k, top_m).await?;

        Ok(ranked
            .into_iter()
            .map(|s| JobMatch {
                description_preview: preview(s.item.1.preview_source()),
                job_title: s.item.1.title,
                bi_score: s.bi_score,
                ce_prob: s.ce_prob,
                score: s.score,
            })
            .collect())
    }
}

/// The caller's text, unless it is missing or only whitespace.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

fn validate_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(Error::invalid_input("k must be at least 1"));
    }
    Ok(())
}

fn validate_query(query: &str, k: usize) -> Result<()> {
    if query.trim().is_empty() {
        return Err(Error::invalid_input("query text must not be empty"));
    }
    validate_k(k)
}

/// Retrieve, rerank and fuse within one pool.
async fn rank_in_pool<R: PoolRow>(
    set: &ResourceSet,
    pool: &PoolResources<R>,
    query: &str,
    k: usize,
    top_m: usize,
) -> Result<Vec<Scored<(usize, R)>>> {
    let embedding = set.encoder().embed(query).await?;
    let hits = pool.index().search(&embedding, k)?;
    log::debug!("{} shortlist: {} of {} rows", R::POOL, hits.len(), pool.index().len());

    let mut shortlist = Vec::with_capacity(hits.len());
    for hit in &hits {
        let row = pool.store().get(hit.id).ok_or_else(|| {
            Error::invalid_data(format!(
                "{} index returned row {} beyond metadata table",
                R::POOL,
                hit.id
            ))
        })?;
        shortlist.push(((hit.id, row.clone()), hit.score));
    }

    if shortlist.is_empty() {
        return Ok(Vec::new());
    }

    let probs = {
        let pairs: Vec<(&str, &str)> = shortlist
            .iter()
            .map(|((_, row), _)| (query, row.rerank_text()))
            .collect();
        set.reranker().score(&pairs).await?
    };

    fuse_and_select(shortlist, &probs, top_m)
}

fn into_records<R: PoolRow>(scored: Vec<Scored<(usize, R)>>) -> Vec<CandidateRecord> {
    scored
        .into_iter()
        .map(|s| CandidateRecord {
            row_id: s.item.0,
            document: s.item.1.into_document(),
            bi_score: s.bi_score,
            ce_prob: s.ce_prob,
            score: s.score,
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{JobRow, MetadataStore, ResumeRow};
    use crate::models::MockModelLoader;
    use crate::types::PoolDocument;
    use hirematch_vector::{
        EmbeddingProvider, FlatIpIndex, MockEmbeddingProvider, MockReranker,
    };

    const DIM: usize = 64;

    fn job(title: &str, description: &str) -> JobRow {
        JobRow {
            title: title.into(),
            description: description.into(),
            text: format!("{title}. {description}"),
        }
    }

    fn resume(category: &str, text: &str) -> ResumeRow {
        ResumeRow {
            category: category.into(),
            text: text.into(),
        }
    }

    fn pool_of<R: PoolRow>(rows: Vec<R>) -> PoolResources<R> {
        let encoder = MockEmbeddingProvider::new(DIM);
        let vectors: Vec<Vec<f32>> = rows
            .iter()
            .map(|r| encoder.embed_sync(r.rerank_text()))
            .collect();
        let index = FlatIpIndex::from_vectors(DIM, &vectors).unwrap();
        PoolResources::new(Box::new(index), MetadataStore::from_rows(rows)).unwrap()
    }

    fn matcher_with(
        jobs: Option<Vec<JobRow>>,
        resumes: Option<Vec<ResumeRow>>,
    ) -> (Matcher, Arc<MockReranker>) {
        let models = Arc::new(MockModelLoader::new(DIM));
        let reranker = models.reranker();
        let mut set = ResourceSet::new(
            Arc::new(MockEmbeddingProvider::new(DIM)),
            reranker.clone(),
        );
        if let Some(rows) = jobs {
            set = set.with_jobs(pool_of(rows)).unwrap();
        }
        if let Some(rows) = resumes {
            set = set.with_resumes(pool_of(rows)).unwrap();
        }
        let loader = Arc::new(ResourceLoader::preloaded(set, models));
        (Matcher::new(loader), reranker)
    }

    /// Mock encoder that remembers every text it was asked to embed.
    struct RecordingEncoder {
        inner: MockEmbeddingProvider,
        seen: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for RecordingEncoder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.seen.lock().unwrap().push(text.to_string());
            self.inner.embed(text).await
        }

        fn dimension(&self) -> usize {
            self.inner.dimension()
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn sample_jobs() -> Vec<JobRow> {
        vec![
            job("Intern marketing assistant", "Social media posts and flyers"),
            job("Senior Backend Engineer", "Senior Backend Engineer with 5 years Go experience"),
            job("Registered Nurse", "Patient care on a hospital ward"),
        ]
    }

    #[tokio::test]
    async fn test_small_pool_returns_everything() {
        let (matcher, _) = matcher_with(Some(sample_jobs()), None);
        let ranked = matcher
            .rank_candidates_for_query("engineer", 25, 10, Pool::Jobs)
            .await
            .unwrap();
        assert_eq!(ranked.len(), 3);
        for r in &ranked {
            assert!((r.score - (0.3 * r.bi_score + 0.7 * r.ce_prob)).abs() < 1e-6);
            assert_eq!(r.document.pool(), Pool::Jobs);
        }
        for pair in ranked.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_relevant_job_ranks_first() {
        let (matcher, _) = matcher_with(Some(sample_jobs()), None);
        let ranked = matcher
            .rank_candidates_for_query("senior backend engineer", 25, 10, Pool::Jobs)
            .await
            .unwrap();
        assert_eq!(ranked[0].row_id, 1);
        match &ranked[0].document {
            PoolDocument::Job(row) => assert_eq!(row.title, "Senior Backend Engineer"),
            other => panic!("unexpected document {other:?}"),
        }
        let intern = ranked.iter().position(|r| r.row_id == 0).unwrap();
        assert!(intern > 0);
    }

    #[tokio::test]
    async fn test_one_reranker_call_per_query() {
        let (matcher, reranker) = matcher_with(Some(sample_jobs()), None);
        matcher
            .rank_candidates_for_query("nurse", 25, 2, Pool::Jobs)
            .await
            .unwrap();
        assert_eq!(reranker.calls(), 1);
        matcher
            .search_jobs(&JobSearchRequest::new("hospital nurse"))
            .await
            .unwrap();
        assert_eq!(reranker.calls(), 2);
    }

    #[tokio::test]
    async fn test_unloaded_pool_is_unavailable() {
        let (matcher, _) = matcher_with(Some(sample_jobs()), None);
        let err = matcher
            .rank_candidates_for_query("python", 25, 10, Pool::Resumes)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PoolUnavailable(Pool::Resumes)));
        assert!(err.is_unavailable());

        let err = matcher
            .search_candidates(&CandidateSearchRequest::from_text("python"))
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_invalid_input_checked_first() {
        let (matcher, reranker) = matcher_with(Some(sample_jobs()), None);

        let err = matcher
            .rank_candidates_for_query("nurse", 0, 10, Pool::Jobs)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = matcher
            .search_candidates(&CandidateSearchRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = matcher
            .search_jobs(&JobSearchRequest::new("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        assert!(matcher.find_by_keywords("").await.is_err());
        assert_eq!(reranker.calls(), 0);
    }

    #[tokio::test]
    async fn test_keyword_lookup() {
        let (matcher, _) = matcher_with(Some(sample_jobs()), None);
        let hit = matcher.find_by_keywords("NURSE").await.unwrap().unwrap();
        assert_eq!(hit.title, "Registered Nurse");
        assert_eq!(hit.text, "Registered Nurse. Patient care on a hospital ward");
        assert!(matcher.find_by_keywords("astronaut").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_keywords_used_as_given() {
        let (matcher, _) = matcher_with(Some(sample_jobs()), None);
        let hit = matcher.find_by_keywords(" care on").await.unwrap().unwrap();
        assert_eq!(hit.title, "Registered Nurse");
        assert!(matcher.find_by_keywords("ward ").await.unwrap().is_none());
        assert!(matches!(
            matcher.find_by_keywords("   ").await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_job_text_reaches_encoder_untrimmed() {
        let encoder = Arc::new(RecordingEncoder {
            inner: MockEmbeddingProvider::new(DIM),
            seen: std::sync::Mutex::new(Vec::new()),
        });
        let models = Arc::new(MockModelLoader::new(DIM));
        let set = ResourceSet::new(encoder.clone(), models.reranker())
            .with_resumes(pool_of(vec![resume("HR", "Recruiting and onboarding")]))
            .unwrap();
        let matcher = Matcher::new(Arc::new(ResourceLoader::preloaded(set, models)));

        let request = CandidateSearchRequest {
            jd_text: Some("  recruiter role\n".into()),
            ..Default::default()
        };
        matcher.search_candidates(&request).await.unwrap();
        assert_eq!(*encoder.seen.lock().unwrap(), vec!["  recruiter role\n".to_string()]);
    }

    #[tokio::test]
    async fn test_keyword_lookup_without_jobs_pool() {
        let (matcher, _) = matcher_with(None, Some(vec![resume("HR", "people")]));
        assert!(matcher.find_by_keywords("nurse").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_candidates_by_keywords() {
        let (matcher, _) = matcher_with(
            Some(sample_jobs()),
            Some(vec![
                resume("Sales", "Retail sales and customer service"),
                resume("Healthcare", "Registered nurse with patient care on a hospital ward"),
            ]),
        );

        let results = matcher
            .search_candidates(&CandidateSearchRequest::from_keywords("nurse").with_top_m(1))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].category, "Healthcare");

        let err = matcher
            .search_candidates(&CandidateSearchRequest::from_keywords("astronaut"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_text_wins_over_keywords() {
        let (matcher, _) = matcher_with(
            Some(sample_jobs()),
            Some(vec![
                resume("Sales", "Retail sales and customer service"),
                resume("Engineering", "Backend engineer writing Go services"),
            ]),
        );
        let request = CandidateSearchRequest {
            jd_text: Some("retail sales customer service".into()),
            keywords: Some("astronaut".into()),
            ..Default::default()
        };
        let results = matcher.search_candidates(&request).await.unwrap();
        assert_eq!(results[0].category, "Sales");
    }

    #[tokio::test]
    async fn test_search_jobs_previews() {
        let long = "Go ".repeat(120);
        let (matcher, _) = matcher_with(Some(vec![job("Gopher", &long)]), None);
        let results = matcher
            .search_jobs(&JobSearchRequest::new("go developer"))
            .await
            .unwrap();
        assert_eq!(results[0].job_title, "Gopher");
        assert!(results[0].description_preview.ends_with("..."));
        assert_eq!(results[0].description_preview.chars().count(), 223);
    }

    #[tokio::test]
    async fn test_health_report() {
        let (matcher, _) = matcher_with(Some(sample_jobs()), None);
        let health = matcher.health().await.unwrap();
        assert_eq!(health.jd_vector_count, 3);
        assert_eq!(health.resume_vector_count, 0);
        assert_eq!(health.embedding_dim, Some(DIM));
        assert_eq!(health.reranker_variant, "mock");

        let (empty, _) = matcher_with(None, None);
        assert_eq!(empty.health().await.unwrap().embedding_dim, None);
    }

    #[test]
    fn test_encoder_dimension_checked_on_attach() {
        let set = ResourceSet::new(
            Arc::new(MockEmbeddingProvider::new(DIM * 2)),
            Arc::new(MockReranker::new()),
        );
        assert!(set.with_jobs(pool_of(sample_jobs())).is_err());
        assert_eq!(MockEmbeddingProvider::new(DIM).dimension(), DIM);
    }
}
