//! Request, result and status types for the matching engine.

use hirematch_core::Pool;
use serde::{Deserialize, Serialize};

use crate::fusion::preview;
use crate::metadata::{JobRow, PoolRow, ResumeRow};

// ============================================================================
// Settings
// ============================================================================

/// Default shortlist and result sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Shortlist size fetched from the vector index.
    #[serde(deserialize_with = "hirematch_core::serde_ext::usize_from_any")]
    pub default_k: usize,

    /// Number of ranked rows returned.
    #[serde(deserialize_with = "hirematch_core::serde_ext::usize_from_any")]
    pub default_top_m: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_k: 25,
            default_top_m: 10,
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Job description → resumes request.
///
/// Supply either `jd_text` or `keywords`; `jd_text` wins when both are set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateSearchRequest {
    /// Full job description text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jd_text: Option<String>,

    /// Keywords resolved to a stored job description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,

    /// Shortlist size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<usize>,

    /// Result size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_m: Option<usize>,
}

impl CandidateSearchRequest {
    /// Request ranked against a job description text.
    pub fn from_text(jd_text: impl Into<String>) -> Self {
        Self {
            jd_text: Some(jd_text.into()),
            ..Default::default()
        }
    }

    /// Request ranked against the first job matching `keywords`.
    pub fn from_keywords(keywords: impl Into<String>) -> Self {
        Self {
            keywords: Some(keywords.into()),
            ..Default::default()
        }
    }

    /// Set the shortlist size.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    /// Set the result size.
    pub fn with_top_m(mut self, top_m: usize) -> Self {
        self.top_m = Some(top_m);
        self
    }
}

/// Resume → job descriptions request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSearchRequest {
    /// Full resume text.
    #[serde(default)]
    pub resume_text: String,

    /// Shortlist size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<usize>,

    /// Result size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_m: Option<usize>,
}

impl JobSearchRequest {
    /// Request ranked against a resume text.
    pub fn new(resume_text: impl Into<String>) -> Self {
        Self {
            resume_text: resume_text.into(),
            ..Default::default()
        }
    }

    /// Set the shortlist size.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    /// Set the result size.
    pub fn with_top_m(mut self, top_m: usize) -> Self {
        self.top_m = Some(top_m);
        self
    }
}

// ============================================================================
// Results
// ============================================================================

/// The stored fields of a candidate, whichever pool it came from.
///
/// Serialized flat as the row's own columns. Output only: the two row
/// shapes share no required field, so the pool can't be recovered from JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PoolDocument {
    /// A job description.
    Job(JobRow),
    /// A resume.
    Resume(ResumeRow),
}

impl PoolDocument {
    /// Pool the document came from.
    pub fn pool(&self) -> Pool {
        match self {
            PoolDocument::Job(_) => Pool::Jobs,
            PoolDocument::Resume(_) => Pool::Resumes,
        }
    }

    /// Truncated long text for display.
    pub fn preview(&self) -> String {
        match self {
            PoolDocument::Job(row) => preview(row.preview_source()),
            PoolDocument::Resume(row) => preview(row.preview_source()),
        }
    }
}

/// One ranked candidate, produced for a single query and then discarded.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateRecord {
    /// Row position in the pool's index and metadata table.
    pub row_id: usize,

    /// Stored fields of the candidate.
    pub document: PoolDocument,

    /// Vector similarity from the index.
    pub bi_score: f32,

    /// Reranker relevance probability.
    pub ce_prob: f32,

    /// Fused ranking score.
    pub score: f32,
}

/// Result row for job description → resumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeMatch {
    /// Resume category.
    pub category: String,
    /// Truncated resume text.
    pub resume_preview: String,
    /// Vector similarity.
    pub bi_score: f32,
    /// Reranker probability.
    pub ce_prob: f32,
    /// Fused score.
    pub score: f32,
}

/// Result row for resume → job descriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatch {
    /// Job title.
    pub job_title: String,
    /// Truncated job description.
    pub description_preview: String,
    /// Vector similarity.
    pub bi_score: f32,
    /// Reranker probability.
    pub ce_prob: f32,
    /// Fused score.
    pub score: f32,
}

/// A job description resolved from keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobHit {
    /// Job title.
    pub title: String,
    /// Full job text.
    pub text: String,
}

/// Loaded-resource status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    /// Vectors in the jobs index (0 when unavailable).
    pub jd_vector_count: usize,
    /// Vectors in the resumes index (0 when unavailable).
    pub resume_vector_count: usize,
    /// Dimension of the loaded indices, if any is loaded.
    pub embedding_dim: Option<usize>,
    /// Loaded reranker variant.
    pub reranker_variant: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_settings_defaults() {
        let settings = SearchSettings::default();
        assert_eq!(settings.default_k, 25);
        assert_eq!(settings.default_top_m, 10);
    }

    #[test]
    fn test_search_settings_accept_numeric_text() {
        let settings: SearchSettings =
            serde_json::from_str(r#"{"default_k": "50", "default_top_m": 4}"#).unwrap();
        assert_eq!(settings.default_k, 50);
        assert_eq!(settings.default_top_m, 4);

        assert!(serde_json::from_str::<SearchSettings>(r#"{"default_k": "lots"}"#).is_err());
    }

    #[test]
    fn test_candidate_request_from_json() {
        let req: CandidateSearchRequest =
            serde_json::from_str(r#"{"keywords": "nurse", "top_m": 3}"#).unwrap();
        assert!(req.jd_text.is_none());
        assert_eq!(req.keywords.as_deref(), Some("nurse"));
        assert_eq!(req.top_m, Some(3));
        assert!(req.k.is_none());
    }

    #[test]
    fn test_result_rows_serialize_documented_fields() {
        let row = ResumeMatch {
            category: "HR".into(),
            resume_preview: "People ops".into(),
            bi_score: 0.5,
            ce_prob: 0.25,
            score: 0.325,
        };
        let json = serde_json::to_value(&row).unwrap();
        let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["bi_score", "category", "ce_prob", "resume_preview", "score"]
        );

        let job = JobMatch {
            job_title: "Nurse".into(),
            description_preview: "Care".into(),
            bi_score: 0.1,
            ce_prob: 0.2,
            score: 0.17,
        };
        let json = serde_json::to_value(&job).unwrap();
        assert!(json.get("job_title").is_some());
        assert!(json.get("description_preview").is_some());
    }

    #[test]
    fn test_document_pool_and_preview() {
        let doc = PoolDocument::Resume(ResumeRow {
            category: "IT".into(),
            text: "x".repeat(300),
        });
        assert_eq!(doc.pool(), Pool::Resumes);
        assert_eq!(doc.preview().chars().count(), 223);
    }

    #[test]
    fn test_resume_record_serializes_resume_columns() {
        let record = CandidateRecord {
            row_id: 2,
            document: PoolDocument::Resume(ResumeRow {
                category: "HR".into(),
                text: "Recruiter".into(),
            }),
            bi_score: 0.4,
            ce_prob: 0.6,
            score: 0.54,
        };
        let json = serde_json::to_value(&record).unwrap();
        let document = json["document"].as_object().unwrap();
        assert_eq!(document["Category"], "HR");
        assert_eq!(document["Resume"], "Recruiter");
        assert!(!document.contains_key("Job Title"));
        assert_eq!(record.document.pool(), Pool::Resumes);
    }
}
