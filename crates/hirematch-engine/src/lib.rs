//! Retrieve-and-rerank matching between resumes and job descriptions.
//!
//! A query is matched against one of two document pools. The engine
//! shortlists candidates by embedding similarity, rescores the shortlist
//! with a pairwise reranker, and fuses both scores into the final ranking.
//!
//! # Key Abstractions
//!
//! - [`ResourceLoader`]: loads models, indices and metadata exactly once
//! - [`Matcher`]: the query operations (`search_candidates`, `search_jobs`,
//!   `find_by_keywords`, `health`)
//! - [`ModelLoader`]: seam between the loader and the model backends
//! - [`MetadataStore`]: position-indexed table beside each vector index
//!
//! # Features
//!
//! - `fastembed`: Enable [`FastEmbedModelLoader`] for real models

pub mod fusion;
pub mod matcher;
pub mod metadata;
pub mod models;
pub mod resources;
pub mod types;

pub use fusion::{BI_ENCODER_WEIGHT, RERANKER_WEIGHT, fuse_and_select, fused_score, preview};
pub use matcher::Matcher;
pub use metadata::{JobRow, MetadataStore, PoolRow, ResumeRow};
pub use models::{MockModelLoader, ModelLoader};
pub use resources::{ArtifactPaths, PoolResources, ResourceLoader, ResourceSet};
pub use types::{
    CandidateRecord, CandidateSearchRequest, Health, JobHit, JobMatch, JobSearchRequest,
    PoolDocument, ResumeMatch, SearchSettings,
};

#[cfg(feature = "fastembed")]
pub use models::FastEmbedModelLoader;
