//! Vector primitives for hirematch.
//!
//! This crate provides the three model-facing pieces of the matching
//! pipeline behind pluggable traits: embedding providers, pairwise
//! rerankers and the pool vector index. fastembed-backed implementations
//! are feature-gated; deterministic mocks are always available.
//!
//! # Features
//!
//! - `fastembed`: Enable local embedding and cross-encoder reranking via fastembed
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     hirematch-vector                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  EmbeddingProvider trait                                    │
//! │  ├── MockEmbeddingProvider (always available)               │
//! │  └── FastEmbedProvider (feature: fastembed)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Reranker trait                                             │
//! │  ├── MockReranker (always available)                        │
//! │  └── FastEmbedReranker (feature: fastembed)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  VectorIndex trait                                          │
//! │  └── FlatIpIndex (exact inner product, .hmvx artifact)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod embedding;
pub mod index;
pub mod rerank;
pub mod types;

#[cfg(feature = "fastembed")]
pub mod fastembed;

#[cfg(feature = "fastembed")]
pub mod fastembed_rerank;

// Re-exports: traits and implementations
pub use embedding::{EmbeddingProvider, MockEmbeddingProvider, l2_normalize};
pub use index::{FlatIpIndex, VectorIndex};
pub use rerank::{MockReranker, Reranker, sigmoid};

// Re-exports: types
pub use types::{EmbeddingSettings, RerankerSettings, SearchHit};

#[cfg(feature = "fastembed")]
pub use fastembed::FastEmbedProvider;

#[cfg(feature = "fastembed")]
pub use fastembed_rerank::FastEmbedReranker;
