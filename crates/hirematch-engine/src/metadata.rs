//! Pool metadata tables.
//!
//! A [`MetadataStore`] is the ordered, read-only table that sits beside a
//! pool's vector index. Row *i* describes the document stored as vector
//! *i*, so rows are only ever addressed by position.

use std::io::Read;
use std::path::Path;

use hirematch_core::{Error, Pool, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::PoolDocument;

// ============================================================================
// Row types
// ============================================================================

/// One job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRow {
    /// Short job title.
    #[serde(rename = "Job Title", default)]
    pub title: String,

    /// Long description, used for previews and keyword lookup.
    #[serde(rename = "Description", default)]
    pub description: String,

    /// Full text that was embedded and is sent to the reranker.
    #[serde(default)]
    pub text: String,
}

/// One resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRow {
    /// Resume category (e.g. "Data Science").
    #[serde(rename = "Category", default)]
    pub category: String,

    /// Full resume text.
    #[serde(rename = "Resume", default)]
    pub text: String,
}

/// A row type that belongs to one pool.
pub trait PoolRow: DeserializeOwned + Clone + Send + Sync + 'static {
    /// The pool this row type lives in.
    const POOL: Pool;

    /// Text paired with the query for reranking.
    fn rerank_text(&self) -> &str;

    /// Long field shown, truncated, in result previews.
    fn preview_source(&self) -> &str;

    /// Wrap the row for pool-agnostic callers.
    fn into_document(self) -> PoolDocument;
}

impl PoolRow for JobRow {
    const POOL: Pool = Pool::Jobs;

    fn rerank_text(&self) -> &str {
        &self.text
    }

    fn preview_source(&self) -> &str {
        &self.description
    }

    fn into_document(self) -> PoolDocument {
        PoolDocument::Job(self)
    }
}

impl PoolRow for ResumeRow {
    const POOL: Pool = Pool::Resumes;

    fn rerank_text(&self) -> &str {
        &self.text
    }

    fn preview_source(&self) -> &str {
        &self.text
    }

    fn into_document(self) -> PoolDocument {
        PoolDocument::Resume(self)
    }
}

// ============================================================================
// Store
// ============================================================================

/// Ordered, position-indexed table of pool rows.
#[derive(Debug, Clone)]
pub struct MetadataStore<R> {
    rows: Vec<R>,
}

impl<R: PoolRow> MetadataStore<R> {
    /// Wrap rows already in index order.
    pub fn from_rows(rows: Vec<R>) -> Self {
        Self { rows }
    }

    /// Load a CSV table from disk. Columns are matched by header name;
    /// unknown columns are ignored.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Error::io_with_path(e, path))?;
        Self::from_reader(file).map_err(|e| match e {
            Error::Parse(msg) => Error::parse(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Read a CSV table from any reader.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut rows = Vec::new();
        for (line, record) in csv_reader.deserialize::<R>().enumerate() {
            let row = record.map_err(|e| {
                Error::parse(format!("{} metadata row {line}: {e}", R::POOL))
            })?;
            rows.push(row);
        }
        Ok(Self { rows })
    }

    /// Row at index position `id`.
    pub fn get(&self, id: usize) -> Option<&R> {
        self.rows.get(id)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows in table order.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }
}

impl MetadataStore<JobRow> {
    /// First job (table order) whose title or description contains
    /// `keywords`, compared case-insensitively as a literal substring.
    pub fn find_by_keywords(&self, keywords: &str) -> Option<&JobRow> {
        let needle = keywords.to_lowercase();
        self.rows.iter().find(|row| {
            row.title.to_lowercase().contains(&needle)
                || row.description.to_lowercase().contains(&needle)
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
