//! Document pools.
//!
//! Every pool owns exactly one vector index artifact and one row-aligned
//! metadata table in the artifacts directory.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two disjoint document pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pool {
    /// Job descriptions (queried with a resume).
    Jobs,
    /// Resumes (queried with a job description).
    Resumes,
}

impl Pool {
    /// Both pools, jobs first.
    pub const ALL: [Pool; 2] = [Pool::Jobs, Pool::Resumes];

    /// File name of the pool's vector index artifact.
    pub fn index_file_name(self) -> &'static str {
        match self {
            Pool::Jobs => "jd_index.hmvx",
            Pool::Resumes => "resume_index.hmvx",
        }
    }

    /// File name of the pool's metadata table.
    pub fn metadata_file_name(self) -> &'static str {
        match self {
            Pool::Jobs => "jd_meta.csv",
            Pool::Resumes => "resume_meta.csv",
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pool::Jobs => write!(f, "JD"),
            Pool::Resumes => write!(f, "Resume"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names_are_distinct() {
        assert_ne!(Pool::Jobs.index_file_name(), Pool::Resumes.index_file_name());
        assert_ne!(
            Pool::Jobs.metadata_file_name(),
            Pool::Resumes.metadata_file_name()
        );
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Pool::Resumes).unwrap();
        assert_eq!(json, "\"resumes\"");
        let pool: Pool = serde_json::from_str("\"jobs\"").unwrap();
        assert_eq!(pool, Pool::Jobs);
    }
}
