//! Pool vector index.
//!
//! [`FlatIpIndex`] is an immutable, exact inner-product index over the
//! unit-length document vectors of one pool. Row *i* of the index is the
//! document at row *i* of the pool's metadata table.
//!
//! # Artifact format
//!
//! Little-endian, as produced by the offline build tooling:
//!
//! | Field     | Size              | Notes                           |
//! |-----------|-------------------|---------------------------------|
//! | magic     | 4                 | `HMVX`                          |
//! | version   | 4 (`u32`)         | currently 1                     |
//! | dim       | 4 (`u32`)         | vector dimension                |
//! | count     | 8 (`u64`)         | number of vectors               |
//! | vectors   | `count * dim * 4` | `f32`, row-major                |
//! | digest    | 32                | Blake3 of the vector bytes      |

use std::cmp::Ordering;
use std::path::Path;

use hirematch_core::{Error, Result};

use crate::types::SearchHit;

const MAGIC: &[u8; 4] = b"HMVX";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 4 + 8;
const DIGEST_LEN: usize = 32;

/// Read-only nearest-neighbor search over one pool.
pub trait VectorIndex: Send + Sync {
    /// Return the `min(k, len)` stored vectors with the highest inner
    /// product against `query`, best first.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>>;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    /// Whether the index holds no vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector dimension.
    fn dimension(&self) -> usize;
}

/// Exact (brute-force) inner-product index.
#[derive(Debug, Clone)]
pub struct FlatIpIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIpIndex {
    /// Build an index from row vectors, in row order.
    ///
    /// All vectors must share the same dimension.
    pub fn from_vectors(dimension: usize, vectors: &[Vec<f32>]) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::invalid_data("Index dimension must be non-zero"));
        }
        let mut data = Vec::with_capacity(dimension * vectors.len());
        for (row, vector) in vectors.iter().enumerate() {
            if vector.len() != dimension {
                return Err(Error::invalid_data(format!(
                    "Vector {row} has dimension {}, expected {dimension}",
                    vector.len()
                )));
            }
            data.extend_from_slice(vector);
        }
        Ok(Self { dimension, data })
    }

    /// Load an index artifact from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| Error::io_with_path(e, path))?;
        Self::from_bytes(&bytes).map_err(|e| match e {
            Error::InvalidData(msg) => Error::invalid_data(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Decode an index artifact.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN + DIGEST_LEN {
            return Err(Error::invalid_data("Index artifact is truncated"));
        }
        if &bytes[0..4] != MAGIC {
            return Err(Error::invalid_data("Not a hirematch index artifact"));
        }

        let version = read_u32(&bytes[4..8]);
        if version != FORMAT_VERSION {
            return Err(Error::invalid_data(format!(
                "Unsupported index format version {version}"
            )));
        }

        let dimension = read_u32(&bytes[8..12]) as usize;
        let count = usize::try_from(read_u64(&bytes[12..20]))
            .map_err(|_| Error::invalid_data("Vector count does not fit in memory"))?;
        if dimension == 0 {
            return Err(Error::invalid_data("Index dimension must be non-zero"));
        }

        let payload_len = count
            .checked_mul(dimension)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| Error::invalid_data("Index size overflows"))?;
        if bytes.len() != HEADER_LEN + payload_len + DIGEST_LEN {
            return Err(Error::invalid_data(format!(
                "Index length mismatch: header declares {count} x {dimension} vectors"
            )));
        }

        let payload = &bytes[HEADER_LEN..HEADER_LEN + payload_len];
        let digest = &bytes[HEADER_LEN + payload_len..];
        if blake3::hash(payload).as_bytes() != digest {
            return Err(Error::invalid_data("Index checksum mismatch"));
        }

        let data = payload
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        Ok(Self { dimension, data })
    }

    /// Encode the index as an artifact.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.data.len() * 4);
        for value in &self.data {
            payload.extend_from_slice(&value.to_le_bytes());
        }

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len() + DIGEST_LEN);
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&payload);
        bytes.extend_from_slice(blake3::hash(&payload).as_bytes());
        bytes
    }

    /// Write the index artifact to `path`.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_bytes()).map_err(|e| Error::io_with_path(e, path))
    }

    fn row(&self, id: usize) -> &[f32] {
        &self.data[id * self.dimension..(id + 1) * self.dimension]
    }
}

impl VectorIndex for FlatIpIndex {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if query.len() != self.dimension {
            return Err(Error::operation(format!(
                "Query dimension {} does not match index dimension {}",
                query.len(),
                self.dimension
            )));
        }

        let k = k.min(self.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<SearchHit> = (0..self.len())
            .map(|id| SearchHit {
                id,
                score: self.row(id).iter().zip(query).map(|(a, b)| a * b).sum(),
            })
            .collect();

        // Best first; equal scores keep the lower row id first.
        let by_rank = |a: &SearchHit, b: &SearchHit| -> Ordering {
            b.score.total_cmp(&a.score).then(a.id.cmp(&b.id))
        };

        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, by_rank);
            hits.truncate(k);
        }
        hits.sort_by(by_rank);

        Ok(hits)
    }

    fn len(&self) -> usize {
        self.data.len() / self.dimension
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn read_u64(bytes: &[u8]) -> u64 {
    u64::from_le_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> FlatIpIndex {
        FlatIpIndex::from_vectors(
            2,
            &[
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![0.6, 0.8],
                vec![-1.0, 0.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_search_orders_by_descending_score() {
        let index = sample_index();
        let hits = index.search(&[1.0, 0.0], 4).unwrap();

        let ids: Vec<usize> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![0, 2, 1, 3]);
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert!((hits[0].score - 1.0).abs() < 1e-6);
        assert!((hits[3].score + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_search_truncates_to_k() {
        let index = sample_index();
        let hits = index.search(&[0.0, 1.0], 2).unwrap();
        let ids: Vec<usize> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_search_clamps_k_to_len() {
        let index = FlatIpIndex::from_vectors(
            2,
            &[vec![1.0, 0.0], vec![0.0, 1.0], vec![0.6, 0.8]],
        )
        .unwrap();
        let hits = index.search(&[1.0, 0.0], 25).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_search_ties_prefer_lower_id() {
        let index =
            FlatIpIndex::from_vectors(2, &[vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 0.0]])
                .unwrap();
        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        let ids: Vec<usize> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_search_zero_k_and_empty_index() {
        let index = sample_index();
        assert!(index.search(&[1.0, 0.0], 0).unwrap().is_empty());

        let empty = FlatIpIndex::from_vectors(3, &[]).unwrap();
        assert!(empty.is_empty());
        assert!(empty.search(&[1.0, 0.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_search_rejects_dimension_mismatch() {
        let index = sample_index();
        let err = index.search(&[1.0, 0.0, 0.0], 1).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn test_from_vectors_rejects_ragged_rows() {
        let err = FlatIpIndex::from_vectors(2, &[vec![1.0, 0.0], vec![1.0]]).unwrap_err();
        assert!(err.to_string().contains("Vector 1"));
    }

    #[test]
    fn test_artifact_written_and_loaded_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jd_index.hmvx");

        let index = sample_index();
        index.write_to_path(&path).unwrap();
        let loaded = FlatIpIndex::load(&path).unwrap();

        assert_eq!(loaded.len(), 4);
        assert_eq!(loaded.dimension(), 2);
        assert_eq!(
            loaded.search(&[0.6, 0.8], 1).unwrap()[0].id,
            index.search(&[0.6, 0.8], 1).unwrap()[0].id
        );
    }

    #[test]
    fn test_corrupt_payload_fails_checksum() {
        let mut bytes = sample_index().to_bytes();
        bytes[HEADER_LEN] ^= 0xFF;
        let err = FlatIpIndex::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn test_bad_magic_and_truncation() {
        let mut bytes = sample_index().to_bytes();
        bytes[0] = b'X';
        assert!(FlatIpIndex::from_bytes(&bytes).is_err());

        let bytes = sample_index().to_bytes();
        let err = FlatIpIndex::from_bytes(&bytes[..bytes.len() - 4]).unwrap_err();
        assert!(err.to_string().contains("length mismatch"));

        assert!(FlatIpIndex::from_bytes(b"HMVX").is_err());
    }

    #[test]
    fn test_corrupt_file_names_path_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jd_index.hmvx");
        let bytes = sample_index().to_bytes();
        std::fs::write(&path, &bytes[..bytes.len() - 4]).unwrap();

        let message = FlatIpIndex::load(&path).unwrap_err().to_string();
        assert!(message.contains(&path.display().to_string()));
        assert_eq!(message.matches("Invalid data").count(), 1);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = FlatIpIndex::load("/nonexistent/jd_index.hmvx").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/jd_index.hmvx"));
    }
}
