//! Exact nearest-neighbor index over page embeddings
//!
//! Vectors are kept in one row-major buffer and every query scans all of
//! them. Scores are `1 - squared_l2_distance`: an ordering heuristic, not a
//! normalized similarity. An exact hit scores 1.0; distant vectors score
//! below zero.

use crate::index::{IndexedEntry, SearchResult};
use crate::{IndexError, IndexResult, EMBEDDING_DIM};

/// Flat (linear scan) vector index, immutable once built
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dim: usize,
    /// Row-major, `entries.len() * dim` values
    vectors: Vec<f32>,
    entries: Vec<IndexedEntry>,
}

impl VectorIndex {
    /// Builds an index over `entries` using [`EMBEDDING_DIM`]
    ///
    /// # Errors
    ///
    /// * [`IndexError::EmptyInput`] - `entries` is empty
    /// * [`IndexError::DimensionMismatch`] - an embedding is not 768 long
    pub fn build(entries: Vec<IndexedEntry>) -> IndexResult<Self> {
        Self::build_with_dim(entries, EMBEDDING_DIM)
    }

    /// Builds an index with an explicit vector dimension
    pub fn build_with_dim(entries: Vec<IndexedEntry>, dim: usize) -> IndexResult<Self> {
        if entries.is_empty() {
            return Err(IndexError::EmptyInput);
        }

        let mut vectors = Vec::with_capacity(entries.len() * dim);
        for entry in &entries {
            if entry.embedding.len() != dim {
                return Err(IndexError::DimensionMismatch {
                    expected: dim,
                    actual: entry.embedding.len(),
                });
            }
            vectors.extend_from_slice(&entry.embedding);
        }

        tracing::info!("Vector index built with {} entries", entries.len());

        Ok(Self {
            dim,
            vectors,
            entries,
        })
    }

    /// Number of indexed entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a successfully built index
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector dimension of this index
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Indexed entries in insertion order
    pub fn entries(&self) -> &[IndexedEntry] {
        &self.entries
    }

    /// Returns the `top_k` entries nearest to `query`
    ///
    /// Distances are squared Euclidean; results are ordered by ascending
    /// distance with ties kept in insertion order. Asking for more results
    /// than there are entries returns every entry.
    ///
    /// # Errors
    ///
    /// * [`IndexError::DimensionMismatch`] - `query` length differs from the index dimension
    pub fn search(&self, query: &[f32], top_k: usize) -> IndexResult<Vec<SearchResult>> {
        if query.len() != self.dim {
            return Err(IndexError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .chunks_exact(self.dim)
            .map(|row| squared_l2(row, query))
            .enumerate()
            .collect();

        // Stable sort keeps insertion order among equal distances
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(i, distance)| {
                let entry = &self.entries[i];
                SearchResult {
                    url: entry.url.clone(),
                    summary: entry.summary.clone(),
                    score: 1.0 - distance,
                }
            })
            .collect())
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
