//! Semantic search over a crawled tree
//!
//! This module contains:
//! - The index-ready projection of tree nodes ([`IndexedEntry`]) and the
//!   traversal that produces it ([`flatten_tree`])
//! - The flat vector index ([`VectorIndex`])
//! - Query-text search on top of an analyzer ([`SemanticSearch`])

mod flat;
mod search;

pub use flat::VectorIndex;
pub use search::SemanticSearch;

use crate::tree::CrawlNode;
use crate::EMBEDDING_DIM;
use serde::{Deserialize, Serialize};

/// A node's URL, summary and embedding, ready for indexing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedEntry {
    pub url: String,
    pub summary: String,
    pub embedding: Vec<f32>,
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub summary: String,
    /// `1 - squared_distance`; 1.0 for an exact match, unbounded below
    pub score: f32,
}

/// Flattens a tree into index entries, in pre-order
///
/// Nodes whose embedding is not exactly [`EMBEDDING_DIM`] finite values are
/// skipped with a warning naming the reason.
pub fn flatten_tree(tree: &CrawlNode) -> Vec<IndexedEntry> {
    let mut entries = Vec::new();

    tree.walk(&mut |node, _| {
        let embedding = &node.embedding;
        if embedding.len() != EMBEDDING_DIM {
            tracing::warn!(
                "Skipping node at {}: embedding length is {} (expected {})",
                node.url,
                embedding.len(),
                EMBEDDING_DIM
            );
        } else if !embedding.iter().all(|v| v.is_finite()) {
            tracing::warn!("Skipping node at {}: embedding has non-finite values", node.url);
        } else {
            entries.push(IndexedEntry {
                url: node.url.clone(),
                summary: node.summary.clone(),
                embedding: embedding.clone(),
            });
        }
    });

    tracing::info!("Total valid nodes with embeddings extracted: {}", entries.len());
    entries
}
