//! Text-query search over a built index
//!
//! Queries are embedded by the same analyzer that embedded the pages, then
//! answered by [`VectorIndex::search`].

use crate::crawler::ContentAnalyzer;
use crate::index::{flatten_tree, SearchResult, VectorIndex};
use crate::tree::CrawlNode;
use crate::NavTreeError;
use std::sync::Arc;

/// Query-text search over one crawl's index
///
/// Holds the analyzer used to embed queries next to the index built from
/// the crawl, so callers search with plain text.
pub struct SemanticSearch {
    analyzer: Arc<dyn ContentAnalyzer>,
    index: VectorIndex,
}

impl SemanticSearch {
    /// Wraps an already built index
    pub fn new(analyzer: Arc<dyn ContentAnalyzer>, index: VectorIndex) -> Self {
        Self { analyzer, index }
    }

    /// Flattens `tree` and builds a fresh index over it
    ///
    /// # Errors
    ///
    /// Returns [`NavTreeError::Index`] when the tree has no indexable node.
    pub fn from_tree(
        analyzer: Arc<dyn ContentAnalyzer>,
        tree: &CrawlNode,
    ) -> Result<Self, NavTreeError> {
        let index = VectorIndex::build(flatten_tree(tree))?;
        Ok(Self::new(analyzer, index))
    }

    /// The underlying vector index
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Embeds `query` and returns its `top_k` nearest pages
    ///
    /// # Errors
    ///
    /// * [`NavTreeError::Analysis`] - the query could not be embedded
    /// * [`NavTreeError::Index`] - the query embedding has the wrong dimension
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>, NavTreeError> {
        let embedding = self.analyzer.embed_query(query).await?;
        let results = self.index.search(&embedding, top_k)?;
        tracing::debug!("Query '{}' matched {} pages", query, results.len());
        Ok(results)
    }
}
