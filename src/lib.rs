//! navtree: a semantic navigation-tree crawler
//!
//! This crate crawls a website from a root URL into a bounded-depth navigation
//! tree, attaches a summary and a 768-dimensional embedding to every page, and
//! serves meaning-based lookups over the crawled pages with an exact
//! (linear-scan) vector index.

pub mod config;
pub mod crawler;
pub mod index;
pub mod output;
pub mod tree;
pub mod url;

use thiserror::Error;

/// Fixed embedding dimension for pages, queries and the vector index
pub const EMBEDDING_DIM: usize = 768;

/// Main error type for navtree operations
#[derive(Debug, Error)]
pub enum NavTreeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] crawler::AnalysisError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crawl of {url} produced no pages")]
    EmptyCrawl { url: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Vector index contract violations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("No entries with embeddings to index")]
    EmptyInput,

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Result type alias for navtree operations
pub type Result<T> = std::result::Result<T, NavTreeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for index operations
pub type IndexResult<T> = std::result::Result<T, IndexError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Crawler, VisitedRegistry};
pub use index::{IndexedEntry, SearchResult, SemanticSearch, VectorIndex};
pub use tree::CrawlNode;
