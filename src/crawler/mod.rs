//! Crawler module for building the navigation tree
//!
//! This module contains the core crawling logic, including:
//! - The per-crawl visited registry with atomic claims
//! - Page fetching behind the `PageFetcher` trait (HTTP or headless browser)
//! - HTML link extraction restricted to the page's origin
//! - Page analysis (summary, type, embedding) behind `ContentAnalyzer`
//! - Recursive, concurrent tree expansion

mod analyzer;
mod browser;
mod coordinator;
mod fetcher;
mod parser;
mod registry;

pub use analyzer::{
    build_analyzer_client, parse_summary_response, AnalysisError, ContentAnalyzer, EmbeddingTask,
    GeminiAnalyzer, PageAnalysis, FALLBACK_PAGE_TYPE, FALLBACK_SUMMARY,
};
pub use browser::{BrowserFetcher, BrowserSettings};
pub use coordinator::{validate_embedding, CrawlSettings, Crawler};
pub use fetcher::{build_http_client, fetch_url, FetchError, HttpFetcher, PageFetcher};
pub use parser::extract_links;
pub use registry::VisitedRegistry;
