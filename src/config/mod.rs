//! Configuration module for navtree
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use navtree::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("navtree.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AnalyzerConfig, Config, CrawlerConfig, OutputConfig, RenderStrategy, SearchConfig,
};

// Re-export parser and validation entry points
pub use parser::{load_config, parse_config};
pub use validation::{validate, MAX_DEPTH_LIMIT};
