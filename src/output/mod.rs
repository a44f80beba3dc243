//! Output module for crawl results
//!
//! This module handles:
//! - Writing the navigation tree as JSON or as a markdown outline
//! - Computing and printing tree statistics
//! - Printing search results and navigation paths

mod error;
mod json;
mod markdown;
pub mod stats;

pub use error::{OutputError, OutputResult};
pub use json::{read_tree_json, write_tree_json};
pub use markdown::{format_markdown_tree, generate_markdown_tree};
pub use stats::{compute_statistics, print_statistics, TreeStatistics};

use crate::index::SearchResult;
use crate::tree::NavigationMatch;

/// Formats search results for the terminal
pub fn format_search_results(query: &str, results: &[SearchResult]) -> String {
    let mut out = format!("Results for \"{}\":\n", query);
    if results.is_empty() {
        out.push_str("  (no results)\n");
        return out;
    }

    for (rank, result) in results.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", rank + 1, result.url));
        out.push_str(&format!("     {}\n", result.summary.replace('\n', " ")));
        out.push_str(&format!("     Score: {:.3}\n", result.score));
    }
    out
}

/// Formats a navigation path as `root → ... → target`
pub fn format_navigation_path(found: &NavigationMatch<'_>) -> String {
    found
        .path
        .iter()
        .map(|node| node.title.as_str())
        .collect::<Vec<_>>()
        .join(" → ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{find_best_match, CrawlNode};

    #[test]
    fn test_format_search_results() {
        let results = vec![SearchResult {
            url: "https://example.com/love".to_string(),
            summary: "Quotes about love".to_string(),
            score: -0.25,
        }];
        let out = format_search_results("love", &results);
        assert!(out.contains("1. https://example.com/love"));
        assert!(out.contains("Quotes about love"));
        assert!(out.contains("Score: -0.250"));
    }

    #[test]
    fn test_format_empty_results() {
        assert!(format_search_results("x", &[]).contains("(no results)"));
    }

    #[test]
    fn test_format_navigation_path() {
        let mut root = CrawlNode::new("https://example.com/", "", "Home", vec![]);
        root.children
            .push(CrawlNode::new("https://example.com/login", "", "Form", vec![]));

        let found = find_best_match(&root, "login").unwrap();
        assert_eq!(
            format_navigation_path(&found),
            "https://example.com/ → https://example.com/login"
        );
    }
}
