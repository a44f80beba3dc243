//! Statistics over a crawled tree
//!
//! This module provides functionality for computing and displaying
//! shape and content statistics of a navigation tree.

use crate::tree::CrawlNode;
use std::collections::BTreeMap;

/// Tree statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeStatistics {
    /// Total number of pages in the tree
    pub total_pages: usize,

    /// Count of pages at each depth (root is 0)
    pub pages_by_depth: BTreeMap<usize, usize>,

    /// Count of pages per page type
    pub pages_by_type: BTreeMap<String, usize>,

    /// Deepest level reached
    pub max_depth_reached: usize,

    /// Pages without children
    pub leaf_pages: usize,
}

impl TreeStatistics {
    /// Average number of children across pages that have any
    pub fn average_fan_out(&self) -> f64 {
        let inner = self.total_pages - self.leaf_pages;
        if inner == 0 {
            0.0
        } else {
            // every page but the root is someone's child
            (self.total_pages - 1) as f64 / inner as f64
        }
    }
}

/// Computes statistics for a tree
pub fn compute_statistics(tree: &CrawlNode) -> TreeStatistics {
    let mut stats = TreeStatistics::default();

    tree.walk(&mut |node, depth| {
        stats.total_pages += 1;
        *stats.pages_by_depth.entry(depth).or_insert(0) += 1;
        *stats
            .pages_by_type
            .entry(node.page_type.clone())
            .or_insert(0) += 1;
        stats.max_depth_reached = stats.max_depth_reached.max(depth);
        if node.children.is_empty() {
            stats.leaf_pages += 1;
        }
    });

    stats
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &TreeStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Total pages: {}", stats.total_pages);
    println!("  Deepest level: {}", stats.max_depth_reached);
    println!("  Leaf pages: {}", stats.leaf_pages);
    println!("  Average fan-out: {:.2}", stats.average_fan_out());
    println!();

    println!("Pages by Depth:");
    for (depth, count) in &stats.pages_by_depth {
        println!("  {}: {}", depth, count);
    }
    println!();

    println!("Pages by Type:");
    // Sort types by count (descending)
    let mut type_counts: Vec<_> = stats.pages_by_type.iter().collect();
    type_counts.sort_by(|a, b| b.1.cmp(a.1));

    for (page_type, count) in type_counts {
        let percentage = if stats.total_pages > 0 {
            (*count as f64 / stats.total_pages as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", page_type, count, percentage);
    }
    println!();
}
