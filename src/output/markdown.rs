//! Markdown tree generation
//!
//! This module renders a navigation tree as a human-readable markdown
//! outline, one nested list item per page with its type and summary.

use crate::output::stats::compute_statistics;
use crate::output::error::OutputResult;
use crate::tree::CrawlNode;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown outline of `tree` to `output_path`
///
/// # Arguments
///
/// * `tree` - The crawled navigation tree
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the outline
/// * `Err(OutputError)` - Failed to write the file
pub fn generate_markdown_tree(tree: &CrawlNode, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_tree(tree);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a tree as a markdown outline
pub fn format_markdown_tree(tree: &CrawlNode) -> String {
    let mut md = String::new();
    let stats = compute_statistics(tree);

    // Title
    md.push_str("# Navigation Tree\n\n");

    md.push_str(&format!("- **Root**: {}\n", tree.url));
    md.push_str(&format!(
        "- **Generated**: {}\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!("- **Pages**: {}\n", stats.total_pages));
    md.push_str(&format!(
        "- **Deepest Level**: {}\n\n",
        stats.max_depth_reached
    ));

    md.push_str("## Pages\n\n");
    tree.walk(&mut |node, depth| {
        let indent = "  ".repeat(depth);
        md.push_str(&format!(
            "{}- [{}]({}) *{}*\n",
            indent,
            escape_link_text(&node.title),
            node.url,
            node.page_type
        ));
        let summary = node.summary.trim();
        if !summary.is_empty() {
            md.push_str(&format!(
                "{}  > {}\n",
                indent,
                summary.replace('\n', " ")
            ));
        }
    });

    md
}

fn escape_link_text(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}
