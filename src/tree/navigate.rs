//! Keyword lookup over a crawled tree
//!
//! Finds the page whose title or URL best resembles a keyword and returns the
//! click path from the root to it.

use crate::tree::CrawlNode;

/// Best match for a keyword plus the path that leads to it
#[derive(Debug, Clone)]
pub struct NavigationMatch<'a> {
    /// The matching page
    pub node: &'a CrawlNode,
    /// Pages from the root down to `node`, both included
    pub path: Vec<&'a CrawlNode>,
    /// Similarity in `0.0..=1.0`
    pub score: f64,
}

/// Finds the node whose title or URL is most similar to `keyword`
///
/// Every node is scored by the higher of its title and URL similarity
/// (case-insensitive, see [`similarity`]). Ties keep the earlier node in
/// pre-order. Returns `None` when nothing shares a single character with the
/// keyword.
pub fn find_best_match<'a>(tree: &'a CrawlNode, keyword: &str) -> Option<NavigationMatch<'a>> {
    let keyword = keyword.to_lowercase();
    let mut best: Option<NavigationMatch<'a>> = None;
    let mut path = Vec::new();
    search(tree, &keyword, &mut path, &mut best);
    best
}

fn search<'a>(
    node: &'a CrawlNode,
    keyword: &str,
    path: &mut Vec<&'a CrawlNode>,
    best: &mut Option<NavigationMatch<'a>>,
) {
    path.push(node);

    let score = similarity(keyword, &node.title.to_lowercase())
        .max(similarity(keyword, &node.url.to_lowercase()));
    let current = best.as_ref().map_or(0.0, |m| m.score);
    if score > current {
        *best = Some(NavigationMatch {
            node,
            path: path.clone(),
            score,
        });
    }

    for child in &node.children {
        search(child, keyword, path, best);
    }

    path.pop();
}

/// Gestalt pattern-matching similarity between two strings
///
/// Returns `2·M / T`, where `M` is the number of characters in matching
/// blocks (longest common substring, then recursively on both sides) and `T`
/// is the combined length. Identical strings score 1.0, disjoint ones 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (a_start, b_start, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..a_start], &b[..b_start])
        + matching_chars(&a[a_start + len..], &b[b_start + len..])
}

/// Earliest longest common substring as `(start in a, start in b, length)`
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // run[j + 1] holds the length of the common run ending at a[i], b[j]
    let mut prev = vec![0usize; b.len() + 1];
    let mut run = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            run[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            if run[j + 1] > best.2 {
                best = (i + 1 - run[j + 1], j + 1 - run[j + 1], run[j + 1]);
            }
        }
        std::mem::swap(&mut prev, &mut run);
    }

    best
}
