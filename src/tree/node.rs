use serde::{Deserialize, Serialize};

/// One visited page in the navigation tree
///
/// `children` are in the order their sub-crawls completed, which varies from
/// run to run; treat them as a set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlNode {
    /// Display label; currently always the URL
    pub title: String,

    /// Canonical page URL and dedup key
    pub url: String,

    /// Short natural-language summary
    pub summary: String,

    /// Coarse page classification
    #[serde(rename = "type")]
    pub page_type: String,

    /// Semantic embedding of the page summary
    pub embedding: Vec<f32>,

    /// Pages first reached from this one
    #[serde(default)]
    pub children: Vec<CrawlNode>,
}

impl CrawlNode {
    /// Creates a leaf node titled by its URL
    pub fn new(
        url: impl Into<String>,
        summary: impl Into<String>,
        page_type: impl Into<String>,
        embedding: Vec<f32>,
    ) -> Self {
        let url = url.into();
        Self {
            title: url.clone(),
            url,
            summary: summary.into(),
            page_type: page_type.into(),
            embedding,
            children: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree, including `self`
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(CrawlNode::node_count).sum::<usize>()
    }

    /// Depth of the deepest node below `self` (0 for a leaf)
    pub fn height(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.height() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Visits every node in pre-order together with its depth relative to `self`
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a CrawlNode, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a CrawlNode, usize)) {
        visit(self, depth);
        for child in &self.children {
            child.walk_at(depth + 1, visit);
        }
    }

    /// All URLs in this subtree, in pre-order
    pub fn urls(&self) -> Vec<&str> {
        let mut urls = Vec::with_capacity(self.node_count());
        self.walk(&mut |node, _| urls.push(node.url.as_str()));
        urls
    }

    /// Finds the node for `url` in this subtree
    pub fn find(&self, url: &str) -> Option<&CrawlNode> {
        if self.url == url {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(url))
    }

    /// Depth of the node for `url` relative to `self`
    pub fn depth_of(&self, url: &str) -> Option<usize> {
        self.path_to(url).map(|path| path.len() - 1)
    }

    /// Nodes from `self` down to the node for `url`, both ends included
    pub fn path_to(&self, url: &str) -> Option<Vec<&CrawlNode>> {
        if self.url == url {
            return Some(vec![self]);
        }
        self.children.iter().find_map(|child| {
            child.path_to(url).map(|mut path| {
                path.insert(0, self);
                path
            })
        })
    }
}
