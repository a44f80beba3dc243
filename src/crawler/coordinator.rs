//! Crawler coordinator - recursive concurrent tree expansion
//!
//! Every page the crawl reaches is expanded by [`Crawler::crawl_node`]:
//! - Depth check, then an atomic claim in the shared [`VisitedRegistry`]
//! - Fetch, link extraction, analysis and embedding validation
//! - One concurrent child crawl per surviving link, bounded per page
//!
//! Failures never propagate upwards: a branch that cannot be fetched,
//! analyzed or validated simply contributes no node.

use crate::config::{Config, CrawlerConfig, RenderStrategy};
use crate::crawler::analyzer::{ContentAnalyzer, GeminiAnalyzer, PageAnalysis};
use crate::crawler::browser::BrowserFetcher;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::parser::extract_links;
use crate::crawler::registry::VisitedRegistry;
use crate::tree::CrawlNode;
use crate::url::canonicalize;
use crate::{NavTreeError, EMBEDDING_DIM};
use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Crawl tuning knobs
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Deepest level that may produce a node (root is 0)
    pub max_depth: u32,

    /// In-flight child crawls per expanded page
    pub max_concurrent_tasks: usize,

    /// Optional cap on simultaneous fetch+analysis work across the crawl
    pub global_concurrency_limit: Option<usize>,

    /// Page retrieval strategy
    pub strategy: RenderStrategy,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_concurrent_tasks: 10,
            global_concurrency_limit: None,
            strategy: RenderStrategy::Http,
        }
    }
}

impl From<&Config> for CrawlSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_depth: config.crawler.max_depth,
            max_concurrent_tasks: config.crawler.max_concurrent_tasks,
            global_concurrency_limit: config.crawler.global_concurrency_limit,
            strategy: config.crawler.renderer,
        }
    }
}

/// Builds navigation trees from a fetcher and an analyzer
///
/// Nested expansions each open their own pool of `max_concurrent_tasks`,
/// so total in-flight work grows with the tree's width at every level.
/// Setting `global_concurrency_limit` adds one crawl-wide semaphore around
/// the fetch+analysis step; permits are released before a page waits on its
/// children, so the limit cannot deadlock the recursion.
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    analyzer: Arc<dyn ContentAnalyzer>,
    settings: CrawlSettings,
    global_permits: Option<Arc<Semaphore>>,
}

impl Crawler {
    /// Creates a crawler from its collaborators
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        analyzer: Arc<dyn ContentAnalyzer>,
        settings: CrawlSettings,
    ) -> Self {
        let settings = CrawlSettings {
            max_concurrent_tasks: settings.max_concurrent_tasks.max(1),
            ..settings
        };
        let global_permits = settings
            .global_concurrency_limit
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));

        Self {
            fetcher,
            analyzer,
            settings,
            global_permits,
        }
    }

    /// Creates a crawler backed by the configured renderer and [`GeminiAnalyzer`]
    ///
    /// The analyzer API key is read from the environment variable named in
    /// the configuration. Model requests use their own client and timeout,
    /// independent of the page fetch timeout.
    pub fn from_config(config: &Config) -> Result<Self, NavTreeError> {
        let fetcher = fetcher_for(&config.crawler)?;
        let analyzer = GeminiAnalyzer::from_env(config.analyzer.clone())?;
        Ok(Self::new(
            fetcher,
            Arc::new(analyzer),
            CrawlSettings::from(config),
        ))
    }

    /// The analyzer used for pages, also usable for query embedding
    pub fn analyzer(&self) -> Arc<dyn ContentAnalyzer> {
        Arc::clone(&self.analyzer)
    }

    /// Crawls from `root_url` with a fresh registry
    ///
    /// Returns `None` when the root itself yields no node (fetch failure or
    /// invalid embedding).
    pub async fn crawl(self: Arc<Self>, root_url: &str) -> Option<CrawlNode> {
        let root = match canonicalize(root_url) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::error!("Invalid root URL {}: {}", root_url, e);
                return None;
            }
        };

        let registry = Arc::new(VisitedRegistry::new());
        let start = std::time::Instant::now();
        let tree = self.crawl_node(root, 0, Arc::clone(&registry)).await;

        tracing::info!(
            "Crawl finished in {:?}: {} URLs claimed, {} pages in tree",
            start.elapsed(),
            registry.len(),
            tree.as_ref().map_or(0, CrawlNode::node_count)
        );
        tree
    }

    /// Expands `url` at `depth` into a subtree
    ///
    /// Returns `None` when the page is too deep, already claimed, cannot be
    /// fetched, or has no valid embedding. In the last case the page's links
    /// are not explored either.
    pub fn crawl_node(
        self: Arc<Self>,
        url: String,
        depth: u32,
        registry: Arc<VisitedRegistry>,
    ) -> BoxFuture<'static, Option<CrawlNode>> {
        Box::pin(async move {
            if depth > self.settings.max_depth {
                return None;
            }

            if !registry.try_claim(&url) {
                tracing::debug!("Already claimed: {}", url);
                return None;
            }

            tracing::info!("Crawling: {} | Depth: {}", url, depth);

            let (links, analysis) = self.fetch_and_analyze(&url, &registry).await?;

            if let Err(reason) = validate_embedding(&analysis.embedding) {
                tracing::warn!("Skipping node at {} due to invalid embedding: {}", url, reason);
                return None;
            }

            let limit = self.settings.max_concurrent_tasks;
            let children: Vec<CrawlNode> = stream::iter(links)
                .map(|link| {
                    let crawler = Arc::clone(&self);
                    let registry = Arc::clone(&registry);
                    async move {
                        let child = crawler.crawl_node(link.clone(), depth + 1, registry);
                        match tokio::spawn(child).await {
                            Ok(child) => child,
                            Err(e) => {
                                tracing::error!("Crawl task for {} failed: {}", link, e);
                                None
                            }
                        }
                    }
                })
                .buffer_unordered(limit)
                .filter_map(|child| async move { child })
                .collect()
                .await;

            let PageAnalysis {
                summary,
                page_type,
                embedding,
            } = analysis;

            Some(CrawlNode {
                title: url.clone(),
                url,
                summary,
                page_type,
                embedding,
                children,
            })
        })
    }

    /// Fetches a claimed page, extracts its unclaimed links and analyzes it
    ///
    /// Holds a global permit (when configured) for the duration.
    async fn fetch_and_analyze(
        &self,
        url: &str,
        registry: &VisitedRegistry,
    ) -> Option<(Vec<String>, PageAnalysis)> {
        let _permit = match &self.global_permits {
            Some(permits) => Some(Arc::clone(permits).acquire_owned().await.ok()?),
            None => None,
        };

        let content = match self.fetcher.fetch(url, self.settings.strategy).await {
            Ok(content) if !content.is_empty() => content,
            Ok(_) => {
                tracing::warn!("No content found at: {}", url);
                return None;
            }
            Err(e) => {
                tracing::warn!("Fetch failed for {}: {}", url, e);
                return None;
            }
        };

        let base = canonicalize(url).ok()?;
        let links: Vec<String> = extract_links(&content, &base)
            .into_iter()
            .filter(|link| !registry.is_claimed(link))
            .collect();

        match self.analyzer.analyze(&content).await {
            Ok(analysis) => Some((links, analysis)),
            Err(e) => {
                tracing::warn!("Analysis failed for {}: {}", url, e);
                None
            }
        }
    }
}

/// Picks the page fetcher matching the configured renderer
fn fetcher_for(config: &CrawlerConfig) -> Result<Arc<dyn PageFetcher>, NavTreeError> {
    Ok(match config.renderer {
        RenderStrategy::Http => Arc::new(HttpFetcher::from_config(config)?),
        RenderStrategy::Browser => Arc::new(BrowserFetcher::from_config(config)),
    })
}

/// Checks that an embedding has exactly [`EMBEDDING_DIM`] finite values
pub fn validate_embedding(embedding: &[f32]) -> Result<(), String> {
    if embedding.is_empty() {
        return Err("embedding is empty".to_string());
    }
    if embedding.len() != EMBEDDING_DIM {
        return Err(format!(
            "embedding length is {} (expected {})",
            embedding.len(),
            EMBEDDING_DIM
        ));
    }
    if !embedding.iter().all(|v| v.is_finite()) {
        return Err("embedding has non-finite values".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{AnalysisError, FetchError};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    const BASE: &str = "https://site.test";

    /// In-memory site: path → list of linked paths
    struct FakeSite {
        pages: HashMap<String, Vec<&'static str>>,
        failing: HashSet<String>,
        fetched: Mutex<Vec<String>>,
    }

    impl FakeSite {
        fn new(graph: &[(&'static str, Vec<&'static str>)]) -> Self {
            Self {
                pages: graph
                    .iter()
                    .map(|(page, links)| (format!("{}{}", BASE, page), links.clone()))
                    .collect(),
                failing: HashSet::new(),
                fetched: Mutex::new(Vec::new()),
            }
        }

        fn failing(mut self, page: &str) -> Self {
            self.failing.insert(format!("{}{}", BASE, page));
            self
        }

        fn fetch_count(&self, page: &str) -> usize {
            let target = format!("{}{}", BASE, page);
            self.fetched
                .lock()
                .unwrap()
                .iter()
                .filter(|u| **u == target)
                .count()
        }
    }

    #[async_trait]
    impl PageFetcher for FakeSite {
        async fn fetch(&self, url: &str, _strategy: RenderStrategy) -> Result<String, FetchError> {
            self.fetched.lock().unwrap().push(url.to_string());
            tokio::task::yield_now().await;

            if self.failing.contains(url) {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: 500,
                });
            }

            let links = self.pages.get(url).ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })?;

            let anchors: String = links
                .iter()
                .map(|l| format!(r#"<a href="{}">{}</a>"#, l, l))
                .collect();
            Ok(format!("<html><body><p>{}</p>{}</body></html>", url, anchors))
        }
    }

    /// Analyzer that emits a 768-d embedding except for listed pages
    struct FakeAnalyzer {
        bad_dims: HashMap<String, usize>,
    }

    impl FakeAnalyzer {
        fn valid() -> Self {
            Self {
                bad_dims: HashMap::new(),
            }
        }

        fn with_bad_dim(mut self, page: &str, dim: usize) -> Self {
            self.bad_dims.insert(format!("{}{}", BASE, page), dim);
            self
        }
    }

    #[async_trait]
    impl ContentAnalyzer for FakeAnalyzer {
        async fn analyze(&self, content: &str) -> Result<PageAnalysis, AnalysisError> {
            let dim = self
                .bad_dims
                .iter()
                .find(|(url, _)| content.contains(&format!("<p>{}</p>", url)))
                .map(|(_, dim)| *dim)
                .unwrap_or(EMBEDDING_DIM);

            Ok(PageAnalysis {
                summary: "A page".to_string(),
                page_type: "Page".to_string(),
                embedding: vec![0.5; dim],
            })
        }

        async fn embed_query(&self, _query: &str) -> Result<Vec<f32>, AnalysisError> {
            Ok(vec![0.5; EMBEDDING_DIM])
        }
    }

    fn crawler(site: Arc<FakeSite>, analyzer: FakeAnalyzer, max_depth: u32) -> Arc<Crawler> {
        Arc::new(Crawler::new(
            site,
            Arc::new(analyzer),
            CrawlSettings {
                max_depth,
                ..CrawlSettings::default()
            },
        ))
    }

    fn url(page: &str) -> String {
        format!("{}{}", BASE, page)
    }

    fn child_urls(node: &CrawlNode) -> HashSet<String> {
        node.children.iter().map(|c| c.url.clone()).collect()
    }

    fn assert_unique_urls(tree: &CrawlNode) {
        let urls = tree.urls();
        let unique: HashSet<&str> = urls.iter().copied().collect();
        assert_eq!(urls.len(), unique.len(), "duplicate nodes in {:?}", urls);
    }

    #[tokio::test]
    async fn test_reference_scenario() {
        let site = Arc::new(FakeSite::new(&[
            ("/a", vec!["/b", "/c"]),
            ("/b", vec!["/a", "/d"]),
            ("/c", vec!["/a"]),
            ("/d", vec!["/e"]),
            ("/e", vec![]),
        ]));
        let tree = crawler(site.clone(), FakeAnalyzer::valid(), 2)
            .crawl(&url("/a"))
            .await
            .unwrap();

        assert_eq!(tree.url, url("/a"));
        assert_eq!(tree.title, tree.url);
        assert_eq!(child_urls(&tree), HashSet::from([url("/b"), url("/c")]));

        let b = tree.find(&url("/b")).unwrap();
        assert_eq!(child_urls(b), HashSet::from([url("/d")]));
        assert!(tree.find(&url("/c")).unwrap().children.is_empty());
        assert!(tree.find(&url("/d")).unwrap().children.is_empty());

        assert_eq!(tree.node_count(), 4);
        assert_eq!(site.fetch_count("/a"), 1);
        assert_eq!(site.fetch_count("/e"), 0);
    }

    #[tokio::test]
    async fn test_depth_limit_stops_expansion() {
        let site = Arc::new(FakeSite::new(&[
            ("/a", vec!["/b", "/c"]),
            ("/b", vec!["/a", "/d"]),
            ("/c", vec!["/e"]),
            ("/d", vec!["/f"]),
            ("/e", vec![]),
            ("/f", vec![]),
        ]));
        let tree = crawler(site.clone(), FakeAnalyzer::valid(), 2)
            .crawl(&url("/a"))
            .await
            .unwrap();

        assert!(tree.height() <= 2);
        assert!(tree.find(&url("/f")).is_none());
        assert_eq!(site.fetch_count("/f"), 0);
    }

    #[tokio::test]
    async fn test_depth_zero_yields_root_only() {
        let site = Arc::new(FakeSite::new(&[
            ("/a", vec!["/b", "/c", "/d"]),
            ("/b", vec![]),
            ("/c", vec![]),
            ("/d", vec![]),
        ]));
        let tree = crawler(site.clone(), FakeAnalyzer::valid(), 0)
            .crawl(&url("/a"))
            .await
            .unwrap();

        assert!(tree.children.is_empty());
        assert_eq!(site.fetch_count("/b"), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_dedup_on_dense_cyclic_graph() {
        // Every page links to every other page
        let pages = ["/p0", "/p1", "/p2", "/p3", "/p4", "/p5", "/p6", "/p7"];
        let graph: Vec<_> = pages
            .iter()
            .map(|p| (*p, pages.iter().copied().filter(|q| q != p).collect()))
            .collect();
        let site = Arc::new(FakeSite::new(&graph));

        let tree = crawler(site.clone(), FakeAnalyzer::valid(), 3)
            .crawl(&url("/p0"))
            .await
            .unwrap();

        assert_unique_urls(&tree);
        assert_eq!(tree.node_count(), pages.len());
        for page in pages {
            assert_eq!(site.fetch_count(page), 1, "{} fetched more than once", page);
        }
    }

    #[tokio::test]
    async fn test_invalid_embedding_drops_subtree() {
        let site = Arc::new(FakeSite::new(&[
            ("/a", vec!["/b", "/c"]),
            ("/b", vec!["/x"]),
            ("/c", vec![]),
            ("/x", vec![]),
        ]));
        let analyzer = FakeAnalyzer::valid().with_bad_dim("/b", 700);
        let tree = crawler(site.clone(), analyzer, 3)
            .crawl(&url("/a"))
            .await
            .unwrap();

        assert_eq!(child_urls(&tree), HashSet::from([url("/c")]));
        assert!(tree.find(&url("/x")).is_none());
        assert_eq!(site.fetch_count("/x"), 0);
    }

    #[tokio::test]
    async fn test_empty_embedding_drops_node() {
        let site = Arc::new(FakeSite::new(&[("/a", vec!["/b"]), ("/b", vec![])]));
        let analyzer = FakeAnalyzer::valid().with_bad_dim("/b", 0);
        let tree = crawler(site, analyzer, 2)
            .crawl(&url("/a"))
            .await
            .unwrap();
        assert!(tree.children.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_drops_branch() {
        let site = Arc::new(
            FakeSite::new(&[
                ("/a", vec!["/b", "/c"]),
                ("/b", vec![]),
                ("/c", vec!["/only-via-c"]),
                ("/only-via-c", vec![]),
            ])
            .failing("/c"),
        );
        let tree = crawler(site.clone(), FakeAnalyzer::valid(), 3)
            .crawl(&url("/a"))
            .await
            .unwrap();

        assert_eq!(child_urls(&tree), HashSet::from([url("/b")]));
        assert!(tree.find(&url("/only-via-c")).is_none());
        assert_eq!(site.fetch_count("/c"), 1);
    }

    #[tokio::test]
    async fn test_root_failure_yields_none() {
        let site = Arc::new(FakeSite::new(&[("/a", vec!["/b"])]).failing("/a"));
        assert!(crawler(site.clone(), FakeAnalyzer::valid(), 2)
            .crawl(&url("/a"))
            .await
            .is_none());

        let analyzer = FakeAnalyzer::valid().with_bad_dim("/a", 12);
        let site = Arc::new(FakeSite::new(&[("/a", vec!["/b"]), ("/b", vec![])]));
        assert!(crawler(site, analyzer, 2).crawl(&url("/a")).await.is_none());
    }

    #[tokio::test]
    async fn test_invalid_root_url() {
        let site = Arc::new(FakeSite::new(&[]));
        assert!(crawler(site, FakeAnalyzer::valid(), 2)
            .crawl("not a url")
            .await
            .is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_global_limit_and_single_task_pool() {
        let pages = ["/p0", "/p1", "/p2", "/p3", "/p4", "/p5"];
        let graph: Vec<_> = pages
            .iter()
            .map(|p| (*p, pages.iter().copied().filter(|q| q != p).collect()))
            .collect();
        let site = Arc::new(FakeSite::new(&graph));

        let crawler = Arc::new(Crawler::new(
            site,
            Arc::new(FakeAnalyzer::valid()),
            CrawlSettings {
                max_depth: 5,
                max_concurrent_tasks: 1,
                global_concurrency_limit: Some(1),
                strategy: RenderStrategy::Http,
            },
        ));

        let tree = crawler.crawl(&url("/p0")).await.unwrap();
        assert_unique_urls(&tree);
        assert_eq!(tree.node_count(), pages.len());
    }

    #[test]
    fn test_validate_embedding() {
        assert!(validate_embedding(&vec![0.0; EMBEDDING_DIM]).is_ok());
        assert!(validate_embedding(&[]).is_err());
        assert!(validate_embedding(&vec![0.0; 700]).is_err());

        let mut inf = vec![0.0; EMBEDDING_DIM];
        inf[0] = f32::INFINITY;
        assert!(validate_embedding(&inf).is_err());
    }

    #[tokio::test]
    async fn test_fetcher_follows_configured_renderer() {
        let mut config = Config::for_root("https://example.com/");
        let http = fetcher_for(&config.crawler).unwrap();
        assert!(matches!(
            http.fetch("https://example.com/", RenderStrategy::Browser).await,
            Err(FetchError::UnsupportedStrategy {
                strategy: RenderStrategy::Browser
            })
        ));

        config.crawler.renderer = RenderStrategy::Browser;
        assert_eq!(CrawlSettings::from(&config).strategy, RenderStrategy::Browser);

        // The browser fetcher only renders; it never falls back to plain HTTP
        let browser = fetcher_for(&config.crawler).unwrap();
        assert!(matches!(
            browser.fetch("https://example.com/", RenderStrategy::Http).await,
            Err(FetchError::UnsupportedStrategy {
                strategy: RenderStrategy::Http
            })
        ));
    }
}
