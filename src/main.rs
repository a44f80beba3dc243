//! navtree main entry point
//!
//! This is the command-line interface for the navtree semantic crawler.

use clap::Parser;
use navtree::config::{load_config, validate, Config, RenderStrategy};
use navtree::crawler::{ContentAnalyzer, Crawler, GeminiAnalyzer};
use navtree::index::SemanticSearch;
use navtree::output::{
    compute_statistics, format_navigation_path, format_search_results, generate_markdown_tree,
    print_statistics, read_tree_json, write_tree_json,
};
use navtree::tree::{find_best_match, CrawlNode};
use navtree::NavTreeError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// navtree: crawl a site into a navigation tree and search it by meaning
///
/// navtree expands a root URL into a bounded-depth tree of same-origin pages,
/// summarizes and embeds every page, and answers free-text queries with the
/// nearest pages.
#[derive(Parser, Debug)]
#[command(name = "navtree")]
#[command(version)]
#[command(about = "A semantic navigation-tree crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", required_unless_present_any = ["url", "tree"])]
    config: Option<PathBuf>,

    /// Root URL to crawl (overrides the config file)
    #[arg(long)]
    url: Option<String>,

    /// Maximum crawl depth (overrides the config file)
    #[arg(long)]
    depth: Option<u32>,

    /// Use the browser-driven renderer for script-heavy pages
    #[arg(long)]
    browser: bool,

    /// Number of results per query (overrides the config file)
    #[arg(long)]
    top_k: Option<usize>,

    /// Semantic query to run after the crawl (repeatable)
    #[arg(short = 'Q', long = "query")]
    queries: Vec<String>,

    /// Find the page best matching a keyword and print how to reach it
    #[arg(long)]
    navigate: Option<String>,

    /// Search and navigate a tree saved as JSON instead of crawling
    #[arg(long, value_name = "TREE_JSON")]
    tree: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let saved_tree = match &cli.tree {
        Some(path) => {
            tracing::info!("Loading saved tree from: {}", path.display());
            Some(read_tree_json(path).map_err(NavTreeError::from)?)
        }
        None => None,
    };

    let config = match resolve_config(&cli, saved_tree.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    match saved_tree {
        Some(tree) => handle_saved_tree(&config, tree, &cli.queries, cli.navigate.as_deref()).await?,
        None => handle_crawl(&config, &cli.queries, cli.navigate.as_deref()).await?,
    }
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("navtree=info,warn"),
            1 => EnvFilter::new("navtree=debug,info"),
            2 => EnvFilter::new("navtree=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any) and applies command-line overrides
///
/// Without a config file the root URL comes from `--url`, else from the
/// saved tree's root.
fn resolve_config(cli: &Cli, saved_tree: Option<&CrawlNode>) -> Result<Config, NavTreeError> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => {
            let root = cli
                .url
                .clone()
                .or_else(|| saved_tree.map(|tree| tree.url.clone()))
                .unwrap_or_default();
            Config::for_root(root)
        }
    };

    if let Some(url) = &cli.url {
        config.crawler.root_url = url.clone();
    }
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if cli.browser {
        config.crawler.renderer = RenderStrategy::Browser;
    }
    if let Some(top_k) = cli.top_k {
        config.search.top_k = top_k;
    }

    validate(&config)?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== navtree Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Root URL: {}", config.crawler.root_url);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!(
        "  Max concurrent tasks per page: {}",
        config.crawler.max_concurrent_tasks
    );
    match config.crawler.global_concurrency_limit {
        Some(limit) => println!("  Global concurrency limit: {}", limit),
        None => println!("  Global concurrency limit: none"),
    }
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout_secs);
    println!("  Renderer: {:?}", config.crawler.renderer);
    if config.crawler.renderer == RenderStrategy::Browser {
        println!(
            "  DOM ready timeout: {}s",
            config.crawler.dom_ready_timeout_secs
        );
        match &config.crawler.browser_executable {
            Some(path) => println!("  Browser executable: {}", path),
            None => println!("  Browser executable: auto-detect"),
        }
    }

    println!("\nAnalyzer:");
    println!("  Text model: {}", config.analyzer.text_model);
    println!("  Embedding model: {}", config.analyzer.embedding_model);
    println!("  API key variable: {}", config.analyzer.api_key_env);
    println!("  Request timeout: {}s", config.analyzer.request_timeout_secs);

    println!("\nSearch:");
    println!("  Top-K: {}", config.search.top_k);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl → index → query flow
async fn handle_crawl(
    config: &Config,
    queries: &[String],
    navigate: Option<&str>,
) -> Result<(), NavTreeError> {
    tracing::info!(
        "Starting crawl of {} (max depth {})",
        config.crawler.root_url,
        config.crawler.max_depth
    );

    let crawler = Arc::new(Crawler::from_config(config)?);
    let analyzer = crawler.analyzer();

    let tree = match Arc::clone(&crawler).crawl(&config.crawler.root_url).await {
        Some(tree) => tree,
        None => {
            tracing::error!("Crawling failed or returned no content");
            return Err(NavTreeError::EmptyCrawl {
                url: config.crawler.root_url.clone(),
            });
        }
    };

    write_outputs(config, &tree)?;
    report(config, &tree, Some(analyzer), queries, navigate).await;
    Ok(())
}

/// Handles --tree: queries a previously saved tree without crawling
async fn handle_saved_tree(
    config: &Config,
    tree: CrawlNode,
    queries: &[String],
    navigate: Option<&str>,
) -> Result<(), NavTreeError> {
    tracing::info!("Using saved tree rooted at {}", tree.url);

    // Only queries need the embedding model
    let analyzer: Option<Arc<dyn ContentAnalyzer>> = if queries.is_empty() {
        None
    } else {
        let analyzer = GeminiAnalyzer::from_env(config.analyzer.clone())?;
        Some(Arc::new(analyzer) as Arc<dyn ContentAnalyzer>)
    };
    report(config, &tree, analyzer, queries, navigate).await;
    Ok(())
}

/// Prints statistics, runs queries and the optional navigation lookup
async fn report(
    config: &Config,
    tree: &CrawlNode,
    analyzer: Option<Arc<dyn ContentAnalyzer>>,
    queries: &[String],
    navigate: Option<&str>,
) {
    print_statistics(&compute_statistics(tree));

    // Indexing failures leave the tree usable, so they only warn
    let search = analyzer.and_then(|analyzer| match SemanticSearch::from_tree(analyzer, tree) {
        Ok(search) => {
            tracing::info!("Indexed {} pages with valid embeddings", search.index().len());
            Some(search)
        }
        Err(e) => {
            tracing::warn!("Indexing failed: {}", e);
            None
        }
    });

    for query in queries {
        match &search {
            Some(search) => match search.search(query, config.search.top_k).await {
                Ok(results) => println!("{}", format_search_results(query, &results)),
                Err(e) => tracing::warn!("Search for '{}' failed: {}", query, e),
            },
            None => tracing::warn!("No index available; skipping query '{}'", query),
        }
    }

    if let Some(keyword) = navigate {
        print_navigation(tree, keyword);
    }
}

fn write_outputs(config: &Config, tree: &CrawlNode) -> Result<(), NavTreeError> {
    if let Some(path) = &config.output.tree_json_path {
        write_tree_json(tree, Path::new(path))?;
        tracing::info!("Tree written to: {}", path);
    }

    if let Some(path) = &config.output.tree_markdown_path {
        generate_markdown_tree(tree, Path::new(path))?;
        tracing::info!("Markdown outline written to: {}", path);
    }

    Ok(())
}

fn print_navigation(tree: &CrawlNode, keyword: &str) {
    match find_best_match(tree, keyword) {
        Some(found) => {
            println!("Best match: {} (similarity {:.2})", found.node.title, found.score);
            println!("Navigation path: {}", format_navigation_path(&found));
        }
        None => println!("No page resembles '{}'", keyword),
    }
}
