use serde::Deserialize;

/// Main configuration structure for navtree
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Builds a configuration for a root URL with every other value defaulted
    pub fn for_root(root_url: impl Into<String>) -> Self {
        Self {
            crawler: CrawlerConfig::for_root(root_url),
            analyzer: AnalyzerConfig::default(),
            search: SearchConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// How pages are retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStrategy {
    /// Plain HTTP GET of the page source
    #[default]
    Http,
    /// Browser-driven rendering for script-heavy pages
    Browser,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the crawl starts from (depth 0)
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Maximum depth to crawl from the root
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum in-flight child crawls per expanded page
    #[serde(rename = "max-concurrent-tasks", default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: usize,

    /// Optional cap on fetch+analysis work across the whole crawl
    #[serde(rename = "global-concurrency-limit", default)]
    pub global_concurrency_limit: Option<usize>,

    /// Per-fetch timeout in seconds
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Page retrieval strategy
    #[serde(default)]
    pub renderer: RenderStrategy,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// How long the browser renderer waits for `<body>` after navigation
    #[serde(rename = "dom-ready-timeout-secs", default = "default_dom_ready_timeout_secs")]
    pub dom_ready_timeout_secs: u64,

    /// Chrome/Chromium binary for the browser renderer (auto-detected when unset)
    #[serde(rename = "browser-executable", default)]
    pub browser_executable: Option<String>,
}

impl CrawlerConfig {
    pub fn for_root(root_url: impl Into<String>) -> Self {
        Self {
            root_url: root_url.into(),
            max_depth: default_max_depth(),
            max_concurrent_tasks: default_max_concurrent_tasks(),
            global_concurrency_limit: None,
            fetch_timeout_secs: default_fetch_timeout_secs(),
            renderer: RenderStrategy::default(),
            user_agent: default_user_agent(),
            dom_ready_timeout_secs: default_dom_ready_timeout_secs(),
            browser_executable: None,
        }
    }
}

/// Summarization and embedding backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    /// Base URL of the generative language REST API
    #[serde(rename = "api-base", default = "default_api_base")]
    pub api_base: String,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env", default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for summarization and classification
    #[serde(rename = "text-model", default = "default_text_model")]
    pub text_model: String,

    /// Model used for document and query embeddings
    #[serde(rename = "embedding-model", default = "default_embedding_model")]
    pub embedding_model: String,

    /// Number of page characters sent to the text model
    #[serde(rename = "content-char-limit", default = "default_content_char_limit")]
    pub content_char_limit: usize,

    /// Timeout in seconds for each model request
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            text_model: default_text_model(),
            embedding_model: default_embedding_model(),
            content_char_limit: default_content_char_limit(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Semantic search configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Number of results returned per query
    #[serde(rename = "top-k", default = "default_top_k")]
    pub top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Where to write the tree as JSON
    #[serde(rename = "tree-json-path", default)]
    pub tree_json_path: Option<String>,

    /// Where to write the tree as a markdown outline
    #[serde(rename = "tree-markdown-path", default)]
    pub tree_markdown_path: Option<String>,
}

fn default_max_depth() -> u32 {
    2
}

fn default_max_concurrent_tasks() -> usize {
    10
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_dom_ready_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_text_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_embedding_model() -> String {
    "embedding-001".to_string()
}

fn default_content_char_limit() -> usize {
    2000
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_top_k() -> usize {
    5
}
