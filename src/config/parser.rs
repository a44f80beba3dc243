use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use navtree::config::load_config;
///
/// let config = load_config(Path::new("navtree.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderStrategy;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
root-url = "https://quotes.toscrape.com"
max-depth = 3
max-concurrent-tasks = 4
global-concurrency-limit = 16
fetch-timeout-secs = 5
renderer = "browser"
user-agent = "TestCrawler/1.0"

[analyzer]
text-model = "gemini-1.5-flash"
content-char-limit = 500

[search]
top-k = 3

[output]
tree-json-path = "./tree.json"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.root_url, "https://quotes.toscrape.com");
        assert_eq!(config.crawler.max_depth, 3);
        assert_eq!(config.crawler.max_concurrent_tasks, 4);
        assert_eq!(config.crawler.global_concurrency_limit, Some(16));
        assert_eq!(config.crawler.fetch_timeout_secs, 5);
        assert_eq!(config.crawler.renderer, RenderStrategy::Browser);
        assert_eq!(config.analyzer.text_model, "gemini-1.5-flash");
        assert_eq!(config.analyzer.embedding_model, "embedding-001");
        assert_eq!(config.analyzer.content_char_limit, 500);
        assert_eq!(config.search.top_k, 3);
        assert_eq!(config.output.tree_json_path.as_deref(), Some("./tree.json"));
        assert!(config.output.tree_markdown_path.is_none());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse_config(
            r#"
[crawler]
root-url = "https://example.com/"
"#,
        )
        .unwrap();

        assert_eq!(config.crawler.max_depth, 2);
        assert_eq!(config.crawler.max_concurrent_tasks, 10);
        assert_eq!(config.crawler.global_concurrency_limit, None);
        assert_eq!(config.crawler.fetch_timeout_secs, 10);
        assert_eq!(config.crawler.renderer, RenderStrategy::Http);
        assert_eq!(config.crawler.user_agent, "Mozilla/5.0");
        assert_eq!(config.analyzer.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.search.top_k, 5);
    }

    #[test]
    fn test_bundled_example_config_parses() {
        let config = parse_config(include_str!("../../navtree.example.toml")).unwrap();
        assert_eq!(config.crawler.root_url, "https://quotes.toscrape.com");
        assert_eq!(config.output.tree_markdown_path.as_deref(), Some("tree.md"));
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/navtree.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_renderer_rejected() {
        let result = parse_config(
            r#"
[crawler]
root-url = "https://example.com/"
renderer = "carrier-pigeon"
"#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[crawler]
root-url = "https://example.com/"
max-depth = 9
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }
}
