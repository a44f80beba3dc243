use crate::config::types::{AnalyzerConfig, Config, CrawlerConfig, SearchConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on the crawl depth
pub const MAX_DEPTH_LIMIT: u32 = 5;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_analyzer_config(&config.analyzer)?;
    validate_search_config(&config.search)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_root_url(&config.root_url)?;

    if config.max_depth > MAX_DEPTH_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_depth must be between 0 and {}, got {}",
            MAX_DEPTH_LIMIT, config.max_depth
        )));
    }

    if config.max_concurrent_tasks < 1 || config.max_concurrent_tasks > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_tasks must be between 1 and 100, got {}",
            config.max_concurrent_tasks
        )));
    }

    if config.global_concurrency_limit == Some(0) {
        return Err(ConfigError::Validation(
            "global_concurrency_limit must be >= 1 when set".to_string(),
        ));
    }

    if config.fetch_timeout_secs < 1 || config.fetch_timeout_secs > 120 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_secs must be between 1 and 120, got {}",
            config.fetch_timeout_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.dom_ready_timeout_secs < 1 || config.dom_ready_timeout_secs > 120 {
        return Err(ConfigError::Validation(format!(
            "dom_ready_timeout_secs must be between 1 and 120, got {}",
            config.dom_ready_timeout_secs
        )));
    }

    if matches!(&config.browser_executable, Some(path) if path.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "browser_executable cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates the root URL: absolute, HTTP(S), with a host
fn validate_root_url(root_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root_url '{}': {}", root_url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "root_url '{}' must use HTTP or HTTPS",
            root_url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "root_url '{}' has no host",
            root_url
        )));
    }

    Ok(())
}

/// Validates analyzer configuration
fn validate_analyzer_config(config: &AnalyzerConfig) -> Result<(), ConfigError> {
    Url::parse(&config.api_base)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api_base: {}", e)))?;

    if config.api_key_env.is_empty() {
        return Err(ConfigError::Validation(
            "api_key_env cannot be empty".to_string(),
        ));
    }

    if config.text_model.is_empty() || config.embedding_model.is_empty() {
        return Err(ConfigError::Validation(
            "text_model and embedding_model cannot be empty".to_string(),
        ));
    }

    if config.content_char_limit == 0 {
        return Err(ConfigError::Validation(
            "content_char_limit must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 600 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be between 1 and 600, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates search configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.top_k == 0 {
        return Err(ConfigError::Validation("top_k must be >= 1".to_string()));
    }
    Ok(())
}
