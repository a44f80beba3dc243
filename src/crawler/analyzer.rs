//! Page analysis: summary, page type and embedding
//!
//! The crawler talks to analysis backends through [`ContentAnalyzer`].
//! [`GeminiAnalyzer`] implements it against the Generative Language REST API:
//! one `generateContent` call to summarize and classify a page, then one
//! `embedContent` call to embed the summary.

use crate::config::AnalyzerConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Summary used when the text model gives no usable answer
pub const FALLBACK_SUMMARY: &str = "Summary failed";

/// Page type used when the text model gives no usable answer
pub const FALLBACK_PAGE_TYPE: &str = "Unknown";

/// Errors raised by analysis backends
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No content to analyze")]
    EmptyContent,

    #[error("API key not found in environment variable {0}")]
    MissingApiKey(String),

    #[error("Analysis request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Analysis API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed analysis response: {0}")]
    MalformedResponse(String),
}

/// Result of analyzing one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageAnalysis {
    /// Short natural-language summary
    pub summary: String,
    /// Coarse page classification (free-form)
    pub page_type: String,
    /// Semantic embedding of the summary
    pub embedding: Vec<f32>,
}

/// Turns page content and search queries into summaries and embeddings
#[async_trait]
pub trait ContentAnalyzer: Send + Sync {
    /// Summarizes, classifies and embeds raw page content
    async fn analyze(&self, content: &str) -> Result<PageAnalysis, AnalysisError>;

    /// Embeds a free-text search query
    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, AnalysisError>;
}

/// Embedding task hint sent with each embedding request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingTask {
    RetrievalDocument,
    RetrievalQuery,
}

impl EmbeddingTask {
    fn as_api_str(self) -> &'static str {
        match self {
            Self::RetrievalDocument => "RETRIEVAL_DOCUMENT",
            Self::RetrievalQuery => "RETRIEVAL_QUERY",
        }
    }
}

/// Gemini-backed analyzer
#[derive(Debug, Clone)]
pub struct GeminiAnalyzer {
    client: Client,
    config: AnalyzerConfig,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct SummaryJson {
    #[serde(default)]
    summary: String,
    #[serde(default, rename = "type")]
    page_type: String,
}

impl GeminiAnalyzer {
    /// Creates an analyzer with an explicit API key
    pub fn new(client: Client, config: AnalyzerConfig, api_key: impl Into<String>) -> Self {
        Self {
            client,
            config,
            api_key: api_key.into(),
        }
    }

    /// Creates an analyzer reading the API key from `config.api_key_env`
    ///
    /// The analyzer gets its own client, built by [`build_analyzer_client`].
    pub fn from_env(config: AnalyzerConfig) -> Result<Self, AnalysisError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AnalysisError::MissingApiKey(config.api_key_env.clone()))?;
        Self::with_api_key(config, api_key)
    }

    /// Creates an analyzer with its own client and an explicit API key
    pub fn with_api_key(
        config: AnalyzerConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, AnalysisError> {
        let client = build_analyzer_client(&config)?;
        Ok(Self::new(client, config, api_key))
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.config.api_base.trim_end_matches('/'),
            model,
            method
        )
    }

    /// Asks the text model for a summary and page type
    ///
    /// Any failure degrades to [`FALLBACK_SUMMARY`] / [`FALLBACK_PAGE_TYPE`]
    /// so the page can still be embedded.
    pub async fn summarize_and_classify(&self, content: &str) -> (String, String) {
        match self.request_summary(content).await {
            Ok((summary, page_type)) => (summary, page_type),
            Err(e) => {
                tracing::warn!("Summarization error: {}", e);
                (FALLBACK_SUMMARY.to_string(), FALLBACK_PAGE_TYPE.to_string())
            }
        }
    }

    async fn request_summary(&self, content: &str) -> Result<(String, String), AnalysisError> {
        let excerpt: String = content.chars().take(self.config.content_char_limit).collect();
        let body = json!({
            "contents": [{ "parts": [{ "text": build_summary_prompt(&excerpt) }] }]
        });

        let response = self
            .client
            .post(self.endpoint(&self.config.text_model, "generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<String>()
            })
            .ok_or_else(|| AnalysisError::MalformedResponse("no candidates".to_string()))?;

        tracing::debug!("Model response: {}", text);
        parse_summary_response(&text)
    }

    /// Embeds `text` with the configured embedding model
    pub async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>, AnalysisError> {
        let model = &self.config.embedding_model;
        let body = json!({
            "model": format!("models/{}", model),
            "content": { "parts": [{ "text": text }] },
            "taskType": task.as_api_str(),
        });

        let response = self
            .client
            .post(self.endpoint(model, "embedContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: EmbedResponse = response.json().await?;
        Ok(parsed.embedding.values)
    }
}

#[async_trait]
impl ContentAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, content: &str) -> Result<PageAnalysis, AnalysisError> {
        if content.trim().is_empty() {
            return Err(AnalysisError::EmptyContent);
        }

        let (summary, page_type) = self.summarize_and_classify(content).await;
        let embedding = self.embed(&summary, EmbeddingTask::RetrievalDocument).await?;

        Ok(PageAnalysis {
            summary,
            page_type,
            embedding,
        })
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, AnalysisError> {
        self.embed(query, EmbeddingTask::RetrievalQuery).await
    }
}

/// Builds the client used for model requests
///
/// Generation can take far longer than a page fetch, so these requests are
/// bounded by `request_timeout_secs` rather than the crawler's fetch timeout.
pub fn build_analyzer_client(config: &AnalyzerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
}

fn build_summary_prompt(excerpt: &str) -> String {
    format!(
        "You are an intelligent assistant. Summarize the following content and classify the type of webpage.\n\
         Return **only** valid JSON in the format: {{\"summary\": \"...\", \"type\": \"...\"}} with no commentary.\n\n\
         Content:\n\"\"\"\n{}\n\"\"\"\n",
        excerpt
    )
}

/// Extracts `(summary, type)` from a model reply
///
/// Accepts replies wrapped in a triple-backtick fence (optionally tagged
/// `json`) and ignores any preamble before the first `{`.
pub fn parse_summary_response(text: &str) -> Result<(String, String), AnalysisError> {
    let mut text = text.trim();

    if let Some(rest) = text.strip_prefix("```") {
        if let Some(end) = rest.find("```") {
            text = rest[..end].trim();
        }
    }

    let start = text
        .find('{')
        .ok_or_else(|| AnalysisError::MalformedResponse("no JSON object in reply".to_string()))?;

    let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<SummaryJson>();
    let parsed = stream
        .next()
        .ok_or_else(|| AnalysisError::MalformedResponse("empty reply".to_string()))?
        .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

    Ok((parsed.summary, parsed.page_type))
}
