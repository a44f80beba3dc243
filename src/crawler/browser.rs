//! Browser-rendered page fetching
//!
//! [`BrowserFetcher`] drives a headless Chrome/Chromium over the DevTools
//! protocol for pages that build their content with scripts. The browser is
//! launched on the first fetch and shared by the whole crawl; every fetch
//! opens its own tab, waits for `<body>` and returns the rendered DOM.

use crate::config::{CrawlerConfig, RenderStrategy};
use crate::crawler::fetcher::{FetchError, PageFetcher};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;

const BODY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Launch and wait settings for the browser renderer
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Chrome/Chromium binary; auto-detected when `None`
    pub executable: Option<PathBuf>,
    pub user_agent: String,
    /// Bound on a single navigation
    pub navigation_timeout: Duration,
    /// Bound on waiting for `<body>` once navigation returned
    pub dom_ready_timeout: Duration,
}

impl BrowserSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            executable: config.browser_executable.as_ref().map(PathBuf::from),
            user_agent: config.user_agent.clone(),
            navigation_timeout: Duration::from_secs(config.fetch_timeout_secs),
            dom_ready_timeout: Duration::from_secs(config.dom_ready_timeout_secs),
        }
    }
}

struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Fetcher rendering pages in a shared headless browser
pub struct BrowserFetcher {
    settings: BrowserSettings,
    session: OnceCell<BrowserSession>,
}

impl BrowserFetcher {
    /// Creates a fetcher; the browser starts on the first fetch
    pub fn new(settings: BrowserSettings) -> Self {
        Self {
            settings,
            session: OnceCell::new(),
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(BrowserSettings::from_config(config))
    }

    async fn session(&self) -> Result<&BrowserSession, String> {
        self.session
            .get_or_try_init(|| launch_browser(&self.settings))
            .await
    }

    async fn render(&self, url: &str) -> Result<String, FetchError> {
        let session = self.session().await.map_err(|message| FetchError::Browser {
            url: url.to_string(),
            message,
        })?;

        let page = session
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| browser_error(url, e))?;

        let result = self.load(&page, url).await;

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close tab for {}: {}", url, e);
        }
        result
    }

    async fn load(&self, page: &Page, url: &str) -> Result<String, FetchError> {
        match tokio::time::timeout(self.settings.navigation_timeout, page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(browser_error(url, e)),
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                })
            }
        }

        wait_for_body(page, url, self.settings.dom_ready_timeout).await?;
        page.content().await.map_err(|e| browser_error(url, e))
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str, strategy: RenderStrategy) -> Result<String, FetchError> {
        match strategy {
            RenderStrategy::Browser => self.render(url).await,
            RenderStrategy::Http => Err(FetchError::UnsupportedStrategy { strategy }),
        }
    }
}

async fn launch_browser(settings: &BrowserSettings) -> Result<BrowserSession, String> {
    let mut builder = BrowserConfig::builder()
        .request_timeout(settings.navigation_timeout)
        .arg(format!("--user-agent={}", settings.user_agent))
        .arg("--no-sandbox")
        .arg("--disable-gpu")
        .arg("--disable-extensions")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--mute-audio");

    if let Some(executable) = &settings.executable {
        builder = builder.chrome_executable(executable);
    }

    let config = builder
        .build()
        .map_err(|e| format!("Failed to build browser config: {}", e))?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| format!("Failed to launch browser: {}", e))?;

    // The CDP connection only makes progress while its handler is polled
    let handler = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::trace!("Browser handler error: {}", e);
            }
        }
        tracing::debug!("Browser handler task completed");
    });

    tracing::info!("Browser renderer started");
    Ok(BrowserSession { browser, handler })
}

/// Polls for `<body>` until it exists or `timeout` elapses
async fn wait_for_body(page: &Page, url: &str, timeout: Duration) -> Result<(), FetchError> {
    let start = Instant::now();
    loop {
        if page.find_element("body").await.is_ok() {
            tracing::debug!("DOM ready for {} after {:?}", url, start.elapsed());
            return Ok(());
        }

        if start.elapsed() >= timeout {
            return Err(FetchError::Timeout {
                url: url.to_string(),
            });
        }

        tokio::time::sleep(BODY_POLL_INTERVAL).await;
    }
}

fn browser_error(url: &str, error: impl std::fmt::Display) -> FetchError {
    FetchError::Browser {
        url: url.to_string(),
        message: error.to_string(),
    }
}
