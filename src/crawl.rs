//! Page acquisition and IA crawl
//!
//! Loads a page (rendered in a headless browser, or fetched over plain HTTP
//! when rendering is disabled or fails) and classifies its links.

use crate::browser::{
    BrowserConfig, BrowserController, NavigationOptions, PageNavigator, UrlValidator,
    DEFAULT_USER_AGENT,
};
use crate::error::{FetchError, Result};
use crate::extraction::{IaResult, SectionClassifier, DEFAULT_MAX_NESTING};
use chrono::{DateTime, Utc};
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Crawl configuration
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Render with a headless browser before falling back to a plain fetch
    pub render: bool,
    /// User agent for plain fetches
    pub user_agent: String,
    /// Readiness wait for rendered pages, in milliseconds
    pub ready_timeout_ms: u64,
    /// Timeout of a plain fetch, in milliseconds
    pub fetch_timeout_ms: u64,
    /// Scroll-to-bottom passes after the page is ready
    pub scroll_passes: u32,
    /// Pause after each scroll, in milliseconds
    pub scroll_pause_ms: u64,
    /// Submenu recursion cap
    pub max_nesting: usize,
    /// Browser launch settings
    pub browser: BrowserConfig,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            render: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            ready_timeout_ms: 15000,
            fetch_timeout_ms: 30000,
            scroll_passes: 3,
            scroll_pause_ms: 1000,
            max_nesting: DEFAULT_MAX_NESTING,
            browser: BrowserConfig::default(),
        }
    }
}

impl CrawlConfig {
    /// Create a new config builder
    pub fn builder() -> CrawlConfigBuilder {
        CrawlConfigBuilder::default()
    }
}

/// Builder for CrawlConfig
#[derive(Default)]
pub struct CrawlConfigBuilder {
    config: CrawlConfig,
}

impl CrawlConfigBuilder {
    /// Enable/disable browser rendering
    pub fn render(mut self, render: bool) -> Self {
        self.config.render = render;
        self
    }

    /// Set the user agent for plain fetches
    pub fn user_agent<S: Into<String>>(mut self, ua: S) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Set the plain fetch timeout
    pub fn fetch_timeout_ms(mut self, ms: u64) -> Self {
        self.config.fetch_timeout_ms = ms;
        self
    }

    /// Set scrolling behavior after load
    pub fn scrolling(mut self, passes: u32, pause_ms: u64) -> Self {
        self.config.scroll_passes = passes;
        self.config.scroll_pause_ms = pause_ms;
        self
    }

    /// Set the submenu recursion cap
    pub fn max_nesting(mut self, max_nesting: usize) -> Self {
        self.config.max_nesting = max_nesting;
        self
    }

    /// Set browser launch settings
    pub fn browser(mut self, browser: BrowserConfig) -> Self {
        self.config.browser = browser;
        self
    }

    /// Build the config
    pub fn build(self) -> CrawlConfig {
        self.config
    }
}

/// How the analyzed HTML was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSource {
    /// Rendered DOM from a headless browser
    Rendered,
    /// Raw response body of a plain GET
    Fetched,
}

/// Result of crawling one page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    /// Classified links
    pub ia: IaResult,
    /// How the HTML was obtained
    pub source: PageSource,
    /// When the crawl finished
    pub crawled_at: DateTime<Utc>,
}

/// Crawls a page and builds its IA map
pub struct SiteCrawler {
    config: CrawlConfig,
    client: reqwest::Client,
}

impl SiteCrawler {
    /// Create a crawler with default config
    pub fn new() -> Result<Self> {
        Self::with_config(CrawlConfig::default())
    }

    /// Create a crawler with custom config
    pub fn with_config(config: CrawlConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.fetch_timeout_ms))
            .build()
            .map_err(FetchError::Request)?;
        Ok(Self { config, client })
    }

    /// Get the crawl configuration
    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Load `url` and classify its links.
    ///
    /// `url` may omit the scheme, in which case https is assumed.
    #[instrument(skip(self))]
    pub async fn crawl(&self, url: &str) -> Result<CrawlReport> {
        let url = UrlValidator::normalize(url)?;

        let (html, source) = if self.config.render {
            match self.render(&url).await {
                Ok(html) => (html, PageSource::Rendered),
                Err(e) => {
                    warn!("Rendering {} failed, falling back to plain fetch: {}", url, e);
                    (self.fetch(&url).await?, PageSource::Fetched)
                }
            }
        } else {
            (self.fetch(&url).await?, PageSource::Fetched)
        };

        let ia = self.classify_html(&html, &url)?;
        info!("Crawled {} via {:?}: {} links", url, source, ia.link_count());

        Ok(CrawlReport {
            ia,
            source,
            crawled_at: Utc::now(),
        })
    }

    /// Classify an already-loaded HTML document
    pub fn classify_html(&self, html: &str, base_url: &str) -> Result<IaResult> {
        let document = Html::parse_document(html);
        SectionClassifier::new()
            .with_max_nesting(self.config.max_nesting)
            .classify(&document, base_url)
    }

    /// Render `url` in a headless browser and return the DOM after scrolling
    #[instrument(skip(self))]
    pub async fn render(&self, url: &str) -> Result<String> {
        let browser = BrowserController::with_config(self.config.browser.clone()).await?;
        let options = NavigationOptions {
            timeout_ms: self.config.ready_timeout_ms,
            scroll_passes: self.config.scroll_passes,
            scroll_pause_ms: self.config.scroll_pause_ms,
            ..Default::default()
        };

        let html = match browser.navigate(url, options.clone()).await {
            Ok(page) => {
                let scrolled = PageNavigator::scroll_to_bottom(
                    &page,
                    options.scroll_passes,
                    options.scroll_pause_ms,
                )
                .await;
                match scrolled {
                    Ok(height) => info!("Scrolled {} to height {}", url, height),
                    Err(e) => warn!("Scrolling {} failed: {}", url, e),
                }
                PageNavigator::outer_html(&page).await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        html
    }

    /// GET `url` and return the body
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }

        let body = response.text().await.map_err(FetchError::Request)?;
        info!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_config_default() {
        let config = CrawlConfig::default();
        assert!(config.render);
        assert_eq!(config.ready_timeout_ms, 15000);
        assert_eq!(config.fetch_timeout_ms, 30000);
        assert_eq!(config.scroll_passes, 3);
        assert_eq!(config.max_nesting, DEFAULT_MAX_NESTING);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_crawl_config_builder() {
        let config = CrawlConfig::builder()
            .render(false)
            .user_agent("TestBot/1.0")
            .scrolling(0, 0)
            .max_nesting(4)
            .build();
        assert!(!config.render);
        assert_eq!(config.user_agent, "TestBot/1.0");
        assert_eq!(config.scroll_passes, 0);
        assert_eq!(config.max_nesting, 4);
    }

    #[test]
    fn test_classify_html_flattens_deep_menus() {
        let config = CrawlConfig::builder().max_nesting(1).build();
        let crawler = SiteCrawler::with_config(config).unwrap();
        let html = r#"<nav><ul><li><ul><li><ul>
            <li><a href="/deep">Deep</a></li>
        </ul></li></ul></li></ul></nav>"#;
        let ia = crawler.classify_html(html, "https://ex.com/").unwrap();
        assert_eq!(ia.gnb.len(), 1);
        assert_eq!(ia.gnb[0].url, "https://ex.com/deep");
    }

    #[test]
    fn test_page_source_serde() {
        assert_eq!(serde_json::to_string(&PageSource::Fetched).unwrap(), "\"fetched\"");
    }
}
