//! Page navigation functionality
//!
//! This module handles URL navigation with retry and timeout handling, plus
//! the page preparation steps the IA crawl and screenshots need: waiting for
//! the document to finish loading, scrolling to trigger lazy content, and
//! dismissing popups.

use crate::browser::PageHandle;
use crate::error::{CaptureError, Error, NavigationError, Result};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Options for page navigation
#[derive(Debug, Clone)]
pub struct NavigationOptions {
    /// Timeout for the load and the readiness wait, in milliseconds (default: 15000)
    pub timeout_ms: u64,
    /// Number of retry attempts (default: 1)
    pub retries: u32,
    /// Delay between retries in ms (default: 1000)
    pub retry_delay_ms: u64,
    /// Maximum scroll-to-bottom passes after load (default: 3)
    pub scroll_passes: u32,
    /// Pause after each scroll in ms (default: 1000)
    pub scroll_pause_ms: u64,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 15000,
            retries: 1,
            retry_delay_ms: 1000,
            scroll_passes: 3,
            scroll_pause_ms: 1000,
        }
    }
}

/// URL validation utilities
pub struct UrlValidator;

impl UrlValidator {
    /// Normalize user input into a crawlable URL.
    ///
    /// Input without a scheme is treated as `https://`. Only http, https and
    /// file URLs are accepted.
    pub fn normalize(input: &str) -> std::result::Result<String, NavigationError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(NavigationError::InvalidUrl("URL cannot be empty".to_string()));
        }

        let candidate = if input.contains("://") {
            input.to_string()
        } else {
            format!("https://{}", input)
        };

        let url = Url::parse(&candidate)
            .map_err(|e| NavigationError::InvalidUrl(format!("{}: {}", input, e)))?;

        match url.scheme() {
            "http" | "https" | "file" => Ok(url.to_string()),
            other => Err(NavigationError::InvalidUrl(format!(
                "Unsupported scheme '{}': {}",
                other, input
            ))),
        }
    }
}

/// Close-button selectors tried before popups are hidden outright
const CLOSE_BUTTON_SELECTORS: &[&str] = &[
    "button.close",
    "a.close",
    "[class*=\"close\"]",
    "[id*=\"close\"]",
    "button[aria-label=\"Close\"]",
    "button[aria-label=\"close\"]",
    "div.close-btn",
    ".btn-close",
    ".modal-close",
];

const HIDE_POPUPS_SCRIPT: &str = r#"
    document.querySelectorAll('.modal, .popup, .overlay, [id*="popup"], [class*="popup"], [id*="modal"], [class*="modal"], [id*="overlay"], [class*="overlay"]')
        .forEach(el => { el.style.display = 'none'; });
    true
"#;

const PAGE_HEIGHT_SCRIPT: &str =
    "Math.max(document.body.scrollHeight, document.documentElement.scrollHeight)";

/// Page navigator
pub struct PageNavigator;

impl PageNavigator {
    /// Navigate to a URL and wait for the document to be ready.
    ///
    /// Returns the final URL after any redirects.
    #[instrument(skip(page, options))]
    pub async fn goto(
        page: &PageHandle,
        url: &str,
        options: Option<NavigationOptions>,
    ) -> Result<String> {
        let opts = options.unwrap_or_default();
        let start = std::time::Instant::now();
        let url = UrlValidator::normalize(url)?;

        info!("Navigating to: {}", url);

        let mut last_error = None;
        for attempt in 0..=opts.retries {
            if attempt > 0 {
                warn!("Navigation retry attempt {} of {}", attempt, opts.retries);
                tokio::time::sleep(Duration::from_millis(opts.retry_delay_ms)).await;
            }

            match Self::navigate_once(&page.page, &url, &opts).await {
                Ok(final_url) => {
                    debug!("Loaded {} in {}ms", final_url, start.elapsed().as_millis());
                    return Ok(final_url);
                }
                Err(e) => {
                    warn!("Navigation attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            NavigationError::LoadFailed("Navigation failed after all retries".to_string()).into()
        }))
    }

    async fn navigate_once(
        page: &chromiumoxide::Page,
        url: &str,
        opts: &NavigationOptions,
    ) -> Result<String> {
        let timeout = Duration::from_millis(opts.timeout_ms);

        tokio::time::timeout(timeout, page.goto(url))
            .await
            .map_err(|_| NavigationError::Timeout(opts.timeout_ms))?
            .map_err(|e| NavigationError::LoadFailed(e.to_string()))?;

        Self::wait_for_ready(page, opts.timeout_ms).await?;

        let final_url = page
            .url()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?
            .unwrap_or_else(|| url.to_string());

        debug!("Navigation complete: {} -> {}", url, final_url);
        Ok(final_url)
    }

    /// Wait until `document.readyState` is `complete`
    async fn wait_for_ready(page: &chromiumoxide::Page, timeout_ms: u64) -> Result<()> {
        let script = r#"
            new Promise(resolve => {
                if (document.readyState === 'complete') {
                    resolve(true);
                } else {
                    window.addEventListener('load', () => resolve(true));
                }
            })
        "#;

        tokio::time::timeout(Duration::from_millis(timeout_ms), page.evaluate(script))
            .await
            .map_err(|_| NavigationError::Timeout(timeout_ms))?
            .map_err(|e| Error::cdp(e.to_string()))?;

        Ok(())
    }

    /// Scroll to the bottom until the page stops growing, at most `passes` times.
    ///
    /// Returns the last observed page height.
    #[instrument(skip(page))]
    pub async fn scroll_to_bottom(page: &PageHandle, passes: u32, pause_ms: u64) -> Result<u64> {
        let mut height = Self::page_height(page).await?;
        for pass in 0..passes {
            page.page
                .evaluate("window.scrollTo(0, document.body.scrollHeight)")
                .await
                .map_err(|e| Error::cdp(e.to_string()))?;
            tokio::time::sleep(Duration::from_millis(pause_ms)).await;

            let new_height = Self::page_height(page).await?;
            debug!("Scroll pass {}: {} -> {}", pass + 1, height, new_height);
            if new_height == height {
                break;
            }
            height = new_height;
        }
        Ok(height)
    }

    async fn page_height(page: &PageHandle) -> Result<u64> {
        page.page
            .evaluate(PAGE_HEIGHT_SCRIPT)
            .await
            .map_err(|e| Error::cdp(e.to_string()))?
            .into_value::<u64>()
            .map_err(|e| Error::cdp(e.to_string()))
    }

    /// Close or hide modal popups that would cover a screenshot.
    ///
    /// Clicks the first visible close button; when there is none, hides
    /// every modal/popup/overlay element instead.
    #[instrument(skip(page))]
    pub async fn dismiss_popups(page: &PageHandle) -> Result<()> {
        let selectors = serde_json::to_string(CLOSE_BUTTON_SELECTORS)?;
        let click_script = format!(
            r#"
            (() => {{
                for (const selector of {}) {{
                    const el = document.querySelector(selector);
                    if (el && el.offsetParent !== null) {{
                        el.click();
                        return true;
                    }}
                }}
                return false;
            }})()
            "#,
            selectors
        );

        let clicked: bool = page
            .page
            .evaluate(click_script.as_str())
            .await
            .map_err(|e| Error::cdp(e.to_string()))?
            .into_value()
            .unwrap_or(false);

        if clicked {
            info!("Popup close button clicked");
            tokio::time::sleep(Duration::from_millis(1000)).await;
        } else {
            info!("No close button found, hiding popup elements");
            page.page
                .evaluate(HIDE_POPUPS_SCRIPT)
                .await
                .map_err(|e| Error::cdp(e.to_string()))?;
        }
        Ok(())
    }

    /// Serialize the rendered DOM
    #[instrument(skip(page))]
    pub async fn outer_html(page: &PageHandle) -> Result<String> {
        let html: String = page
            .page
            .evaluate("document.documentElement.outerHTML")
            .await
            .map_err(|e| CaptureError::HtmlFailed(e.to_string()))?
            .into_value()
            .map_err(|e| CaptureError::HtmlFailed(e.to_string()))?;
        debug!("Captured {} bytes of HTML", html.len());
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_options_default() {
        let opts = NavigationOptions::default();
        assert_eq!(opts.timeout_ms, 15000);
        assert_eq!(opts.scroll_passes, 3);
        assert_eq!(opts.scroll_pause_ms, 1000);
    }

    #[test]
    fn test_normalize_adds_https() {
        assert_eq!(
            UrlValidator::normalize("example.com").unwrap(),
            "https://example.com/"
        );
        assert_eq!(
            UrlValidator::normalize("  www.example.co.kr/main  ").unwrap(),
            "https://www.example.co.kr/main"
        );
    }

    #[test]
    fn test_normalize_keeps_scheme() {
        assert_eq!(
            UrlValidator::normalize("http://example.com/a?b=1").unwrap(),
            "http://example.com/a?b=1"
        );
        assert!(UrlValidator::normalize("file:///tmp/page.html").is_ok());
    }

    #[test]
    fn test_normalize_rejects() {
        assert!(UrlValidator::normalize("").is_err());
        assert!(UrlValidator::normalize("ftp://example.com").is_err());
        assert!(UrlValidator::normalize("https://exa mple.com").is_err());
    }

    #[test]
    fn test_close_selectors_serialize_as_js_array() {
        let json = serde_json::to_string(CLOSE_BUTTON_SELECTORS).unwrap();
        assert!(json.starts_with('['));
        assert!(json.contains(r#""[class*=\"close\"]""#));
    }
}
