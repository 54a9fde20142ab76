//! Screenshot capture and caching
//!
//! Full-page screenshots of menu pages are stored on disk keyed by URL and
//! viewport width, so a page is rendered at most once per width. When a
//! capture fails a placeholder image is cached in its place.

use crate::browser::{
    BrowserConfig, BrowserController, NavigationOptions, PageHandle, PageNavigator,
};
use crate::error::{CaptureError, Error, Result};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::future::Future;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Desktop viewport width
pub const DESKTOP_WIDTH: u32 = 1920;
/// Mobile viewport width
pub const MOBILE_WIDTH: u32 = 360;
/// Height of the placeholder image
pub const PLACEHOLDER_HEIGHT: u32 = 400;

const VIEWPORT_HEIGHT: u32 = 1080;
const FRAME: u32 = 4;

/// On-disk screenshot cache
#[derive(Debug, Clone)]
pub struct ScreenshotCache {
    dir: PathBuf,
}

/// Where a cached screenshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Already on disk
    Hit,
    /// Freshly captured
    Captured,
    /// Capture failed; a placeholder was stored
    Placeholder,
}

impl ScreenshotCache {
    /// Use `dir` as the cache directory; it is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the cached image for `url` at `width`
    pub fn cache_path(&self, url: &str, width: u32) -> PathBuf {
        let key = Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("{}_{}", url, width).as_bytes());
        self.dir.join(format!("{}.png", key))
    }

    /// Return the cached image, capturing it with `capture` on a miss.
    ///
    /// A failed capture is logged and replaced by a placeholder, which is
    /// cached like a real screenshot.
    #[instrument(skip(self, capture))]
    pub async fn get_or_capture<F, Fut>(
        &self,
        url: &str,
        width: u32,
        capture: F,
    ) -> Result<(PathBuf, CacheOutcome)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>>>,
    {
        let path = self.cache_path(url, width);
        if tokio::fs::try_exists(&path).await? {
            debug!("Screenshot cache hit: {}", path.display());
            return Ok((path, CacheOutcome::Hit));
        }

        let (bytes, outcome) = match capture().await {
            Ok(bytes) => (bytes, CacheOutcome::Captured),
            Err(e) => {
                warn!("Screenshot of {} at {}px failed: {}", url, width, e);
                (placeholder_png(width)?, CacheOutcome::Placeholder)
            }
        };

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, &bytes).await?;
        info!("Cached screenshot {} ({} bytes)", path.display(), bytes.len());
        Ok((path, outcome))
    }

    /// Cached full-page screenshot of `url` rendered `width` pixels wide
    pub async fn screenshot(
        &self,
        url: &str,
        width: u32,
        config: &BrowserConfig,
    ) -> Result<(PathBuf, CacheOutcome)> {
        self.get_or_capture(url, width, || capture(url, width, config)).await
    }
}

/// Launch a browser at `width` and take a full-page screenshot of `url`
#[instrument(skip(config))]
pub async fn capture(url: &str, width: u32, config: &BrowserConfig) -> Result<Vec<u8>> {
    let mut config = config.clone();
    config.width = width;
    config.height = VIEWPORT_HEIGHT;

    let browser = BrowserController::with_config(config).await?;
    let options = NavigationOptions {
        timeout_ms: browser.config().timeout_ms,
        ..Default::default()
    };

    let shot = match browser.navigate(url, options.clone()).await {
        Ok(page) => full_page_png(&page, &options).await,
        Err(e) => Err(e),
    };

    if let Err(e) = browser.close().await {
        warn!("Failed to close screenshot browser: {}", e);
    }
    shot
}

async fn full_page_png(page: &PageHandle, options: &NavigationOptions) -> Result<Vec<u8>> {
    PageNavigator::dismiss_popups(page).await?;
    page.page
        .evaluate("document.body.style.overflow = 'hidden'; true")
        .await
        .map_err(|e| Error::cdp(e.to_string()))?;
    PageNavigator::scroll_to_bottom(page, options.scroll_passes, options.scroll_pause_ms).await?;
    page.page
        .evaluate("window.scrollTo(0, 0); true")
        .await
        .map_err(|e| Error::cdp(e.to_string()))?;

    let params = ScreenshotParams::builder()
        .format(CaptureScreenshotFormat::Png)
        .from_surface(true)
        .capture_beyond_viewport(true)
        .full_page(true)
        .build();

    let data = page
        .page
        .screenshot(params)
        .await
        .map_err(|e| CaptureError::ScreenshotFailed(e.to_string()))?;

    debug!("Screenshot captured: {} bytes", data.len());
    Ok(data)
}

/// Light grey PNG with a darker frame, `width` x [`PLACEHOLDER_HEIGHT`]
pub fn placeholder_png(width: u32) -> Result<Vec<u8>> {
    let width = width.max(1);
    let fill = Rgb([240, 240, 240]);
    let frame = Rgb([200, 200, 200]);

    let img = RgbImage::from_fn(width, PLACEHOLDER_HEIGHT, |x, y| {
        let on_frame =
            x < FRAME || y < FRAME || x + FRAME >= width || y + FRAME >= PLACEHOLDER_HEIGHT;
        if on_frame {
            frame
        } else {
            fill
        }
    });

    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_cache_path_is_stable_per_url_and_width() {
        let cache = ScreenshotCache::new("/tmp/shots");
        let a = cache.cache_path("https://ex.com/", DESKTOP_WIDTH);
        assert_eq!(a, cache.cache_path("https://ex.com/", DESKTOP_WIDTH));
        assert_ne!(a, cache.cache_path("https://ex.com/", MOBILE_WIDTH));
        assert_ne!(a, cache.cache_path("https://ex.com/about", DESKTOP_WIDTH));
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("png"));
        assert!(a.starts_with("/tmp/shots"));
    }

    #[test]
    fn test_placeholder_dimensions() {
        let bytes = placeholder_png(MOBILE_WIDTH).unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (MOBILE_WIDTH, PLACEHOLDER_HEIGHT));
        assert_eq!(img.get_pixel(0, 0), &Rgb([200, 200, 200]));
        assert_eq!(img.get_pixel(180, 200), &Rgb([240, 240, 240]));
    }

    #[tokio::test]
    async fn test_get_or_capture_caches() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ScreenshotCache::new(dir.path().join("shots"));
        let calls = AtomicUsize::new(0);
        let png = placeholder_png(10).unwrap();

        for expected in [CacheOutcome::Captured, CacheOutcome::Hit] {
            let (path, outcome) = cache
                .get_or_capture("https://ex.com/", 10, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(png.clone())
                })
                .await
                .unwrap();
            assert_eq!(outcome, expected);
            assert_eq!(std::fs::read(&path).unwrap(), png);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_capture_stores_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ScreenshotCache::new(dir.path());

        let (path, outcome) = cache
            .get_or_capture("https://down.example.com/", 120, || async {
                Err(CaptureError::ScreenshotFailed("boom".to_string()).into())
            })
            .await
            .unwrap();

        assert_eq!(outcome, CacheOutcome::Placeholder);
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (120, PLACEHOLDER_HEIGHT));
    }
}
