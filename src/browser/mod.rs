//! Browser automation module
//!
//! This module provides high-level browser control through ChromiumOxide:
//! lifecycle management, navigation and page preparation, and cached
//! screenshot capture.

pub mod capture;
pub mod controller;
pub mod navigation;

pub use capture::{CacheOutcome, ScreenshotCache, DESKTOP_WIDTH, MOBILE_WIDTH};
pub use controller::{BrowserConfig, BrowserController, PageHandle, DEFAULT_USER_AGENT};
pub use navigation::{NavigationOptions, PageNavigator, UrlValidator};
