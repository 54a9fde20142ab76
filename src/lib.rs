//! Site IA - Information Architecture Extraction for Web Pages
//!
//! This crate loads a web page and maps its navigation structure: every link
//! is assigned to the global navigation bar (GNB), the side menu, the footer,
//! or the remaining "other" links, with submenus kept as one level of
//! children.
//!
//! # Features
//!
//! - **Landmark Location**: Scores candidate regions to find GNB, side menu and footer
//! - **Hierarchical Extraction**: Builds URL-deduplicated link trees from list menus
//! - **Page Acquisition**: Headless rendering via ChromiumOxide with a plain HTTP fallback
//! - **Exports**: Text tree, CSV, Markdown and JSON
//! - **Screenshots**: Cached full-page captures at desktop and mobile widths
//!
//! # Architecture
//!
//! ```text
//! URL ──▶ SiteCrawler ──▶ Browser Controller (CDP) ──┐
//!              │                                     │ HTML
//!              └────────▶ reqwest fallback ──────────┤
//!                                                    ▼
//!                                          SectionClassifier
//!                                       ┌────────────┴────────────┐
//!                                       ▼                         ▼
//!                               Landmark Locator         Link Extractor
//!                                       └────────────┬────────────┘
//!                                                    ▼
//!                                       IaResult ──▶ export
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use scraper::Html;
//! use site_ia::extraction::classify;
//!
//! let html = Html::parse_document(
//!     r#"<nav><ul><li><a href="/about">About</a></li></ul></nav>"#,
//! );
//! let ia = classify(&html, "https://example.com/").unwrap();
//! assert_eq!(ia.gnb[0].url, "https://example.com/about");
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod browser;
pub mod crawl;
pub mod error;
pub mod export;
pub mod extraction;

// Re-exports for convenience
pub use browser::{BrowserController, ScreenshotCache};
pub use crawl::{CrawlConfig, CrawlReport, PageSource, SiteCrawler};
pub use error::{Error, Result};
pub use export::ExportFormat;
pub use extraction::{classify, IaResult, LinkNode, Section, SectionClassifier};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
