//! Site IA command line tool
//!
//! Crawls one page, prints or saves its IA map, and optionally captures
//! screenshots of the GNB pages.

use anyhow::{Context, Result};
use clap::Parser;
use site_ia::browser::{BrowserConfig, ScreenshotCache, DESKTOP_WIDTH, MOBILE_WIDTH};
use site_ia::export::{self, ExportFormat};
use site_ia::{CrawlConfig, SiteCrawler};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site IA extractor
#[derive(Parser, Debug)]
#[command(name = "site-ia")]
#[command(version)]
#[command(about = "Map a web page's navigation into GNB, side menu, footer and other links")]
struct Args {
    /// Page to analyze (https:// is assumed when no scheme is given)
    url: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Txt)]
    format: ExportFormat,

    /// Write the export to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip the headless browser and fetch the raw HTML
    #[arg(long)]
    no_browser: bool,

    /// Path to Chrome/Chromium executable
    #[arg(long)]
    chrome_path: Option<String>,

    /// Launch Chrome without its sandbox
    #[arg(long)]
    no_sandbox: bool,

    /// Capture desktop and mobile screenshots of each top-level GNB page
    #[arg(long)]
    screenshots: bool,

    /// Screenshot cache directory
    #[arg(long, default_value = "screenshot_cache")]
    cache_dir: PathBuf,

    /// Cap on submenu recursion
    #[arg(long, default_value_t = site_ia::extraction::DEFAULT_MAX_NESTING)]
    max_nesting: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut browser = BrowserConfig::builder().sandbox(!args.no_sandbox);
    if let Some(ref path) = args.chrome_path {
        browser = browser.chrome_path(path);
    }
    let browser = browser.build();

    let config = CrawlConfig::builder()
        .render(!args.no_browser)
        .max_nesting(args.max_nesting)
        .browser(browser.clone())
        .build();

    let crawler = SiteCrawler::with_config(config).context("Failed to build crawler")?;
    let report = crawler
        .crawl(&args.url)
        .await
        .with_context(|| format!("Failed to analyze {}", args.url))?;

    tracing::info!(
        "Analyzed {} ({:?}): {} links",
        report.ia.base_url,
        report.source,
        report.ia.link_count()
    );

    let rendered = export::render(&report.ia, args.format).context("Failed to render export")?;
    match args.output {
        Some(ref path) => {
            tokio::fs::write(path, &rendered)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Saved {} export to {}", args.format.extension(), path.display());
        }
        None => print!("{}", rendered),
    }

    if args.screenshots {
        let cache = ScreenshotCache::new(args.cache_dir.clone());
        for node in &report.ia.gnb {
            for width in [DESKTOP_WIDTH, MOBILE_WIDTH] {
                let (path, outcome) = cache
                    .screenshot(&node.url, width, &browser)
                    .await
                    .with_context(|| format!("Failed to cache screenshot of {}", node.url))?;
                tracing::info!(
                    "{} @ {}px: {} ({:?})",
                    node.text,
                    width,
                    path.display(),
                    outcome
                );
            }
        }
    }

    Ok(())
}
