//! Section classification
//!
//! Assigns every link on the page to exactly one of GNB, Side Menu, Footer or
//! Other. Landmark sections are extracted from their located subtrees; Other
//! is the whole-document pass minus every URL a landmark already claimed.

use crate::error::{ExtractionError, Result};
use crate::extraction::landmark::{locate, LandmarkKind};
use crate::extraction::links::{LinkExtractor, LinkNode, Section, DEFAULT_MAX_NESTING};
use scraper::Html;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, instrument};
use url::Url;

/// The IA map of one page at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IaResult {
    /// URL the page was loaded from; every link is resolved against it
    pub base_url: String,
    /// Global navigation bar
    pub gnb: Vec<LinkNode>,
    /// Side menu
    pub side: Vec<LinkNode>,
    /// Footer
    pub footer: Vec<LinkNode>,
    /// Links claimed by no landmark
    pub other: Vec<LinkNode>,
}

impl IaResult {
    /// Top-level nodes of one section
    pub fn section(&self, section: Section) -> &[LinkNode] {
        match section {
            Section::Gnb => &self.gnb,
            Section::Side => &self.side,
            Section::Footer => &self.footer,
            Section::Other => &self.other,
        }
    }

    /// Sections in report order, paired with their nodes
    pub fn sections(&self) -> impl Iterator<Item = (Section, &[LinkNode])> {
        Section::ALL.into_iter().map(move |s| (s, self.section(s)))
    }

    /// Number of links, children included
    pub fn link_count(&self) -> usize {
        self.sections()
            .flat_map(|(_, nodes)| nodes.iter())
            .map(|node| 1 + node.children.len())
            .sum()
    }
}

/// Runs landmark location and link extraction over a parsed document
#[derive(Debug, Clone)]
pub struct SectionClassifier {
    max_nesting: usize,
}

impl Default for SectionClassifier {
    fn default() -> Self {
        Self {
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

impl SectionClassifier {
    /// Create a classifier with the default nesting cap
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap submenu recursion in every extraction pass
    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Classify every link of `document`, resolving hrefs against `base_url`.
    ///
    /// Fails only when `base_url` is not an absolute URL links can be
    /// resolved against.
    #[instrument(skip(self, document))]
    pub fn classify(&self, document: &Html, base_url: &str) -> Result<IaResult> {
        let base = parse_base(base_url)?;
        let extractor = LinkExtractor::new(&base).with_max_nesting(self.max_nesting);

        let landmark_links = |kind: LandmarkKind| -> Vec<LinkNode> {
            locate(document, kind)
                .map(|landmark| extractor.extract(landmark.element, kind.section(), 1))
                .unwrap_or_default()
        };
        let gnb = landmark_links(LandmarkKind::Gnb);
        let side = landmark_links(LandmarkKind::Side);
        let footer = landmark_links(LandmarkKind::Footer);

        let claimed: HashSet<&str> = gnb
            .iter()
            .chain(&side)
            .chain(&footer)
            .flat_map(|node| node.urls())
            .collect();

        let other: Vec<LinkNode> = extractor
            .extract(document.root_element(), Section::Other, 1)
            .into_iter()
            .filter(|node| !claimed.contains(node.url.as_str()))
            .map(|mut node| {
                node.children.retain(|child| !claimed.contains(child.url.as_str()));
                node
            })
            .collect();

        info!(
            "Classified {}: gnb={} side={} footer={} other={}",
            base_url,
            gnb.len(),
            side.len(),
            footer.len(),
            other.len()
        );

        Ok(IaResult {
            base_url: base_url.to_string(),
            gnb,
            side,
            footer,
            other,
        })
    }
}

/// Classify `document` with default settings.
pub fn classify(document: &Html, base_url: &str) -> Result<IaResult> {
    SectionClassifier::default().classify(document, base_url)
}

fn parse_base(base_url: &str) -> Result<Url> {
    let base = Url::parse(base_url).map_err(|e| ExtractionError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;
    if base.cannot_be_a_base() {
        return Err(ExtractionError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: "URL cannot be used as a base".to_string(),
        }
        .into());
    }
    Ok(base)
}
