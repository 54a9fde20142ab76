//! Hierarchical link extraction
//!
//! Walks a subtree and turns its list items and anchors into an ordered,
//! URL-deduplicated tree of [`LinkNode`]s. A node carries at most one level
//! of children: the items of the submenu directly under its list item.
//! Anything nested deeper surfaces as a flat node of the enclosing walk.

use crate::extraction::landmark::elements_below;
use crate::extraction::normalize::accept_anchor;
use ego_tree::NodeId;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;
use url::Url;

/// Default cap on submenu recursion
pub const DEFAULT_MAX_NESTING: usize = 32;

/// Classification bucket of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    /// Global navigation bar
    #[serde(rename = "GNB")]
    Gnb,
    /// Side menu
    #[serde(rename = "Side Menu")]
    Side,
    /// Footer
    Footer,
    /// Everything not claimed by a landmark
    Other,
}

impl Section {
    /// All sections, in report order
    pub const ALL: [Section; 4] = [Section::Gnb, Section::Side, Section::Footer, Section::Other];

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Section::Gnb => "GNB",
            Section::Side => "Side Menu",
            Section::Footer => "Footer",
            Section::Other => "Other",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One link of the IA tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkNode {
    /// Normalized anchor text (never empty)
    pub text: String,
    /// Absolute URL
    pub url: String,
    /// Section the link was classified into
    pub section: Section,
    /// 1-based nesting level within the section
    pub depth: usize,
    /// Direct submenu items
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LinkNode>,
}

impl LinkNode {
    /// This node's URL followed by its children's URLs
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.url.as_str()).chain(self.children.iter().map(|c| c.url.as_str()))
    }
}

/// Per-call walk state, threaded explicitly through submenu recursion
#[derive(Debug, Default)]
struct WalkState {
    /// URLs already emitted by this call
    seen: HashSet<String>,
    /// Submenus already walked as anchorless list items
    expanded: HashSet<NodeId>,
}

/// Hierarchical link extraction over one parsed document
#[derive(Debug, Clone)]
pub struct LinkExtractor<'u> {
    base: &'u Url,
    max_nesting: usize,
}

impl<'u> LinkExtractor<'u> {
    /// Create an extractor resolving hrefs against `base`
    pub fn new(base: &'u Url) -> Self {
        Self {
            base,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    /// Cap the depth submenu recursion may reach
    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting.max(1);
        self
    }

    /// Extract the link tree below `target`.
    ///
    /// No URL appears twice among the returned nodes and their children.
    pub fn extract(&self, target: ElementRef<'_>, section: Section, depth: usize) -> Vec<LinkNode> {
        let mut state = WalkState::default();
        let mut links = Vec::new();
        self.walk(target, section, depth, &mut state, &mut links);
        debug!(
            "{}: {} top-level link(s) at depth {}",
            section,
            links.len(),
            depth
        );
        links
    }

    fn walk<'a>(
        &self,
        target: ElementRef<'a>,
        section: Section,
        depth: usize,
        state: &mut WalkState,
        out: &mut Vec<LinkNode>,
    ) {
        for item in elements_below(target).filter(|el| el.value().name() == "li") {
            match own_anchor(item) {
                Some(anchor) => {
                    let Some((text, url)) = accept_anchor(self.base, anchor) else {
                        continue;
                    };
                    if !state.seen.insert(url.clone()) {
                        continue;
                    }
                    let children = submenu(item)
                        .map(|menu| self.submenu_items(menu, section, depth + 1, state))
                        .unwrap_or_default();
                    out.push(LinkNode {
                        text,
                        url,
                        section,
                        depth,
                        children,
                    });
                }
                None => {
                    let Some(menu) = submenu(item) else {
                        continue;
                    };
                    if depth >= self.max_nesting {
                        debug!("Nesting cap {} reached, flattening submenu", self.max_nesting);
                        continue;
                    }
                    // A second walk of the same submenu could only yield URLs
                    // the first one already claimed.
                    if state.expanded.insert(menu.id()) {
                        self.walk(menu, section, depth + 1, state, out);
                    }
                }
            }
        }

        // Links outside list items (buttons, logos, inline links)
        for anchor in elements_below(target).filter(|el| el.value().name() == "a") {
            let Some((text, url)) = accept_anchor(self.base, anchor) else {
                continue;
            };
            if state.seen.insert(url.clone()) {
                out.push(LinkNode {
                    text,
                    url,
                    section,
                    depth,
                    children: Vec::new(),
                });
            }
        }
    }

    /// Leaf nodes for the items directly inside `menu`
    fn submenu_items(
        &self,
        menu: ElementRef<'_>,
        section: Section,
        depth: usize,
        state: &mut WalkState,
    ) -> Vec<LinkNode> {
        let mut children = Vec::new();
        for item in elements_below(menu)
            .filter(|el| el.value().name() == "li" && !has_item_between(*el, menu))
        {
            let Some((text, url)) = own_anchor(item).and_then(|a| accept_anchor(self.base, a))
            else {
                continue;
            };
            if state.seen.insert(url.clone()) {
                children.push(LinkNode {
                    text,
                    url,
                    section,
                    depth,
                    children: Vec::new(),
                });
            }
        }
        children
    }
}

/// The list item's own anchor: the first one not inside a nested list item
fn own_anchor(item: ElementRef<'_>) -> Option<ElementRef<'_>> {
    elements_below(item).find(|el| el.value().name() == "a" && !has_item_between(*el, item))
}

/// Submenu container directly under a list item: its first `ul` or `div` child
fn submenu(item: ElementRef<'_>) -> Option<ElementRef<'_>> {
    item.children()
        .filter_map(ElementRef::wrap)
        .find(|child| matches!(child.value().name(), "ul" | "div"))
}

/// Whether an `<li>` sits strictly between `el` and its ancestor `outer`
fn has_item_between(el: ElementRef<'_>, outer: ElementRef<'_>) -> bool {
    let outer_id = outer.id();
    el.ancestors()
        .take_while(|node| node.id() != outer_id)
        .filter_map(ElementRef::wrap)
        .any(|node| node.value().name() == "li")
}
