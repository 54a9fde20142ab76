//! Landmark region detection
//!
//! Finds the subtree that most likely plays the role of the global
//! navigation bar, the side menu, or the footer. Each landmark kind is a
//! declarative [`LandmarkSpec`]: where candidates come from and how they are
//! weighted. One gather/score/select routine serves all of them.

use crate::extraction::links::Section;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Structural role a landmark plays on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandmarkKind {
    /// Global navigation bar
    Gnb,
    /// Side menu
    Side,
    /// Footer
    Footer,
}

impl LandmarkKind {
    /// All landmark kinds, in classification order
    pub const ALL: [LandmarkKind; 3] = [
        LandmarkKind::Gnb,
        LandmarkKind::Side,
        LandmarkKind::Footer,
    ];

    /// Section label assigned to links found inside this landmark
    pub fn section(self) -> Section {
        match self {
            LandmarkKind::Gnb => Section::Gnb,
            LandmarkKind::Side => Section::Side,
            LandmarkKind::Footer => Section::Footer,
        }
    }

    /// Detection configuration for this kind
    pub fn spec(self) -> &'static LandmarkSpec {
        match self {
            LandmarkKind::Gnb => &GNB_SPEC,
            LandmarkKind::Side => &SIDE_SPEC,
            LandmarkKind::Footer => &FOOTER_SPEC,
        }
    }
}

/// Where candidate elements come from
#[derive(Debug, Clone, Copy)]
pub enum CandidateSource {
    /// Tag pass, then class-substring pass, then id-substring pass.
    ///
    /// Class patterns collect every matching element; id patterns keep only
    /// the first match per pattern.
    Patterns {
        /// Semantic tag names
        tags: &'static [&'static str],
        /// Case-insensitive substrings of the class attribute
        classes: &'static [&'static str],
        /// Case-insensitive substrings of the id attribute
        ids: &'static [&'static str],
    },
    /// CSS selectors, with a text-keyword scan when none of them match
    Selectors {
        /// Selectors applied in order
        selectors: &'static [&'static str],
        /// Block containers scanned by the fallback
        fallback_tags: &'static [&'static str],
        /// Keywords the fallback looks for in a container's text
        fallback_keywords: &'static [&'static str],
    },
}

/// Scoring weights for one landmark kind
#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    /// Tag that earns `semantic_tag_bonus`
    pub semantic_tag: &'static str,
    /// Bonus when the element itself is `semantic_tag`
    pub semantic_tag_bonus: u32,
    /// Bonus when the element sits inside a `<header>`
    pub header_ancestor_bonus: u32,
    /// Points per contained anchor
    pub per_anchor: u32,
    /// Upper bound on the anchor points, if any
    pub anchor_cap: Option<u32>,
    /// Bonus when the element contains a `<ul>` or `<ol>`
    pub list_bonus: u32,
    /// Bonus when an anchor mentions an account action (login, join, ...)
    pub account_link_bonus: u32,
    /// Bonus when a class token contains this substring
    pub class_token_bonus: Option<(&'static str, u32)>,
}

/// Declarative description of one landmark kind
#[derive(Debug, Clone, Copy)]
pub struct LandmarkSpec {
    /// The kind this spec detects
    pub kind: LandmarkKind,
    /// Candidate gathering strategy
    pub source: CandidateSource,
    /// Candidate scoring
    pub weights: ScoreWeights,
}

/// Anchor texts that mark a menu as the site's primary navigation
pub const ACCOUNT_KEYWORDS: &[&str] = &["login", "logout", "join", "mypage"];

/// Global navigation bar
pub static GNB_SPEC: LandmarkSpec = LandmarkSpec {
    kind: LandmarkKind::Gnb,
    source: CandidateSource::Patterns {
        tags: &["nav", "header"],
        classes: &[
            "gnb",
            "nav",
            "navigation",
            "menu",
            "main-menu",
            "top-menu",
            "topmenu",
            "global-nav",
            "util-menu",
            "user-menu",
            "header-menu",
        ],
        ids: &[
            "gnb",
            "nav",
            "navigation",
            "menu",
            "top-menu",
            "topmenu",
            "global-nav",
            "util-menu",
            "user-menu",
            "header-menu",
        ],
    },
    weights: ScoreWeights {
        semantic_tag: "nav",
        semantic_tag_bonus: 30,
        header_ancestor_bonus: 20,
        per_anchor: 2,
        anchor_cap: Some(20),
        list_bonus: 15,
        account_link_bonus: 10,
        class_token_bonus: None,
    },
};

/// Side menu
pub static SIDE_SPEC: LandmarkSpec = LandmarkSpec {
    kind: LandmarkKind::Side,
    source: CandidateSource::Patterns {
        tags: &["aside"],
        classes: &["sidebar", "side", "side-menu", "side-nav"],
        ids: &["sidebar", "side", "side-menu"],
    },
    weights: ScoreWeights {
        semantic_tag: "aside",
        semantic_tag_bonus: 20,
        header_ancestor_bonus: 0,
        per_anchor: 2,
        anchor_cap: Some(20),
        list_bonus: 15,
        account_link_bonus: 0,
        class_token_bonus: None,
    },
};

/// Footer
pub static FOOTER_SPEC: LandmarkSpec = LandmarkSpec {
    kind: LandmarkKind::Footer,
    source: CandidateSource::Selectors {
        selectors: &[
            "footer",
            "#footer",
            ".footer",
            r#"[class*="footer"]"#,
            r#"[class*="Footer"]"#,
            ".bottom",
            "#bottom",
            ".site-bottom",
        ],
        fallback_tags: &["div", "section"],
        // terms of use, privacy policy, sitemap, about us
        fallback_keywords: &["이용약관", "개인정보", "사이트맵", "회사소개"],
    },
    weights: ScoreWeights {
        semantic_tag: "footer",
        semantic_tag_bonus: 20,
        header_ancestor_bonus: 0,
        per_anchor: 2,
        anchor_cap: None,
        list_bonus: 0,
        account_link_bonus: 0,
        class_token_bonus: Some(("footer", 10)),
    },
};

/// A scored candidate subtree, borrowed from the parsed document
#[derive(Debug, Clone, Copy)]
pub struct LandmarkCandidate<'a> {
    /// Root element of the candidate subtree
    pub element: ElementRef<'a>,
    /// Heuristic score
    pub score: u32,
}

/// Locate the best subtree for `kind`, or `None` when nothing qualifies.
pub fn locate(document: &Html, kind: LandmarkKind) -> Option<LandmarkCandidate<'_>> {
    let spec = kind.spec();
    let candidates = gather_candidates(document, spec);
    debug!("{:?}: {} candidate(s)", kind, candidates.len());

    let best = select_best(
        candidates
            .into_iter()
            .map(|element| LandmarkCandidate {
                element,
                score: score(element, &spec.weights),
            }),
    );

    if let Some(ref winner) = best {
        info!(
            "{:?} landmark: <{}> score={}",
            kind,
            winner.element.value().name(),
            winner.score
        );
    }
    best
}

/// Pick the highest-scoring candidate; ties go to the earliest one.
pub fn select_best<'a, I>(candidates: I) -> Option<LandmarkCandidate<'a>>
where
    I: IntoIterator<Item = LandmarkCandidate<'a>>,
{
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(current) if current.score >= candidate.score => Some(current),
        _ => Some(candidate),
    })
}

/// Collect candidate elements in discovery order. Duplicates are kept.
pub fn gather_candidates<'a>(document: &'a Html, spec: &LandmarkSpec) -> Vec<ElementRef<'a>> {
    match spec.source {
        CandidateSource::Patterns { tags, classes, ids } => {
            let mut found = Vec::new();
            for tag in tags {
                found.extend(all_elements(document).filter(|el| el.value().name() == *tag));
            }
            for pattern in classes {
                found.extend(
                    all_elements(document)
                        .filter(|el| attr_contains(el.value().attr("class"), pattern)),
                );
            }
            for pattern in ids {
                if let Some(el) =
                    all_elements(document).find(|el| attr_contains(el.value().id(), pattern))
                {
                    found.push(el);
                }
            }
            found
        }
        CandidateSource::Selectors {
            selectors,
            fallback_tags,
            fallback_keywords,
        } => {
            let mut found = Vec::new();
            for raw in selectors {
                match Selector::parse(raw) {
                    Ok(selector) => found.extend(document.select(&selector)),
                    Err(e) => debug!("Skipping selector {}: {:?}", raw, e),
                }
            }
            if found.is_empty() {
                found.extend(all_elements(document).filter(|el| {
                    fallback_tags.iter().any(|tag| *tag == el.value().name()) && {
                        let text = el.text().collect::<String>().to_lowercase();
                        fallback_keywords.iter().any(|kw| text.contains(kw))
                    }
                }));
            }
            found
        }
    }
}

/// Score one candidate subtree.
pub fn score(element: ElementRef<'_>, weights: &ScoreWeights) -> u32 {
    let mut score = 0;

    if element.value().name() == weights.semantic_tag {
        score += weights.semantic_tag_bonus;
    }

    if weights.header_ancestor_bonus > 0
        && element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| a.value().name() == "header")
    {
        score += weights.header_ancestor_bonus;
    }

    let anchors: Vec<ElementRef<'_>> = elements_below(element)
        .filter(|el| el.value().name() == "a")
        .collect();
    let anchor_points = weights.per_anchor.saturating_mul(anchors.len() as u32);
    score += match weights.anchor_cap {
        Some(cap) => anchor_points.min(cap),
        None => anchor_points,
    };

    if weights.list_bonus > 0
        && elements_below(element).any(|el| matches!(el.value().name(), "ul" | "ol"))
    {
        score += weights.list_bonus;
    }

    if weights.account_link_bonus > 0
        && anchors.iter().any(|a| {
            let text = a.text().collect::<String>().to_lowercase();
            ACCOUNT_KEYWORDS.iter().any(|kw| text.contains(kw))
        })
    {
        score += weights.account_link_bonus;
    }

    if let Some((needle, bonus)) = weights.class_token_bonus {
        if element
            .value()
            .classes()
            .any(|class| class.to_lowercase().contains(needle))
        {
            score += bonus;
        }
    }

    score
}

/// Every element of the document, `<html>` included, in document order
fn all_elements(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
}

/// Elements strictly below `element`, in document order
pub(crate) fn elements_below(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element.descendants().skip(1).filter_map(ElementRef::wrap)
}

fn attr_contains(value: Option<&str>, pattern: &str) -> bool {
    value.is_some_and(|v| v.to_lowercase().contains(&pattern.to_lowercase()))
}
