//! Anchor text and href normalization
//!
//! Every link node is built from an anchor that passed through here: the text
//! is canonicalized and the href is resolved against the page's base URL.

use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;
use url::Url;

/// Zero-width space/non-joiner/joiner and non-breaking space
static INVISIBLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("[\u{00a0}\u{200b}\u{200c}\u{200d}]").expect("invisible-char pattern is valid")
});

/// Canonicalize anchor text.
///
/// Applies NFKC, drops zero-width characters and non-breaking spaces, then
/// collapses whitespace runs to a single space and trims both ends. The result
/// is a fixed point: normalizing it again returns it unchanged.
pub fn normalize_text(raw: &str) -> String {
    // NFKC can itself produce invisible characters or whitespace, so the
    // strip/collapse steps must run after it and the whole thing must settle.
    let mut current = collapse(raw);
    loop {
        let next = collapse(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn collapse(raw: &str) -> String {
    let composed: String = raw.nfkc().collect();
    let visible = INVISIBLE_RE.replace_all(&composed, "");
    visible.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve an href against the base URL with RFC 3986 semantics.
///
/// Returns `None` when the href cannot be joined (for example an absolute
/// URL with an unparseable host).
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    match base.join(href.trim()) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            debug!("Cannot resolve href {:?} against {}: {}", href, base, e);
            None
        }
    }
}

/// Whether an href can never produce a link node.
pub fn is_rejected_href(href: &str) -> bool {
    let href = href.trim();
    href.is_empty() || href == "#" || is_script_scheme(href)
}

fn is_script_scheme(href: &str) -> bool {
    href.get(..11)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
}

/// Turn an anchor element into `(text, absolute url)`, or reject it.
///
/// An anchor is rejected when its normalized text is empty, when its href is
/// missing or `#`, when the href uses the `javascript:` scheme, or when the
/// href cannot be resolved.
pub fn accept_anchor(base: &Url, anchor: ElementRef<'_>) -> Option<(String, String)> {
    let href = anchor.value().attr("href")?;
    if is_rejected_href(href) {
        return None;
    }

    let text = normalize_text(&anchor.text().collect::<String>());
    if text.is_empty() {
        return None;
    }

    let url = resolve_url(base, href)?;
    Some((text, url))
}
