//! Extraction module tests
//!
//! These tests run whole documents through landmark location, link
//! extraction and section classification.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use scraper::Html;
use site_ia::extraction::{classify, locate, normalize_text, resolve_url, LandmarkKind, Section};
use std::collections::HashSet;
use url::Url;

fn urls(nodes: &[site_ia::LinkNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.url.as_str()).collect()
}

#[test]
fn test_nested_menu() {
    let html = Html::parse_document(
        r#"<html><body><nav><ul>
            <li><a href="/products">Products</a><ul><li><a href="/products/shoes">Shoes</a></li></ul></li>
        </ul></nav></body></html>"#,
    );
    let ia = classify(&html, "https://shop.example.com/").unwrap();

    assert_eq!(ia.gnb.len(), 1);
    let products = &ia.gnb[0];
    assert_eq!(products.text, "Products");
    assert_eq!(products.url, "https://shop.example.com/products");
    assert_eq!(products.depth, 1);
    assert_eq!(products.section, Section::Gnb);
    assert_eq!(products.children.len(), 1);
    assert_eq!(products.children[0].text, "Shoes");
    assert_eq!(products.children[0].url, "https://shop.example.com/products/shoes");
    assert_eq!(products.children[0].depth, 2);
    assert!(products.children[0].children.is_empty());
    assert!(ia.other.is_empty());
}

#[test]
fn test_no_landmark_found() {
    let html = Html::parse_document(
        r#"<html><body>
            <div class="content">
                <p>Read <a href="/a">the first</a> and <a href="/b">the second</a>.</p>
                <a href="https://elsewhere.org/">Elsewhere</a>
            </div>
        </body></html>"#,
    );
    let ia = classify(&html, "https://example.com/").unwrap();

    assert!(locate(&html, LandmarkKind::Gnb).is_none());
    assert!(ia.gnb.is_empty());
    assert!(ia.side.is_empty());
    assert!(ia.footer.is_empty());
    assert_eq!(
        urls(&ia.other),
        vec![
            "https://example.com/a",
            "https://example.com/b",
            "https://elsewhere.org/"
        ]
    );
    assert!(ia.other.iter().all(|n| n.section == Section::Other && n.depth == 1));
}

#[test]
fn test_footer_keyword_fallback() {
    let html = Html::parse_document(
        r#"<html><body>
            <p><a href="/news">News</a></p>
            <div id="legal"><a href="/terms">Terms</a> <a href="/sitemap">사이트맵</a></div>
        </body></html>"#,
    );

    let footer = locate(&html, LandmarkKind::Footer).unwrap();
    assert_eq!(footer.element.value().name(), "div");
    assert_eq!(footer.element.value().attr("id"), Some("legal"));

    let ia = classify(&html, "https://example.com/").unwrap();
    assert_eq!(
        urls(&ia.footer),
        vec!["https://example.com/terms", "https://example.com/sitemap"]
    );
    assert_eq!(urls(&ia.other), vec!["https://example.com/news"]);
}

#[test]
fn test_relative_resolution_and_rejections() {
    let html = Html::parse_document(
        r##"<html><body><main>
            <a href="../b">Up one</a>
            <a href="#">Top</a>
            <a href="javascript:void(0)">Open</a>
            <a href="/empty"> </a>
        </main></body></html>"##,
    );
    let ia = classify(&html, "https://example.com/a/").unwrap();
    assert_eq!(urls(&ia.other), vec!["https://example.com/b"]);
    assert_eq!(ia.link_count(), 1);
}

#[test]
fn test_tie_goes_to_first_candidate() {
    let html = Html::parse_document(
        r#"<html><body>
            <nav><a href="/first">First</a></nav>
            <nav><a href="/second">Second</a></nav>
        </body></html>"#,
    );
    let gnb = locate(&html, LandmarkKind::Gnb).unwrap();
    assert_eq!(gnb.score, 32);

    let ia = classify(&html, "https://example.com/").unwrap();
    assert_eq!(urls(&ia.gnb), vec!["https://example.com/first"]);
    assert_eq!(urls(&ia.other), vec!["https://example.com/second"]);
}

#[test]
fn test_anchorless_items_surface_as_siblings() {
    let html = Html::parse_document(
        r#"<html><body><nav><ul>
            <li><span>Shop</span><ul>
                <li><a href="/men">Men</a></li>
                <li><a href="/women">Women</a></li>
            </ul></li>
            <li><a href="/help">Help</a></li>
        </ul></nav></body></html>"#,
    );
    let ia = classify(&html, "https://example.com/").unwrap();

    let flat: Vec<(&str, usize)> = ia.gnb.iter().map(|n| (n.text.as_str(), n.depth)).collect();
    assert_eq!(flat, vec![("Men", 2), ("Women", 2), ("Help", 1)]);
    assert!(ia.gnb.iter().all(|n| n.children.is_empty()));
}

#[test]
fn test_korean_portal_layout() {
    let html = Html::parse_document(
        r#"<html><body>
            <header><nav id="gnb"><ul>
                <li><a href="/company">회사소개</a>
                    <div class="depth2"><ul>
                        <li><a href="/company/ceo">CEO 인사말</a></li>
                        <li><a href="/company/history">연혁</a></li>
                    </ul></div>
                </li>
                <li><a href="/login">로그인</a></li>
            </ul></nav></header>
            <div class="lnb side-menu"><ul><li><a href="/company/ceo">CEO 인사말</a></li><li><a href="/company/map">오시는 길</a></li></ul></div>
            <footer class="footer">
                <a href="/policy/terms">이용약관</a>
                <a href="/policy/privacy">개인정보처리방침</a>
            </footer>
        </body></html>"#,
    );
    let ia = classify(&html, "https://www.example.co.kr/").unwrap();

    assert_eq!(ia.gnb.len(), 2);
    let children: Vec<&str> = ia.gnb[0].children.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(children, vec!["CEO 인사말", "연혁"]);
    assert_eq!(
        urls(&ia.side),
        vec![
            "https://www.example.co.kr/company/ceo",
            "https://www.example.co.kr/company/map"
        ]
    );
    assert_eq!(ia.footer.len(), 2);
    assert!(ia.other.is_empty());
}

#[test]
fn test_normalizer_exports() {
    assert_eq!(normalize_text("\u{200b} 메뉴\u{00a0} 1 "), "메뉴 1");
    let base = Url::parse("https://example.com/a/").unwrap();
    assert_eq!(resolve_url(&base, "../b").as_deref(), Some("https://example.com/b"));
}

fn page_strategy() -> impl Strategy<Value = (Vec<u8>, Vec<u8>, Vec<u8>)> {
    let paths = || prop::collection::vec(0u8..12, 0..8);
    (paths(), paths(), paths())
}

proptest! {
    #[test]
    fn prop_other_excludes_landmark_urls((nav, main, footer) in page_strategy()) {
        let items = |ids: &[u8]| -> String {
            ids.iter()
                .map(|id| format!(r#"<li><a href="/p{id}">Page {id}</a></li>"#))
                .collect()
        };
        let anchors = |ids: &[u8]| -> String {
            ids.iter()
                .map(|id| format!(r#"<a href="/p{id}">Page {id}</a>"#))
                .collect()
        };
        // The main list comes first so its submenu can pick up URLs the
        // landmarks claim later.
        let markup = format!(
            "<html><body><main><ul><li><a href=\"/hub\">Hub</a><ul>{}</ul></li></ul>{}</main>\
             <nav><ul>{}</ul></nav><footer>{}</footer></body></html>",
            items(&main),
            anchors(&main),
            items(&nav),
            anchors(&footer)
        );
        let html = Html::parse_document(&markup);
        let ia = classify(&html, "https://example.com/").unwrap();

        let claimed: HashSet<&str> = ia
            .gnb
            .iter()
            .chain(&ia.side)
            .chain(&ia.footer)
            .flat_map(|node| node.urls())
            .collect();
        for node in &ia.other {
            prop_assert!(!claimed.contains(node.url.as_str()));
        }

        for section in [&ia.gnb, &ia.side, &ia.footer, &ia.other] {
            let mut seen = HashSet::new();
            for url in section.iter().flat_map(|node| node.urls()) {
                prop_assert!(seen.insert(url), "duplicate {}", url);
            }
        }
    }
}
