//! Crawl tests against a mock HTTP server
//!
//! Rendering is disabled so the crawler goes straight to the plain fetch.

use site_ia::error::{Error, FetchError};
use site_ia::export::{self, ExportFormat};
use site_ia::{CrawlConfig, PageSource, SiteCrawler};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

const HOME: &str = r#"<html><body>
    <header><nav class="gnb"><ul>
        <li><a href="/about">About</a><ul><li><a href="/about/team">Team</a></li></ul></li>
        <li><a href="/blog">Blog</a></li>
    </ul></nav></header>
    <main><a href="/blog">Latest posts</a><a href="/contact">Contact us</a></main>
    <footer><a href="/terms">Terms</a></footer>
</body></html>"#;

fn crawler() -> SiteCrawler {
    let config = CrawlConfig::builder()
        .render(false)
        .user_agent("site-ia-test")
        .build();
    SiteCrawler::with_config(config).unwrap()
}

async fn serve(body: &str) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "site-ia-test"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(body),
        )
        .mount(&mock_server)
        .await;
    mock_server
}

#[tokio::test]
async fn test_crawl_fetched_page() {
    let mock_server = serve(HOME).await;
    let base = format!("{}/", mock_server.uri());

    let report = crawler().crawl(&base).await.unwrap();

    assert_eq!(report.source, PageSource::Fetched);
    assert_eq!(report.ia.base_url, base);

    let gnb: Vec<&str> = report.ia.gnb.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(gnb, vec!["About", "Blog"]);
    assert_eq!(report.ia.gnb[0].children[0].url, format!("{}about/team", base));

    let other: Vec<&str> = report.ia.other.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(other, vec!["Contact us"]);
    assert_eq!(report.ia.footer.len(), 1);
}

#[tokio::test]
async fn test_crawl_http_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let err = crawler().crawl(&mock_server.uri()).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Fetch(FetchError::Status { status: 503, .. })
    ));
}

#[tokio::test]
async fn test_crawl_then_export() {
    let mock_server = serve(HOME).await;
    let report = crawler().crawl(&mock_server.uri()).await.unwrap();

    let csv = export::render(&report.ia, ExportFormat::Csv).unwrap();
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows[0], "\u{feff}section,text,url,depth");
    assert!(rows[2].starts_with("GNB,Team,"));
    assert!(rows[2].ends_with(",2"));
    assert_eq!(rows.len(), 1 + 3 + 1 + 1);

    let text = export::render(&report.ia, ExportFormat::Txt).unwrap();
    assert!(text.contains("No Side Menu data"));
}
