use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn test_client() -> PageClient {
    PageClient::new(5, "skuscan-test/0.1", 0, 0).expect("failed to build test PageClient")
}

fn url(raw: &str) -> reqwest::Url {
    reqwest::Url::parse(raw).expect("test URL should parse")
}

#[test]
fn storefront_origin_drops_search_path_and_query() {
    assert_eq!(
        storefront_origin(&url("https://depofit.com/search?q=48.98721")).as_deref(),
        Some("https://depofit.com")
    );
}

#[test]
fn storefront_origin_keeps_port() {
    assert_eq!(
        storefront_origin(&url("http://127.0.0.1:8080/products/x")).as_deref(),
        Some("http://127.0.0.1:8080")
    );
}

#[test]
fn storefront_origin_absent_for_non_web_scheme() {
    assert_eq!(storefront_origin(&url("data:text/html,<h1>x</h1>")), None);
}

#[test]
fn catalog_host_for_log_fields() {
    assert_eq!(catalog_host(&url("https://www.innvictus.com/p/123")), "www.innvictus.com");
    assert_eq!(catalog_host(&url("data:text/html,x")), "");
}

#[tokio::test]
async fn fetch_html_returns_body_and_sends_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("user-agent", "skuscan-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><h1>ok</h1></html>"))
        .mount(&server)
        .await;

    let body = test_client()
        .fetch_html(&format!("{}/search?q=x", server.uri()))
        .await
        .expect("expected page");
    assert!(body.contains("<h1>ok</h1>"));
}

#[tokio::test]
async fn fetch_page_sends_storefront_referer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/roger"))
        .and(header("referer", server.uri().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Roger</h1>"))
        .expect(1)
        .mount(&server)
        .await;

    let page = test_client()
        .fetch_page(&format!("{}/products/roger?variant=1", server.uri()))
        .await
        .expect("expected page");
    assert_eq!(page.body, "<h1>Roger</h1>");
}

#[tokio::test]
async fn fetch_html_maps_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_html(&format!("{}/products/missing", server.uri()))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ScraperError::UnexpectedStatus { status: 404, .. }),
        "expected UnexpectedStatus(404), got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_page_reports_final_url_after_redirect() {
    let server = MockServer::start().await;
    let target = format!("{}/products/the-roger-pro", server.uri());
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", target.as_str()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/the-roger-pro"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let page = test_client()
        .fetch_page(&format!("{}/search?q=48.98721", server.uri()))
        .await
        .unwrap();
    assert_eq!(page.url, target);
}

#[tokio::test]
async fn fetch_html_rejects_relative_url() {
    let err = test_client().fetch_html("/products/x").await.unwrap_err();
    assert!(matches!(err, ScraperError::InvalidUrl { .. }));
}

#[tokio::test]
async fn fetch_html_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = PageClient::new(5, "skuscan-test/0.1", 2, 0).unwrap();
    let err = client
        .fetch_html(&format!("{}/search?q=x", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ScraperError::UnexpectedStatus { status: 503, .. }
    ));
}
