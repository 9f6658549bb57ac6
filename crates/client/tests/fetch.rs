//! Integration tests for `FetchClient::fetch` and `ProductPipeline::extract`.
//!
//! Each test stands up a local `wiremock` server. The host gate is disabled so
//! requests to 127.0.0.1 are allowed.

use std::sync::Arc;
use std::time::Duration;

use url::Url;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use autoviz_client::{FetchClient, FetchConfig, ProductPipeline, RuleExtractor};
use autoviz_core::Error;

fn test_config() -> FetchConfig {
    FetchConfig { block_private_hosts: false, timeout: Duration::from_secs(5), ..Default::default() }
}

fn test_client() -> FetchClient {
    FetchClient::new(test_config()).expect("failed to build test FetchClient")
}

fn test_pipeline() -> ProductPipeline {
    ProductPipeline::new(test_client(), Arc::new(RuleExtractor::new()))
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8")
}

const PRODUCT_PAGE: &str = r#"<!doctype html>
<html><head>
  <title>Ignored Title | Shop</title>
  <meta property="og:title" content="Kit Super LED H7 6000K">
  <meta property="og:description" content="Par de lâmpadas LED com 12000 lúmens.">
  <meta property="og:image" content="/img/kit-h7.jpg">
  <meta property="product:price:amount" content="199.90">
</head><body><h1>Kit Super LED H7 6000K</h1></body></html>"#;

async fn fetch(server: &MockServer, route: &str) -> Result<autoviz_client::FetchResponse, Error> {
    let url = Url::parse(&format!("{}{}", server.uri(), route)).unwrap();
    test_client().fetch(&url).await
}

#[tokio::test]
async fn fetch_returns_html_with_browser_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/produto/kit-h7"))
        .and(header_exists("accept-language"))
        .and(header_exists("accept"))
        .respond_with(html(PRODUCT_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let response = fetch(&server, "/produto/kit-h7").await.expect("fetch should succeed");

    assert_eq!(response.status.as_u16(), 200);
    assert!(response.html().contains("Kit Super LED H7"));
    assert_eq!(response.final_url, response.url);
}

#[tokio::test]
async fn fetch_maps_404_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

    let err = fetch(&server, "/missing").await.unwrap_err();
    assert!(matches!(err, Error::HttpNotFound), "got {err:?}");
}

#[tokio::test]
async fn fetch_maps_403_to_forbidden() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(403)).mount(&server).await;

    let err = fetch(&server, "/blocked").await.unwrap_err();
    assert!(matches!(err, Error::HttpForbidden), "got {err:?}");
}

#[tokio::test]
async fn fetch_maps_5xx_to_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(503)).mount(&server).await;

    let err = fetch(&server, "/down").await.unwrap_err();
    assert!(matches!(err, Error::HttpServerError(503)), "got {err:?}");
}

#[tokio::test]
async fn fetch_rejects_non_html_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"title": "Kit"})))
        .mount(&server)
        .await;

    let err = fetch(&server, "/api/product").await.unwrap_err();
    match err {
        Error::NotHtmlContent(Some(ct)) => assert!(ct.starts_with("application/json")),
        other => panic!("expected NotHtmlContent, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_rejects_missing_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

    let err = fetch(&server, "/bare").await.unwrap_err();
    assert!(matches!(err, Error::NotHtmlContent(None)), "got {err:?}");
}

#[tokio::test]
async fn fetch_times_out_on_slow_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html(PRODUCT_PAGE).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = FetchClient::new(FetchConfig { timeout: Duration::from_millis(200), ..test_config() }).unwrap();
    let url = Url::parse(&format!("{}/slow", server.uri())).unwrap();

    let err = client.fetch(&url).await.unwrap_err();
    assert!(matches!(err, Error::Timeout(_)), "got {err:?}");
}

#[tokio::test]
async fn fetch_rejects_oversized_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(html(&"x".repeat(4096))).mount(&server).await;

    let client = FetchClient::new(FetchConfig { max_bytes: 1024, ..test_config() }).unwrap();
    let url = Url::parse(&format!("{}/huge", server.uri())).unwrap();

    let err = client.fetch(&url).await.unwrap_err();
    assert!(matches!(err, Error::TooLarge(_)), "got {err:?}");
}

#[tokio::test]
async fn fetch_follows_redirects_and_reports_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/kit"))
        .mount(&server)
        .await;
    Mock::given(method("GET")).and(path("/new/kit")).respond_with(html(PRODUCT_PAGE)).mount(&server).await;

    let response = fetch(&server, "/old").await.expect("redirect should be followed");
    assert_eq!(response.final_url.path(), "/new/kit");
}

#[tokio::test]
async fn fetch_gives_up_on_redirect_loop() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
        .mount(&server)
        .await;

    let err = fetch(&server, "/loop").await.unwrap_err();
    assert!(matches!(err, Error::UnknownFetch(_)), "got {err:?}");
}

#[tokio::test]
async fn fetch_blocks_loopback_when_gate_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(html(PRODUCT_PAGE)).expect(0).mount(&server).await;

    let client = FetchClient::new(FetchConfig { block_private_hosts: true, ..test_config() }).unwrap();
    let url = Url::parse(&format!("{}/produto", server.uri())).unwrap();

    let err = client.fetch(&url).await.unwrap_err();
    assert!(matches!(err, Error::Blocked(_)), "got {err:?}");
}

#[tokio::test]
async fn fetch_unknown_host_is_host_not_found() {
    let url = Url::parse("https://no-such-store.invalid/produto").unwrap();
    let err = test_client().fetch(&url).await.unwrap_err();
    assert!(matches!(err, Error::HostNotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn pipeline_extracts_and_validates_product() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old-kit"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/loja/kit-h7"))
        .mount(&server)
        .await;
    Mock::given(method("GET")).and(path("/loja/kit-h7")).respond_with(html(PRODUCT_PAGE)).mount(&server).await;

    let submitted = format!("{}/old-kit?utm_source=ads#reviews", server.uri());
    let product = test_pipeline().extract(&submitted).await.expect("extraction should succeed");

    assert_eq!(product.name, "Kit Super LED H7 6000K");
    assert_eq!(product.description, "Par de lâmpadas LED com 12000 lúmens.");
    assert_eq!(product.image, format!("{}/img/kit-h7.jpg", server.uri()));
    assert_eq!(product.price, "199.90");
    assert_eq!(product.source_url, format!("{}/old-kit", server.uri()));
}

#[tokio::test]
async fn pipeline_rejects_page_without_usable_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<html><head><title>AB</title></head><body><p>no product here</p></body></html>"))
        .mount(&server)
        .await;

    let err = test_pipeline().extract(&format!("{}/empty", server.uri())).await.unwrap_err();
    assert!(matches!(err, Error::ExtractionFailed(_)), "got {err:?}");
}

#[tokio::test]
async fn pipeline_propagates_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(404)).mount(&server).await;

    let err = test_pipeline().extract(&format!("{}/gone", server.uri())).await.unwrap_err();
    assert!(matches!(err, Error::HttpNotFound));
    assert!(err.user_message().contains("404"));
}
