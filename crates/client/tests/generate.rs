//! Integration tests for `GenerationClient` against a mocked image API.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use autoviz_client::{GenerationClient, GenerationConfig, GenerationError, ImageBackend, VehicleImage};
use autoviz_core::{Error, UpstreamFailure};

const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

fn test_client(server: &MockServer) -> GenerationClient {
    GenerationClient::new(GenerationConfig {
        api_key: Some("sk-test".into()),
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
        vision_timeout: Duration::from_secs(5),
        ..Default::default()
    })
    .expect("failed to build test GenerationClient")
}

fn vehicle() -> VehicleImage {
    VehicleImage::from_base64_payload(PNG_1X1).expect("fixture decodes")
}

#[tokio::test]
async fn generate_returns_hosted_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/edits"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created": 1,
            "data": [{"url": "https://cdn.example/result.png"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client(&server).generate(&vehicle(), "Install the kit").await.unwrap();
    assert_eq!(result, "https://cdn.example/result.png");
}

#[tokio::test]
async fn generate_wraps_inline_image_as_data_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/edits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"b64_json": PNG_1X1}]})))
        .mount(&server)
        .await;

    let result = test_client(&server).generate(&vehicle(), "prompt").await.unwrap();
    assert_eq!(result, format!("data:image/png;base64,{PNG_1X1}"));
}

#[tokio::test]
async fn generate_categorises_error_statuses() {
    let cases = [
        (401, UpstreamFailure::InvalidCredentials),
        (429, UpstreamFailure::RateLimited),
        (400, UpstreamFailure::BadRequest),
        (403, UpstreamFailure::Forbidden),
        (500, UpstreamFailure::Unknown),
    ];

    for (status, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/edits"))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({"error": {"message": "nope", "type": "x"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server).generate(&vehicle(), "prompt").await.unwrap_err();
        match Error::from(err) {
            Error::UpstreamGenerationFailed { kind, .. } => assert_eq!(kind, expected, "status {status}"),
            other => panic!("status {status}: unexpected {other:?}"),
        }
    }
}

#[tokio::test]
async fn generate_keeps_api_message_for_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": {"message": "Invalid image file"}})),
        )
        .mount(&server)
        .await;

    let err = test_client(&server).generate(&vehicle(), "prompt").await.unwrap_err();
    assert!(matches!(err, GenerationError::BadRequest(ref m) if m == "Invalid image file"), "got {err:?}");
}

#[tokio::test]
async fn generate_fails_on_empty_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let err = test_client(&server).generate(&vehicle(), "prompt").await.unwrap_err();
    assert!(matches!(err, GenerationError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn generate_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"data": [{"url": "https://cdn.example/late.png"}]}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = GenerationClient::new(GenerationConfig {
        api_key: Some("sk-test".into()),
        base_url: server.uri(),
        timeout: Duration::from_millis(200),
        ..Default::default()
    })
    .unwrap();

    let err = client.generate(&vehicle(), "prompt").await.unwrap_err();
    assert!(matches!(err, GenerationError::Timeout), "got {err:?}");
}

#[tokio::test]
async fn describe_vehicle_reads_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_string_contains("data:image/png;base64,"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "a silver Honda Civic sedan"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = test_client(&server).describe_vehicle(&vehicle()).await.unwrap();
    assert_eq!(text, "a silver Honda Civic sedan");
}

#[tokio::test]
async fn describe_vehicle_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = test_client(&server).describe_vehicle(&vehicle()).await.unwrap_err();
    assert!(matches!(err, GenerationError::RateLimited));
}
