//! Integration tests for `GenerationClient` using wiremock HTTP mocks.

use std::time::Duration;

use mapdash_reports::{ClientError, GenerationClient, GenerationRequest, OutputKind, RetryPolicy};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Short timeout and zero backoff so retry tests run in milliseconds.
fn test_client(base_url: &str, max_attempts: u32) -> GenerationClient {
    GenerationClient::with_base_url(
        base_url,
        "mapdash-test",
        Duration::from_millis(200),
        RetryPolicy::new(max_attempts, Duration::ZERO),
    )
    .expect("client construction should not fail")
}

fn text_request() -> GenerationRequest {
    GenerationRequest::from_payload(
        json!({
            "output_type": "text",
            "text_instructions": "Three short captions",
            "brand": "Salit",
            "language": "English"
        }),
        None,
    )
    .expect("valid text request")
}

const TEXT_RESPONSE: &str = r#"{
    "output_1": {"Headline": "Cook with Salit", "Body": "Pure golden oil"},
    "output_2": {"Headline": "Fry better"},
    "output_3": {"Headline": "Kitchen favourite", "Tagline": "Since 1985"}
}"#;

#[tokio::test]
async fn text_generation_posts_prompt_and_decodes_variants() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/text_new"))
        .and(body_json(json!({
            "text_prompt": "Three short captions",
            "product_data": {"brand": "Salit", "language": "English"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(TEXT_RESPONSE, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 3);
    let output = client
        .run_with_retry(&text_request())
        .await
        .expect("generation should succeed");

    assert_eq!(output.attempts, 1);
    let variants = output.display.text_variants();
    assert_eq!(variants.len(), 3);
    assert_eq!(
        variants[0].sections,
        vec![
            ("Headline".to_string(), "Cook with Salit".to_string()),
            ("Body".to_string(), "Pure golden oil".to_string()),
        ]
    );
    assert_eq!(variants[2].sections[1].0, "Tagline");
}

#[tokio::test]
async fn image_generation_decodes_base64_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/image_new"))
        .and(body_json(json!({
            "image_prompt": "Market stall",
            "product_data": {"brand": "Salit"},
            "image": "cmVmZXJlbmNl"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result1": "aW1hZ2Ux",
            "result2": "aW1hZ2Uy",
            "result3": "aW1hZ2Uz"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = GenerationRequest::from_payload(
        json!({"output_type": "image", "image_instructions": "Market stall", "brand": "Salit"}),
        Some("cmVmZXJlbmNl".to_string()),
    )
    .expect("valid image request");
    let client = test_client(&server.uri(), 3);
    let display = client.generate(&request).await.expect("image generation");

    let images = display.images();
    assert_eq!(images.len(), 3);
    assert_eq!(images[0].bytes, b"image1");
    assert_eq!(images[2].bytes, b"image3");
}

#[tokio::test]
async fn missing_image_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = GenerationRequest::from_payload(
        json!({"output_type": "text_image", "text_instructions": "x", "image_instructions": "y"}),
        None,
    )
    .expect_err("image is required");
    assert!(matches!(err, ClientError::Validation(_)));

    let request = GenerationRequest::new(
        OutputKind::Image,
        None,
        None,
        Some(String::new()),
        serde_json::Map::new(),
    );
    assert!(matches!(request, Err(ClientError::Validation(_))));
}

#[tokio::test]
async fn upstream_500_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/text_new"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "model overloaded"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 3);
    let err = client
        .run_with_retry(&text_request())
        .await
        .expect_err("500 must fail");
    match err {
        ClientError::Upstream { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "model overloaded");
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn two_timeouts_then_success_takes_three_attempts() {
    let server = MockServer::start().await;
    // Mounted first, so it answers the first two calls (too slowly).
    Mock::given(method("POST"))
        .and(path("/api/text_new"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(TEXT_RESPONSE, "application/json")
                .set_delay(Duration::from_secs(2)),
        )
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/text_new"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(TEXT_RESPONSE, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 3);
    let output = client
        .run_with_retry(&text_request())
        .await
        .expect("third attempt should succeed");
    assert_eq!(output.attempts, 3);
    assert_eq!(output.display.text_variants().len(), 3);
}

#[tokio::test]
async fn persistent_timeouts_exhaust_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/text_new"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), 3);
    let err = client
        .run_with_retry(&text_request())
        .await
        .expect_err("every attempt times out");
    match err {
        ClientError::ExhaustedRetries {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 3);
            assert!(matches!(
                *last_error,
                ClientError::Transport {
                    timed_out: true,
                    ..
                }
            ));
        }
        other => panic!("expected ExhaustedRetries, got {other:?}"),
    }
}
