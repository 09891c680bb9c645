//! Integration tests for `ReportClient` using wiremock HTTP mocks.

use mapdash_reports::{
    BinaryReport, ClientError, JsonReport, ReportClient, ReportPayload, ReportResponse,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PDF_BYTES: &[u8] = b"%PDF-1.7\n\x00\xff\xfe binary \x80\x81 tail\n%%EOF";

fn test_client(base_url: &str) -> ReportClient {
    ReportClient::with_base_url(base_url, "mapdash-test").expect("client construction should not fail")
}

fn payload() -> ReportPayload {
    ReportPayload::new("Salit", "Cooking Oil").with_territory("Rift Valley")
}

#[tokio::test]
async fn binary_report_is_returned_byte_exact() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/mt/executive_summary"))
        .and(body_json(json!({
            "brand": "Salit",
            "category": "Cooking Oil",
            "territory": "Rift Valley"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(PDF_BYTES.to_vec(), "application/pdf"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let response = client
        .fetch_report("mt_executive_summary", &payload())
        .await
        .expect("report should download");

    assert_eq!(response, ReportResponse::Binary(PDF_BYTES.to_vec()));
}

#[tokio::test]
async fn llm_input_is_decoded_as_json() {
    let server = MockServer::start().await;
    let body = json!({
        "output_type": "text_image",
        "text_instructions": "Write three captions",
        "image_instructions": "Market stall at dusk",
        "language": "Swahili",
        "brand": "Salit",
        "white_space_score": 42.5
    });
    Mock::given(method("POST"))
        .and(path("/api/gt/llm_input"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let response = client
        .fetch_report("gt_llm_input", &payload())
        .await
        .expect("json report");
    assert_eq!(response, ReportResponse::Json(body.clone()));

    let input = client.fetch_llm_input(&payload()).await.expect("typed llm input");
    assert_eq!(input.output_type.as_deref(), Some("text_image"));
    assert_eq!(input.language.as_deref(), Some("Swahili"));
    assert_eq!(input.product_fields["white_space_score"], 42.5);
}

#[tokio::test]
async fn unknown_report_name_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_report("mt_weekly_digest", &payload())
        .await
        .expect_err("unknown kind must fail");
    assert!(matches!(err, ClientError::Configuration(_)));
}

#[tokio::test]
async fn non_success_status_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/gt/territory_report"))
        .respond_with(ResponseTemplate::new(500).set_body_string("renderer crashed"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_binary_report(BinaryReport::GtTerritoryReport, &payload())
        .await
        .expect_err("500 must fail");
    assert_eq!(err.status(), Some(500));
    assert!(matches!(err, ClientError::Upstream { body, .. } if body == "renderer crashed"));
}

#[tokio::test]
async fn json_error_body_is_kept_whole() {
    let server = MockServer::start().await;
    let body = r#"{"error":"render failed","trace_id":"abc123","detail":"template missing"}"#;
    Mock::given(method("POST"))
        .and(path("/api/mt/executive_summary"))
        .respond_with(ResponseTemplate::new(502).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_binary_report(BinaryReport::MtExecutiveSummary, &payload())
        .await
        .expect_err("502 must fail");
    match err {
        ClientError::Upstream { status, body: got } => {
            assert_eq!(status, 502);
            assert_eq!(got, body);
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn stream_writes_every_chunk_to_sink() {
    let server = MockServer::start().await;
    let document: Vec<u8> = (0..=255u8).cycle().take(64 * 1024).collect();
    Mock::given(method("POST"))
        .and(path("/api/gt/executive_summary"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(document.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let mut sink: Vec<u8> = Vec::new();
    let written = client
        .stream_binary_report(BinaryReport::GtExecutiveSummary, &payload(), &mut sink)
        .await
        .expect("stream should complete");

    assert_eq!(written, document.len() as u64);
    assert_eq!(sink, document);
}

#[tokio::test]
async fn invalid_json_report_body_is_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/gt/llm_input"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch_json_report(JsonReport::GtLlmInput, &payload())
        .await
        .expect_err("html is not json");
    assert!(matches!(err, ClientError::Deserialize { .. }));
}
