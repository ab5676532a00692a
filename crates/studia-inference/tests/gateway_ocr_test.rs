//! OCR requests against a mock OpenAI-compatible gateway.

use studia_core::Error;
use studia_inference::openai::{GatewayConfig, OpenAIBackend};
use studia_inference::OcrBackend;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> OpenAIBackend {
    let config = GatewayConfig::default()
        .with_base_url(server.uri())
        .with_api_key("sk-test")
        .with_ocr_model("test-vision");
    OpenAIBackend::new(config).expect("Failed to create backend")
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-ocr",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_ocr_returns_completion_text_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("  Chapter 1\n\n| a | b |  ")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let text = backend_for(&server)
        .extract_text(b"%PDF-1.7 fake", "application/pdf")
        .await
        .unwrap();
    assert_eq!(text, "  Chapter 1\n\n| a | b |  ");
}

#[tokio::test]
async fn test_ocr_request_carries_data_uri_and_sampling() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-vision",
            "max_tokens": 16000,
            "stream": false,
            "messages": [
                {"role": "system"},
                {"role": "user", "content": [
                    {"type": "text"},
                    {"type": "image_url", "image_url": {"url": "data:image/png;base64,aGk="}}
                ]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("hello world")))
        .expect(1)
        .mount(&server)
        .await;

    let text = backend_for(&server)
        .extract_text(b"hi", "image/png")
        .await
        .unwrap();
    assert_eq!(text, "hello world");
}

#[tokio::test]
async fn test_rate_limit_is_distinguishable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .extract_text(b"img", "image/jpeg")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RateLimited(_)), "got {:?}", err);
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_payload_too_large() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(413).set_body_string("request entity too large"))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .extract_text(b"img", "image/webp")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::GatewayPayloadTooLarge(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_server_error_keeps_status_and_truncates_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(502).set_body_string("e".repeat(2_000)))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .extract_text(b"img", "image/png")
        .await
        .unwrap_err();
    match err {
        Error::Gateway { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body.len(), 500);
        }
        other => panic!("Expected Gateway error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_null_content_yields_empty_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        })))
        .mount(&server)
        .await;

    let text = backend_for(&server)
        .extract_text(b"img", "image/png")
        .await
        .unwrap();
    assert!(text.is_empty());
}

#[tokio::test]
async fn test_openrouter_headers_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("HTTP-Referer", "https://studia.example"))
        .and(header("X-Title", "Studia"))
        .and(header("Content-Type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok text")))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = GatewayConfig::default().with_base_url(server.uri());
    config.http_referer = Some("https://studia.example".to_string());
    config.x_title = Some("Studia".to_string());
    let backend = OpenAIBackend::new(config).unwrap();

    assert!(backend.extract_text(b"x", "image/png").await.is_ok());
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    assert!(OcrBackend::health_check(&backend).await.unwrap());
    assert_eq!(backend.model_name(), "test-vision");
}
