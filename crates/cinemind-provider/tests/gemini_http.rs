use cinemind_provider::{CompletionProvider, CompletionRequest, GeminiClient, ProviderError};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gemini_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{"text": text}]
            },
            "finishReason": "STOP"
        }],
        "usageMetadata": {
            "promptTokenCount": 42,
            "candidatesTokenCount": 7
        }
    })
}

fn request() -> CompletionRequest {
    CompletionRequest {
        model: "gemini-2.5-flash".into(),
        system: Some("You are a film expert".into()),
        prompt: "Recommend a movie".into(),
        temperature: Some(0.6),
        max_output_tokens: None,
        response_schema: Some(serde_json::json!({"type": "OBJECT"})),
    }
}

#[tokio::test]
async fn complete_posts_generate_content_with_key_and_json_config() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "generationConfig": {
                "temperature": 0.6,
                "responseMimeType": "application/json"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body("{\"ok\":true}")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new("test-key").with_base_url(server.uri());
    let completion = client.complete(request()).await.unwrap();

    assert_eq!(completion.text, "{\"ok\":true}");
    assert_eq!(completion.input_tokens, Some(42));
    assert_eq!(completion.output_tokens, Some(7));
    assert_eq!(completion.finish_reason.as_deref(), Some("stop"));
}

#[tokio::test]
async fn complete_surfaces_api_errors_with_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
            "error": { "code": 503, "message": "The model is overloaded." }
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::new("test-key").with_base_url(server.uri());
    let err = client.complete(request()).await.unwrap_err();

    match err {
        ProviderError::Api {
            status,
            message,
            retryable,
        } => {
            assert_eq!(status, 503);
            assert!(retryable);
            assert!(message.contains("overloaded"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn complete_with_no_candidates_resolves_to_empty_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let client = GeminiClient::new("test-key").with_base_url(server.uri());
    let completion = client.complete(request()).await.unwrap();

    assert!(completion.text.is_empty());
}
