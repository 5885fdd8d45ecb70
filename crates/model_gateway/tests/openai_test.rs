use axum::{
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use secrecy::Secret;
use serde_json::{json, Value};
use trip_insight_core::{
    traits::VisionClient,
    types::{AnalysisRequest, NormalizedImage},
};
use trip_insight_model_gateway::{OpenAiVisionClient, VisionModelConfig};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

fn client(base_url: &str) -> OpenAiVisionClient {
    OpenAiVisionClient::new(
        VisionModelConfig::openai("gpt-4o")
            .with_base_url(base_url)
            .with_api_key(Secret::new("sk-test".to_string())),
    )
    .unwrap()
}

fn request() -> AnalysisRequest {
    AnalysisRequest {
        location_hint: None,
        images: vec![NormalizedImage::from_jpeg("u1/t1/a.jpg", &[0xFF, 0xD8])],
        instruction_text: "Analyze.".into(),
    }
}

#[tokio::test]
async fn test_returns_message_content() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(headers["authorization"], "Bearer sk-test");
            assert_eq!(body["response_format"]["type"], "json_object");
            assert_eq!(body["messages"][0]["content"][1]["type"], "image_url");
            Json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "{\"travel_analysis\":{}}"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 900, "completion_tokens": 120, "total_tokens": 1020}
            }))
        }),
    );
    let base = serve(app).await;

    let text = client(&base).complete_json(&request()).await.unwrap();
    assert_eq!(text, "{\"travel_analysis\":{}}");
}

#[tokio::test]
async fn test_api_error_is_model_provider_error() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": {"message": "Incorrect API key provided"}})),
            )
        }),
    );
    let base = serve(app).await;

    let err = client(&base).complete_json(&request()).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("401"), "{}", msg);
    assert!(msg.contains("Incorrect API key"), "{}", msg);
}

#[tokio::test]
async fn test_empty_content_is_an_error() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            Json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": null},
                    "finish_reason": "stop"
                }]
            }))
        }),
    );
    let base = serve(app).await;

    let err = client(&base).complete_json(&request()).await.unwrap_err();
    assert!(err.to_string().contains("no text"));
}

#[tokio::test]
async fn test_non_json_content_is_passed_through() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            Json(json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "I cannot help with that."},
                    "finish_reason": "stop"
                }]
            }))
        }),
    );
    let base = serve(app).await;

    let text = client(&base).complete_json(&request()).await.unwrap();
    assert_eq!(text, "I cannot help with that.");
}
