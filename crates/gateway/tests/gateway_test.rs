use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::Arc;
use tower::ServiceExt;

use trip_insight_core::mocks::{ListFailure, MockObjectStore, MockVisionClient};
use trip_insight_gateway::{GatewayConfig, GatewayServer};
use trip_insight_pipeline::TripAnalysisPipeline;

const ANALYSIS: &str = r#"{"travel_analysis":{"overall_mood":"Calm harbour walks","mbti":"INFP"}}"#;

fn png(color: [u8; 3]) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb(color)));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

fn app(store: Arc<MockObjectStore>, vision: Arc<MockVisionClient>, bucket: Option<&str>) -> Router {
    let pipeline = TripAnalysisPipeline::new(store, vision).with_bucket(bucket.map(String::from));
    GatewayServer::new(GatewayConfig::default(), Arc::new(pipeline)).build_router()
}

async fn post(app: Router, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post(app, uri, body.to_string()).await
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app(
        Arc::new(MockObjectStore::new()),
        Arc::new(MockVisionClient::constant(ANALYSIS)),
        Some("photos"),
    );

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_empty_trip_folder() {
    let store = Arc::new(MockObjectStore::new());
    let vision = Arc::new(MockVisionClient::constant(ANALYSIS));

    let (status, body) = post_json(
        app(store.clone(), vision.clone(), Some("photos")),
        "/v1/analyze/trip",
        json!({"memberId": "u1", "retripId": "t1"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("u1/t1/"));
    assert!(body.get("error").is_none());
    assert!(body.get("travel_image_analysis").is_none());
    assert!(body["trace_id"].is_string());
    assert_eq!(store.list_calls(), 1);
    assert_eq!(vision.call_count(), 0);
}

#[tokio::test]
async fn test_missing_retrip_id_never_touches_storage() {
    let store = Arc::new(MockObjectStore::new());
    let vision = Arc::new(MockVisionClient::constant(ANALYSIS));

    let (status, body) = post_json(
        app(store.clone(), vision, Some("photos")),
        "/v1/analyze/trip",
        json!({"memberId": "u1"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("retripId"));
    assert_eq!(store.list_calls(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_client_error() {
    let store = Arc::new(MockObjectStore::new());

    let (status, body) = post(
        app(store.clone(), Arc::new(MockVisionClient::constant(ANALYSIS)), Some("photos")),
        "/v1/analyze/trip",
        "{\"memberId\": ",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(store.list_calls(), 0);
}

#[tokio::test]
async fn test_successful_analysis_with_nested_fields() {
    let store = Arc::new(
        MockObjectStore::new()
            .with_object("u1/t1/", Vec::<u8>::new())
            .with_object("u1/t1/harbour.png", png([10, 80, 160]))
            .with_object("u1/t1/clip.mov", b"moov".to_vec()),
    );
    let vision = Arc::new(MockVisionClient::constant(ANALYSIS));

    let (status, body) = post_json(
        app(store, vision.clone(), Some("photos")),
        "/analyze_s3_images",
        json!({
            "request": {"memberId": "u1", "mainLocationLat": 35.1, "mainLocationLng": 129.0},
            "body": {"retripId": "t1"}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["travel_image_analysis"]["travel_analysis"]["mbti"], "INFP");
    assert_eq!(body["failed_images_info"][0]["id"], "u1/t1/clip.mov");
    assert!(body.get("error").is_none());

    assert_eq!(vision.call_count(), 1);
    assert_eq!(vision.requests()[0].images.len(), 1);
}

#[tokio::test]
async fn test_all_failures_skip_inference() {
    let store = Arc::new(
        MockObjectStore::new()
            .with_object("u1/t1/notes.txt", b"hello".to_vec())
            .with_object("u1/t1/broken.jpg", b"not a jpeg".to_vec()),
    );
    let vision = Arc::new(MockVisionClient::constant(ANALYSIS));

    let (status, body) = post_json(
        app(store, vision.clone(), Some("photos")),
        "/v1/analyze/trip",
        json!({"memberId": "u1", "retripId": "t1"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("could be analyzed"));
    assert_eq!(body["failed_images_info"].as_array().unwrap().len(), 2);
    assert_eq!(vision.call_count(), 0);
}

#[tokio::test]
async fn test_non_json_model_reply() {
    let store = Arc::new(MockObjectStore::new().with_object("u1/t1/a.png", png([1, 2, 3])));
    let vision = Arc::new(MockVisionClient::constant("I think this trip was lovely."));

    let (status, body) = post_json(
        app(store, vision, Some("photos")),
        "/v1/analyze/trip",
        json!({"memberId": "u1", "retripId": "t1"}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["raw_openai_response"], "I think this trip was lovely.");
    assert!(body.get("travel_image_analysis").is_none());
    assert!(body["failed_images_info"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_inference_failure_has_no_raw_reply() {
    let store = Arc::new(MockObjectStore::new().with_object("u1/t1/a.png", png([1, 2, 3])));
    let vision = Arc::new(MockVisionClient::failing("429 Too Many Requests"));

    let (status, body) = post_json(
        app(store, vision, Some("photos")),
        "/v1/analyze/trip",
        json!({"memberId": "u1", "retripId": "t1"}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
    assert!(body.get("raw_openai_response").is_none());
}

#[tokio::test]
async fn test_missing_bucket_checked_after_input() {
    let store = Arc::new(MockObjectStore::new());
    let vision = Arc::new(MockVisionClient::constant(ANALYSIS));

    let (status, _) = post_json(
        app(store.clone(), vision.clone(), None),
        "/v1/analyze/trip",
        json!({"memberId": "u1"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post_json(
        app(store.clone(), vision, None),
        "/v1/analyze/trip",
        json!({"memberId": "u1", "retripId": "t1"}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("bucket"));
    assert_eq!(store.list_calls(), 0);
}

#[tokio::test]
async fn test_storage_errors_abort_request() {
    for (failure, needle) in [
        (ListFailure::AccessDenied, "AccessDenied"),
        (ListFailure::NoCredentials, "credentials"),
    ] {
        let store = Arc::new(
            MockObjectStore::new()
                .with_object("u1/t1/a.png", png([1, 2, 3]))
                .with_list_failure(failure),
        );
        let vision = Arc::new(MockVisionClient::constant(ANALYSIS));

        let (status, body) = post_json(
            app(store.clone(), vision.clone(), Some("photos")),
            "/v1/analyze/trip",
            json!({"memberId": "u1", "retripId": "t1"}),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains(needle));
        assert!(body.get("failed_images_info").is_none());
        assert_eq!(store.fetch_calls(), 0);
        assert_eq!(vision.call_count(), 0);
    }
}

#[tokio::test]
async fn test_url_analysis_requires_urls() {
    let (status, body) = post_json(
        app(
            Arc::new(MockObjectStore::new()),
            Arc::new(MockVisionClient::constant(ANALYSIS)),
            Some("photos"),
        ),
        "/v1/analyze/urls",
        json!({"imageUrls": []}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("imageUrls"));
}
