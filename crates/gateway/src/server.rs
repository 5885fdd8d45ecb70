//! Axum-based HTTP server for the analysis endpoints.

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use trip_insight_core::{config::ServerConfig, Error, Result};
use trip_insight_observability::{track_analysis, track_request};
use trip_insight_pipeline::{AnalysisOutcome, TripAnalysisPipeline};

use crate::extract;
use crate::response::ApiResponse;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Enable CORS.
    pub enable_cors: bool,
    /// Enable request tracing.
    pub enable_tracing: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            enable_cors: true,
            enable_tracing: true,
        }
    }
}

impl From<&ServerConfig> for GatewayConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            enable_cors: config.enable_cors,
            enable_tracing: config.enable_tracing,
        }
    }
}

/// Shared application state.
pub struct AppState {
    pub pipeline: Arc<TripAnalysisPipeline>,
}

/// Gateway server.
pub struct GatewayServer {
    config: GatewayConfig,
    state: Arc<AppState>,
    metrics_handle: Option<PrometheusHandle>,
}

impl GatewayServer {
    /// Create a new gateway server.
    pub fn new(config: GatewayConfig, pipeline: Arc<TripAnalysisPipeline>) -> Self {
        Self {
            config,
            state: Arc::new(AppState { pipeline }),
            metrics_handle: None,
        }
    }

    /// Set metrics handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    /// Build the Axum router.
    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/health", get(health_handler))
            .route("/v1/analyze/trip", post(analyze_trip_handler))
            .route("/analyze_s3_images", post(analyze_trip_handler))
            .route("/v1/analyze/urls", post(analyze_urls_handler))
            .with_state(self.state.clone());

        if let Some(handle) = &self.metrics_handle {
            let handle = handle.clone();
            router = router.route("/metrics", get(move || async move { handle.render() }));
        }

        router = router
            .layer(middleware::from_fn(track_http))
            .layer(CatchPanicLayer::custom(panic_response));

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(AnyOrigin)
                    .allow_methods(AnyOrigin)
                    .allow_headers(AnyOrigin),
            );
        }

        if self.config.enable_tracing {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Run the server.
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::internal(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!(addr = %addr, "Gateway server starting");

        axum::serve(listener, self.build_router())
            .await
            .map_err(|e| Error::internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// =============================================================================
// Handlers
// =============================================================================

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Analyze the photos stored under `{memberId}/{retripId}/`.
async fn analyze_trip_handler(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResponse {
    let trace_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("analyze_trip", trace_id = %trace_id);

    let work = async move {
        let body = extract::parse_body(&body)?;
        let request = extract::parse_trip_request(&body)?;
        tracing::info!(
            member_id = %request.member_id,
            retrip_id = %request.retrip_id,
            has_location = request.location.is_some(),
            "Processing trip analysis request"
        );
        state.pipeline.run_trip(&request).await
    };

    respond("trip", trace_id, work).instrument(span).await
}

/// Analyze photos downloaded from caller-supplied URLs.
async fn analyze_urls_handler(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResponse {
    let trace_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("analyze_urls", trace_id = %trace_id);

    let work = async move {
        let body = extract::parse_body(&body)?;
        let request = extract::parse_remote_request(&body)?;
        tracing::info!(urls = request.urls.len(), "Processing remote image analysis request");
        state.pipeline.run_urls(&request).await
    };

    respond("urls", trace_id, work).instrument(span).await
}

/// Await the pipeline, log and count the result, and render it.
async fn respond<F>(route: &'static str, trace_id: String, work: F) -> ApiResponse
where
    F: Future<Output = Result<AnalysisOutcome>>,
{
    let started = Instant::now();

    let (response, label) = match work.await {
        Ok(outcome) => {
            let label = outcome.label();
            tracing::info!(outcome = label, "Analysis request finished");
            (ApiResponse::from_outcome(outcome, trace_id), label)
        }
        Err(e) if e.is_client_error() => {
            tracing::info!(error = %e, "Rejected analysis request");
            (ApiResponse::from_error(&e, trace_id), "invalid_request")
        }
        Err(e) => {
            tracing::error!(error = %e, "Analysis request failed");
            (ApiResponse::from_error(&e, trace_id), "error")
        }
    };

    track_analysis(route, label, started.elapsed().as_secs_f64());
    response
}

/// Label for the `path` metric. Only routed paths are used, so unknown URLs
/// share a single series.
fn metric_path(request: &Request) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_PATH.to_string())
}

const UNMATCHED_PATH: &str = "unmatched";

async fn track_http(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = metric_path(&request);
    let started = Instant::now();

    let response = next.run(request).await;

    track_request(
        &method,
        &path,
        response.status().as_u16(),
        started.elapsed().as_secs_f64(),
    );
    response
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };

    tracing::error!(panic = %detail, "Request handler panicked");
    ApiResponse::from_error(&Error::internal(detail), Uuid::new_v4().to_string()).into_response()
}
