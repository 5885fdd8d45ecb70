//! Mapping of pipeline outcomes and errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use trip_insight_core::{types::FailureRecord, Error};
use trip_insight_pipeline::AnalysisOutcome;

/// JSON body shared by every analysis endpoint.
#[derive(Debug, Default, Serialize)]
pub struct AnalysisResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub travel_image_analysis: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_openai_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_images_info: Option<Vec<FailureRecord>>,
    pub trace_id: String,
}

/// Status code plus body, ready to be returned from a handler.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: AnalysisResponse,
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl ApiResponse {
    /// Build the response for a finished pipeline run.
    pub fn from_outcome(outcome: AnalysisOutcome, trace_id: String) -> Self {
        let (status, body) = match outcome {
            AnalysisOutcome::NoImagesFound { scope } => (
                StatusCode::OK,
                AnalysisResponse {
                    message: Some(format!("No images found in folder '{}'.", scope)),
                    ..Default::default()
                },
            ),
            AnalysisOutcome::NothingAnalyzable { scope, failures } => (
                StatusCode::OK,
                AnalysisResponse {
                    message: Some(format!(
                        "No images could be analyzed in '{}': none were found or all failed to process.",
                        scope
                    )),
                    failed_images_info: Some(failures),
                    ..Default::default()
                },
            ),
            AnalysisOutcome::Analyzed { analysis, failures } => (
                StatusCode::OK,
                AnalysisResponse {
                    travel_image_analysis: Some(analysis.into_value()),
                    failed_images_info: Some(failures),
                    ..Default::default()
                },
            ),
            AnalysisOutcome::InferenceFailed { failures, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                AnalysisResponse {
                    error: Some(
                        "Combined image analysis failed (API call error or no response)".into(),
                    ),
                    failed_images_info: Some(failures),
                    ..Default::default()
                },
            ),
            AnalysisOutcome::UnparseableResponse { raw, failures } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                AnalysisResponse {
                    error: Some("Failed to parse the model response as JSON".into()),
                    raw_openai_response: Some(raw),
                    failed_images_info: Some(failures),
                    ..Default::default()
                },
            ),
        };

        Self {
            status,
            body: AnalysisResponse { trace_id, ..body },
        }
    }

    /// Build the response for a request that aborted.
    pub fn from_error(error: &Error, trace_id: String) -> Self {
        let status = status_for(error);
        let message = match error {
            Error::InvalidRequest(msg) => msg.clone(),
            Error::Configuration(_) | Error::StorageAccess { .. } => error.to_string(),
            Error::StorageCredentials(_) => {
                "AWS credentials are not configured. Check the environment variables or IAM role."
                    .to_string()
            }
            other => format!("Internal server error: {}", other),
        };

        Self {
            status,
            body: AnalysisResponse {
                error: Some(message),
                trace_id,
                ..Default::default()
            },
        }
    }
}

/// HTTP status for an aborting error.
pub fn status_for(error: &Error) -> StatusCode {
    if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
