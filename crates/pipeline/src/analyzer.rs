//! Analyzer stage: one inference call over every normalized image.

use std::sync::Arc;

use trip_insight_core::{
    template::render_instruction,
    traits::VisionClient,
    types::{AnalysisRequest, AnalysisResult, LocationHint, NormalizedImage},
    Result,
};

/// Number of characters of an unparseable reply written to the log.
const RAW_LOG_PREVIEW_CHARS: usize = 500;

/// Why the analysis produced no structured result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisFailure {
    /// The call failed or returned no text.
    InferenceFailed { detail: String },
    /// Text came back but was not JSON.
    UnparseableResponse { raw: String, detail: String },
}

/// Submits trip photos to the vision model.
pub struct Analyzer {
    client: Arc<dyn VisionClient>,
}

impl Analyzer {
    pub fn new(client: Arc<dyn VisionClient>) -> Self {
        Self { client }
    }

    /// Render the instruction and assemble the request.
    pub fn build_request(
        &self,
        images: Vec<NormalizedImage>,
        location_hint: Option<LocationHint>,
    ) -> Result<AnalysisRequest> {
        let instruction_text = render_instruction(location_hint.as_ref())?;
        Ok(AnalysisRequest {
            location_hint,
            images,
            instruction_text,
        })
    }

    /// Make the single inference call and parse its reply.
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> std::result::Result<AnalysisResult, AnalysisFailure> {
        tracing::info!(
            model = %self.client.model_name(),
            images = request.images.len(),
            "Starting trip analysis"
        );

        let raw = self.client.complete_json(request).await.map_err(|e| {
            tracing::error!(error = %e, "Inference call failed");
            AnalysisFailure::InferenceFailed {
                detail: e.to_string(),
            }
        })?;

        AnalysisResult::parse(&raw).map_err(|e| {
            let preview: String = raw.chars().take(RAW_LOG_PREVIEW_CHARS).collect();
            tracing::error!(error = %e, reply = %preview, "Model reply is not valid JSON");
            AnalysisFailure::UnparseableResponse {
                detail: e.to_string(),
                raw,
            }
        })
    }
}
