//! Inference traits.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::AnalysisRequest;

/// A hosted multimodal model.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Submit the instruction followed by every image in one user turn,
    /// asking for a JSON-formatted reply. Returns the reply text.
    ///
    /// An `Err` means no usable text came back (transport, auth, or an
    /// empty completion); parsing the text is the caller's job.
    async fn complete_json(&self, request: &AnalysisRequest) -> Result<String>;

    /// Model identifier for logs and metrics.
    fn model_name(&self) -> &str;
}
