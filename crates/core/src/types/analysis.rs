use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use super::image::NormalizedImage;
use crate::error::{Error, Result};

/// Approximate centroid of the trip, substituted into the instruction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationHint {
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationHint {
    /// Validate and build a hint.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::invalid_request(format!(
                "mainLocationLat must be between -90 and 90, got {}",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::invalid_request(format!(
                "mainLocationLng must be between -180 and 180, got {}",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Everything the analyzer sends in its single inference call.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub location_hint: Option<LocationHint>,
    /// In storage-listing order.
    pub images: Vec<NormalizedImage>,
    pub instruction_text: String,
}

/// The model's structured answer, relayed without schema validation.
///
/// Field names such as `overall_mood` or `top5_subjects` are a convention
/// between the prompt and downstream consumers; callers that want a typed
/// view can use [`AnalysisResult::decode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(Value);

impl AnalysisResult {
    /// Parse the raw model reply. Anything that is valid JSON is accepted.
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(Self(serde_json::from_str(raw)?))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Optional strict decoding into a caller-defined schema.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.0)?)
    }
}
