//! OpenAI-compatible vision client.
//!
//! Sends a single user turn made of one text part followed by one
//! `image_url` part per image, with `response_format = json_object`.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use trip_insight_core::{
    traits::VisionClient,
    types::AnalysisRequest,
    Error, Result,
};

use crate::config::VisionModelConfig;

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

impl<'a> ChatCompletionRequest<'a> {
    pub(crate) fn build(config: &'a VisionModelConfig, request: &'a AnalysisRequest) -> Self {
        let mut content = Vec::with_capacity(request.images.len() + 1);
        content.push(ContentPart::Text {
            text: &request.instruction_text,
        });
        content.extend(request.images.iter().map(|image| ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: &image.data_url,
            },
        }));

        Self {
            model: &config.model,
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
            max_tokens: config.max_tokens,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Chat-completions client for vision-capable models.
pub struct OpenAiVisionClient {
    config: VisionModelConfig,
    http: reqwest::Client,
}

impl OpenAiVisionClient {
    /// Create a new client with the given configuration.
    pub fn new(config: VisionModelConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &VisionModelConfig {
        &self.config
    }
}

#[async_trait]
impl VisionClient for OpenAiVisionClient {
    async fn complete_json(&self, request: &AnalysisRequest) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| Error::model_provider("OPENAI_API_KEY not set"))?;

        let body = ChatCompletionRequest::build(&self.config, request);

        tracing::info!(
            model = %self.config.model,
            images = request.images.len(),
            prompt_len = request.instruction_text.len(),
            "Requesting image analysis"
        );

        let response = self
            .http
            .post(self.config.completions_url())
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::model_provider(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::model_provider(format!(
                "API error (status {}): {}",
                status, text
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::model_provider(format!("malformed completion envelope: {}", e)))?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                model = %self.config.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Analysis token usage"
            );
        }

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::model_provider("completion contained no choices"))?;

        if choice.finish_reason.as_deref() == Some("length") {
            tracing::warn!(
                max_tokens = self.config.max_tokens,
                "Analysis reply hit the token ceiling and may be truncated"
            );
        }

        match choice.message.content {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(Error::model_provider("completion contained no text")),
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trip_insight_core::types::NormalizedImage;

    fn sample_request() -> AnalysisRequest {
        AnalysisRequest {
            location_hint: None,
            images: vec![
                NormalizedImage::from_jpeg("a.jpg", &[1, 2, 3]),
                NormalizedImage::from_jpeg("b.jpg", &[4, 5, 6]),
            ],
            instruction_text: "Describe the trip.".into(),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let config = VisionModelConfig::openai("gpt-4o");
        let request = sample_request();
        let body = serde_json::to_value(ChatCompletionRequest::build(&config, &request)).unwrap();

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["response_format"]["type"], "json_object");

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");

        let parts = messages[0]["content"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[0]["text"], "Describe the trip.");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["url"], request.images[0].data_url);
        assert_eq!(parts[2]["image_url"]["url"], request.images[1].data_url);
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let client = OpenAiVisionClient::new(
            VisionModelConfig::openai("gpt-4o").with_base_url("http://127.0.0.1:1"),
        )
        .unwrap();

        let err = client.complete_json(&sample_request()).await.unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
