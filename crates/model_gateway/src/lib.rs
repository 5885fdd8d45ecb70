#![deny(unused)]
//! Model gateway for Trip Insight.
//!
//! This crate provides:
//! - Vision model configuration
//! - An OpenAI-compatible chat-completions client that sends one
//!   instruction plus inline images and asks for a JSON reply

pub mod config;
pub mod openai;

pub use config::VisionModelConfig;
pub use openai::OpenAiVisionClient;

use trip_insight_core::config::ModelConfig;

/// Create a vision client from application configuration.
pub fn create_client_from_config(
    config: &ModelConfig,
) -> trip_insight_core::Result<OpenAiVisionClient> {
    let mut vision = VisionModelConfig::openai(&config.model)
        .with_base_url(&config.base_url)
        .with_max_tokens(config.max_tokens);

    if let Some(key) = &config.api_key {
        vision = vision.with_api_key(key.clone());
    } else {
        tracing::warn!("No inference API key configured; analysis calls will fail");
    }

    if let Some(secs) = config.request_timeout_secs {
        vision = vision.with_timeout(std::time::Duration::from_secs(secs));
    }

    OpenAiVisionClient::new(vision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;
    use trip_insight_core::traits::VisionClient;

    #[test]
    fn test_client_from_app_config() {
        let config = ModelConfig {
            base_url: "http://localhost:9999/v1".into(),
            model: "gpt-4o-mini".into(),
            max_tokens: 1234,
            api_key: Some(Secret::new("sk-test".into())),
            request_timeout_secs: Some(30),
        };

        let client = create_client_from_config(&config).unwrap();
        assert_eq!(client.model_name(), "gpt-4o-mini");
        assert_eq!(client.config().max_tokens, 1234);
        assert_eq!(client.config().base_url, "http://localhost:9999/v1");
        assert!(client.config().api_key.is_some());
    }
}
