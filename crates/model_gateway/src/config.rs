use secrecy::Secret;
use std::time::Duration;

use trip_insight_core::config::DEFAULT_MAX_TOKENS;

/// Configuration for a vision-capable chat-completions model.
#[derive(Debug, Clone)]
pub struct VisionModelConfig {
    /// API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Response-length ceiling.
    pub max_tokens: u32,
    /// Bearer token.
    pub api_key: Option<Secret<String>>,
    /// Whole-request timeout. `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
}

impl Default for VisionModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            api_key: None,
            timeout: None,
        }
    }
}

impl VisionModelConfig {
    /// Config for an OpenAI model.
    pub fn openai(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Point at another OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, key: Secret<String>) -> Self {
        self.api_key = Some(key);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Chat-completions endpoint URL.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}
