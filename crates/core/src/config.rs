//! Layered application configuration.
//!
//! Sources, later ones winning: built-in defaults, `config/default`,
//! `config/{TRIP_INSIGHT_ENV}`, `config/local`, `APP__SECTION__KEY`
//! environment variables, and finally the conventional cloud variables
//! (`OPENAI_API_KEY`, `AWS_S3_BUCKET`, ...).

use config::{Config, ConfigError, Environment, File};
use secrecy::Secret;
use serde::Deserialize;

/// Default timeout for ad-hoc remote image downloads.
pub const DEFAULT_REMOTE_FETCH_TIMEOUT_SECS: u64 = 10;

/// Default response-length ceiling for the analysis call.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub model: ModelConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    pub enable_tracing: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Bucket holding `{memberId}/{retripId}/` folders. Absence is reported
    /// per request, not at startup.
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub remote_fetch_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub api_key: Option<Secret<String>>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    pub json_logs: bool,
    pub metrics_enabled: bool,
}

impl AppConfig {
    /// Load configuration from files and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// Load configuration, resolving the conventional variables through
    /// `lookup` instead of the process environment.
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| lookup(name).filter(|v| !v.trim().is_empty()))
        };

        let env = var(&["TRIP_INSIGHT_ENV"]).unwrap_or_else(|| "development".into());
        let port = var(&["PORT"]).and_then(|p| p.parse::<i64>().ok());

        let s = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000_i64)?
            .set_default("server.enable_cors", true)?
            .set_default("server.enable_tracing", true)?
            .set_default(
                "storage.remote_fetch_timeout_secs",
                DEFAULT_REMOTE_FETCH_TIMEOUT_SECS as i64,
            )?
            .set_default("model.base_url", "https://api.openai.com/v1")?
            .set_default("model.model", "gpt-4o")?
            .set_default("model.max_tokens", DEFAULT_MAX_TOKENS as i64)?
            .set_default("observability.json_logs", false)?
            .set_default("observability.metrics_enabled", true)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map APP__SERVER__PORT=5000 to server.port
            .add_source(Environment::with_prefix("APP").separator("__"))
            .set_override_option("server.host", var(&["HOST"]))?
            .set_override_option("server.port", port)?
            .set_override_option("storage.bucket", var(&["AWS_S3_BUCKET", "S3_BUCKET_NAME"]))?
            .set_override_option("storage.region", var(&["AWS_REGION"]))?
            .set_override_option("storage.endpoint", var(&["AWS_ENDPOINT_URL"]))?
            .set_override_option("model.api_key", var(&["OPENAI_API_KEY"]))?
            .build()?;

        let mut cfg: Self = s.try_deserialize()?;
        // An empty bucket name from a file is as good as none.
        cfg.storage.bucket = cfg.storage.bucket.filter(|b| !b.trim().is_empty());
        Ok(cfg)
    }
}
