pub mod domain;
pub mod error;
pub mod ingest;
pub mod models;
pub mod time;

pub use error::PredictError;

pub const DEFAULT_MODEL_VERSION: &str = "v0.1";

pub mod config {
    use anyhow::Context;

    const DEFAULT_PORT: u16 = 8000;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub port: u16,
        pub model_version: String,
        pub cors_allow_origins: Vec<String>,
        pub sentry_dsn: Option<String>,
        pub api_base_url: Option<String>,
        pub data_provider_base_url: Option<String>,
        pub data_provider_api_key: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let port = match std::env::var("PORT") {
                Ok(v) => v
                    .trim()
                    .parse::<u16>()
                    .with_context(|| format!("PORT must be a valid port number (got {v:?})"))?,
                Err(_) => DEFAULT_PORT,
            };

            let model_version = std::env::var("MODEL_VERSION")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| crate::DEFAULT_MODEL_VERSION.to_string());

            let cors_allow_origins: Vec<String> = std::env::var("CORS_ALLOW_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();

            Ok(Self {
                port,
                model_version,
                cors_allow_origins,
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                api_base_url: std::env::var("API_BASE_URL").ok(),
                data_provider_base_url: std::env::var("DATA_PROVIDER_BASE_URL").ok(),
                data_provider_api_key: std::env::var("DATA_PROVIDER_API_KEY").ok(),
            })
        }

        pub fn require_api_base_url(&self) -> anyhow::Result<&str> {
            self.api_base_url
                .as_deref()
                .context("API_BASE_URL is required")
        }

        pub fn require_data_provider_base_url(&self) -> anyhow::Result<&str> {
            self.data_provider_base_url
                .as_deref()
                .context("DATA_PROVIDER_BASE_URL is required")
        }
    }
}
