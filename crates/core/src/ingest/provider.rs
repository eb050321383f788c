use crate::config::Settings;
use crate::domain::price::PriceSnapshot;
use crate::ingest::snapshots::normalise_snapshots;
use crate::ingest::types::RawSnapshotBatch;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PATH: &str = "/v1/price_snapshots";
const DEFAULT_RETRIES: u32 = 3;

#[async_trait::async_trait]
pub trait SnapshotProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Snapshots observed on or after `since` (all history when `None`).
    async fn fetch_snapshots(&self, since: Option<NaiveDate>) -> Result<Vec<PriceSnapshot>>;
}

#[derive(Debug, Clone)]
pub struct HttpJsonSnapshotProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    path: String,
    retries: u32,
}

impl HttpJsonSnapshotProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_data_provider_base_url()?.to_string();
        let api_key = settings.data_provider_api_key.clone();

        let timeout_secs = std::env::var("DATA_PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retries = std::env::var("DATA_PROVIDER_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRIES);

        let path = std::env::var("DATA_PROVIDER_SNAPSHOTS_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PATH.to_string());

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build data provider http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
            path,
            retries,
        })
    }

    fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }

    async fn fetch_once(&self, since: Option<NaiveDate>) -> Result<RawSnapshotBatch> {
        let mut req = self.http.get(self.url()).headers(self.headers()?);
        if let Some(since) = since {
            req = req.query(&[("since", since.format("%Y-%m-%d").to_string())]);
        }

        let res = req.send().await.context("data provider request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read provider response")?;

        if !status.is_success() {
            anyhow::bail!("data provider HTTP {status}: {text}");
        }

        parse_batch(&text)
    }
}

fn parse_batch(text: &str) -> Result<RawSnapshotBatch> {
    serde_json::from_str::<RawSnapshotBatch>(text)
        .with_context(|| format!("provider response is not a snapshot batch: {text}"))
}

const MAX_BACKOFF_SECS: u64 = 60;

/// Exponential backoff after the given failed attempt (1-based), capped at a minute.
fn retry_backoff(attempt: u32) -> Duration {
    let secs = 1u64
        .checked_shl(attempt.saturating_sub(1))
        .unwrap_or(u64::MAX)
        .min(MAX_BACKOFF_SECS);
    Duration::from_secs(secs)
}

#[async_trait::async_trait]
impl SnapshotProvider for HttpJsonSnapshotProvider {
    fn provider_name(&self) -> &'static str {
        "external_http_json"
    }

    async fn fetch_snapshots(&self, since: Option<NaiveDate>) -> Result<Vec<PriceSnapshot>> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(since).await {
                Ok(batch) => {
                    let snapshots = normalise_snapshots(&batch.rows);
                    tracing::info!(
                        received = batch.rows.len(),
                        kept = snapshots.len(),
                        "fetched price snapshots"
                    );
                    return Ok(snapshots);
                }
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = retry_backoff(attempt);
                    tracing::warn!(attempt, ?backoff, error = %err, "data provider fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base_url: &str, path: &str) -> HttpJsonSnapshotProvider {
        HttpJsonSnapshotProvider {
            http: reqwest::Client::new(),
            base_url: base_url.to_string(),
            api_key: None,
            path: path.to_string(),
            retries: 1,
        }
    }

    #[test]
    fn backoff_doubles_then_caps() {
        assert_eq!(retry_backoff(1), Duration::from_secs(1));
        assert_eq!(retry_backoff(2), Duration::from_secs(2));
        assert_eq!(retry_backoff(4), Duration::from_secs(8));
        assert_eq!(retry_backoff(7), Duration::from_secs(MAX_BACKOFF_SECS));
        assert_eq!(retry_backoff(65), Duration::from_secs(MAX_BACKOFF_SECS));
        assert_eq!(retry_backoff(u32::MAX), Duration::from_secs(MAX_BACKOFF_SECS));
    }

    #[test]
    fn url_joins_base_and_path() {
        assert_eq!(
            provider("https://feed.example/", "v1/price_snapshots").url(),
            "https://feed.example/v1/price_snapshots"
        );
        assert_eq!(
            provider("https://feed.example", "/prices").url(),
            "https://feed.example/prices"
        );
    }

    #[test]
    fn parses_batch_and_normalises_rows() {
        let text = r#"{"rows": [
            {"commodity": "Maize", "market": "Kericho", "date": "2024-05-06", "avgPrice": 40},
            {"commodity": "Maize", "date": "2024-05-06"}
        ]}"#;
        let batch = parse_batch(text).unwrap();
        assert_eq!(batch.rows.len(), 2);
        assert_eq!(normalise_snapshots(&batch.rows).len(), 1);
    }

    #[test]
    fn rejects_non_batch_bodies() {
        assert!(parse_batch("[1, 2, 3]").is_err());
        assert!(parse_batch("<html>").is_err());
    }
}
