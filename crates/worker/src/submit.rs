use anyhow::Context;
use greenvast_core::domain::price::{PriceSnapshot, TrainingReport};
use serde_json::json;
use std::time::Duration;

const SUBMIT_TIMEOUT_SECS: u64 = 60;

/// Sends the full batch to the API's training endpoint. Each pair present in the batch is
/// retrained from these rows alone, so callers should submit complete history.
pub async fn submit_training_rows(
    api_base_url: &str,
    rows: &[PriceSnapshot],
) -> anyhow::Result<TrainingReport> {
    anyhow::ensure!(!rows.is_empty(), "no usable snapshot rows to submit");

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(SUBMIT_TIMEOUT_SECS))
        .build()
        .context("failed to build api http client")?;

    let url = format!("{}/train/price", api_base_url.trim_end_matches('/'));
    let res = http
        .post(&url)
        .json(&json!({ "rows": rows }))
        .send()
        .await
        .with_context(|| format!("POST {url} failed"))?;

    let status = res.status();
    let text = res.text().await.context("failed to read api response")?;
    if !status.is_success() {
        anyhow::bail!("api HTTP {status}: {text}");
    }

    serde_json::from_str::<TrainingReport>(&text)
        .with_context(|| format!("api response is not a training report: {text}"))
}
