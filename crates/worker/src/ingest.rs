use anyhow::Context;
use chrono::NaiveDate;
use greenvast_core::domain::price::PriceSnapshot;
use greenvast_core::ingest::snapshots::normalise_snapshots;
use serde_json::Value;
use std::path::Path;

/// Reads raw snapshot rows from a JSON file: either a bare array or `{"rows": [...]}`.
pub fn load_snapshots_file(path: &Path) -> anyhow::Result<Vec<PriceSnapshot>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshots file {}", path.display()))?;
    let parsed: Value = serde_json::from_str(&text)
        .with_context(|| format!("snapshots file {} is not valid JSON", path.display()))?;
    raw_rows(parsed).map(|rows| normalise_snapshots(&rows))
}

fn raw_rows(parsed: Value) -> anyhow::Result<Vec<Value>> {
    match parsed {
        Value::Array(rows) => Ok(rows),
        Value::Object(mut obj) => match obj.remove("rows") {
            Some(Value::Array(rows)) => Ok(rows),
            _ => anyhow::bail!("snapshots object must contain a \"rows\" array"),
        },
        _ => anyhow::bail!("snapshots must be a JSON array or an object with \"rows\""),
    }
}

/// Keeps snapshots dated on or after `since`.
pub fn filter_since(snapshots: Vec<PriceSnapshot>, since: Option<NaiveDate>) -> Vec<PriceSnapshot> {
    match since {
        None => snapshots,
        Some(since) => snapshots
            .into_iter()
            .filter(|s| s.date.date() >= since)
            .collect(),
    }
}
