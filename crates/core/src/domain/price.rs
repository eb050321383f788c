use crate::time::dates::{de_datetime, de_opt_datetime};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

pub(crate) fn default_unit() -> String {
    "kg".to_string()
}

/// One market observation as reported by the price feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    pub commodity: String,
    pub market: String,
    #[serde(alias = "timestamp", deserialize_with = "de_datetime")]
    pub date: NaiveDateTime,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub avg_price: Option<f64>,
    #[serde(default)]
    pub median_price: Option<f64>,
}

impl PriceSnapshot {
    /// Usable price: avg, then median, then the mean of min/max (only when both are non-zero).
    /// `None` when no candidate is positive.
    pub fn usable_price(&self) -> Option<f64> {
        let min_max_mean = match (self.min_price, self.max_price) {
            (Some(lo), Some(hi)) if lo != 0.0 && hi != 0.0 => Some((lo + hi) / 2.0),
            _ => None,
        };

        [self.avg_price, self.median_price, min_max_mean]
            .into_iter()
            .flatten()
            .find(|v| *v > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDateTime,
    pub price: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainPriceRequest {
    pub rows: Vec<PriceSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePredictRequest {
    pub commodity: String,
    pub market: String,
    #[serde(default, deserialize_with = "de_opt_datetime")]
    pub date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
    pub model_version: String,
    pub pair_count: usize,
    pub trained_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePrediction {
    pub commodity: String,
    pub market: String,
    pub price: f64,
    pub low: f64,
    pub high: f64,
    pub unit: String,
    pub confidence: f64,
    pub model_version: String,
    pub trained_at: Option<DateTime<Utc>>,
    pub history_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairSummary {
    pub commodity: String,
    pub market: String,
    pub count: usize,
    pub unit: String,
    pub slope: f64,
    pub intercept: f64,
    pub rolling_median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceModelsOverview {
    pub model_version: String,
    pub trained_at: Option<DateTime<Utc>>,
    pub pairs: Vec<PairSummary>,
}
