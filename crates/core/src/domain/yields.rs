use crate::error::PredictError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One past season's harvest record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldHistoryItem {
    #[serde(default)]
    pub season: Option<String>,
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub area_ha: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropYieldRequest {
    pub crop: String,
    pub area_ha: f64,
    pub county: String,
    #[serde(default)]
    pub sub_county: Option<String>,
    #[serde(default)]
    pub history: Vec<YieldHistoryItem>,
    #[serde(default)]
    pub rainfall: Option<f64>,
    #[serde(default)]
    pub outbreak_risk: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropYieldEstimate {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
    pub unit: String,
    pub assumptions: Vec<String>,
    pub model_version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivestockKind {
    Dairy,
    Beef,
}

impl LivestockKind {
    /// Herd types are matched exactly ("Dairy", "Beef").
    pub fn parse(s: &str) -> Result<Self, PredictError> {
        match s {
            "Dairy" => Ok(Self::Dairy),
            "Beef" => Ok(Self::Beef),
            other => Err(PredictError::UnsupportedType(other.to_string())),
        }
    }
}

impl fmt::Display for LivestockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dairy => f.write_str("Dairy"),
            Self::Beef => f.write_str("Beef"),
        }
    }
}

/// A past period's herd record. Which fields matter depends on the herd type:
/// dairy reads `litres` (falling back to `quantity`) as a monthly total, beef reads
/// `headsReady` (falling back to `quantity`) and `liveweightKg`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivestockHistoryItem {
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub litres: Option<f64>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub heads_ready: Option<f64>,
    #[serde(default)]
    pub liveweight_kg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivestockYieldRequest {
    /// Kept as free text so an unknown herd type surfaces as `UnsupportedType`
    /// instead of a deserialization failure.
    #[serde(rename = "type")]
    pub kind: String,
    pub head_count: i64,
    #[serde(default)]
    pub sessions_per_day: Option<i64>,
    #[serde(default)]
    pub avg_milk_lpd: Option<f64>,
    #[serde(default)]
    pub drought_risk: Option<f64>,
    #[serde(default)]
    pub outbreak_risk: Option<f64>,
    /// An explicit `null` reads as no history.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub history: Vec<LivestockHistoryItem>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DairyEstimate {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
    pub unit: String,
    pub assumptions: Vec<String>,
    pub model_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeefEstimate {
    pub heads_ready: f64,
    pub liveweight_kg_range: [f64; 2],
    pub assumptions: Vec<String>,
    pub model_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LivestockEstimate {
    Dairy(DairyEstimate),
    Beef(BeefEstimate),
}
