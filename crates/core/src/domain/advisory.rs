use crate::time::dates::de_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One forecast day. `pop` is the probability of precipitation (0-100),
/// `rain` is in millimetres and `temp_max` in degrees Celsius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEntry {
    #[serde(deserialize_with = "de_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub pop: Option<f64>,
    #[serde(default)]
    pub rain: Option<f64>,
    #[serde(default)]
    pub temp_max: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisoryRequest {
    #[serde(default)]
    pub forecast: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryAction {
    Plant,
    Wait,
    Watch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryIcon {
    Eye,
    Seedling,
    Umbrella,
}

/// Low-literacy guidance in English and Swahili.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub action: AdvisoryAction,
    pub text_en: String,
    pub text_sw: String,
    pub icon: AdvisoryIcon,
}
