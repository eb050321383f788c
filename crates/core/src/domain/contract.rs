//! Boundary validation for incoming payloads.
//!
//! The estimators assume well-formed input (positive areas and head counts, risks in
//! `[0, 1]`, ...). These checks run before a payload reaches them.

use crate::domain::price::{PricePredictRequest, TrainPriceRequest};
use crate::domain::yields::{CropYieldRequest, LivestockKind, LivestockYieldRequest};
use crate::error::PredictError;

macro_rules! ensure_valid {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err(PredictError::Validation(format!($($arg)+)));
        }
    };
}

fn ensure_unit_interval(name: &str, value: Option<f64>) -> Result<(), PredictError> {
    if let Some(v) = value {
        ensure_valid!(
            (0.0..=1.0).contains(&v),
            "{name} must be between 0 and 1 (got {v})"
        );
    }
    Ok(())
}

impl TrainPriceRequest {
    pub fn validate(&self) -> Result<(), PredictError> {
        ensure_valid!(!self.rows.is_empty(), "rows must not be empty");
        for (idx, row) in self.rows.iter().enumerate() {
            ensure_valid!(
                !row.commodity.trim().is_empty(),
                "rows[{idx}].commodity must be non-empty"
            );
            ensure_valid!(
                !row.market.trim().is_empty(),
                "rows[{idx}].market must be non-empty"
            );
        }
        Ok(())
    }
}

impl PricePredictRequest {
    pub fn validate_and_trim(self) -> Result<Self, PredictError> {
        let commodity = self.commodity.trim().to_string();
        ensure_valid!(!commodity.is_empty(), "commodity must be non-empty");

        let market = self.market.trim().to_string();
        ensure_valid!(!market.is_empty(), "market must be non-empty");

        Ok(Self {
            commodity,
            market,
            date: self.date,
        })
    }
}

impl CropYieldRequest {
    pub fn validate(&self) -> Result<(), PredictError> {
        ensure_valid!(!self.crop.trim().is_empty(), "crop must be non-empty");
        ensure_valid!(!self.county.trim().is_empty(), "county must be non-empty");
        ensure_valid!(
            self.area_ha > 0.0,
            "areaHa must be greater than 0 (got {})",
            self.area_ha
        );

        if let Some(rainfall) = self.rainfall {
            ensure_valid!(
                rainfall >= 0.0,
                "rainfall must be >= 0 (got {rainfall})"
            );
        }
        ensure_unit_interval("outbreakRisk", self.outbreak_risk)?;

        for (idx, item) in self.history.iter().enumerate() {
            ensure_valid!(
                item.quantity > 0.0,
                "history[{idx}].quantity must be greater than 0 (got {})",
                item.quantity
            );
            if let Some(area) = item.area_ha {
                ensure_valid!(
                    area > 0.0,
                    "history[{idx}].areaHa must be greater than 0 (got {area})"
                );
            }
        }

        Ok(())
    }
}

impl LivestockYieldRequest {
    /// Validates ranges and resolves the herd type.
    pub fn validate(&self) -> Result<LivestockKind, PredictError> {
        let kind = LivestockKind::parse(&self.kind)?;

        ensure_valid!(
            self.head_count > 0,
            "headCount must be greater than 0 (got {})",
            self.head_count
        );
        if let Some(sessions) = self.sessions_per_day {
            ensure_valid!(
                (1..=6).contains(&sessions),
                "sessionsPerDay must be between 1 and 6 (got {sessions})"
            );
        }
        if let Some(lpd) = self.avg_milk_lpd {
            ensure_valid!(lpd > 0.0, "avgMilkLpd must be greater than 0 (got {lpd})");
        }
        ensure_unit_interval("droughtRisk", self.drought_risk)?;
        ensure_unit_interval("outbreakRisk", self.outbreak_risk)?;

        Ok(kind)
    }
}
