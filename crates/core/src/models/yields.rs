//! Heuristic crop and livestock output estimates.

use crate::domain::yields::{
    BeefEstimate, CropYieldEstimate, CropYieldRequest, DairyEstimate, LivestockEstimate,
    LivestockHistoryItem, LivestockKind, LivestockYieldRequest,
};
use crate::error::PredictError;
use crate::models::stats::{round_to, weighted_average};

const IDEAL_RAINFALL_MM: f64 = 750.0;
const RAINFALL_BAND_MM: f64 = 250.0;
const MIN_AREA_HA: f64 = 0.1;
const SYNTHETIC_OUTPUT: f64 = 2_000.0;

const DEFAULT_SESSIONS_PER_DAY: i64 = 2;
const DEFAULT_MILK_LPD: f64 = 8.0;
const DAYS_PER_RECORD: f64 = 30.0;

const DEFAULT_READINESS_RATE: f64 = 0.3;
const DEFAULT_LIVEWEIGHT_KG: f64 = 320.0;

/// 1.0 when rainfall is unknown; otherwise falls 0.15 per 250 mm above the 750 mm ideal
/// (and rises below it), clamped to `[0.7, 1.2]`.
pub fn rainfall_factor(rainfall_mm: Option<f64>) -> f64 {
    match rainfall_mm {
        None => 1.0,
        Some(mm) => {
            let deviation = (mm - IDEAL_RAINFALL_MM) / RAINFALL_BAND_MM;
            (1.0 - 0.15 * deviation).clamp(0.7, 1.2)
        }
    }
}

pub fn crop_risk_factor(outbreak_risk: f64) -> f64 {
    (1.0 - outbreak_risk * 0.4).max(0.6)
}

pub fn livestock_risk_factor(drought_risk: f64, outbreak_risk: f64) -> f64 {
    (1.0 - drought_risk * 0.3 - outbreak_risk * 0.3).max(0.6)
}

pub fn predict_crop_yield(req: &CropYieldRequest, model_version: &str) -> CropYieldEstimate {
    let area = req.area_ha;
    let floored_area = area.max(MIN_AREA_HA);

    let per_ha: Vec<f64> = req
        .history
        .iter()
        .map(|item| match item.area_ha {
            Some(a) if a > 0.0 => item.quantity / a,
            _ => item.quantity / floored_area,
        })
        .collect();

    let mut base_per_ha = weighted_average(&per_ha);
    if base_per_ha == 0.0 {
        base_per_ha = SYNTHETIC_OUTPUT / floored_area;
    }
    let base_output = base_per_ha * area;

    let rain = rainfall_factor(req.rainfall);
    let risk = crop_risk_factor(req.outbreak_risk.unwrap_or(0.0));

    let mid = base_output * rain * risk;

    let seasons = if req.history.is_empty() {
        "synthetic".to_string()
    } else {
        req.history.len().to_string()
    };

    let unit = req
        .history
        .first()
        .and_then(|item| item.unit.as_deref())
        .filter(|u| !u.is_empty())
        .unwrap_or("kg")
        .to_string();

    tracing::debug!(
        crop = %req.crop,
        county = %req.county,
        base_per_ha,
        rainfall_factor = rain,
        risk_factor = risk,
        "crop yield estimated"
    );

    CropYieldEstimate {
        low: round_to(mid * 0.88, 2),
        mid: round_to(mid, 2),
        high: round_to(mid * 1.12, 2),
        unit,
        assumptions: vec![
            format!("Base per-ha yield derived from {seasons} season(s)."),
            format!("Rainfall adjustment factor: {rain:.2}."),
            format!("Outbreak risk adjustment: {risk:.2}."),
        ],
        model_version: model_version.to_string(),
    }
}

/// Validates the payload, then dispatches on herd type.
pub fn predict_livestock_yield(
    req: &LivestockYieldRequest,
    model_version: &str,
) -> Result<LivestockEstimate, PredictError> {
    let kind = req.validate()?;
    let risk = livestock_risk_factor(
        req.drought_risk.unwrap_or(0.0),
        req.outbreak_risk.unwrap_or(0.0),
    );

    let estimate = match kind {
        LivestockKind::Dairy => LivestockEstimate::Dairy(estimate_dairy(req, risk, model_version)),
        LivestockKind::Beef => LivestockEstimate::Beef(estimate_beef(req, risk, model_version)),
    };

    tracing::debug!(%kind, head_count = req.head_count, risk_factor = risk, "livestock yield estimated");
    Ok(estimate)
}

// A zero reading counts as missing, so the next field is consulted.
fn first_nonzero(values: &[Option<f64>]) -> f64 {
    values
        .iter()
        .flatten()
        .copied()
        .find(|v| *v != 0.0)
        .unwrap_or(0.0)
}

fn estimate_dairy(req: &LivestockYieldRequest, risk: f64, model_version: &str) -> DairyEstimate {
    let head_count = req.head_count as f64;
    let sessions = req.sessions_per_day.unwrap_or(DEFAULT_SESSIONS_PER_DAY);

    let avg_lpd = req
        .avg_milk_lpd
        .unwrap_or_else(|| infer_milk_lpd(&req.history, head_count));

    let adjusted_daily = avg_lpd * head_count * risk;
    let per_session = adjusted_daily / sessions as f64;

    DairyEstimate {
        low: round_to(per_session * 0.9, 2),
        mid: round_to(per_session, 2),
        high: round_to(per_session * 1.1, 2),
        unit: "litres_per_session".to_string(),
        assumptions: vec![
            format!("Average milk per cow per day: {avg_lpd:.1} L."),
            format!("Sessions per day: {sessions}."),
            format!("Risk adjustment factor: {risk:.2}."),
        ],
        model_version: model_version.to_string(),
    }
}

/// Litres per cow per day from monthly totals; 8.0 when history is empty or sums to zero.
fn infer_milk_lpd(history: &[LivestockHistoryItem], head_count: f64) -> f64 {
    let total: f64 = history
        .iter()
        .map(|item| first_nonzero(&[item.litres, item.quantity]))
        .sum();
    let days = history.len().max(1) as f64 * DAYS_PER_RECORD;

    let lpd = total / days / head_count.max(1.0);
    if lpd == 0.0 {
        DEFAULT_MILK_LPD
    } else {
        lpd
    }
}

fn estimate_beef(req: &LivestockYieldRequest, risk: f64, model_version: &str) -> BeefEstimate {
    let head_count = req.head_count as f64;

    let readiness_rate = if req.history.is_empty() {
        DEFAULT_READINESS_RATE
    } else {
        let ready: Vec<f64> = req
            .history
            .iter()
            .map(|item| first_nonzero(&[item.heads_ready, item.quantity]))
            .collect();
        (weighted_average(&ready) / head_count).clamp(0.15, 0.7)
    };

    let heads_ready = head_count * readiness_rate * risk;
    let average_weight = req
        .history
        .first()
        .and_then(|item| item.liveweight_kg)
        .filter(|w| *w != 0.0)
        .unwrap_or(DEFAULT_LIVEWEIGHT_KG);
    let mid_weight = average_weight * risk;

    BeefEstimate {
        heads_ready: round_to(heads_ready, 1),
        liveweight_kg_range: [round_to(mid_weight * 0.9, 1), round_to(mid_weight * 1.1, 1)],
        assumptions: vec![
            format!("Base readiness rate: {readiness_rate:.2}."),
            format!("Risk adjustment factor: {risk:.2}."),
        ],
        model_version: model_version.to_string(),
    }
}
