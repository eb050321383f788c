//! Per-(commodity, market) price baselines.
//!
//! Each pair keeps a least-squares trend over its observation index plus a rolling median of
//! the latest prices. A prediction averages the two.

use crate::domain::price::{
    PairSummary, PricePoint, PriceModelsOverview, PricePrediction, PriceSnapshot, TrainingReport,
};
use crate::error::PredictError;
use crate::models::stats::{self, LinearFit};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const ROLLING_WINDOW: usize = 3;
const MIN_TREND_POINTS: usize = 3;
const PRICE_FLOOR: f64 = 0.01;
const BAND: f64 = 0.08;

/// Case-insensitive (commodity, market) identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    pub commodity: String,
    pub market: String,
}

impl PairKey {
    pub fn new(commodity: &str, market: &str) -> Self {
        Self {
            commodity: commodity.to_lowercase(),
            market: market.to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainedPairModel {
    /// Ordered by date ascending; never empty.
    pub points: Vec<PricePoint>,
    pub trend: LinearFit,
    pub rolling_median: f64,
    pub unit: String,
}

impl TrainedPairModel {
    fn fit(mut points: Vec<PricePoint>) -> Option<Self> {
        points.sort_by(|a, b| a.date.cmp(&b.date));
        let last = points.last()?;
        let unit = last.unit.clone();
        let prices: Vec<f64> = points.iter().map(|p| p.price).collect();

        let all_equal = prices.windows(2).all(|w| w[0] == w[1]);
        let trend = if prices.len() >= MIN_TREND_POINTS && !all_equal {
            stats::fit_against_index(&prices)
        } else {
            None
        }
        .unwrap_or(LinearFit {
            slope: 0.0,
            intercept: stats::median(&prices),
        });

        let rolling_median = if prices.len() >= ROLLING_WINDOW {
            stats::median(&prices[prices.len() - ROLLING_WINDOW..])
        } else {
            last.price
        };

        Some(Self {
            points,
            trend,
            rolling_median,
            unit,
        })
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }

    fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// Observation-index position for `target`: whole days since the first point over 7,
    /// floored at 0. Without a target, the last observed index.
    fn weeks_ahead(&self, target: Option<NaiveDateTime>) -> f64 {
        match (target, self.points.first()) {
            (Some(target), Some(first)) => {
                let delta_days = (target - first.date).num_days() as f64;
                (delta_days / 7.0).max(0.0)
            }
            _ => self.count().saturating_sub(1) as f64,
        }
    }
}

/// Trained baselines for every known pair. Lives as long as its owner.
#[derive(Debug, Clone)]
pub struct PriceModelStore {
    models: BTreeMap<PairKey, TrainedPairModel>,
    version: String,
    trained_at: Option<DateTime<Utc>>,
}

impl Default for PriceModelStore {
    fn default() -> Self {
        Self::new(crate::DEFAULT_MODEL_VERSION)
    }
}

impl PriceModelStore {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            models: BTreeMap::new(),
            version: version.into(),
            trained_at: None,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn trained_at(&self) -> Option<DateTime<Utc>> {
        self.trained_at
    }

    pub fn pair_count(&self) -> usize {
        self.models.len()
    }

    pub fn get(&self, commodity: &str, market: &str) -> Option<&TrainedPairModel> {
        self.models.get(&PairKey::new(commodity, market))
    }

    pub fn clear(&mut self) {
        self.models.clear();
        self.trained_at = None;
    }

    /// Retrains every pair present in `rows`, replacing its previous baseline.
    /// Pairs absent from `rows` keep their existing model.
    pub fn train(&mut self, rows: &[PriceSnapshot]) -> Result<TrainingReport, PredictError> {
        self.train_at(rows, Utc::now())
    }

    pub fn train_at(
        &mut self,
        rows: &[PriceSnapshot],
        now: DateTime<Utc>,
    ) -> Result<TrainingReport, PredictError> {
        if rows.is_empty() {
            return Err(PredictError::validation("rows must not be empty"));
        }

        let mut grouped: BTreeMap<PairKey, Vec<PricePoint>> = BTreeMap::new();
        let mut skipped: usize = 0;
        for row in rows {
            let Some(price) = row.usable_price() else {
                skipped += 1;
                continue;
            };
            grouped
                .entry(PairKey::new(&row.commodity, &row.market))
                .or_default()
                .push(PricePoint {
                    date: row.date,
                    price,
                    unit: row.unit.clone(),
                });
        }

        let retrained = grouped.len();
        for (key, points) in grouped {
            let Some(model) = TrainedPairModel::fit(points) else {
                continue;
            };
            tracing::debug!(
                commodity = %key.commodity,
                market = %key.market,
                count = model.count(),
                slope = model.trend.slope,
                intercept = model.trend.intercept,
                rolling_median = model.rolling_median,
                "fitted price baseline"
            );
            self.models.insert(key, model);
        }

        self.trained_at = Some(now);

        tracing::info!(
            rows = rows.len(),
            skipped,
            retrained,
            pair_count = self.models.len(),
            version = %self.version,
            "price model trained"
        );

        Ok(TrainingReport {
            model_version: self.version.clone(),
            pair_count: self.models.len(),
            trained_at: now,
        })
    }

    pub fn predict(
        &self,
        commodity: &str,
        market: &str,
        target: Option<NaiveDateTime>,
    ) -> Result<PricePrediction, PredictError> {
        let Some(model) = self.get(commodity, market) else {
            tracing::debug!(%commodity, %market, "no price model for pair");
            return Err(PredictError::NotFound {
                commodity: commodity.to_string(),
                market: market.to_string(),
            });
        };

        let weeks_ahead = model.weeks_ahead(target);
        let trend_price = model.trend.intercept + model.trend.slope * weeks_ahead;
        let estimate = ((trend_price + model.rolling_median) / 2.0).max(PRICE_FLOOR);

        let count = model.count();
        let variance = stats::population_variance(&model.prices());
        let confidence = stats::round_to(
            (0.35 + count as f64 * 0.1 - variance * 0.001).min(0.9),
            2,
        )
        .max(0.2);

        Ok(PricePrediction {
            commodity: commodity.to_string(),
            market: market.to_string(),
            price: stats::round_to(estimate, 2),
            low: stats::round_to(estimate * (1.0 - BAND), 2),
            high: stats::round_to(estimate * (1.0 + BAND), 2),
            unit: model.unit.clone(),
            confidence,
            model_version: self.version.clone(),
            trained_at: self.trained_at,
            history_count: count,
        })
    }

    pub fn overview(&self) -> PriceModelsOverview {
        PriceModelsOverview {
            model_version: self.version.clone(),
            trained_at: self.trained_at,
            pairs: self.summaries(),
        }
    }

    /// One entry per trained pair, ordered by key.
    pub fn summaries(&self) -> Vec<PairSummary> {
        self.models
            .iter()
            .map(|(key, model)| PairSummary {
                commodity: key.commodity.clone(),
                market: key.market.clone(),
                count: model.count(),
                unit: model.unit.clone(),
                slope: model.trend.slope,
                intercept: model.trend.intercept,
                rolling_median: model.rolling_median,
            })
            .collect()
    }
}

/// Store handle shared between request handlers.
///
/// Training holds the write lock for the whole batch, so readers never observe a
/// partially retrained pair.
#[derive(Debug, Clone, Default)]
pub struct SharedPriceModels {
    inner: Arc<RwLock<PriceModelStore>>,
}

impl SharedPriceModels {
    pub fn new(store: PriceModelStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    pub async fn train(&self, rows: &[PriceSnapshot]) -> Result<TrainingReport, PredictError> {
        self.inner.write().await.train(rows)
    }

    pub async fn predict(
        &self,
        commodity: &str,
        market: &str,
        target: Option<NaiveDateTime>,
    ) -> Result<PricePrediction, PredictError> {
        self.inner.read().await.predict(commodity, market, target)
    }

    pub async fn overview(&self) -> PriceModelsOverview {
        self.inner.read().await.overview()
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }
}
