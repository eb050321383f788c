use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use greenvast_core::domain::advisory::{Advisory, AdvisoryRequest};
use greenvast_core::domain::price::{
    PriceModelsOverview, PricePrediction, PricePredictRequest, TrainPriceRequest, TrainingReport,
};
use greenvast_core::domain::yields::{
    CropYieldEstimate, CropYieldRequest, LivestockEstimate, LivestockYieldRequest,
};
use greenvast_core::models::price::{PriceModelStore, SharedPriceModels};
use greenvast_core::models::{advisory, yields};
use greenvast_core::PredictError;

pub const SERVICE_NAME: &str = "greenvast-ai";

#[derive(Debug, Clone)]
pub struct AppState {
    pub models: SharedPriceModels,
    pub model_version: String,
}

impl AppState {
    pub fn new(model_version: impl Into<String>) -> Self {
        let model_version = model_version.into();
        Self {
            models: SharedPriceModels::new(PriceModelStore::new(model_version.clone())),
            model_version,
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/train/price", post(train_price))
        .route("/predict/price", post(predict_price))
        .route("/predict/yield/crop", post(predict_yield_crop))
        .route("/predict/yield/livestock", post(predict_yield_livestock))
        .route("/advisory", post(advise))
        .route(
            "/models/price",
            get(get_price_models).delete(reset_price_models),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Any origin when `origins` is empty; otherwise only the listed ones.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

#[derive(Debug)]
pub struct ApiError(PredictError);

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PredictError::Validation(_) => StatusCode::BAD_REQUEST,
            PredictError::NotFound { .. } => StatusCode::NOT_FOUND,
            PredictError::UnsupportedType(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        tracing::debug!(%status, error = %self.0, "request rejected");
        json_error(status, self.0.code(), self.0.to_string())
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "ok": true,
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn train_price(
    State(state): State<AppState>,
    Json(req): Json<TrainPriceRequest>,
) -> Result<Json<TrainingReport>, ApiError> {
    req.validate()?;
    let report = state.models.train(&req.rows).await?;
    Ok(Json(report))
}

async fn predict_price(
    State(state): State<AppState>,
    Json(req): Json<PricePredictRequest>,
) -> Result<Json<PricePrediction>, ApiError> {
    let req = req.validate_and_trim()?;
    let prediction = state
        .models
        .predict(&req.commodity, &req.market, req.date)
        .await?;
    Ok(Json(prediction))
}

async fn predict_yield_crop(
    State(state): State<AppState>,
    Json(req): Json<CropYieldRequest>,
) -> Result<Json<CropYieldEstimate>, ApiError> {
    req.validate()?;
    Ok(Json(yields::predict_crop_yield(&req, &state.model_version)))
}

async fn predict_yield_livestock(
    State(state): State<AppState>,
    Json(req): Json<LivestockYieldRequest>,
) -> Result<Json<LivestockEstimate>, ApiError> {
    let estimate = yields::predict_livestock_yield(&req, &state.model_version)?;
    Ok(Json(estimate))
}

async fn advise(Json(req): Json<AdvisoryRequest>) -> Json<Advisory> {
    Json(advisory::advise_from_forecast(&req.forecast))
}

async fn get_price_models(State(state): State<AppState>) -> Json<PriceModelsOverview> {
    Json(state.models.overview().await)
}

async fn reset_price_models(State(state): State<AppState>) -> StatusCode {
    state.models.clear().await;
    tracing::info!("price models cleared");
    StatusCode::NO_CONTENT
}
