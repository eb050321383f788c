use thiserror::Error;

/// Failures surfaced by the estimators and the price-model store.
///
/// Numeric guards (floors, clamps) never produce an error; they substitute safe values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("no price history for commodity/market pair ({commodity}, {market})")]
    NotFound { commodity: String, market: String },

    #[error("unsupported livestock type: {0}")]
    UnsupportedType(String),
}

impl PredictError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Stable machine-readable code, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::UnsupportedType(_) => "unsupported_type",
        }
    }
}
