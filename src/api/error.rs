use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),

    #[error("{field} must be a finite number >= 0, got {value}")]
    InvalidAmount { field: String, value: f64 },

    #[error("startDate must be YYYY-MM-DD, got '{0}'")]
    InvalidDate(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson(_) | ApiError::InvalidAmount { .. } | ApiError::InvalidDate(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Io(_) | ApiError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
