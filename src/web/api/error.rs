use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::sampler::SamplerError;
use crate::tracker::TrackerError;

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound(String),
    Unavailable(String),
    Internal(String),
}

impl From<SamplerError> for ApiError {
    fn from(e: SamplerError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<TrackerError> for ApiError {
    fn from(e: TrackerError) -> Self {
        match e {
            TrackerError::NotWatched(_) => ApiError::NotFound(e.to_string()),
            TrackerError::WrongSatellite { .. } => ApiError::Validation(e.to_string()),
            TrackerError::Stopped(_) => ApiError::Unavailable(e.to_string()),
            TrackerError::InvalidConfig(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_failed", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "position_unavailable", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };
        (status, Json(ErrorResponse::with_message(error, &message))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}
