use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use anireview_types::api::ErrorBody;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A create request lacked a required field. Reported without field detail.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// The JSON body did not parse. Treated like a missing field.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("bad request: {0}")]
    BadRequest(&'static str),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("store error: {0:#}")]
    Store(#[from] anyhow::Error),

    #[error("background task failed")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::MissingField(_) | ApiError::InvalidBody(_) => {
                warn!("Rejected request: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            ApiError::BadRequest(_) | ApiError::InvalidPath(_) => {
                warn!("Rejected request: {}", self);
                (StatusCode::BAD_REQUEST, "Bad Request".to_string())
            }
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Store(_) | ApiError::Internal => {
                error!("{}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// A required string field: absent or blank counts as missing.
pub(crate) fn required(value: Option<String>, field: &'static str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::MissingField(field)),
    }
}
