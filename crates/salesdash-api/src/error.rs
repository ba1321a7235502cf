//! Error types for salesdash-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use salesdash_core::{CoreError, ErrorCode, ErrorDetails, ErrorSeverity};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Core(error) => match error.code() {
                ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
                ErrorCode::NotLoaded => StatusCode::NOT_FOUND,
                ErrorCode::UploadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
                ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
            ApiError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        match self {
            ApiError::Core(error) => error.to_details(),
            ApiError::Unauthorized => CoreError::Unauthorized.to_details(),
            ApiError::NotFound { .. } => ErrorDetails::new(ErrorCode::NotLoaded, self.to_string()),
            ApiError::BadRequest { .. } => ErrorDetails::new(ErrorCode::InvalidUpload, self.to_string()),
            ApiError::InternalError { .. } => ErrorDetails::new(ErrorCode::InternalError, self.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let details = self.to_details();
        match details.severity {
            ErrorSeverity::Critical | ErrorSeverity::Error => log::error!("{} ({}): {}", status, details.code, self),
            ErrorSeverity::Warning => log::warn!("Request refused with {}: {}", status, self),
            ErrorSeverity::Info => log::debug!("Request refused with {}: {}", status, self),
        }
        (status, Json(details)).into_response()
    }
}
