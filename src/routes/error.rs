use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use thiserror::Error;
use validator::ValidationErrors;

use crate::core::EngineError;
use crate::models::ErrorResponse;

/// Errors rendered by the HTTP boundary
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    Unauthorized(String),

    #[error("caller may only swipe as themselves")]
    Forbidden,

    #[error("{0}")]
    InvalidPayload(String),

    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    fn label(&self) -> &'static str {
        match self {
            ApiError::Engine(EngineError::Validation(_)) | ApiError::Validation(_) => {
                "Validation failed"
            }
            ApiError::Engine(EngineError::NotFound(_)) => "User does not exist",
            ApiError::Engine(EngineError::Storage { .. }) => "Storage unavailable",
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::Forbidden => "Forbidden",
            ApiError::InvalidPayload(_) => "Invalid request",
            ApiError::Internal(_) => "Internal error",
        }
    }

    fn validations(&self) -> Option<ValidationErrors> {
        match self {
            ApiError::Engine(EngineError::Validation(errors)) | ApiError::Validation(errors) => {
                Some(errors.clone())
            }
            _ => None,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Engine(EngineError::Validation(_))
            | ApiError::Validation(_)
            | ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::Engine(EngineError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Engine(EngineError::Storage { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: self.label().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
            validations: self.validations(),
        })
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::InvalidPayload(format!("Invalid JSON: {}", err)).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("Query error on {}: {}", req.path(), err);
    ApiError::InvalidPayload(format!("Invalid query: {}", err)).into()
}
