use std::any::Any;

use axum::{
    Json,
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::{
    config::ConfigurationError,
    dao::storage::StorageError,
    dto::{game::ErrorResponse, payload::DecodeError, validation::ValidationError},
    services::game_service::CapacityError,
};

/// Message returned when a request fails for a reason nobody anticipated.
pub const UNEXPECTED_FAILURE: &str = "An unexpected error occurred while creating the game";

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Required settings are missing; checked before the payload.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The request body is not a JSON object.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// A field is missing or has the wrong type.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Too few events for a non-randomized board.
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    /// The store rejected or failed the write.
    #[error("Failed to create game document: {0}")]
    Persistence(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// A caller-supplied game code is already taken.
    #[error("Game code `{0}` is already in use")]
    DuplicateGameCode(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict { game_code } => ServiceError::DuplicateGameCode(game_code),
            other => ServiceError::Persistence(other),
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("{0}")]
    BadRequest(String),
    /// Conflict with an existing resource.
    #[error("{0}")]
    Conflict(String),
    /// Request body over the configured limit.
    #[error("{0}")]
    PayloadTooLarge(String),
    /// Service unavailable or degraded.
    #[error("{0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::Decode(_) | ServiceError::Validation(_) | ServiceError::Capacity(_) => {
                AppError::BadRequest(message)
            }
            ServiceError::DuplicateGameCode(_) => AppError::Conflict(message),
            ServiceError::Persistence(_) | ServiceError::Degraded => {
                AppError::ServiceUnavailable(message)
            }
            ServiceError::Configuration(_) => AppError::Internal(message),
        }
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        let status = rejection.status();
        let message = rejection.body_text();
        warn!(%status, error = %message, "request body rejected");
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(message)
        } else {
            AppError::BadRequest(message)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

/// Turn a panic caught by the HTTP layer into the uniform failure body.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    error!(panic = %detail, "request handler panicked");

    AppError::Internal(UNEXPECTED_FAILURE.into()).into_response()
}
