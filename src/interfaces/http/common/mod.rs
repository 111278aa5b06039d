//! Shared HTTP plumbing: error bodies and the validated JSON extractor

pub mod validated_json;

pub use validated_json::ValidatedJson;

use std::collections::BTreeMap;
use std::fmt::Display;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::DomainError;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";
pub const VALIDATION_ERROR_MESSAGE: &str = "Validation error.";

/// Body of every non-2xx response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

/// 400 body for rejected request payloads
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub message: String,
    /// Field name to the list of problems found in it
    pub issues: BTreeMap<String, Vec<String>>,
}

/// Error type returned by handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 401 used for every authentication failure
    pub fn not_allowed() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, DomainError::UserNotAllowed.to_string())
    }

    /// Logs `detail` and hides it from the client
    pub fn internal(detail: impl Display) -> Self {
        error!("Internal error: {}", detail);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = match &err {
            DomainError::UserAlreadyExists => StatusCode::CONFLICT,
            DomainError::InvalidCredentials => StatusCode::BAD_REQUEST,
            DomainError::UserNotFound | DomainError::ResourceNotFound => StatusCode::NOT_FOUND,
            DomainError::UserNotAllowed => StatusCode::UNAUTHORIZED,
            DomainError::Storage(_) | DomainError::Crypto(_) => return Self::internal(err),
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                message: self.message,
            }),
        )
            .into_response()
    }
}
