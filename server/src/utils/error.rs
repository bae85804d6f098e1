use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::calendar::CalendarError;
use crate::repository::RepositoryError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => {
                AppError::NotFound(format!("Event template '{}' was not found", id))
            }
            RepositoryError::Conflict(id) => {
                AppError::Conflict(format!("Event template '{}' already exists", id))
            }
            RepositoryError::Corrupt(detail) => AppError::InternalServerError(detail),
            RepositoryError::Database(e) => AppError::DatabaseError(e),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Calendar(CalendarError::InvalidRange { .. }) => StatusCode::BAD_REQUEST,
            AppError::Calendar(CalendarError::InvalidTemplate { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::Calendar(CalendarError::InvalidRange { .. }) => "INVALID_RANGE",
            AppError::Calendar(CalendarError::InvalidTemplate { .. }) => "INVALID_TEMPLATE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::DatabaseError(e) => {
                tracing::error!(error = ?e, "Database error");
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(error = ?self, message = %msg, "Application error");
            }
            _ => {
                tracing::warn!(code = self.code(), message = %self, "Request rejected");
            }
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Calendar(CalendarError::InvalidRange { start, end }) => {
                Some(json!({ "startDate": start, "endDate": end }))
            }
            AppError::Calendar(CalendarError::InvalidTemplate { id, .. }) => {
                Some(json!({ "templateId": id }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        self.log();

        // Only expose high-level message to the client
        let public_message = match &self {
            AppError::ValidationError(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Calendar(e) => e.to_string(),
            AppError::DatabaseError(_) => "A database error occurred".to_string(),
            AppError::InternalServerError(_) => "An internal error occurred".to_string(),
        };

        error_response(code, public_message, self.details(), status)
    }
}
