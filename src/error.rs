//! Custom error types and handling
//!
//! This module defines the application's error types and implements
//! conversion to HTTP responses for the Axum framework.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::judge::grader::ValidationReport;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Resource errors
    #[error("Not found: {0}")]
    NotFound(String),

    // Persistence errors
    #[error("Submission could not be saved: {reason}")]
    PersistenceFailed {
        reason: String,
        report: Box<ValidationReport>,
    },

    #[error("Database error: {0}")]
    Database(String),

    // External service errors
    #[error("Docker error: {0}")]
    Docker(String),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in response
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::PersistenceFailed { .. } => "PERSISTENCE_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Docker(_) => "DOCKER_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PersistenceFailed { .. }
            | Self::Database(_)
            | Self::Docker(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Extra payload rendered under `error.details`
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::PersistenceFailed { report, .. } => {
                let mut details = serde_json::to_value(report.as_ref()).ok()?;
                if let Some(object) = details.as_object_mut() {
                    object.insert("submitted".to_string(), serde_json::Value::Bool(false));
                }
                Some(details)
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log internal errors but don't expose details to clients
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                "An internal error occurred".to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "A database error occurred".to_string()
            }
            AppError::PersistenceFailed { reason, .. } => {
                tracing::error!(reason = %reason, "Submission persistence failed");
                "Submission could not be saved".to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code: self.error_code().to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// Implement From for common error types
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<bollard::errors::Error> for AppError {
    fn from(err: bollard::errors::Error) -> Self {
        AppError::Docker(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::grader::HiddenSummary;
    use crate::models::SubmissionStatus;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("problem".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Docker("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_persistence_failure_carries_report() {
        let report = ValidationReport {
            status: SubmissionStatus::Passed,
            total: 1,
            passed: 1,
            output: "30".to_string(),
            test_results: Vec::new(),
            hidden_summary: HiddenSummary {
                total_hidden: 1,
                passed_hidden: 1,
            },
        };
        let err = AppError::PersistenceFailed {
            reason: "connection reset".to_string(),
            report: Box::new(report),
        };

        assert_eq!(err.error_code(), "PERSISTENCE_ERROR");
        let details = err.details().unwrap();
        assert_eq!(details["submitted"], serde_json::Value::Bool(false));
        assert_eq!(details["status"], "Passed");
        assert_eq!(details["hiddenSummary"]["totalHidden"], 1);
    }
}
