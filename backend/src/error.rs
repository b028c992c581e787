//! Error handling for the AcciNex risk analytics service
//!
//! Every failure is rendered as `{ "success": false, "error", "code", "field"? }`

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::AnalyticsError;
use thiserror::Error;
use validator::ValidationErrors;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Request errors
    #[error("{0}")]
    InputMissing(String),

    #[error("{message}")]
    InputInvalid {
        field: Option<String>,
        message: String,
    },

    #[error("{0}")]
    ResourceNotFound(String),

    // Analytics errors
    #[error("Model is not fitted")]
    UnfittedModel,

    #[error("{0}")]
    EmptyInput(String),

    // External service errors
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::InputInvalid {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InputMissing(_) => "INPUT_MISSING",
            AppError::InputInvalid { .. } => "INPUT_INVALID",
            AppError::ResourceNotFound(_) => "RESOURCE_NOT_FOUND",
            AppError::UnfittedModel => "UNFITTED_MODEL",
            AppError::EmptyInput(_) => "EMPTY_INPUT",
            AppError::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) | AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Configuration(_) | AppError::Internal(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error for debugging
        tracing::error!(code = self.code(), "Error: {:?}", self);

        let field = match &self {
            AppError::InputInvalid { field, .. } => field.clone(),
            _ => None,
        };
        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: self.code(),
            field,
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<AnalyticsError> for AppError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::EmptyInput => AppError::EmptyInput(err.to_string()),
            AnalyticsError::InvalidGridSize(_) => AppError::invalid("grid_size", err.to_string()),
            AnalyticsError::MissingTimestamp(_) => AppError::InputMissing(err.to_string()),
            AnalyticsError::UnfittedModel => AppError::UnfittedModel,
            AnalyticsError::ModelIo(msg) => AppError::Internal(format!("Model storage error: {}", msg)),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let field = errors.errors().keys().min().map(|name| name.to_string());
        AppError::InputInvalid {
            field,
            message: errors.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        if message.contains("missing field") {
            AppError::InputMissing(message)
        } else {
            AppError::InputInvalid {
                field: None,
                message,
            }
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
