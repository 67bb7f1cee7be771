use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::GatewayError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Notification failures are deliberately absent: they never fail a request
/// and travel as warnings on the success response instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Role not found: {0}")]
    RoleNotFound(String),

    #[error("Artifact unreadable: {0}")]
    ArtifactUnreadable(String),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Machine-readable error kind, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::RoleNotFound(_) => "ROLE_NOT_FOUND",
            AppError::ArtifactUnreadable(_) => "ARTIFACT_UNREADABLE",
            AppError::Analysis(_) => "ANALYSIS_ERROR",
            AppError::Persistence(_) => "PERSISTENCE_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::RoleNotFound(_) => StatusCode::BAD_REQUEST,
            AppError::ArtifactUnreadable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Analysis(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human-readable message safe to show callers. Internal causes are
    /// logged here and replaced with a generic sentence.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::ArtifactUnreadable(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::RoleNotFound(role) => format!("Selected role '{role}' was not found"),
            AppError::Analysis(msg) => {
                tracing::error!("Analysis error: {msg}");
                "The candidate analysis service failed; please try again".to_string()
            }
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {e}");
                "The submission could not be saved".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::ArtifactUnreadable(msg) => AppError::ArtifactUnreadable(msg),
            GatewayError::InvalidInput(msg) => AppError::Validation(msg),
            GatewayError::Service(e) => AppError::Analysis(e.to_string()),
            timeout @ GatewayError::Timeout(_) => AppError::Analysis(timeout.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.public_message()
            }
        }));

        (status, body).into_response()
    }
}
