use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::planner::FlyerStatus;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote store error: {0}")]
    Remote(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,

    #[error("Planner row not found: {0}")]
    RowNotFound(String),

    #[error("A base date is required to generate recurring dates")]
    MissingBaseDate,

    #[error("Select at least one row")]
    EmptySelection,

    #[error("{0} selected row(s) have validation errors")]
    ValidationFailed(usize),

    #[error("A batch submit is already in progress")]
    SubmitInProgress,

    #[error("No created dates to update")]
    NoCreatedRows,

    #[error("Invalid flyer transition: {from:?} -> {to:?}")]
    InvalidFlyerTransition { from: FlyerStatus, to: FlyerStatus },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    InternalServerError,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::RowNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::MissingBaseDate | AppError::EmptySelection | AppError::NoCreatedRows => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::ValidationFailed(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::SubmitInProgress | AppError::InvalidFlyerTransition { .. } => {
                (StatusCode::CONFLICT, self.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Remote(msg) => {
                error!("remote store error: {}", msg);
                (StatusCode::BAD_GATEWAY, "Remote store rejected the request".to_string())
            }
            AppError::Http(e) => {
                error!("http error: {}", e);
                (StatusCode::BAD_GATEWAY, "Remote store unreachable".to_string())
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::Serialization(e) => {
                error!("serialization error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Serialization error occurred".to_string(),
                )
            }
            AppError::Config(msg) => {
                error!("configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
