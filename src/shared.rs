use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::ai::GenerativeBackend;
use crate::auth::TokenConfig;
use crate::logs::repository::LogRepository;
use crate::logs::upload::UploadStore;
use crate::user::repository::UserRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub log_repository: Arc<dyn LogRepository + Send + Sync>,
    pub token_config: TokenConfig,
    pub uploads: UploadStore,
    /// None when no AI credentials are configured
    pub ai_backend: Option<Arc<dyn GenerativeBackend + Send + Sync>>,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        log_repository: Arc<dyn LogRepository + Send + Sync>,
        token_config: TokenConfig,
        uploads: UploadStore,
        ai_backend: Option<Arc<dyn GenerativeBackend + Send + Sync>>,
    ) -> Self {
        Self {
            user_repository,
            log_repository,
            token_config,
            uploads,
            ai_backend,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Upstream error: {message}")]
    Upstream {
        message: String,
        details: Option<Value>,
    },

    #[error("Internal server error")]
    Internal,
}

/// JSON body extractor whose rejections (bad syntax, wrong field types,
/// missing content type) render as a 400 `{error}` body like every other failure
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match self {
            AppError::JwtError(_) => (
                StatusCode::UNAUTHORIZED,
                "Token is not valid".to_string(),
                None,
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            AppError::BadRequest(msg) | AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, msg, None)
            }
            AppError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                "Invalid credentials".to_string(),
                None,
            ),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg, None),
            AppError::Upstream { message, details } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, details)
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                None,
            ),
        };

        let body = match details {
            Some(details) => json!({ "error": error_message, "details": details }),
            None => json!({ "error": error_message }),
        };

        (status, Json(body)).into_response()
    }
}
