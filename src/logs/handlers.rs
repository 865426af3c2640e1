use axum::{
    extract::{Multipart, Path, State},
    Extension, Json,
};
use tracing::{info, instrument};

use super::{
    service::LogService,
    types::{DeleteResponse, LogEnvelope, LogRequest, LogResponse},
    upload::read_video_upload,
};
use crate::auth::AuthUser;
use crate::shared::{AppError, AppJson, AppState};

/// HTTP handler for listing the caller's logs
///
/// GET /logs
/// Returns logs sorted newest date first
#[instrument(name = "list_logs", skip(state, user))]
pub async fn list_logs(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<LogResponse>>, AppError> {
    let service = LogService::new(state.log_repository.clone());
    let logs = service.list_logs(&user.user_id).await?;

    info!(user_id = %user.user_id, log_count = logs.len(), "Logs listed successfully");
    Ok(Json(logs))
}

/// POST /logs
#[instrument(name = "create_log", skip(state, user, request))]
pub async fn create_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(request): AppJson<LogRequest>,
) -> Result<Json<LogEnvelope>, AppError> {
    let service = LogService::new(state.log_repository.clone());
    let log = service.create_log(&user.user_id, request).await?;

    Ok(Json(LogEnvelope {
        message: "Log added!".to_string(),
        log,
    }))
}

/// HTTP handler for multipart video uploads
///
/// POST /logs/upload-video
/// Expects a `video` file field plus optional `title`, `mood`, `notes`, `date`
#[instrument(name = "upload_video", skip(state, user, multipart))]
pub async fn upload_video(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<Json<LogEnvelope>, AppError> {
    let upload = read_video_upload(multipart, &state.uploads).await?;

    let service = LogService::new(state.log_repository.clone());
    let log = service
        .create_video_log(&user.user_id, upload, &state.uploads)
        .await?;

    Ok(Json(LogEnvelope {
        message: "Video log added!".to_string(),
        log,
    }))
}

/// PUT /logs/:id
#[instrument(name = "update_log", skip(state, user, request))]
pub async fn update_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(log_id): Path<String>,
    AppJson(request): AppJson<LogRequest>,
) -> Result<Json<LogEnvelope>, AppError> {
    let service = LogService::new(state.log_repository.clone());
    let log = service.update_log(&user.user_id, &log_id, request).await?;

    Ok(Json(LogEnvelope {
        message: "Log updated!".to_string(),
        log,
    }))
}

/// DELETE /logs/:id
#[instrument(name = "delete_log", skip(state, user))]
pub async fn delete_log(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(log_id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let service = LogService::new(state.log_repository.clone());
    service.delete_log(&user.user_id, &log_id).await?;

    Ok(Json(DeleteResponse {
        message: "Log deleted!".to_string(),
    }))
}
