use axum::{extract::State, Extension, Json};
use tracing::{info, instrument};

use super::{
    service::UserService,
    types::{UpdateProfileRequest, UserProfile},
};
use crate::auth::AuthUser;
use crate::shared::{AppError, AppJson, AppState};

/// HTTP handler for reading the caller's profile
///
/// GET /user
#[instrument(name = "get_user", skip(state, user))]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>, AppError> {
    let service = UserService::new(state.user_repository.clone());
    let profile = service.get_profile(&user.user_id).await?;
    Ok(Json(profile))
}

/// HTTP handler for updating first/last name
///
/// PUT /user
#[instrument(name = "update_user", skip(state, user, request))]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    AppJson(request): AppJson<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    info!(user_id = %user.user_id, "Updating profile");

    let service = UserService::new(state.user_repository.clone());
    let profile = service.update_profile(&user.user_id, request).await?;
    Ok(Json(profile))
}
