use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, instrument};

use super::{
    service::AuthService,
    types::{LoginRequest, MessageResponse, SignupRequest, TokenResponse},
};
use crate::shared::{AppError, AppJson, AppState};

/// HTTP handler for account registration
///
/// POST /auth/signup
/// Returns 201 with a confirmation message
#[instrument(name = "signup", skip(state, request))]
pub async fn signup(
    State(state): State<AppState>,
    AppJson(request): AppJson<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    info!("Signup requested");

    let service = AuthService::new(state.user_repository.clone(), state.token_config.clone());
    service.signup(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            msg: "Signup successful! You can now log in.".to_string(),
        }),
    ))
}

/// HTTP handler for login
///
/// POST /auth/login
/// Returns a signed token valid for one hour
#[instrument(name = "login", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let service = AuthService::new(state.user_repository.clone(), state.token_config.clone());
    let response = service.login(request).await?;
    Ok(Json(response))
}
