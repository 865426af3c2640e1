use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, info, instrument, warn};

use super::{token::TokenConfig, types::AuthUser};
use crate::shared::{AppError, AppState};

/// Header carrying the signed token
pub const AUTH_HEADER: &str = "x-auth-token";

fn header_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTH_HEADER)
        .and_then(|header| header.to_str().ok())
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Token authentication middleware - validates the x-auth-token header and adds AuthUser to the request.
/// Usage: .route_layer(middleware::from_fn_with_state(app_state.clone(), auth::require_auth))
/// Handlers can then extract Extension(user): Extension<AuthUser>.
#[instrument(skip(state, req, next))]
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    debug!(uri = %req.uri(), "Authentication middleware triggered");

    let token = header_token(req.headers()).ok_or_else(|| {
        warn!("Missing {} header in request", AUTH_HEADER);
        AppError::Unauthorized("No token, authorization denied".to_string())
    })?;

    let claims = match state.token_config.validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("Token authentication failed: {}", e);
            return Err(AppError::Unauthorized("Token is not valid".to_string()));
        }
    };

    info!(user_id = %claims.user_id, "Authentication successful");

    req.extensions_mut().insert(AuthUser {
        user_id: claims.user_id,
    });

    Ok(next.run(req).await)
}

/// Resolves the caller for routes where the token is optional. Invalid tokens count as anonymous.
pub fn optional_identity(headers: &HeaderMap, tokens: &TokenConfig) -> Option<String> {
    let token = header_token(headers)?;
    match tokens.validate_token(token) {
        Ok(claims) => Some(claims.user_id),
        Err(e) => {
            debug!(error = %e, "Ignoring invalid optional token");
            None
        }
    }
}
