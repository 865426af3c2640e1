use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::ai;
use crate::auth::{self, require_auth};
use crate::logs::{self, upload::UPLOADS_ROUTE};
use crate::shared::AppState;
use crate::user;

/// Room for multipart boundaries and the text fields on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Builds the full HTTP surface. Routes under `protected` require `x-auth-token`.
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.uploads.max_bytes() + MULTIPART_OVERHEAD_BYTES;

    let protected = Router::new()
        .route("/user", get(user::get_user).put(user::update_user))
        .route("/logs", get(logs::list_logs).post(logs::create_log))
        .route(
            "/logs/upload-video",
            post(logs::upload_video).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/logs/:id", put(logs::update_log).delete(logs::delete_log))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let public = Router::new()
        .route("/", get(|| async { "Welcome to the LogAnything API!" }))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/ai", get(ai::ai_root))
        .route("/ai/ping", get(ai::ping))
        .route("/ai/chat", post(ai::chat));

    Router::new()
        .merge(public)
        .merge(protected)
        .nest_service(UPLOADS_ROUTE, ServeDir::new(state.uploads.dir()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_root_greeting() {
        let app = build_router(AppStateBuilder::new().build());
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Welcome to the LogAnything API!");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = build_router(AppStateBuilder::new().build());
        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_protected_routes_reject_missing_token() {
        for (method, uri) in [("GET", "/user"), ("PUT", "/user"), ("DELETE", "/logs/abc")] {
            let app = build_router(AppStateBuilder::new().build());
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let response = app.oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        }
    }
}
