use crate::api::ApiDoc;
use crate::AppState;
use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::limit::RequestBodyLimitLayer;
use utoipa::OpenApi;

/// Credentials bodies are tiny; anything larger is rejected before parsing.
const MAX_BODY_BYTES: usize = 16 * 1024;

pub fn create_router() -> Router<AppState> {
    let public_routes = Router::new()
        // Public routes (no auth required)
        .route("/register", post(crate::api::handlers::auth::register))
        .route("/login", post(crate::api::handlers::auth::login))
        .route("/health", get(crate::api::handlers::auth::health))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        );

    // Protected routes take `AuthUser`, which verifies the bearer token
    let protected_routes = Router::new().route("/me", get(crate::api::handlers::auth::me));

    public_routes
        .merge(protected_routes)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}
