use crate::{
    auth::AuthUser,
    types::{AppError, AuthResponse, CredentialsRequest, HealthResponse, Result, UserResponse},
    AppState,
};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};

fn validated(
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<CredentialsRequest> {
    let invalid = || AppError::InvalidInput("invalid payload".to_string());

    let Json(request) = payload.map_err(|e| {
        tracing::debug!(error = %e, "rejected request body");
        invalid()
    })?;

    if !request.is_well_formed() {
        return Err(invalid());
    }

    Ok(request)
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/register",
    request_body = CredentialsRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "User already exists")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let request = validated(payload)?;

    let authenticated = state
        .auth
        .register(&request.username, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(authenticated.into())))
}

/// Log in with username and password
#[utoipa::path(
    post,
    path = "/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>> {
    let request = validated(payload)?;

    let authenticated = state
        .auth
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(authenticated.into()))
}

/// The account behind the presented bearer token
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Authenticated account", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn me(AuthUser(account): AuthUser) -> Json<UserResponse> {
    Json(UserResponse { user: account })
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "health"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
