use crate::types::{Account, AppError};
use crate::AppState;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

/// The verified account behind a request's bearer token.
///
/// Handlers take this as an argument; the request is rejected with 401
/// before the handler runs if the token is missing or invalid.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Account);

/// Pulls the token out of `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let raw = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("missing Authorization header".to_string()))?;

    let invalid = || AppError::Unauthorized("invalid Authorization header".to_string());

    let raw = raw.to_str().map_err(|_| invalid())?;
    let (scheme, token) = raw.split_once(' ').ok_or_else(invalid)?;

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(invalid());
    }

    Ok(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;

        state
            .auth
            .verify_token(token)
            .map(AuthUser)
            .map_err(AppError::from)
    }
}
