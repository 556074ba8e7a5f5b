use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

// ============= Account Types =============

/// Opaque, stable account identifier assigned by the account store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses the textual form produced by `Display`.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered account as seen outside the store.
///
/// Never carries credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Account {
    #[schema(value_type = String, format = Uuid)]
    pub id: AccountId,
    pub username: String,
}

/// Successful outcome of `register` or `login`.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub account: Account,
    pub token: String,
}

// ============= API Request/Response Types =============

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

impl CredentialsRequest {
    pub const MIN_USERNAME_CHARS: usize = 3;
    pub const MIN_PASSWORD_CHARS: usize = 6;

    /// Shape check applied by the transport before the core is invoked.
    pub fn is_well_formed(&self) -> bool {
        self.username.chars().count() >= Self::MIN_USERNAME_CHARS
            && self.password.chars().count() >= Self::MIN_PASSWORD_CHARS
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: Account,
    pub token: String,
}

impl From<Authenticated> for AuthResponse {
    fn from(auth: Authenticated) -> Self {
        Self {
            user: auth.account,
            token: auth.token,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub user: Account,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

// ============= Error Types =============

/// Every way an authentication operation can fail.
///
/// `InvalidCredentials` covers both an unknown username and a wrong
/// password, and `InvalidToken` covers malformed, wrong-algorithm,
/// bad-signature and expired tokens. Callers cannot tell the sub-cases apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("user already exists")]
    DuplicateUser,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token")]
    InvalidToken,

    #[error("password hashing failed: {0}")]
    HashingFailure(String),

    #[error("token signing failed: {0}")]
    SigningFailure(String),

    #[error("account store failure: {0}")]
    StoreFailure(String),
}

/// HTTP-facing error. Converts into a JSON `{"error": ...}` response.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::DuplicateUser => AppError::Conflict("user already exists".to_string()),
            AuthError::InvalidCredentials => {
                AppError::Unauthorized("invalid credentials".to_string())
            }
            AuthError::InvalidToken => AppError::Unauthorized("invalid token".to_string()),
            other @ (AuthError::HashingFailure(_)
            | AuthError::SigningFailure(_)
            | AuthError::StoreFailure(_)) => AppError::Internal(other.to_string()),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::InvalidInput(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (axum::http::StatusCode::UNAUTHORIZED, msg),
            AppError::Conflict(msg) => (axum::http::StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
