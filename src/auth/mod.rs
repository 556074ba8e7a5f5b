//! Authentication core
//!
//! Account registration, login and bearer-token verification.
//!
//! # Module Structure
//!
//! - [`auth::password`](crate::auth::password) - Argon2id credential hashing
//! - [`auth::jwt`](crate::auth::jwt) - HS256 token issuance and verification
//! - [`auth::service`](crate::auth::service) - the `Authenticator` operations
//! - [`auth::extractor`](crate::auth::extractor) - Axum extractor for the verified account
//!
//! # Security Properties
//!
//! - **Password Hashing**: Argon2id with a random salt per hash; verification
//!   compares digests in constant time
//! - **Tokens**: HS256 only; tokens declaring any other algorithm are rejected
//! - **Uniform failures**: unknown user and wrong password are the same
//!   error, and every token failure is `InvalidToken`
//!
//! # Usage
//!
//! ```ignore
//! use authgate::auth::{AuthService, AuthSettings, Authenticator, SigningSecret};
//! use authgate::db::MemoryAccountStore;
//!
//! let settings = AuthSettings::new(SigningSecret::new(secret), chrono::Duration::minutes(60));
//! let service = AuthService::new(MemoryAccountStore::new(), settings)?;
//!
//! let registered = service.register("alice", "secret1").await?;
//! let account = service.verify_token(&registered.token)?;
//! ```
//!
//! ## Extracting the account in handlers
//!
//! ```ignore
//! async fn protected_handler(AuthUser(account): AuthUser) -> impl IntoResponse {
//!     format!("Hello, {}!", account.username)
//! }
//! ```

/// Typed request extractor for authenticated routes.
pub mod extractor;
/// Token codec and claims.
pub mod jwt;
/// Credential hashing.
pub mod password;
/// Authentication orchestration.
pub mod service;

pub use extractor::AuthUser;
pub use jwt::{Claims, SigningSecret, TokenCodec};
pub use password::{CredentialHasher, HashCost, HashedCredential};
pub use service::{AuthService, AuthSettings, Authenticator};
