//! # authgate - stateless account authentication
//!
//! Registers accounts with Argon2id-hashed passwords, authenticates logins,
//! and issues and verifies HS256 bearer tokens.
//!
//! ## Overview
//!
//! authgate can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `authgate-server` binary
//! 2. **As a library** - Embed the [`auth`] core with your own [`db::AccountStore`]
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use authgate::auth::{AuthService, AuthSettings, Authenticator, SigningSecret};
//! use authgate::db::TursoClient;
//!
//! let store = TursoClient::new_local("data/auth.db").await?;
//! let settings = AuthSettings::new(SigningSecret::new(secret), chrono::Duration::minutes(60));
//! let service = AuthService::new(store, settings)?;
//!
//! let session = service.register("alice", "secret1").await?;
//! let account = service.verify_token(&session.token)?;
//! assert_eq!(account.username, "alice");
//! ```
//!
//! ## Tokens are stateless
//!
//! Validity depends only on the signature, the pinned algorithm and the
//! expiry. There is no revocation: an account removed after a token was
//! issued stays authenticated until that token expires.
//!
//! ## Modules
//!
//! - [`auth`] - hashing, tokens, and the `Authenticator` operations
//! - [`api`] - REST API handlers and routes
//! - [`db`] - Account stores (libsql, in-memory)
//! - [`types`] - Common types and error handling
//! - [`utils`] - Configuration loading

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
#[allow(missing_docs)]
pub mod api;
/// Authentication core.
#[allow(missing_docs)]
pub mod auth;
/// Command-line interface.
pub mod cli;
/// Account stores.
pub mod db;
/// Core types (requests, responses, errors).
#[allow(missing_docs)]
pub mod types;
/// Configuration utilities.
#[allow(missing_docs)]
pub mod utils;

// Re-export commonly used types
pub use auth::{AuthService, AuthSettings, Authenticator};
pub use db::{AccountStore, MemoryAccountStore, TursoClient};
pub use types::{Account, AccountId, AppError, AuthError, Result};
pub use utils::toml_config::{AuthGateConfig, ConfigError};

use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Authentication operations
    pub auth: Arc<dyn Authenticator>,
}

/// Builds the complete HTTP application for `state`.
pub fn app(state: AppState) -> Router {
    let router = api::routes::create_router();

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/swagger-ui/openapi.json", api::ApiDoc::openapi()),
        )
    };

    router
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
