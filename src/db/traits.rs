//! Account store abstraction
//!
//! This module provides the `AccountStore` trait that the authentication core
//! consumes, plus `DatabaseProvider` for picking a backend at startup.
//!
//! # Example
//!
//! ```rust,ignore
//! use authgate::db::{AccountStore, DatabaseProvider};
//!
//! // In-memory SQLite (default for development/testing)
//! let store = DatabaseProvider::Memory.create_store().await?;
//!
//! // File-based SQLite
//! let store = DatabaseProvider::SQLite { path: "data/auth.db".into() }.create_store().await?;
//! ```

use crate::types::{Account, AccountId};
use async_trait::async_trait;
use std::sync::Arc;

/// Errors reported by an account store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The username is already taken (uniqueness violation).
    #[error("username already exists")]
    DuplicateUsername,

    #[error("account not found")]
    NotFound,

    /// Transient persistence or connectivity problem.
    #[error("store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// An account together with its stored password hash.
#[derive(Debug, Clone)]
pub struct StoredCredential {
    pub account: Account,
    pub password_hash: String,
}

/// Durable record of accounts keyed by a unique username.
///
/// Implementations must enforce username uniqueness atomically in
/// `create_account`: of several concurrent creates for the same username at
/// most one may succeed, the rest must return `DuplicateUsername`.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Creates an account, assigning it a fresh id.
    async fn create_account(&self, username: &str, password_hash: &str) -> StoreResult<Account>;

    /// Looks up an account and its password hash by username.
    async fn find_credential_by_username(&self, username: &str) -> StoreResult<StoredCredential>;

    /// Looks up an account by id.
    async fn find_account_by_id(&self, id: &AccountId) -> StoreResult<Account>;
}

#[async_trait]
impl<T: AccountStore + ?Sized> AccountStore for Arc<T> {
    async fn create_account(&self, username: &str, password_hash: &str) -> StoreResult<Account> {
        (**self).create_account(username, password_hash).await
    }

    async fn find_credential_by_username(&self, username: &str) -> StoreResult<StoredCredential> {
        (**self).find_credential_by_username(username).await
    }

    async fn find_account_by_id(&self, id: &AccountId) -> StoreResult<Account> {
        (**self).find_account_by_id(id).await
    }
}

/// Database provider configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatabaseProvider {
    /// In-memory SQLite database (ephemeral, lost on restart)
    #[default]
    Memory,
    /// File-based SQLite database
    SQLite {
        /// Path to the SQLite database file
        path: String,
    },
    /// Remote Turso database (requires network access)
    #[cfg(feature = "turso")]
    Turso {
        /// The Turso database URL (e.g., `libsql://your-db.turso.io`)
        url: String,
        /// Authentication token for the Turso database
        auth_token: String,
    },
}

impl DatabaseProvider {
    /// Picks a provider from a database URL or path.
    ///
    /// `:memory:` (or an empty string) selects the in-memory database,
    /// anything else is treated as a file path.
    pub fn from_url(url: &str) -> Self {
        if url.is_empty() || url == ":memory:" {
            DatabaseProvider::Memory
        } else {
            DatabaseProvider::SQLite {
                path: url.to_string(),
            }
        }
    }

    /// Create an account store from this provider configuration
    pub async fn create_store(&self) -> StoreResult<Arc<dyn AccountStore>> {
        match self {
            DatabaseProvider::Memory => {
                let client = super::turso::TursoClient::new_memory().await?;
                Ok(Arc::new(client))
            }
            DatabaseProvider::SQLite { path } => {
                let client = super::turso::TursoClient::new_local(path).await?;
                Ok(Arc::new(client))
            }
            #[cfg(feature = "turso")]
            DatabaseProvider::Turso { url, auth_token } => {
                let client =
                    super::turso::TursoClient::new_remote(url.clone(), auth_token.clone()).await?;
                Ok(Arc::new(client))
            }
        }
    }
}
