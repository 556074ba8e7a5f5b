//! Mock implementations for testing.
//!
//! Account stores that fail or stall on demand, and a canned
//! `Authenticator` for exercising the HTTP layer without hashing.

use async_trait::async_trait;
use authgate::db::{AccountStore, StoreError, StoreResult, StoredCredential};
use authgate::types::{Account, AccountId, AuthError, Authenticated};
use authgate::Authenticator;
use mockall::mock;
use std::time::Duration;

mock! {
    /// Account store with per-test expectations.
    pub Store {}

    #[async_trait]
    impl AccountStore for Store {
        async fn create_account(&self, username: &str, password_hash: &str) -> StoreResult<Account>;
        async fn find_credential_by_username(&self, username: &str) -> StoreResult<StoredCredential>;
        async fn find_account_by_id(&self, id: &AccountId) -> StoreResult<Account>;
    }
}

/// Store whose every call takes `delay` before answering `NotFound`.
pub struct SlowStore {
    pub delay: Duration,
}

#[async_trait]
impl AccountStore for SlowStore {
    async fn create_account(&self, _username: &str, _password_hash: &str) -> StoreResult<Account> {
        tokio::time::sleep(self.delay).await;
        Err(StoreError::Backend("too late".to_string()))
    }

    async fn find_credential_by_username(&self, _username: &str) -> StoreResult<StoredCredential> {
        tokio::time::sleep(self.delay).await;
        Err(StoreError::NotFound)
    }

    async fn find_account_by_id(&self, _id: &AccountId) -> StoreResult<Account> {
        tokio::time::sleep(self.delay).await;
        Err(StoreError::NotFound)
    }
}

/// `Authenticator` returning canned results.
///
/// `register` and `login` fail with `error` when set, otherwise succeed for
/// `account`. `verify_token` accepts exactly `VALID_TOKEN`.
pub struct StubAuthenticator {
    pub account: Account,
    pub error: Option<AuthError>,
}

impl StubAuthenticator {
    pub const VALID_TOKEN: &'static str = "stub-token";

    pub fn succeeding(username: &str) -> Self {
        Self {
            account: Account {
                id: AccountId::new(),
                username: username.to_string(),
            },
            error: None,
        }
    }

    pub fn failing(error: AuthError) -> Self {
        Self {
            error: Some(error),
            ..Self::succeeding("stub")
        }
    }

    fn outcome(&self) -> Result<Authenticated, AuthError> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(Authenticated {
                account: self.account.clone(),
                token: Self::VALID_TOKEN.to_string(),
            }),
        }
    }
}

#[async_trait]
impl Authenticator for StubAuthenticator {
    async fn register(&self, _username: &str, _password: &str) -> Result<Authenticated, AuthError> {
        self.outcome()
    }

    async fn login(&self, _username: &str, _password: &str) -> Result<Authenticated, AuthError> {
        self.outcome()
    }

    fn verify_token(&self, token: &str) -> Result<Account, AuthError> {
        if token == Self::VALID_TOKEN {
            Ok(self.account.clone())
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}
