use crate::auth::jwt::{SigningSecret, TokenCodec};
use crate::auth::password::{CredentialHasher, HashCost, HashedCredential};
use crate::db::{AccountStore, StoreError, StoreResult};
use crate::types::{Account, AuthError, Authenticated};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// The operations the transport layer may invoke.
///
/// Each call is independent and safe to run concurrently.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Creates an account and issues its first token.
    async fn register(&self, username: &str, password: &str) -> Result<Authenticated, AuthError>;

    /// Checks credentials and issues a fresh token.
    async fn login(&self, username: &str, password: &str) -> Result<Authenticated, AuthError>;

    /// Resolves a bearer token to the account it was issued for.
    fn verify_token(&self, token: &str) -> Result<Account, AuthError>;
}

/// Everything `AuthService` needs besides a store. Fixed for its lifetime.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub secret: SigningSecret,
    pub token_ttl: chrono::Duration,
    /// Seconds a token is still accepted after expiry. Zero by default.
    pub leeway_secs: u64,
    pub hash_cost: HashCost,
    /// Upper bound on any single store call.
    pub store_timeout: Duration,
}

impl AuthSettings {
    pub fn new(secret: SigningSecret, token_ttl: chrono::Duration) -> Self {
        Self {
            secret,
            token_ttl,
            leeway_secs: 0,
            hash_cost: HashCost::default(),
            store_timeout: Duration::from_secs(3),
        }
    }
}

/// Production `Authenticator`: Argon2id credentials, HS256 tokens, and any
/// `AccountStore`.
///
/// Registration relies solely on the store's uniqueness constraint; there is
/// no existence check before the insert. Token verification never consults
/// the store, so an account removed after a token was issued stays
/// authenticatable until that token expires.
pub struct AuthService<S> {
    store: S,
    hasher: CredentialHasher,
    codec: TokenCodec,
    store_timeout: Duration,
    // Verified against when the username is unknown, so both login failures
    // cost one Argon2 run.
    dummy_hash: HashedCredential,
}

impl<S: AccountStore> AuthService<S> {
    pub fn new(store: S, settings: AuthSettings) -> Result<Self, AuthError> {
        // Reject a lifetime that cannot produce an expiry, so registration
        // never creates an account it cannot issue a token for.
        if chrono::Utc::now()
            .checked_add_signed(settings.token_ttl)
            .is_none()
        {
            return Err(AuthError::SigningFailure(format!(
                "Token lifetime {} is out of range",
                settings.token_ttl
            )));
        }

        let hasher = CredentialHasher::new(settings.hash_cost)?;
        let dummy_hash = hasher.hash("authgate-dummy-credential")?;
        let codec =
            TokenCodec::with_leeway(&settings.secret, settings.token_ttl, settings.leeway_secs);

        Ok(Self {
            store,
            hasher,
            codec,
            store_timeout: settings.store_timeout,
            dummy_hash,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn hash_password(&self, password: &str) -> Result<HashedCredential, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::HashingFailure(format!("Hashing task failed: {}", e)))?
    }

    async fn verify_password(
        &self,
        hashed: HashedCredential,
        candidate: &str,
    ) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let candidate = candidate.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify(&hashed, &candidate))
            .await
            .map_err(|e| AuthError::HashingFailure(format!("Verification task failed: {}", e)))?
    }

    async fn with_deadline<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = StoreResult<T>>,
    ) -> Result<StoreResult<T>, AuthError> {
        tokio::time::timeout(self.store_timeout, fut)
            .await
            .map_err(|_| {
                tracing::warn!(operation, timeout = ?self.store_timeout, "store call timed out");
                AuthError::StoreFailure(format!(
                    "{} timed out after {:?}",
                    operation, self.store_timeout
                ))
            })
    }
}

fn store_failure(err: StoreError) -> AuthError {
    AuthError::StoreFailure(err.to_string())
}

#[async_trait]
impl<S: AccountStore + 'static> Authenticator for AuthService<S> {
    async fn register(&self, username: &str, password: &str) -> Result<Authenticated, AuthError> {
        let hashed = self.hash_password(password).await?;

        let created = self
            .with_deadline(
                "create_account",
                self.store.create_account(username, hashed.as_str()),
            )
            .await?;

        let account = match created {
            Ok(account) => account,
            Err(StoreError::DuplicateUsername) => {
                tracing::info!(username, "registration rejected: username taken");
                return Err(AuthError::DuplicateUser);
            }
            Err(e) => {
                tracing::error!(username, error = %e, "failed to create account");
                return Err(store_failure(e));
            }
        };

        tracing::info!(username, account_id = %account.id, "account registered");

        // The account exists even if this fails; the caller can log in later.
        let token = self.codec.issue(&account).inspect_err(|e| {
            tracing::error!(account_id = %account.id, error = %e, "token issuance failed after registration");
        })?;

        Ok(Authenticated { account, token })
    }

    async fn login(&self, username: &str, password: &str) -> Result<Authenticated, AuthError> {
        let found = self
            .with_deadline(
                "find_credential_by_username",
                self.store.find_credential_by_username(username),
            )
            .await?;

        let (account, stored_hash) = match found {
            Ok(cred) => (
                Some(cred.account),
                HashedCredential::from_stored(cred.password_hash),
            ),
            Err(StoreError::NotFound) => (None, self.dummy_hash.clone()),
            Err(e) => {
                tracing::error!(username, error = %e, "credential lookup failed");
                return Err(store_failure(e));
            }
        };

        let matches = self.verify_password(stored_hash, password).await?;

        match account {
            Some(account) if matches => {
                let token = self.codec.issue(&account)?;
                tracing::info!(username, account_id = %account.id, "login succeeded");
                Ok(Authenticated { account, token })
            }
            Some(_) => {
                tracing::info!(username, "login failed: wrong password");
                Err(AuthError::InvalidCredentials)
            }
            None => {
                tracing::info!(username, "login failed: unknown user");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    fn verify_token(&self, token: &str) -> Result<Account, AuthError> {
        self.codec.verify(token).map(|claims| claims.account())
    }
}
