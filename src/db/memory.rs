//! In-process account store.
//!
//! Used by tests and by embedders that do not need durability.

use super::traits::{AccountStore, StoreError, StoreResult, StoredCredential};
use crate::types::{Account, AccountId};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryAccountStore {
    // keyed by username
    accounts: RwLock<HashMap<String, StoredCredential>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }

    /// Administrative removal; returns whether the account existed.
    pub fn remove_account(&self, id: &AccountId) -> bool {
        let mut accounts = self.accounts.write();
        let before = accounts.len();
        accounts.retain(|_, cred| cred.account.id != *id);
        accounts.len() != before
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create_account(&self, username: &str, password_hash: &str) -> StoreResult<Account> {
        let mut accounts = self.accounts.write();
        if accounts.contains_key(username) {
            return Err(StoreError::DuplicateUsername);
        }

        let account = Account {
            id: AccountId::new(),
            username: username.to_string(),
        };
        accounts.insert(
            username.to_string(),
            StoredCredential {
                account: account.clone(),
                password_hash: password_hash.to_string(),
            },
        );

        Ok(account)
    }

    async fn find_credential_by_username(&self, username: &str) -> StoreResult<StoredCredential> {
        self.accounts
            .read()
            .get(username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_account_by_id(&self, id: &AccountId) -> StoreResult<Account> {
        self.accounts
            .read()
            .values()
            .find(|cred| cred.account.id == *id)
            .map(|cred| cred.account.clone())
            .ok_or(StoreError::NotFound)
    }
}
