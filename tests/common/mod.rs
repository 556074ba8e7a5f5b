//! Shared fixtures for integration tests.

#![allow(dead_code)]

pub mod mocks;

use authgate::auth::{AuthService, AuthSettings, HashCost, SigningSecret};
use authgate::db::{AccountStore, MemoryAccountStore};
use std::sync::Arc;
use std::time::Duration;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Settings with a cheap Argon2 cost so the suite stays fast.
pub fn test_settings() -> AuthSettings {
    let mut settings = AuthSettings::new(
        SigningSecret::new(TEST_SECRET),
        chrono::Duration::minutes(60),
    );
    settings.hash_cost = HashCost {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    };
    settings.store_timeout = Duration::from_secs(2);
    settings
}

pub fn service_with<S: AccountStore>(store: S) -> AuthService<S> {
    AuthService::new(store, test_settings()).expect("test settings are valid")
}

/// Service over a shared in-memory store the test can also inspect.
pub fn memory_service() -> (Arc<MemoryAccountStore>, AuthService<Arc<MemoryAccountStore>>) {
    let store = Arc::new(MemoryAccountStore::new());
    let service = service_with(store.clone());
    (store, service)
}
