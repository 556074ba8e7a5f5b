//! Account persistence.
//!
//! - [`traits`] - the `AccountStore` contract and backend selection
//! - [`turso`] - libsql implementation (in-memory, local file, remote Turso)
//! - [`memory`] - lock-guarded in-process implementation

#![allow(missing_docs)]

pub mod memory;
pub mod traits;
pub mod turso;

// Re-exports
pub use memory::MemoryAccountStore;
pub use traits::{AccountStore, DatabaseProvider, StoreError, StoreResult, StoredCredential};
pub use turso::TursoClient;
