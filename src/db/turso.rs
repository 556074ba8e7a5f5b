use super::traits::{AccountStore, StoreError, StoreResult, StoredCredential};
use crate::types::{Account, AccountId};
use async_trait::async_trait;
use chrono::Utc;
use libsql::{Builder, Connection, Database};

/// libsql-backed account store.
///
/// A single connection is shared by all callers; for `:memory:` databases
/// every connection would otherwise see its own empty database.
pub struct TursoClient {
    _db: Database,
    conn: Connection,
}

impl TursoClient {
    /// Opens an ephemeral in-memory database.
    pub async fn new_memory() -> StoreResult<Self> {
        Self::new_local(":memory:").await
    }

    /// Opens (or creates) a local SQLite database file.
    pub async fn new_local(path: &str) -> StoreResult<Self> {
        if path != ":memory:" {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        StoreError::Backend(format!("Failed to create {}: {}", parent.display(), e))
                    })?;
                }
            }
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to open database: {}", e)))?;

        Self::from_database(db).await
    }

    /// Connects to a remote Turso database.
    #[cfg(feature = "turso")]
    pub async fn new_remote(url: String, auth_token: String) -> StoreResult<Self> {
        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to connect to Turso: {}", e)))?;

        Self::from_database(db).await
    }

    async fn from_database(db: Database) -> StoreResult<Self> {
        let conn = db
            .connect()
            .map_err(|e| StoreError::Backend(format!("Failed to get connection: {}", e)))?;

        let client = Self { _db: db, conn };
        client.initialize_schema().await?;

        Ok(client)
    }

    pub fn connection(&self) -> Connection {
        self.conn.clone()
    }

    async fn initialize_schema(&self) -> StoreResult<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    username TEXT UNIQUE NOT NULL,
                    password_hash TEXT NOT NULL,
                    created_at INTEGER NOT NULL
                )",
                (),
            )
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to create users table: {}", e)))?;

        Ok(())
    }
}

fn is_unique_violation(err: &libsql::Error) -> bool {
    // SQLITE_CONSTRAINT_UNIQUE; remote errors only carry the message.
    if let libsql::Error::SqliteFailure(code, _) = err {
        if *code == 2067 {
            return true;
        }
    }
    err.to_string().contains("UNIQUE constraint failed")
}

fn parse_account_id(raw: &str) -> StoreResult<AccountId> {
    AccountId::parse(raw)
        .ok_or_else(|| StoreError::Backend(format!("Corrupt account id in store: {}", raw)))
}

#[async_trait]
impl AccountStore for TursoClient {
    async fn create_account(&self, username: &str, password_hash: &str) -> StoreResult<Account> {
        let id = AccountId::new();
        let now = Utc::now().timestamp();

        self.conn
            .execute(
                "INSERT INTO users (id, username, password_hash, created_at)
                 VALUES (?, ?, ?, ?)",
                (id.to_string(), username, password_hash, now),
            )
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateUsername
                } else {
                    StoreError::Backend(format!("Failed to create user: {}", e))
                }
            })?;

        Ok(Account {
            id,
            username: username.to_string(),
        })
    }

    async fn find_credential_by_username(&self, username: &str) -> StoreResult<StoredCredential> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, username, password_hash FROM users WHERE username = ?",
                [username],
            )
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to query user: {}", e)))?;

        let row = rows
            .next()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .ok_or(StoreError::NotFound)?;

        let id: String = row.get(0).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(StoredCredential {
            account: Account {
                id: parse_account_id(&id)?,
                username: row.get(1).map_err(|e| StoreError::Backend(e.to_string()))?,
            },
            password_hash: row.get(2).map_err(|e| StoreError::Backend(e.to_string()))?,
        })
    }

    async fn find_account_by_id(&self, id: &AccountId) -> StoreResult<Account> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, username FROM users WHERE id = ?",
                [id.to_string()],
            )
            .await
            .map_err(|e| StoreError::Backend(format!("Failed to query user: {}", e)))?;

        let row = rows
            .next()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .ok_or(StoreError::NotFound)?;

        let raw_id: String = row.get(0).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Account {
            id: parse_account_id(&raw_id)?,
            username: row.get(1).map_err(|e| StoreError::Backend(e.to_string()))?,
        })
    }
}
