//! TOML-based configuration for authgate
//!
//! Settings are read once at startup from a TOML file (`authgate.toml` by
//! default) and never change afterwards. Every section has defaults, so the
//! file itself is optional. Secrets are never stored in the file: it names
//! the environment variable that holds them.
//!
//! A handful of plain environment variables override file values for
//! container deployments: `PORT`, `TOKEN_TTL_MIN`, `SHUTDOWN_TIMEOUT_SEC` and
//! `DB_DSN`.

use crate::auth::{AuthSettings, CredentialHasher, HashCost, SigningSecret};
use crate::db::DatabaseProvider;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Secrets shorter than this are accepted with a warning.
pub const RECOMMENDED_SECRET_BYTES: usize = 32;

/// Longest accepted token lifetime (one year).
pub const MAX_TOKEN_TTL_MINUTES: i64 = 365 * 24 * 60;

/// Root configuration structure loaded from authgate.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthGateConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub hashing: HashCost,
    #[serde(default)]
    pub database: DatabaseConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Grace period for in-flight requests after a shutdown signal
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,

    /// Deadline for each account store call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_shutdown_timeout_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    3
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// ============= Authentication Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable name containing the JWT signing secret
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,

    /// Clock-skew allowance past token expiry. Zero means none.
    #[serde(default)]
    pub leeway_secs: u64,
}

fn default_jwt_secret_env() -> String {
    "JWT_SECRET".to_string()
}

fn default_token_ttl_minutes() -> i64 {
    60
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret_env: default_jwt_secret_env(),
            token_ttl_minutes: default_token_ttl_minutes(),
            leeway_secs: 0,
        }
    }
}

// ============= Database Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Local database path, or `:memory:`
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Environment variable for Turso URL (optional cloud config)
    pub turso_url_env: Option<String>,

    /// Environment variable for Turso auth token
    pub turso_token_env: Option<String>,
}

fn default_database_url() -> String {
    "./data/authgate.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            turso_url_env: None,
            turso_token_env: None,
        }
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {0}: {1}")]
    ReadError(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn positive<T>(name: &str, raw: &str) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Some(value),
        _ => {
            warn!(variable = name, value = raw, "ignoring invalid override");
            None
        }
    }
}

impl AuthGateConfig {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist. Environment overrides are applied and the result
    /// validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let content =
                fs::read_to_string(path).map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;
            info!(path = %path.display(), "loaded configuration file");
            Self::from_toml(&content)?
        } else {
            warn!(path = %path.display(), "configuration file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML text without touching the environment.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `PORT`, `TOKEN_TTL_MIN`, `SHUTDOWN_TIMEOUT_SEC` and `DB_DSN`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(env_lookup);
    }

    /// Same as [`apply_env_overrides`](Self::apply_env_overrides) with an
    /// explicit variable source. Non-positive or unparseable numbers are
    /// ignored with a warning.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").and_then(|raw| positive::<u16>("PORT", &raw)) {
            self.server.port = port;
        }
        if let Some(ttl) =
            lookup("TOKEN_TTL_MIN").and_then(|raw| positive::<i64>("TOKEN_TTL_MIN", &raw))
        {
            self.auth.token_ttl_minutes = ttl;
        }
        if let Some(secs) = lookup("SHUTDOWN_TIMEOUT_SEC")
            .and_then(|raw| positive::<u64>("SHUTDOWN_TIMEOUT_SEC", &raw))
        {
            self.server.shutdown_timeout_secs = secs;
        }
        if let Some(dsn) = lookup("DB_DSN").filter(|dsn| !dsn.trim().is_empty()) {
            self.database.url = dsn;
        }
    }

    /// Validate the configuration against the process environment
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_with(env_lookup)
    }

    /// Validate using an explicit variable source
    pub fn validate_with<F>(&self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = self.jwt_secret_with(&lookup)?;
        if secret.len() < RECOMMENDED_SECRET_BYTES {
            warn!(
                bytes = secret.len(),
                recommended = RECOMMENDED_SECRET_BYTES,
                "JWT secret is shorter than recommended"
            );
        }

        self.token_ttl()?;
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "server.request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.server.shutdown_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "server.shutdown_timeout_secs must be positive".to_string(),
            ));
        }

        CredentialHasher::new(self.hashing)
            .map_err(|e| ConfigError::ValidationError(format!("hashing: {}", e)))?;

        if let Some(ref env) = self.database.turso_url_env {
            lookup(env).ok_or_else(|| ConfigError::MissingEnvVar(env.clone()))?;
        }
        if let Some(ref env) = self.database.turso_token_env {
            lookup(env).ok_or_else(|| ConfigError::MissingEnvVar(env.clone()))?;
        }

        Ok(())
    }

    /// Get the JWT secret from the environment
    pub fn jwt_secret(&self) -> Result<SigningSecret, ConfigError> {
        self.jwt_secret_with(env_lookup)
    }

    fn jwt_secret_with<F>(&self, lookup: F) -> Result<SigningSecret, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(&self.auth.jwt_secret_env)
            .map(SigningSecret::new)
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(self.auth.jwt_secret_env.clone()))
    }

    /// Token lifetime, bounded to `1..=MAX_TOKEN_TTL_MINUTES` minutes
    pub fn token_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        let minutes = self.auth.token_ttl_minutes;
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes) {
            return Err(ConfigError::ValidationError(format!(
                "auth.token_ttl_minutes must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_MINUTES, minutes
            )));
        }

        chrono::Duration::try_minutes(minutes).ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "auth.token_ttl_minutes out of range: {}",
                minutes
            ))
        })
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }

    /// Settings for `AuthService`, with the secret resolved from the environment
    pub fn auth_settings(&self) -> Result<AuthSettings, ConfigError> {
        let mut settings = AuthSettings::new(self.jwt_secret()?, self.token_ttl()?);
        settings.leeway_secs = self.auth.leeway_secs;
        settings.hash_cost = self.hashing;
        settings.store_timeout = Duration::from_secs(self.server.request_timeout_secs);
        Ok(settings)
    }

    /// Which account store backend to open
    pub fn database_provider(&self) -> DatabaseProvider {
        #[cfg(feature = "turso")]
        {
            if let (Some(url_env), Some(token_env)) =
                (&self.database.turso_url_env, &self.database.turso_token_env)
            {
                if let (Some(url), Some(auth_token)) = (env_lookup(url_env), env_lookup(token_env)) {
                    return DatabaseProvider::Turso { url, auth_token };
                }
            }
        }

        DatabaseProvider::from_url(&self.database.url)
    }
}
