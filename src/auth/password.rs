use crate::types::AuthError;
use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Argon2id cost parameters.
///
/// Defaults are the Argon2 crate's recommended values (19 MiB, 2 passes,
/// 1 lane), which cost tens of milliseconds per hash on commodity hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashCost {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

fn default_memory_kib() -> u32 {
    Params::DEFAULT_M_COST
}

fn default_iterations() -> u32 {
    Params::DEFAULT_T_COST
}

fn default_parallelism() -> u32 {
    Params::DEFAULT_P_COST
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

/// PHC-formatted password hash (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`).
///
/// Debug output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedCredential(String);

impl HashedCredential {
    /// Wraps a hash loaded from storage. Validity is checked at verify time.
    pub fn from_stored(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedCredential(<redacted>)")
    }
}

/// Salted, adaptive one-way password hashing using Argon2id.
#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    /// Builds a hasher, rejecting parameters Argon2 would refuse.
    pub fn new(cost: HashCost) -> Result<Self, AuthError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| AuthError::HashingFailure(format!("Invalid Argon2 parameters: {}", e)))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<HashedCredential, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| HashedCredential(hash.to_string()))
            .map_err(|e| AuthError::HashingFailure(format!("Failed to hash password: {}", e)))
    }

    /// Verifies a candidate password against a stored hash.
    ///
    /// The cost parameters embedded in `hashed` are used, so hashes produced
    /// under an older configuration keep verifying. The digest comparison is
    /// constant-time. A mismatch is `Ok(false)`; only an unparseable or
    /// unsupported stored hash is an error.
    pub fn verify(&self, hashed: &HashedCredential, candidate: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hashed.as_str())
            .map_err(|e| AuthError::HashingFailure(format!("Invalid password hash: {}", e)))?;

        match self.argon2().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::HashingFailure(format!(
                "Failed to verify password: {}",
                e
            ))),
        }
    }
}

impl fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("memory_kib", &self.params.m_cost())
            .field("iterations", &self.params.t_cost())
            .field("parallelism", &self.params.p_cost())
            .finish()
    }
}
