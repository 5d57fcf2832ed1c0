//! Password hashing and verification using Argon2id

use crate::{config::SecurityConfig, error::AppError};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use once_cell::sync::OnceCell;
use std::sync::Arc;

// Plaintext behind the throwaway hash used when no account matches.
const DUMMY_PASSWORD: &str = "dummy-password-for-missing-accounts";

/// Password hasher with configurable cost parameters
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    dummy_hash: Arc<OnceCell<String>>,
}

impl PasswordHasher {
    /// Create hasher with default parameters (OWASP minimum: m=19MiB, t=2, p=1)
    pub fn new() -> Self {
        Self::with_params(Params::DEFAULT)
    }

    /// Create hasher from the security section of the config
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AppError> {
        let params = Params::new(
            config.password_hash_memory_kib,
            config.password_hash_iterations,
            config.password_hash_parallelism,
            None,
        )
        .map_err(|e| AppError::Config(format!("Invalid Argon2 params: {}", e)))?;

        let hasher = Self::with_params(params);
        // Built up front so the first unknown-account login costs the same as later ones
        hasher.dummy_hash()?;

        Ok(hasher)
    }

    fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    fn dummy_hash(&self) -> Result<&str, AppError> {
        self.dummy_hash
            .get_or_try_init(|| self.hash(DUMMY_PASSWORD))
            .map(String::as_str)
    }

    /// Hash a password with a fresh random salt, returning a PHC string
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored PHC hash.
    ///
    /// A malformed hash and a wrong password both yield `false`.
    /// The cost parameters are read from the stored hash, not from `self`.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Stored password hash is malformed: {:?}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Run a full verification against a throwaway hash and return `false`.
    ///
    /// Used when no stored hash exists, so a missing account takes as long
    /// to reject as a wrong password.
    pub fn verify_dummy(&self, password: &str) -> bool {
        match self.dummy_hash() {
            Ok(hash) => {
                let _ = self.verify(password, hash);
            }
            Err(e) => tracing::warn!("Dummy password hash unavailable: {}", e),
        }

        false
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
