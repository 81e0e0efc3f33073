//! Password hashing and verification.
//!
//! Argon2id with fixed parameters and a fresh OsRng salt per hash, stored as
//! a PHC string. The parameters are a property of the deployment, not of the
//! call: every hash produced by [`PasswordHasher`] uses the same work factor.
//!
//! # Example
//!
//! ```
//! use ruralcare_auth::password::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("secret1").unwrap();
//! assert!(hash.starts_with("$argon2id$"));
//! assert!(hasher.verify("secret1", &hash));
//! assert!(!hasher.verify("secret2", &hash));
//! ```

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use crate::AuthResult;
use crate::error::AuthError;

/// Argon2 memory cost in KiB.
pub const MEMORY_COST_KIB: u32 = 19 * 1024;

/// Argon2 iteration count.
pub const ITERATIONS: u32 = 2;

/// Argon2 lanes.
pub const PARALLELISM: u32 = 1;

/// One-way password hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher {
    _private: (),
}

impl PasswordHasher {
    #[must_use]
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn argon2() -> AuthResult<Argon2<'static>> {
        let params = Params::new(MEMORY_COST_KIB, ITERATIONS, PARALLELISM, None)
            .map_err(|e| AuthError::internal(format!("invalid argon2 parameters: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hashes a plaintext password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if the hash primitive fails.
    pub fn hash(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::internal(format!("password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored PHC hash.
    ///
    /// Never fails: a mismatch or an unreadable hash both yield `false`.
    /// Parameters are taken from the hash itself.
    #[must_use]
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is not a valid PHC string");
                return false;
            }
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Hashes on the blocking pool so the runtime is not stalled by the cost
    /// function.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Internal` if hashing fails or the blocking task
    /// panics.
    pub async fn hash_async(&self, password: &str) -> AuthResult<String> {
        let hasher = *self;
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::internal(format!("hashing task failed: {e}")))?
    }

    /// Verifies on the blocking pool. A failed blocking task counts as a
    /// mismatch.
    pub async fn verify_async(&self, password: &str, hash: &str) -> bool {
        let hasher = *self;
        let password = password.to_owned();
        let hash = hash.to_owned();
        match tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::error!(error = %e, "Password verification task failed");
                false
            }
        }
    }
}
