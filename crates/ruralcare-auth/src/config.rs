//! Identity core configuration.
//!
//! Injected into the services at construction; nothing in this crate reads
//! the process environment directly.
//!
//! # Example (TOML)
//!
//! ```toml
//! [auth]
//! min_password_length = 6
//! store_timeout = "5s"
//!
//! [auth.static_admin]
//! email = "ops@ruralcare.example"
//! password = "change-me"
//!
//! [auth.bootstrap_admin]
//! email = "admin@ruralcare.example"
//! password = "change-me-too"
//! name = "District Administrator"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default identity of the bootstrapped admin.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@ruralcare.local";

/// Default password of the bootstrapped admin.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Default display name of the bootstrapped admin.
pub const DEFAULT_ADMIN_NAME: &str = "System Administrator";

/// Root identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Minimum password length, in characters, accepted at registration.
    pub min_password_length: usize,

    /// Upper bound for a single credential store call.
    #[serde(with = "humantime_serde")]
    pub store_timeout: Duration,

    /// Out-of-band operator credential checked before the store on admin
    /// login. Disabled when absent.
    pub static_admin: Option<StaticAdminCredential>,

    /// Admin account created by the bootstrap initializer if none exists.
    pub bootstrap_admin: BootstrapAdminConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            min_password_length: 6,
            store_timeout: Duration::from_secs(5),
            static_admin: None,
            bootstrap_admin: BootstrapAdminConfig::default(),
        }
    }
}

/// Static admin email/secret pair.
#[derive(Clone, Deserialize, Serialize)]
pub struct StaticAdminCredential {
    pub email: String,
    pub password: String,
    /// Display name reported for the synthetic admin record.
    #[serde(default = "default_static_admin_name")]
    pub name: String,
}

fn default_static_admin_name() -> String {
    "Static Administrator".to_string()
}

impl StaticAdminCredential {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: default_static_admin_name(),
        }
    }

    /// Exact comparison of both values.
    #[must_use]
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }
}

impl fmt::Debug for StaticAdminCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticAdminCredential")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// Bootstrap admin settings.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BootstrapAdminConfig {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Default for BootstrapAdminConfig {
    fn default() -> Self {
        Self {
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
            name: DEFAULT_ADMIN_NAME.to_string(),
        }
    }
}

impl fmt::Debug for BootstrapAdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapAdminConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An invalid configuration value was provided.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// A required configuration value is missing.
    #[error("Missing required configuration: {0}")]
    Missing(String),
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - `min_password_length` is zero
    /// - `store_timeout` is zero
    ///
    /// Returns `ConfigError::Missing` if the static admin or bootstrap admin
    /// has an empty email or password.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_password_length == 0 {
            return Err(ConfigError::InvalidValue(
                "min_password_length must be > 0".to_string(),
            ));
        }

        if self.store_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "store_timeout must be > 0".to_string(),
            ));
        }

        if let Some(ref admin) = self.static_admin {
            if admin.email.is_empty() {
                return Err(ConfigError::Missing("static_admin.email".to_string()));
            }
            if admin.password.is_empty() {
                return Err(ConfigError::Missing("static_admin.password".to_string()));
            }
        }

        if self.bootstrap_admin.email.is_empty() {
            return Err(ConfigError::Missing("bootstrap_admin.email".to_string()));
        }
        if self.bootstrap_admin.password.is_empty() {
            return Err(ConfigError::Missing(
                "bootstrap_admin.password".to_string(),
            ));
        }

        Ok(())
    }
}
