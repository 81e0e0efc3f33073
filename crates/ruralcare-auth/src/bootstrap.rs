//! Singleton admin bootstrap.
//!
//! Guarantees an admin account exists after process start. The routine is
//! idempotent and safe to run concurrently with itself: it inserts and treats
//! a uniqueness conflict as "someone else already did it". Failures are
//! logged and swallowed; the static admin credential keeps the admin
//! endpoints reachable regardless.

use std::sync::Arc;

use crate::config::BootstrapAdminConfig;
use crate::error::AuthError;
use crate::password::PasswordHasher;
use crate::storage::CredentialStore;
use crate::types::{Account, AccountId, AdminProfile, Profile, Role};

/// What a bootstrap run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// An admin was already stored.
    AlreadyPresent,
    /// This run created the admin.
    Created(AccountId),
    /// A concurrent run created the admin first.
    LostRace,
    /// The store or hasher failed; nothing was created.
    Failed,
}

impl BootstrapOutcome {
    /// Returns `true` if an admin is known to exist after the run.
    #[must_use]
    pub fn admin_exists(&self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Creates the admin account when none exists.
#[derive(Clone)]
pub struct BootstrapInitializer {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    admin: BootstrapAdminConfig,
}

impl BootstrapInitializer {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, admin: BootstrapAdminConfig) -> Self {
        Self {
            store,
            hasher: PasswordHasher::new(),
            admin,
        }
    }

    /// Ensures the singleton admin exists. Never fails.
    pub async fn ensure_admin_exists(&self) -> BootstrapOutcome {
        match self.try_ensure().await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Admin bootstrap failed; static admin login remains available"
                );
                BootstrapOutcome::Failed
            }
        }
    }

    async fn try_ensure(&self) -> Result<BootstrapOutcome, AuthError> {
        let admins = self.store.find_by_role_and_status(Role::Admin, None).await?;
        if !admins.is_empty() {
            tracing::debug!("Admin account already present, skipping bootstrap");
            return Ok(BootstrapOutcome::AlreadyPresent);
        }

        let password_hash = self.hasher.hash_async(&self.admin.password).await?;
        let account = Account::new(
            self.admin.email.clone(),
            password_hash,
            Profile::Admin(AdminProfile {
                name: self.admin.name.clone(),
            }),
        );

        match self.store.insert(&account).await {
            Ok(id) => {
                tracing::info!(account_id = %id, email = %account.email, "Admin account created");
                Ok(BootstrapOutcome::Created(id))
            }
            Err(AuthError::AdminExists) => {
                tracing::info!("Admin account created concurrently, nothing to do");
                Ok(BootstrapOutcome::LostRace)
            }
            Err(AuthError::DuplicateIdentity) => {
                let admins = self.store.find_by_role_and_status(Role::Admin, None).await?;
                if admins.is_empty() {
                    return Err(AuthError::internal(format!(
                        "bootstrap admin identity {} is held by a non-admin account",
                        account.email
                    )));
                }
                tracing::info!("Admin account created concurrently, nothing to do");
                Ok(BootstrapOutcome::LostRace)
            }
            Err(e) => Err(e),
        }
    }
}
