//! Role-aware authentication.
//!
//! Two entry points that are never interchangeable:
//!
//! - [`AuthenticationService::login`] for patients and health workers. Admin
//!   accounts are refused here even with a correct password.
//! - [`AuthenticationService::admin_login`] for the admin. A configured static
//!   operator credential is checked first, by exact comparison and without
//!   touching the store, so operators can sign in while the store is down.
//!   Otherwise the stored admin account is used.
//!
//! The general login never tells an unknown identity apart from a wrong
//! password. The admin login does report `AccessDenied` for identities that
//! exist but are not admins.

use std::sync::Arc;

use crate::AuthResult;
use crate::config::{AuthConfig, StaticAdminCredential};
use crate::error::AuthError;
use crate::password::PasswordHasher;
use crate::storage::CredentialStore;
use crate::types::{AccountView, ApprovalStatus, Profile, Role};

/// Verifies credentials for both login entry points.
#[derive(Clone)]
pub struct AuthenticationService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    static_admin: Option<StaticAdminCredential>,
}

impl AuthenticationService {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, config: &AuthConfig) -> Self {
        Self {
            store,
            hasher: PasswordHasher::new(),
            static_admin: config.static_admin.clone(),
        }
    }

    /// General login for patients and health workers.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` for an unknown identity or wrong password
    /// - `UseAdminEndpoint` if the identity belongs to the admin
    /// - `RoleMismatch` if `expected_role` differs from the account's role
    /// - `PendingApproval` / `AccountDenied` for unapproved health workers
    /// - `StoreUnavailable` if the store cannot be reached
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        expected_role: Option<Role>,
    ) -> AuthResult<AccountView> {
        let Some(account) = self.store.find_by_identity(email).await? else {
            tracing::debug!("Login rejected: unknown identity");
            return Err(AuthError::InvalidCredentials);
        };

        let role = account.role();
        if role == Role::Admin {
            return Err(AuthError::UseAdminEndpoint);
        }

        if let Some(expected) = expected_role
            && expected != role
        {
            tracing::debug!(
                account_id = %account.id,
                expected = %expected,
                actual = %role,
                "Login rejected: role mismatch"
            );
            return Err(AuthError::RoleMismatch {
                expected: expected.to_string(),
                actual: role.to_string(),
            });
        }

        match &account.profile {
            Profile::HealthWorker(worker) => match worker.status {
                ApprovalStatus::Pending => return Err(AuthError::PendingApproval),
                ApprovalStatus::Denied => return Err(AuthError::AccountDenied),
                ApprovalStatus::Approved => {}
            },
            Profile::Patient(_) | Profile::Admin(_) => {}
        }

        if !self
            .hasher
            .verify_async(password, &account.password_hash)
            .await
        {
            tracing::debug!(account_id = %account.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(account_id = %account.id, role = %role, "Login succeeded");
        Ok(account.into_view())
    }

    /// Admin-only login.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` for an unknown identity or wrong password
    /// - `AccessDenied` if the identity exists but is not the admin
    /// - `StoreUnavailable` if the store is needed and cannot be reached
    pub async fn admin_login(&self, email: &str, password: &str) -> AuthResult<AccountView> {
        if let Some(ref operator) = self.static_admin
            && operator.matches(email, password)
        {
            tracing::info!("Admin login succeeded with static credential");
            return Ok(AccountView::static_admin(&operator.email, &operator.name));
        }

        let Some(account) = self.store.find_by_identity(email).await? else {
            tracing::debug!("Admin login rejected: unknown identity");
            return Err(AuthError::InvalidCredentials);
        };

        if account.role() != Role::Admin {
            tracing::warn!(
                account_id = %account.id,
                role = %account.role(),
                "Admin login attempted with non-admin account"
            );
            return Err(AuthError::AccessDenied);
        }

        if !self
            .hasher
            .verify_async(password, &account.password_hash)
            .await
        {
            tracing::debug!(account_id = %account.id, "Admin login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(account_id = %account.id, "Admin login succeeded");
        Ok(account.into_view())
    }
}
