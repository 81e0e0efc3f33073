//! Identity service facade.
//!
//! Bundles registration, authentication, approval and bootstrap over a single
//! credential store. This is the surface the presentation layer calls.

use std::sync::Arc;

use crate::AuthResult;
use crate::approval::ApprovalWorkflow;
use crate::authentication::AuthenticationService;
use crate::bootstrap::{BootstrapInitializer, BootstrapOutcome};
use crate::config::AuthConfig;
use crate::registration::{RegistrationRequest, RegistrationService};
use crate::storage::CredentialStore;
use crate::types::{AccountId, AccountView, ApprovalStatus, Role};

/// All exposed identity operations.
#[derive(Clone)]
pub struct IdentityService {
    registration: RegistrationService,
    authentication: AuthenticationService,
    approval: ApprovalWorkflow,
    bootstrap: BootstrapInitializer,
}

impl IdentityService {
    /// Wires every component to the same store.
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, config: &AuthConfig) -> Self {
        Self {
            registration: RegistrationService::new(Arc::clone(&store), config),
            authentication: AuthenticationService::new(Arc::clone(&store), config),
            approval: ApprovalWorkflow::new(Arc::clone(&store)),
            bootstrap: BootstrapInitializer::new(store, config.bootstrap_admin.clone()),
        }
    }

    /// See [`RegistrationService::register`].
    pub async fn register(&self, request: RegistrationRequest) -> AuthResult<AccountView> {
        self.registration.register(request).await
    }

    /// See [`AuthenticationService::login`].
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        expected_role: Option<Role>,
    ) -> AuthResult<AccountView> {
        self.authentication
            .login(email, password, expected_role)
            .await
    }

    /// See [`AuthenticationService::admin_login`].
    pub async fn admin_login(&self, email: &str, password: &str) -> AuthResult<AccountView> {
        self.authentication.admin_login(email, password).await
    }

    /// Health workers awaiting review.
    pub async fn list_pending_workers(&self) -> AuthResult<Vec<AccountView>> {
        self.approval.list_pending().await
    }

    /// Health workers with the given status.
    pub async fn list_workers(&self, status: ApprovalStatus) -> AuthResult<Vec<AccountView>> {
        self.approval.list_by_status(status).await
    }

    /// See [`ApprovalWorkflow::approve`].
    pub async fn approve_worker(&self, worker_id: AccountId) -> AuthResult<AccountView> {
        self.approval.approve(worker_id).await
    }

    /// See [`ApprovalWorkflow::deny`].
    pub async fn deny_worker(&self, worker_id: AccountId, reason: &str) -> AuthResult<AccountView> {
        self.approval.deny(worker_id, reason).await
    }

    /// See [`BootstrapInitializer::ensure_admin_exists`].
    pub async fn ensure_admin_exists(&self) -> BootstrapOutcome {
        self.bootstrap.ensure_admin_exists().await
    }
}
