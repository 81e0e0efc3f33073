//! Time-bounded credential store decorator.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::CredentialStore;
use crate::types::{Account, AccountId, ApprovalStatus, ReviewDecision, Role};

/// Wraps a store so that every call either completes within `timeout` or
/// fails with `StoreUnavailable`.
#[derive(Debug, Clone)]
pub struct DeadlineStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S> DeadlineStore<S> {
    #[must_use]
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    /// The wrapped store.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = AuthResult<T>>,
    ) -> AuthResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Credential store call timed out"
                );
                Err(AuthError::store_unavailable(format!(
                    "{operation} exceeded {:?}",
                    self.timeout
                )))
            }
        }
    }
}

#[async_trait]
impl<S: CredentialStore> CredentialStore for DeadlineStore<S> {
    async fn find_by_identity(&self, email: &str) -> AuthResult<Option<Account>> {
        self.bounded("find_by_identity", self.inner.find_by_identity(email))
            .await
    }

    async fn find_by_id(&self, id: AccountId) -> AuthResult<Option<Account>> {
        self.bounded("find_by_id", self.inner.find_by_id(id)).await
    }

    async fn find_by_role_and_status(
        &self,
        role: Role,
        status: Option<ApprovalStatus>,
    ) -> AuthResult<Vec<Account>> {
        self.bounded(
            "find_by_role_and_status",
            self.inner.find_by_role_and_status(role, status),
        )
        .await
    }

    async fn insert(&self, account: &Account) -> AuthResult<AccountId> {
        self.bounded("insert", self.inner.insert(account)).await
    }

    async fn update_status(
        &self,
        id: AccountId,
        expected_role: Role,
        decision: ReviewDecision,
    ) -> AuthResult<Account> {
        self.bounded(
            "update_status",
            self.inner.update_status(id, expected_role, decision),
        )
        .await
    }
}
