//! Health-worker approval workflow.
//!
//! ```text
//!            approve
//!   pending ---------> approved
//!      |
//!      |     deny(reason)
//!      +-------------> denied
//! ```
//!
//! Both decisions are one-way. Reviewing an application that is no longer
//! pending fails with `InvalidTransition`; the check is a compare-and-set in
//! the store, so two admins racing on the same application cannot both win.

use std::sync::Arc;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::CredentialStore;
use crate::types::{AccountId, AccountView, ApprovalStatus, ReviewDecision, Role};

/// Admin operations over health-worker applications.
#[derive(Clone)]
pub struct ApprovalWorkflow {
    store: Arc<dyn CredentialStore>,
}

impl ApprovalWorkflow {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Lists health workers with the given status, oldest application first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn list_by_status(&self, status: ApprovalStatus) -> AuthResult<Vec<AccountView>> {
        let accounts = self
            .store
            .find_by_role_and_status(Role::HealthWorker, Some(status))
            .await?;
        Ok(accounts.into_iter().map(|a| a.into_view()).collect())
    }

    /// Lists health workers awaiting review.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn list_pending(&self) -> AuthResult<Vec<AccountView>> {
        self.list_by_status(ApprovalStatus::Pending).await
    }

    /// Approves a pending application and clears any denial reason.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no health worker has this id
    /// - `InvalidTransition` if the application was already reviewed
    pub async fn approve(&self, worker_id: AccountId) -> AuthResult<AccountView> {
        self.review(worker_id, ReviewDecision::Approve).await
    }

    /// Denies a pending application with a reason.
    ///
    /// # Errors
    ///
    /// - `MissingReason` if `reason` is blank
    /// - `NotFound` if no health worker has this id
    /// - `InvalidTransition` if the application was already reviewed
    pub async fn deny(&self, worker_id: AccountId, reason: &str) -> AuthResult<AccountView> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AuthError::MissingReason);
        }
        self.review(
            worker_id,
            ReviewDecision::Deny {
                reason: reason.to_string(),
            },
        )
        .await
    }

    async fn review(&self, worker_id: AccountId, decision: ReviewDecision) -> AuthResult<AccountView> {
        let to = decision.target();
        let account = self
            .store
            .update_status(worker_id, Role::HealthWorker, decision)
            .await
            .inspect_err(|e| {
                tracing::debug!(worker_id = %worker_id, error = %e, "Review rejected");
            })?;

        tracing::info!(worker_id = %worker_id, status = %to, "Health worker reviewed");
        Ok(account.into_view())
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::storage::InMemoryCredentialStore;
    use crate::types::{Account, HealthWorkerProfile, PatientProfile, Profile};

    fn worker(email: &str) -> Account {
        Account::new(
            email,
            "hash",
            Profile::HealthWorker(HealthWorkerProfile {
                name: "W".into(),
                phone: "1".into(),
                qualification: String::new(),
                license_number: String::new(),
                workplace: String::new(),
                district: String::new(),
                village: String::new(),
                years_of_experience: 0,
                specialization: String::new(),
                government_id_document: String::new(),
                credential_document: String::new(),
                status: ApprovalStatus::Pending,
                applied_at: OffsetDateTime::now_utc(),
                denial_reason: None,
            }),
        )
    }

    async fn setup(accounts: &[Account]) -> ApprovalWorkflow {
        let store = Arc::new(InMemoryCredentialStore::new());
        for account in accounts {
            store.insert(account).await.unwrap();
        }
        ApprovalWorkflow::new(store)
    }

    #[tokio::test]
    async fn test_approve_pending() {
        let w = worker("w@x");
        let workflow = setup(std::slice::from_ref(&w)).await;

        let view = workflow.approve(w.id).await.unwrap();
        let profile = view.profile.as_health_worker().unwrap();
        assert_eq!(profile.status, ApprovalStatus::Approved);
        assert!(profile.denial_reason.is_none());
        assert!(workflow.list_pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deny_requires_reason() {
        let w = worker("w@x");
        let workflow = setup(std::slice::from_ref(&w)).await;

        let err = workflow.deny(w.id, "   ").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingReason));
        assert_eq!(workflow.list_pending().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deny_sets_reason() {
        let w = worker("w@x");
        let workflow = setup(std::slice::from_ref(&w)).await;

        let view = workflow.deny(w.id, " bad license ").await.unwrap();
        let profile = view.profile.as_health_worker().unwrap();
        assert_eq!(profile.status, ApprovalStatus::Denied);
        assert_eq!(profile.denial_reason.as_deref(), Some("bad license"));

        let denied = workflow.list_by_status(ApprovalStatus::Denied).await.unwrap();
        assert_eq!(denied.len(), 1);
    }

    #[tokio::test]
    async fn test_decisions_are_one_way() {
        let w = worker("w@x");
        let workflow = setup(std::slice::from_ref(&w)).await;

        workflow.deny(w.id, "bad license").await.unwrap();
        let err = workflow.approve(w.id).await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::InvalidTransition {
                current: ApprovalStatus::Denied
            }
        ));

        let err = workflow.deny(w.id, "again").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_unknown_or_non_worker_is_not_found() {
        let p = Account::new(
            "p@x",
            "hash",
            Profile::Patient(PatientProfile::default()),
        );
        let workflow = setup(std::slice::from_ref(&p)).await;

        let err = workflow.approve(p.id).await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound { .. }));

        let err = workflow.deny(AccountId::new(), "reason").await.unwrap_err();
        assert!(matches!(err, AuthError::NotFound { .. }));
    }
}
