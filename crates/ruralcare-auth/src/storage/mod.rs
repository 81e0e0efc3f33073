//! Credential store interface.
//!
//! The credential store is the only shared mutable resource of the identity
//! core and the sole source of truth for which accounts exist. All account
//! mutation goes through [`CredentialStore::insert`] and
//! [`CredentialStore::update_status`].
//!
//! # Implementations
//!
//! - [`InMemoryCredentialStore`] - process-local store for development and tests
//! - `ruralcare-auth-postgres` - PostgreSQL storage backend
//!
//! [`DeadlineStore`] wraps any implementation and bounds every call in time.

pub mod deadline;
pub mod memory;

pub use deadline::DeadlineStore;
pub use memory::InMemoryCredentialStore;

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::{Account, AccountId, ApprovalStatus, ReviewDecision, Role};

/// Storage operations for accounts.
///
/// # Example
///
/// ```ignore
/// use ruralcare_auth::storage::CredentialStore;
///
/// async fn example(store: &impl CredentialStore) {
///     if let Some(account) = store.find_by_identity("a@x.com").await? {
///         println!("Found account with role {}", account.role());
///     }
/// }
/// ```
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find an account by its identity (email), compared exactly.
    ///
    /// Returns `None` if no account has that identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_identity(&self, email: &str) -> AuthResult<Option<Account>>;

    /// Find an account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: AccountId) -> AuthResult<Option<Account>>;

    /// List accounts with the given role, oldest first.
    ///
    /// `status` only filters health-worker accounts; it is ignored for other
    /// roles.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_role_and_status(
        &self,
        role: Role,
        status: Option<ApprovalStatus>,
    ) -> AuthResult<Vec<Account>>;

    /// Store a new account.
    ///
    /// Duplicate detection and insert are atomic.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The identity is already taken (`DuplicateIdentity`)
    /// - The account is an admin and an admin already exists (`AdminExists`)
    /// - The storage operation fails
    async fn insert(&self, account: &Account) -> AuthResult<AccountId>;

    /// Apply a review decision to the record with this id and role.
    ///
    /// The check of the current status and the write happen as one step.
    /// Sets `updated_at` and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No record with this id has `expected_role` (`NotFound`)
    /// - The record was already reviewed (`InvalidTransition`)
    /// - The storage operation fails
    async fn update_status(
        &self,
        id: AccountId,
        expected_role: Role,
        decision: ReviewDecision,
    ) -> AuthResult<Account>;
}

#[async_trait]
impl<T: CredentialStore + ?Sized> CredentialStore for std::sync::Arc<T> {
    async fn find_by_identity(&self, email: &str) -> AuthResult<Option<Account>> {
        (**self).find_by_identity(email).await
    }

    async fn find_by_id(&self, id: AccountId) -> AuthResult<Option<Account>> {
        (**self).find_by_id(id).await
    }

    async fn find_by_role_and_status(
        &self,
        role: Role,
        status: Option<ApprovalStatus>,
    ) -> AuthResult<Vec<Account>> {
        (**self).find_by_role_and_status(role, status).await
    }

    async fn insert(&self, account: &Account) -> AuthResult<AccountId> {
        (**self).insert(account).await
    }

    async fn update_status(
        &self,
        id: AccountId,
        expected_role: Role,
        decision: ReviewDecision,
    ) -> AuthResult<Account> {
        (**self).update_status(id, expected_role, decision).await
    }
}
