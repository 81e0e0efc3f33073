//! In-memory credential store.
//!
//! Reads go straight to `dashmap` shards. Writes are serialised through a
//! single gate that also owns the admin slot, so the identity check, the
//! admin singleton check and the insert happen as one step.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use time::OffsetDateTime;

use crate::AuthResult;
use crate::error::AuthError;
use crate::storage::CredentialStore;
use crate::types::{Account, AccountId, ApprovalStatus, ReviewDecision, Role};

#[derive(Debug, Default)]
struct WriteGate {
    admin: Option<AccountId>,
}

/// Process-local credential store.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    accounts: DashMap<AccountId, Account>,
    identities: DashMap<String, AccountId>,
    writes: Mutex<WriteGate>,
}

impl InMemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_identity(&self, email: &str) -> AuthResult<Option<Account>> {
        let Some(id) = self.identities.get(email).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self.accounts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, id: AccountId) -> AuthResult<Option<Account>> {
        Ok(self.accounts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_role_and_status(
        &self,
        role: Role,
        status: Option<ApprovalStatus>,
    ) -> AuthResult<Vec<Account>> {
        let mut matches: Vec<Account> = self
            .accounts
            .iter()
            .filter(|entry| entry.role() == role)
            .filter(|entry| match (role, status) {
                (Role::HealthWorker, Some(wanted)) => {
                    entry.profile.approval_status() == Some(wanted)
                }
                _ => true,
            })
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by_key(|account| account.created_at);
        Ok(matches)
    }

    async fn insert(&self, account: &Account) -> AuthResult<AccountId> {
        let mut gate = self.writes.lock();

        if self.identities.contains_key(&account.email) {
            return Err(AuthError::DuplicateIdentity);
        }
        let is_admin = account.role() == Role::Admin;
        if is_admin && gate.admin.is_some() {
            return Err(AuthError::AdminExists);
        }

        self.accounts.insert(account.id, account.clone());
        self.identities.insert(account.email.clone(), account.id);
        if is_admin {
            gate.admin = Some(account.id);
        }
        Ok(account.id)
    }

    async fn update_status(
        &self,
        id: AccountId,
        expected_role: Role,
        decision: ReviewDecision,
    ) -> AuthResult<Account> {
        let _gate = self.writes.lock();

        let mut entry = self
            .accounts
            .get_mut(&id)
            .filter(|entry| entry.role() == expected_role)
            .ok_or_else(|| AuthError::not_found(format!("{expected_role}/{id}")))?;

        let account = entry.value_mut();
        let worker = account
            .profile
            .as_health_worker_mut()
            .ok_or_else(|| AuthError::not_found(format!("{expected_role}/{id}")))?;

        worker.apply(&decision)?;
        account.updated_at = OffsetDateTime::now_utc();

        Ok(account.clone())
    }
}
