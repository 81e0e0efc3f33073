//! PostgreSQL credential store for RuralCare identity.
//!
//! Stores accounts in a single `account` table. The database enforces both
//! uniqueness rules:
//!
//! - `UNIQUE (email)` for identities
//! - a partial unique index on `role = 'admin'` for the singleton admin
//!
//! Approval decisions are a single conditional `UPDATE`, so concurrent
//! reviews of the same application cannot both succeed.
//!
//! # Example
//!
//! ```ignore
//! use ruralcare_auth_postgres::{PoolSettings, PostgresCredentialStore};
//!
//! let store = PostgresCredentialStore::connect(
//!     "postgres://localhost/ruralcare",
//!     &PoolSettings::default(),
//! )
//! .await?;
//! store.migrate().await?;
//! ```

pub mod account;
pub mod pool;
pub mod schema;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx_core::pool::Pool;
use sqlx_postgres::Postgres;

use ruralcare_auth::storage::CredentialStore;
use ruralcare_auth::types::{Account, AccountId, ApprovalStatus, ReviewDecision, Role};
use ruralcare_auth::{AuthError, AuthResult};

pub use account::{AccountRow, AccountStorage};
pub use pool::{PoolSettings, create_pool, mask_password};

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during account storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx_core::Error),

    /// The identity column's unique constraint rejected the row.
    #[error("Identity already exists")]
    DuplicateIdentity,

    /// The single-admin index rejected the row.
    #[error("Admin already exists")]
    AdminExists,

    /// Some other uniqueness rule rejected the row.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored value could not be decoded.
    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

impl StorageError {
    /// Create a `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Create an `InvalidData` error.
    #[must_use]
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }

    /// Returns `true` if this is a serialization error.
    #[must_use]
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Self::Serialization(_))
    }

    /// Returns `true` if the database could not be reached.
    ///
    /// Covers pool exhaustion, closed pools, I/O and TLS failures.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Database(
                sqlx_core::Error::PoolTimedOut
                    | sqlx_core::Error::PoolClosed
                    | sqlx_core::Error::Io(_)
                    | sqlx_core::Error::Tls(_)
                    | sqlx_core::Error::WorkerCrashed
            )
        )
    }
}

impl From<StorageError> for AuthError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::DuplicateIdentity => AuthError::DuplicateIdentity,
            StorageError::AdminExists => AuthError::AdminExists,
            e if e.is_unavailable() => AuthError::store_unavailable(e.to_string()),
            e => AuthError::internal(e.to_string()),
        }
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// PostgreSQL Credential Store
// =============================================================================

/// PostgreSQL implementation of [`CredentialStore`].
#[derive(Debug, Clone)]
pub struct PostgresCredentialStore {
    pool: Arc<PgPool>,
}

impl PostgresCredentialStore {
    /// Create a store with an existing connection pool.
    #[must_use]
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create a store by connecting to the database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails.
    pub async fn connect(database_url: &str, settings: &PoolSettings) -> StorageResult<Self> {
        let pool = create_pool(database_url, settings).await?;
        Ok(Self::new(Arc::new(pool)))
    }

    /// Get a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the account schema if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if a DDL statement fails.
    pub async fn migrate(&self) -> StorageResult<()> {
        schema::migrate(&self.pool).await
    }

    fn accounts(&self) -> AccountStorage<'_> {
        AccountStorage::new(&self.pool)
    }
}

fn decode(row: Option<AccountRow>) -> AuthResult<Option<Account>> {
    Ok(row.map(AccountRow::into_account).transpose()?)
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn find_by_identity(&self, email: &str) -> AuthResult<Option<Account>> {
        decode(self.accounts().find_by_email(email).await?)
    }

    async fn find_by_id(&self, id: AccountId) -> AuthResult<Option<Account>> {
        decode(self.accounts().find_by_id(id.as_uuid()).await?)
    }

    async fn find_by_role_and_status(
        &self,
        role: Role,
        status: Option<ApprovalStatus>,
    ) -> AuthResult<Vec<Account>> {
        let rows = self.accounts().list_by_role(role, status).await?;
        let accounts = rows
            .into_iter()
            .map(AccountRow::into_account)
            .collect::<StorageResult<Vec<_>>>()?;
        Ok(accounts)
    }

    async fn insert(&self, account: &Account) -> AuthResult<AccountId> {
        let id = self.accounts().create(account).await?;
        Ok(AccountId::from_uuid(id))
    }

    async fn update_status(
        &self,
        id: AccountId,
        expected_role: Role,
        decision: ReviewDecision,
    ) -> AuthResult<Account> {
        let storage = self.accounts();
        // Only pending applications are reviewable.
        let updated = storage
            .update_status(
                id.as_uuid(),
                expected_role,
                ApprovalStatus::Pending,
                decision.target(),
                decision.denial_reason(),
            )
            .await?;

        if let Some(row) = updated {
            return Ok(row.into_account()?);
        }

        // Nothing matched: tell a missing record from a stale status.
        let current = decode(storage.find_by_id(id.as_uuid()).await?)?
            .filter(|account| account.role() == expected_role)
            .ok_or_else(|| AuthError::not_found(format!("{expected_role} {id}")))?;

        match current.profile.approval_status() {
            Some(status) => {
                status.review(&decision)?;
                Err(StorageError::conflict(format!("account {id} changed during review")).into())
            }
            None => Err(StorageError::invalid_data(format!(
                "account {id} has role {expected_role} but no approval status"
            ))
            .into()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
