//! Account storage.
//!
//! One row per account. The role-specific profile is kept as JSONB; `role`
//! and `status` are duplicated into plain columns so the uniqueness and
//! compare-and-set rules can be expressed in SQL.

use sqlx_core::query_as::query_as;
use time::OffsetDateTime;
use uuid::Uuid;

use ruralcare_auth::types::{Account, AccountId, ApprovalStatus, Profile, Role};

use crate::schema::{EMAIL_CONSTRAINT, SINGLE_ADMIN_INDEX};
use crate::{PgPool, StorageError, StorageResult};

// =============================================================================
// Types
// =============================================================================

type AccountTuple = (
    Uuid,
    String,
    String,
    serde_json::Value,
    OffsetDateTime,
    OffsetDateTime,
);

/// Account record from the database.
#[derive(Clone)]
pub struct AccountRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub profile: serde_json::Value,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl AccountRow {
    fn from_tuple(row: AccountTuple) -> Self {
        Self {
            id: row.0,
            email: row.1,
            password_hash: row.2,
            profile: row.3,
            created_at: row.4,
            updated_at: row.5,
        }
    }

    /// Decodes the row into a domain account.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile column does not hold a valid profile.
    pub fn into_account(self) -> StorageResult<Account> {
        let profile: Profile = serde_json::from_value(self.profile)?;
        Ok(Account {
            id: AccountId::from_uuid(self.id),
            email: self.email,
            password_hash: self.password_hash,
            profile,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Value of the `status` column for an account.
fn status_column(profile: &Profile) -> Option<&'static str> {
    profile.approval_status().map(|s| s.as_str())
}

/// Health-worker status filter; other roles have no status.
fn status_filter(role: Role, status: Option<ApprovalStatus>) -> Option<&'static str> {
    match role {
        Role::HealthWorker => status.map(|s| s.as_str()),
        Role::Patient | Role::Admin => None,
    }
}

// =============================================================================
// Account Storage
// =============================================================================

/// Account storage operations over a borrowed pool.
pub struct AccountStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountStorage<'a> {
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find an account by its exact identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> StorageResult<Option<AccountRow>> {
        let row: Option<AccountTuple> = query_as(
            r#"
            SELECT id, email, password_hash, profile, created_at, updated_at
            FROM account
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(AccountRow::from_tuple))
    }

    /// Find an account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<AccountRow>> {
        let row: Option<AccountTuple> = query_as(
            r#"
            SELECT id, email, password_hash, profile, created_at, updated_at
            FROM account
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(AccountRow::from_tuple))
    }

    /// List accounts with a role, optionally filtered by status, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_role(
        &self,
        role: Role,
        status: Option<ApprovalStatus>,
    ) -> StorageResult<Vec<AccountRow>> {
        let rows: Vec<AccountTuple> = query_as(
            r#"
            SELECT id, email, password_hash, profile, created_at, updated_at
            FROM account
            WHERE role = $1
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(role.as_str())
        .bind(status_filter(role, status))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(AccountRow::from_tuple).collect())
    }

    /// Insert a new account.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DuplicateIdentity` or `StorageError::AdminExists`
    /// when a uniqueness constraint rejects the row, or a database error.
    pub async fn create(&self, account: &Account) -> StorageResult<Uuid> {
        let profile = serde_json::to_value(&account.profile)?;

        let (id,): (Uuid,) = query_as(
            r#"
            INSERT INTO account
                (id, email, password_hash, role, status, profile, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(account.id.as_uuid())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role().as_str())
        .bind(status_column(&account.profile))
        .bind(&profile)
        .bind(account.created_at)
        .bind(account.updated_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx_core::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return match db_err.constraint() {
                    Some(SINGLE_ADMIN_INDEX) => StorageError::AdminExists,
                    Some(EMAIL_CONSTRAINT) => StorageError::DuplicateIdentity,
                    _ => StorageError::conflict(db_err.message().to_string()),
                };
            }
            StorageError::from(e)
        })?;

        Ok(id)
    }

    /// Compare-and-set the approval status of a row with the given role.
    ///
    /// Returns `None` when no row matched `id`, `role` and `from` together.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn update_status(
        &self,
        id: Uuid,
        role: Role,
        from: ApprovalStatus,
        to: ApprovalStatus,
        denial_reason: Option<&str>,
    ) -> StorageResult<Option<AccountRow>> {
        let row: Option<AccountTuple> = query_as(
            r#"
            UPDATE account
            SET status = $4,
                profile = jsonb_set(
                    jsonb_set(profile, '{status}', to_jsonb($4::text)),
                    '{denialReason}',
                    COALESCE(to_jsonb($5::text), 'null'::jsonb)
                ),
                updated_at = $6
            WHERE id = $1
              AND role = $2
              AND status = $3
            RETURNING id, email, password_hash, profile, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(role.as_str())
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(denial_reason)
        .bind(OffsetDateTime::now_utc())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(AccountRow::from_tuple))
    }
}
