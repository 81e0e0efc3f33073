//! Account table schema.
//!
//! `migrate` is idempotent and safe to call on every start.

use sqlx_core::query::query;
use tracing::{debug, info};

use crate::{PgPool, StorageResult};

/// Unique constraint on the identity column.
pub const EMAIL_CONSTRAINT: &str = "account_email_key";

/// Partial unique index allowing at most one admin row.
pub const SINGLE_ADMIN_INDEX: &str = "account_single_admin_idx";

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS account (
        id            UUID PRIMARY KEY,
        email         TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        role          TEXT NOT NULL,
        status        TEXT,
        profile       JSONB NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL,
        updated_at    TIMESTAMPTZ NOT NULL,
        CONSTRAINT account_email_key UNIQUE (email),
        CONSTRAINT account_role_check CHECK (role IN ('patient', 'health-worker', 'admin')),
        CONSTRAINT account_status_check CHECK (
            (role = 'health-worker' AND status IN ('pending', 'approved', 'denied'))
            OR (role <> 'health-worker' AND status IS NULL)
        )
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS account_single_admin_idx
        ON account ((role))
        WHERE role = 'admin'
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS account_role_status_idx
        ON account (role, status, created_at)
    "#,
];

/// Creates the account table and its indexes if missing.
///
/// # Errors
///
/// Returns an error if any DDL statement fails.
pub async fn migrate(pool: &PgPool) -> StorageResult<()> {
    for statement in STATEMENTS {
        query(statement).execute(pool).await?;
    }
    debug!(statements = STATEMENTS.len(), "Account schema statements applied");
    info!("Account schema ready");
    Ok(())
}
