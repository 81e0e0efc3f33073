//! Credential store selection.

use std::sync::Arc;

use ruralcare_auth::config::AuthConfig;
use ruralcare_auth::storage::{CredentialStore, DeadlineStore, InMemoryCredentialStore};
use ruralcare_auth_postgres::{PostgresCredentialStore, mask_password};

use crate::config::{StorageBackend, StorageConfig};

/// Opens the configured store, bounded by `auth.store_timeout`.
///
/// # Errors
///
/// Returns an error if the PostgreSQL store cannot be reached or migrated.
pub async fn open_store(
    storage: &StorageConfig,
    auth: &AuthConfig,
) -> anyhow::Result<Arc<dyn CredentialStore>> {
    let timeout = auth.store_timeout;
    match storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory credential store; accounts are lost on restart");
            Ok(Arc::new(DeadlineStore::new(
                InMemoryCredentialStore::new(),
                timeout,
            )))
        }
        StorageBackend::Postgres => {
            let url = storage
                .postgres
                .url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("storage.postgres.url is not set"))?;

            let store = PostgresCredentialStore::connect(url, &storage.postgres.pool).await?;
            if storage.postgres.run_migrations {
                store.migrate().await?;
            }
            tracing::info!(url = %mask_password(url), "Connected to PostgreSQL credential store");

            Ok(Arc::new(DeadlineStore::new(store, timeout)))
        }
    }
}
