//! Account registration.
//!
//! Patients and health workers register themselves; admins never do (see
//! [`crate::bootstrap`]). Preconditions are checked in a fixed order and the
//! first failure wins:
//!
//! 1. email and password present
//! 2. role known and not `admin`
//! 3. password long enough
//! 4. identity not taken

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use time::OffsetDateTime;

use crate::AuthResult;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password::PasswordHasher;
use crate::storage::CredentialStore;
use crate::types::{
    Account, AccountView, ApprovalStatus, HealthWorkerProfile, PatientProfile, Profile, Role,
};

/// Role-specific registration fields, as submitted by the sign-up form.
///
/// Fields that do not apply to the requested role are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationForm {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub qualification: Option<String>,
    pub license_number: Option<String>,
    pub workplace: Option<String>,
    pub district: Option<String>,
    pub village: Option<String>,
    pub years_of_experience: Option<u32>,
    pub specialization: Option<String>,
    pub government_id_document: Option<String>,
    pub credential_document: Option<String>,
}

/// A registration attempt.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Raw role name; validated by [`RegistrationService::register`].
    #[serde(default)]
    pub role: String,
    #[serde(flatten)]
    pub form: RegistrationForm,
}

impl RegistrationRequest {
    #[must_use]
    pub fn new(
        role: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            role: role.into(),
            form: RegistrationForm::default(),
        }
    }

    #[must_use]
    pub fn with_form(mut self, form: RegistrationForm) -> Self {
        self.form = form;
        self
    }
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .field("form", &self.form)
            .finish()
    }
}

/// Creates patient and health-worker accounts.
#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    min_password_length: usize,
}

impl RegistrationService {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>, config: &AuthConfig) -> Self {
        Self {
            store,
            hasher: PasswordHasher::new(),
            min_password_length: config.min_password_length,
        }
    }

    /// Registers a new account and returns it without the password hash.
    ///
    /// # Errors
    ///
    /// - `MissingCredentials` if email or password is empty
    /// - `InvalidRole` if the role is unknown
    /// - `AdminRegistrationForbidden` if the role is `admin`
    /// - `WeakPassword` if the password is too short
    /// - `DuplicateIdentity` if the email is taken
    /// - `StoreUnavailable` / `Internal` on infrastructure failures
    pub async fn register(&self, request: RegistrationRequest) -> AuthResult<AccountView> {
        let RegistrationRequest {
            email,
            password,
            role,
            form,
        } = request;

        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let role: Role = role.parse()?;
        if role == Role::Admin {
            return Err(AuthError::AdminRegistrationForbidden);
        }

        if password.chars().count() < self.min_password_length {
            return Err(AuthError::WeakPassword {
                min_length: self.min_password_length,
            });
        }

        if self.store.find_by_identity(&email).await?.is_some() {
            return Err(AuthError::DuplicateIdentity);
        }

        let password_hash = self.hasher.hash_async(&password).await?;
        let profile = build_profile(role, form, OffsetDateTime::now_utc())?;
        let account = Account::new(email, password_hash, profile);

        // The store re-checks the identity atomically; a concurrent sign-up
        // with the same email surfaces here as DuplicateIdentity.
        self.store.insert(&account).await?;

        tracing::info!(
            account_id = %account.id,
            role = %role,
            "Account registered"
        );

        Ok(account.into_view())
    }
}

fn build_profile(role: Role, form: RegistrationForm, now: OffsetDateTime) -> AuthResult<Profile> {
    match role {
        Role::Patient => Ok(Profile::Patient(PatientProfile {
            name: form.name.unwrap_or_default(),
            phone: form.phone,
            date_of_birth: form.date_of_birth,
            address: form.address,
        })),
        Role::HealthWorker => Ok(Profile::HealthWorker(HealthWorkerProfile {
            name: form.name.unwrap_or_default(),
            phone: form.phone.unwrap_or_default(),
            qualification: form.qualification.unwrap_or_default(),
            license_number: form.license_number.unwrap_or_default(),
            workplace: form.workplace.unwrap_or_default(),
            district: form.district.unwrap_or_default(),
            village: form.village.unwrap_or_default(),
            years_of_experience: form.years_of_experience.unwrap_or_default(),
            specialization: form.specialization.unwrap_or_default(),
            government_id_document: form.government_id_document.unwrap_or_default(),
            credential_document: form.credential_document.unwrap_or_default(),
            status: ApprovalStatus::Pending,
            applied_at: now,
            denial_reason: None,
        })),
        Role::Admin => Err(AuthError::AdminRegistrationForbidden),
    }
}
