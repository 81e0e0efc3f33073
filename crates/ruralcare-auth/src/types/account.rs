//! Account domain types.
//!
//! An [`Account`] is the stored record: it carries the password hash and never
//! leaves the credential store boundary. Everything handed to callers is an
//! [`AccountView`], which has no hash field at all.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AuthError;
use crate::AuthResult;

// =============================================================================
// Role
// =============================================================================

/// The closed set of account kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// A patient using the coordination app.
    Patient,
    /// A field health worker; must be approved before signing in.
    HealthWorker,
    /// The singleton system administrator.
    Admin,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Role; 3] = [Role::Patient, Role::HealthWorker, Role::Admin];

    /// Returns the wire name of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::HealthWorker => "health-worker",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AuthError::invalid_role(s))
    }
}

// =============================================================================
// Approval Status
// =============================================================================

/// Review state of a health-worker application.
///
/// `Pending` is the only non-terminal state. See [`ApprovalStatus::review`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// Submitted, awaiting an admin decision.
    Pending,
    /// Approved; the worker may sign in.
    Approved,
    /// Denied; sign-in is refused.
    Denied,
}

/// An admin's decision on a pending application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Approve the application.
    Approve,
    /// Deny the application with a reason shown to the worker.
    Deny {
        /// Why the application was denied.
        reason: String,
    },
}

impl ReviewDecision {
    /// Status the decision leads to.
    #[must_use]
    pub fn target(&self) -> ApprovalStatus {
        match self {
            Self::Approve => ApprovalStatus::Approved,
            Self::Deny { .. } => ApprovalStatus::Denied,
        }
    }

    /// Denial reason to store alongside the new status.
    #[must_use]
    pub fn denial_reason(&self) -> Option<&str> {
        match self {
            Self::Approve => None,
            Self::Deny { reason } => Some(reason),
        }
    }
}

impl ApprovalStatus {
    /// Returns the wire name of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }

    /// Applies a review decision.
    ///
    /// Only `pending` may be reviewed; reviewing a decided application fails
    /// with `InvalidTransition`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidTransition` if the status is terminal.
    pub fn review(self, decision: &ReviewDecision) -> AuthResult<ApprovalStatus> {
        match self {
            Self::Pending => Ok(decision.target()),
            current @ (Self::Approved | Self::Denied) => {
                Err(AuthError::InvalidTransition { current })
            }
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Account Id
// =============================================================================

/// Opaque account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generates a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AccountId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

// =============================================================================
// Profiles
// =============================================================================

/// Patient-specific fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Health-worker application fields plus review state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthWorkerProfile {
    pub name: String,
    pub phone: String,
    pub qualification: String,
    /// License or registration number issued by the health authority.
    pub license_number: String,
    pub workplace: String,
    pub district: String,
    pub village: String,
    pub years_of_experience: u32,
    pub specialization: String,
    /// Stored filename of the uploaded government ID.
    pub government_id_document: String,
    /// Stored filename of the uploaded credential proof.
    pub credential_document: String,
    pub status: ApprovalStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub applied_at: OffsetDateTime,
    /// Present only while `status` is `denied`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denial_reason: Option<String>,
}

impl HealthWorkerProfile {
    /// Moves the application to the decision's target status.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidTransition` if the application was already
    /// reviewed.
    pub fn apply(&mut self, decision: &ReviewDecision) -> AuthResult<()> {
        self.status = self.status.review(decision)?;
        self.denial_reason = decision.denial_reason().map(str::to_owned);
        Ok(())
    }
}

/// Admin fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub name: String,
}

/// Role-specific account data, tagged by role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "kebab-case")]
pub enum Profile {
    Patient(PatientProfile),
    HealthWorker(HealthWorkerProfile),
    Admin(AdminProfile),
}

impl Profile {
    /// The role this profile belongs to.
    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Self::Patient(_) => Role::Patient,
            Self::HealthWorker(_) => Role::HealthWorker,
            Self::Admin(_) => Role::Admin,
        }
    }

    /// Display name shown in the UI.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Patient(p) => &p.name,
            Self::HealthWorker(w) => &w.name,
            Self::Admin(a) => &a.name,
        }
    }

    /// Approval status, for health workers only.
    #[must_use]
    pub fn approval_status(&self) -> Option<ApprovalStatus> {
        match self {
            Self::HealthWorker(w) => Some(w.status),
            Self::Patient(_) | Self::Admin(_) => None,
        }
    }

    /// Returns the health-worker profile, if this is one.
    #[must_use]
    pub fn as_health_worker(&self) -> Option<&HealthWorkerProfile> {
        match self {
            Self::HealthWorker(w) => Some(w),
            _ => None,
        }
    }

    /// Mutable access to the health-worker profile, if this is one.
    pub fn as_health_worker_mut(&mut self) -> Option<&mut HealthWorkerProfile> {
        match self {
            Self::HealthWorker(w) => Some(w),
            _ => None,
        }
    }
}

// =============================================================================
// Account
// =============================================================================

/// A stored account, including its password hash.
///
/// Not `Serialize`. The only way out of the store towards a caller is
/// [`Account::view`].
#[derive(Clone)]
pub struct Account {
    pub id: AccountId,
    /// Unique identity, compared exactly as stored.
    pub email: String,
    /// PHC-formatted Argon2 hash.
    pub password_hash: String,
    pub profile: Profile,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Account {
    /// Creates a new account with a fresh id and both timestamps set to now.
    #[must_use]
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>, profile: Profile) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: AccountId::new(),
            email: email.into(),
            password_hash: password_hash.into(),
            profile,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.profile.role()
    }

    /// Returns the caller-facing view, without the password hash.
    #[must_use]
    pub fn view(&self) -> AccountView {
        AccountView {
            id: self.id.to_string(),
            email: self.email.clone(),
            profile: self.profile.clone(),
            origin: AccountOrigin::Stored,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Consumes the account into its caller-facing view.
    #[must_use]
    pub fn into_view(self) -> AccountView {
        AccountView {
            id: self.id.to_string(),
            email: self.email,
            profile: self.profile,
            origin: AccountOrigin::Stored,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("profile", &self.profile)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

// =============================================================================
// Account View
// =============================================================================

/// Where an authenticated admin identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountOrigin {
    /// Loaded from the credential store.
    Stored,
    /// The configured static operator credential.
    Static,
}

/// Account as returned to callers. Has no password hash field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub id: String,
    pub email: String,
    #[serde(flatten)]
    pub profile: Profile,
    pub origin: AccountOrigin,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Id reported for the synthetic static admin.
pub const STATIC_ADMIN_ID: &str = "static-admin";

impl AccountView {
    /// Builds the synthetic record for the static operator credential.
    #[must_use]
    pub fn static_admin(email: impl Into<String>, name: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: STATIC_ADMIN_ID.to_string(),
            email: email.into(),
            profile: Profile::Admin(AdminProfile { name: name.into() }),
            origin: AccountOrigin::Static,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.profile.role()
    }
}

// =============================================================================
// Tests
// =============================================================================
