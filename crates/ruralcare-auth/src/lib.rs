//! # ruralcare-auth
//!
//! Identity and access control core for the RuralCare coordination app.
//!
//! This crate provides:
//! - A credential store interface with an in-memory implementation
//! - Argon2id password hashing
//! - Role-aware registration for patients and health workers
//! - General and admin-only login with role and state gating
//! - The health-worker approval workflow
//! - Idempotent singleton admin bootstrap
//!
//! ## Modules
//!
//! - [`config`] - Identity configuration (static admin, bootstrap admin, timeouts)
//! - [`types`] - Accounts, roles, profiles and approval status
//! - [`storage`] - Credential store trait and implementations
//! - [`password`] - Password hashing and verification
//! - [`registration`] - Account sign-up
//! - [`authentication`] - Login entry points
//! - [`approval`] - Health-worker review
//! - [`bootstrap`] - Admin bootstrap
//! - [`service`] - Facade over all of the above

pub mod approval;
pub mod authentication;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod password;
pub mod registration;
pub mod service;
pub mod storage;
pub mod types;

pub use approval::ApprovalWorkflow;
pub use authentication::AuthenticationService;
pub use bootstrap::{BootstrapInitializer, BootstrapOutcome};
pub use config::{AuthConfig, BootstrapAdminConfig, ConfigError, StaticAdminCredential};
pub use error::{AuthError, ErrorCategory};
pub use password::PasswordHasher;
pub use registration::{RegistrationForm, RegistrationRequest, RegistrationService};
pub use service::IdentityService;
pub use storage::{CredentialStore, DeadlineStore, InMemoryCredentialStore};
pub use types::{
    Account, AccountId, AccountOrigin, AccountView, AdminProfile, ApprovalStatus,
    HealthWorkerProfile, PatientProfile, Profile, ReviewDecision, Role,
};

/// Type alias for identity operation results.
pub type AuthResult<T> = Result<T, AuthError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use ruralcare_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthResult;
    pub use crate::config::AuthConfig;
    pub use crate::error::AuthError;
    pub use crate::registration::{RegistrationForm, RegistrationRequest};
    pub use crate::service::IdentityService;
    pub use crate::storage::{CredentialStore, InMemoryCredentialStore};
    pub use crate::types::{AccountId, AccountView, ApprovalStatus, Role};
}
