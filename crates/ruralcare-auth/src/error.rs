//! Identity and access control error types.
//!
//! Every operation of the identity core returns one of these kinds to its
//! immediate caller. Each kind maps to a fixed, non-leaking public message;
//! the free-form detail carried by infrastructure variants is meant for logs
//! only.

use std::fmt;

use crate::types::ApprovalStatus;

/// Errors that can occur during registration, authentication and review.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Email or password was empty.
    #[error("Email and password are required")]
    MissingCredentials,

    /// The requested role is not one of the known roles.
    #[error("Invalid role: {role}")]
    InvalidRole {
        /// The rejected role string.
        role: String,
    },

    /// Admin accounts cannot be created through self-registration.
    #[error("Admin accounts cannot be self-registered")]
    AdminRegistrationForbidden,

    /// The password is shorter than the configured minimum.
    #[error("Password must be at least {min_length} characters")]
    WeakPassword {
        /// Minimum accepted length in characters.
        min_length: usize,
    },

    /// An account with the same identity already exists.
    #[error("An account with this email already exists")]
    DuplicateIdentity,

    /// An admin account already exists; a second one cannot be stored.
    #[error("An admin account already exists")]
    AdminExists,

    /// Unknown identity or wrong password. The two are never distinguished.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// An admin tried to sign in through the general login.
    #[error("Admin accounts must use the admin login")]
    UseAdminEndpoint,

    /// The account exists but has a different role than the caller expected.
    #[error("Role mismatch: expected {expected}, account is {actual}")]
    RoleMismatch {
        /// Role the caller asked for.
        expected: String,
        /// Role of the stored account.
        actual: String,
    },

    /// The identity exists but is not allowed through the admin login.
    #[error("Access denied")]
    AccessDenied,

    /// Health-worker account is still awaiting review.
    #[error("Account is pending approval")]
    PendingApproval,

    /// Health-worker account was denied during review.
    #[error("Account application was denied")]
    AccountDenied,

    /// No account of the expected role has the given id.
    #[error("Not found: {what}")]
    NotFound {
        /// Description of the missing target.
        what: String,
    },

    /// A denial was requested without a reason.
    #[error("A denial reason is required")]
    MissingReason,

    /// The account is not in the state the transition starts from.
    #[error("Invalid transition: account is already {current}")]
    InvalidTransition {
        /// The status the account currently has.
        current: ApprovalStatus,
    },

    /// The credential store could not be reached or timed out.
    #[error("Credential store unavailable: {message}")]
    StoreUnavailable {
        /// Description of the infrastructure failure.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidRole` error.
    #[must_use]
    pub fn invalid_role(role: impl Into<String>) -> Self {
        Self::InvalidRole { role: role.into() }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Creates a new `StoreUnavailable` error.
    #[must_use]
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if the caller may retry the same request later.
    ///
    /// Only transient infrastructure failures qualify.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::StoreUnavailable { .. } | Self::Internal { .. }
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        !self.is_client_error()
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingCredentials
            | Self::InvalidRole { .. }
            | Self::AdminRegistrationForbidden
            | Self::WeakPassword { .. } => ErrorCategory::Validation,
            Self::DuplicateIdentity | Self::AdminExists => ErrorCategory::Conflict,
            Self::InvalidCredentials => ErrorCategory::Authentication,
            Self::UseAdminEndpoint | Self::RoleMismatch { .. } | Self::AccessDenied => {
                ErrorCategory::Authorization
            }
            Self::PendingApproval | Self::AccountDenied => ErrorCategory::AccountState,
            Self::NotFound { .. } | Self::MissingReason | Self::InvalidTransition { .. } => {
                ErrorCategory::Workflow
            }
            Self::StoreUnavailable { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the stable machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing_credentials",
            Self::InvalidRole { .. } => "invalid_role",
            Self::AdminRegistrationForbidden => "admin_registration_forbidden",
            Self::WeakPassword { .. } => "weak_password",
            Self::DuplicateIdentity => "duplicate_identity",
            Self::AdminExists => "admin_exists",
            Self::InvalidCredentials => "invalid_credentials",
            Self::UseAdminEndpoint => "use_admin_endpoint",
            Self::RoleMismatch { .. } => "role_mismatch",
            Self::AccessDenied => "access_denied",
            Self::PendingApproval => "pending_approval",
            Self::AccountDenied => "account_denied",
            Self::NotFound { .. } => "not_found",
            Self::MissingReason => "missing_reason",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::StoreUnavailable { .. } => "store_unavailable",
            Self::Internal { .. } => "internal_error",
        }
    }

    /// Returns the message shown to end callers.
    ///
    /// Never contains store internals, hashes or secrets.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::StoreUnavailable { .. } => {
                "Service temporarily unavailable, please retry later".to_string()
            }
            Self::Internal { .. } => "An internal error occurred".to_string(),
            Self::NotFound { .. } => "Health worker not found".to_string(),
            Self::RoleMismatch { .. } => {
                "Account role does not match the requested role".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Categories of identity errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Registration input errors.
    Validation,
    /// Uniqueness violations.
    Conflict,
    /// Bad or unknown credentials.
    Authentication,
    /// Structural role errors.
    Authorization,
    /// Health-worker state gating.
    AccountState,
    /// Approval workflow target/input errors.
    Workflow,
    /// Store availability errors.
    Infrastructure,
    /// Internal errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Conflict => write!(f, "conflict"),
            Self::Authentication => write!(f, "authentication"),
            Self::Authorization => write!(f, "authorization"),
            Self::AccountState => write!(f, "account_state"),
            Self::Workflow => write!(f, "workflow"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
