//! Domain types shared by the identity services.
//!
//! - [`Account`] - stored record, including the password hash
//! - [`AccountView`] - caller-facing record, without the hash
//! - [`Profile`] - role-specific fields as a closed variant set
//! - [`ApprovalStatus`] - health-worker review state machine

pub mod account;

pub use account::{
    Account, AccountId, AccountOrigin, AccountView, AdminProfile, ApprovalStatus,
    HealthWorkerProfile, PatientProfile, Profile, ReviewDecision, Role, STATIC_ADMIN_ID,
};
