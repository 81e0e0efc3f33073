//! End-to-end identity flows over the in-memory credential store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ruralcare_auth::prelude::*;
use ruralcare_auth::{
    Account, AccountId, AccountOrigin, AuthResult, BootstrapOutcome, DeadlineStore,
    ReviewDecision, StaticAdminCredential,
};

fn service() -> (Arc<InMemoryCredentialStore>, IdentityService) {
    service_with(AuthConfig::default())
}

fn service_with(config: AuthConfig) -> (Arc<InMemoryCredentialStore>, IdentityService) {
    let store = Arc::new(InMemoryCredentialStore::new());
    let service = IdentityService::new(store.clone(), &config);
    (store, service)
}

fn health_worker(email: &str) -> RegistrationRequest {
    RegistrationRequest::new("health-worker", email, "secret1").with_form(RegistrationForm {
        name: Some("Asha Devi".into()),
        phone: Some("+91-9000000000".into()),
        qualification: Some("ANM".into()),
        license_number: Some("LIC-42".into()),
        workplace: Some("PHC Rampur".into()),
        district: Some("Sitapur".into()),
        village: Some("Rampur".into()),
        years_of_experience: Some(4),
        specialization: Some("Maternal care".into()),
        government_id_document: Some("aadhaar.pdf".into()),
        credential_document: Some("anm-cert.pdf".into()),
        ..Default::default()
    })
}

fn worker_id(view: &AccountView) -> AccountId {
    view.id.parse().unwrap()
}

#[tokio::test]
async fn patient_registers_and_logs_in() {
    let (_, service) = service();

    let registered = service
        .register(RegistrationRequest::new("patient", "a@x.com", "secret1"))
        .await
        .unwrap();
    assert_eq!(registered.role(), Role::Patient);

    let view = service
        .login("a@x.com", "secret1", Some(Role::Patient))
        .await
        .unwrap();
    assert_eq!(view.role(), Role::Patient);
    assert_eq!(view.id, registered.id);
}

#[tokio::test]
async fn health_worker_lifecycle() {
    let (_, service) = service();

    let b = service.register(health_worker("b@x.com")).await.unwrap();
    let err = service.login("b@x.com", "secret1", None).await.unwrap_err();
    assert!(matches!(err, AuthError::PendingApproval));

    let pending = service.list_pending_workers().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].email, "b@x.com");

    service.approve_worker(worker_id(&b)).await.unwrap();
    let view = service
        .login("b@x.com", "secret1", Some(Role::HealthWorker))
        .await
        .unwrap();
    assert_eq!(
        view.profile.approval_status(),
        Some(ApprovalStatus::Approved)
    );
    assert!(service.list_pending_workers().await.unwrap().is_empty());
}

#[tokio::test]
async fn denied_worker_stays_denied() {
    let (_, service) = service();

    let c = service.register(health_worker("c@x.com")).await.unwrap();
    let id = worker_id(&c);

    let denied = service.deny_worker(id, "bad license").await.unwrap();
    let profile = denied.profile.as_health_worker().unwrap();
    assert_eq!(profile.denial_reason.as_deref(), Some("bad license"));

    let err = service.login("c@x.com", "secret1", None).await.unwrap_err();
    assert!(matches!(err, AuthError::AccountDenied));

    let err = service.approve_worker(id).await.unwrap_err();
    assert!(matches!(
        err,
        AuthError::InvalidTransition {
            current: ApprovalStatus::Denied
        }
    ));

    let err = service.login("c@x.com", "secret1", None).await.unwrap_err();
    assert!(matches!(err, AuthError::AccountDenied));
    assert_eq!(
        service
            .list_workers(ApprovalStatus::Denied)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn static_admin_mismatch_without_stored_admin() {
    let config = AuthConfig {
        static_admin: Some(StaticAdminCredential::new("ops@x", "op-secret")),
        ..Default::default()
    };
    let (_, service) = service_with(config);

    let err = service.admin_login("admin@x", "wrongpass").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn roles_are_separated() {
    let (_, service) = service();
    service.ensure_admin_exists().await;
    service
        .register(RegistrationRequest::new("patient", "a@x.com", "secret1"))
        .await
        .unwrap();

    let err = service.admin_login("a@x.com", "secret1").await.unwrap_err();
    assert!(matches!(err, AuthError::AccessDenied));

    let err = service
        .login("admin@ruralcare.local", "admin123", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UseAdminEndpoint));

    let admin = service
        .admin_login("admin@ruralcare.local", "admin123")
        .await
        .unwrap();
    assert_eq!(admin.origin, AccountOrigin::Stored);
}

#[tokio::test]
async fn admin_cannot_self_register() {
    let (store, service) = service();

    let err = service
        .register(RegistrationRequest::new("admin", "x@x.com", "secret1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AdminRegistrationForbidden));
    assert!(store.is_empty());
}

#[tokio::test]
async fn concurrent_registrations_of_one_identity() {
    let (store, service) = service();

    let attempts = (0..8).map(|_| {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .register(RegistrationRequest::new("patient", "same@x.com", "secret1"))
                .await
        })
    });

    let mut ok = 0;
    for handle in attempts {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(AuthError::DuplicateIdentity) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(ok, 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn concurrent_bootstrap_creates_one_admin() {
    let (store, service) = service();

    let runs = (0..6).map(|_| {
        let service = service.clone();
        tokio::spawn(async move { service.ensure_admin_exists().await })
    });

    let mut created = 0;
    for handle in runs {
        let outcome = handle.await.unwrap();
        assert!(outcome.admin_exists());
        if matches!(outcome, BootstrapOutcome::Created(_)) {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    let admins = store
        .find_by_role_and_status(Role::Admin, None)
        .await
        .unwrap();
    assert_eq!(admins.len(), 1);
}

#[tokio::test]
async fn success_payloads_never_carry_the_hash() {
    let config = AuthConfig {
        static_admin: Some(StaticAdminCredential::new("ops@x", "op-secret")),
        ..Default::default()
    };
    let (_, service) = service_with(config);
    service.ensure_admin_exists().await;

    let mut payloads = vec![
        service
            .register(RegistrationRequest::new("patient", "a@x.com", "secret1"))
            .await
            .unwrap(),
        service.register(health_worker("b@x.com")).await.unwrap(),
        service.login("a@x.com", "secret1", None).await.unwrap(),
        service
            .admin_login("admin@ruralcare.local", "admin123")
            .await
            .unwrap(),
        service.admin_login("ops@x", "op-secret").await.unwrap(),
    ];
    payloads.extend(service.list_pending_workers().await.unwrap());

    for view in payloads {
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("passwordHash"), "{json}");
        assert!(!json.contains("$argon2"), "{json}");
        assert!(!json.contains("secret1"), "{json}");
    }
}

/// Store whose every call stalls.
struct StalledStore;

#[async_trait]
impl CredentialStore for StalledStore {
    async fn find_by_identity(&self, _email: &str) -> AuthResult<Option<Account>> {
        std::future::pending().await
    }

    async fn find_by_id(&self, _id: AccountId) -> AuthResult<Option<Account>> {
        std::future::pending().await
    }

    async fn find_by_role_and_status(
        &self,
        _role: Role,
        _status: Option<ApprovalStatus>,
    ) -> AuthResult<Vec<Account>> {
        std::future::pending().await
    }

    async fn insert(&self, _account: &Account) -> AuthResult<AccountId> {
        std::future::pending().await
    }

    async fn update_status(
        &self,
        _id: AccountId,
        _expected_role: Role,
        _decision: ReviewDecision,
    ) -> AuthResult<Account> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn stalled_store_is_unavailable_but_static_admin_works() {
    let config = AuthConfig {
        static_admin: Some(StaticAdminCredential::new("ops@x", "op-secret")),
        ..Default::default()
    };
    let store = Arc::new(DeadlineStore::new(StalledStore, Duration::from_millis(20)));
    let service = IdentityService::new(store, &config);

    let err = service.login("a@x.com", "secret1", None).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(matches!(err, AuthError::StoreUnavailable { .. }));

    let view = service.admin_login("ops@x", "op-secret").await.unwrap();
    assert_eq!(view.origin, AccountOrigin::Static);

    assert_eq!(service.ensure_admin_exists().await, BootstrapOutcome::Failed);
}
