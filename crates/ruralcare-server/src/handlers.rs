use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use ruralcare_auth::{
    AccountId, AccountView, ApprovalStatus, AuthError, IdentityService, RegistrationRequest, Role,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::extractors::AdminAuth;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub commit: &'static str,
}

pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            commit: env!("GIT_COMMIT"),
        }),
    )
}

// =============================================================================
// Public authentication
// =============================================================================

pub async fn register(
    State(identity): State<IdentityService>,
    Json(request): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<AccountView>), ApiError> {
    let account = identity.register(request).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Role the client expects the account to have.
    pub expected_role: Option<String>,
}

pub async fn login(
    State(identity): State<IdentityService>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AccountView>, ApiError> {
    let expected_role = request
        .expected_role
        .as_deref()
        .filter(|role| !role.is_empty())
        .map(str::parse::<Role>)
        .transpose()?;

    let account = identity
        .login(&request.email, &request.password, expected_role)
        .await?;
    Ok(Json(account))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn admin_login(
    State(identity): State<IdentityService>,
    Json(request): Json<AdminLoginRequest>,
) -> Result<Json<AccountView>, ApiError> {
    let account = identity
        .admin_login(&request.email, &request.password)
        .await?;
    Ok(Json(account))
}

// =============================================================================
// Admin review
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ListWorkersQuery {
    /// Defaults to `pending`.
    pub status: Option<ApprovalStatus>,
}

pub async fn list_health_workers(
    _admin: AdminAuth,
    State(identity): State<IdentityService>,
    Query(query): Query<ListWorkersQuery>,
) -> Result<Json<Vec<AccountView>>, ApiError> {
    let status = query.status.unwrap_or(ApprovalStatus::Pending);
    let workers = identity.list_workers(status).await?;
    Ok(Json(workers))
}

pub async fn approve_health_worker(
    AdminAuth { admin }: AdminAuth,
    State(identity): State<IdentityService>,
    Path(id): Path<String>,
) -> Result<Json<AccountView>, ApiError> {
    let worker_id = parse_worker_id(&id)?;
    let worker = identity.approve_worker(worker_id).await?;
    tracing::info!(admin_id = %admin.id, worker_id = %worker_id, "Health worker approved");
    Ok(Json(worker))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DenyRequest {
    pub reason: String,
}

pub async fn deny_health_worker(
    AdminAuth { admin }: AdminAuth,
    State(identity): State<IdentityService>,
    Path(id): Path<String>,
    body: Result<Json<DenyRequest>, JsonRejection>,
) -> Result<Json<AccountView>, ApiError> {
    let worker_id = parse_worker_id(&id)?;
    let reason = deny_reason(body);
    let worker = identity.deny_worker(worker_id, &reason).await?;
    tracing::info!(admin_id = %admin.id, worker_id = %worker_id, "Health worker denied");
    Ok(Json(worker))
}

/// A missing or unreadable body carries no reason.
fn deny_reason(body: Result<Json<DenyRequest>, JsonRejection>) -> String {
    match body {
        Ok(Json(request)) => request.reason,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Deny request without a usable body");
            String::new()
        }
    }
}

/// A malformed id cannot name any worker.
fn parse_worker_id(raw: &str) -> Result<AccountId, AuthError> {
    raw.parse()
        .map_err(|_| AuthError::not_found(format!("health worker {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_worker_id() {
        let id = AccountId::new();
        assert_eq!(parse_worker_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_worker_id("not-a-uuid"),
            Err(AuthError::NotFound { .. })
        ));
    }

    #[test]
    fn test_login_request_accepts_missing_role() {
        let request: LoginRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"secret1"}"#).unwrap();
        assert!(request.expected_role.is_none());

        let request: LoginRequest = serde_json::from_str(
            r#"{"email":"a@x.com","password":"secret1","expectedRole":"health-worker"}"#,
        )
        .unwrap();
        assert_eq!(request.expected_role.as_deref(), Some("health-worker"));
    }
}
