//! HTTP error responses.
//!
//! Every failure leaves the server as `{ "error": code, "message": text }`
//! with a status derived from the identity error kind. The message is the
//! fixed public text; infrastructure details are logged here and dropped.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use ruralcare_auth::AuthError;
use serde::Serialize;

/// Realm announced on admin Basic-auth challenges.
pub const ADMIN_REALM: &str = "Basic realm=\"ruralcare-admin\", charset=\"UTF-8\"";

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// Identity error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    inner: AuthError,
    challenge: bool,
}

impl ApiError {
    /// Adds a Basic-auth challenge to 401 responses.
    #[must_use]
    pub fn with_challenge(mut self) -> Self {
        self.challenge = true;
        self
    }

    #[must_use]
    pub fn kind(&self) -> &AuthError {
        &self.inner
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        status_for(&self.inner)
    }
}

impl From<AuthError> for ApiError {
    fn from(inner: AuthError) -> Self {
        Self {
            inner,
            challenge: false,
        }
    }
}

/// HTTP status for an identity error.
pub fn status_for(error: &AuthError) -> StatusCode {
    match error {
        AuthError::MissingCredentials
        | AuthError::InvalidRole { .. }
        | AuthError::WeakPassword { .. }
        | AuthError::MissingReason => StatusCode::BAD_REQUEST,
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::AdminRegistrationForbidden
        | AuthError::UseAdminEndpoint
        | AuthError::RoleMismatch { .. }
        | AuthError::AccessDenied
        | AuthError::PendingApproval
        | AuthError::AccountDenied => StatusCode::FORBIDDEN,
        AuthError::NotFound { .. } => StatusCode::NOT_FOUND,
        AuthError::DuplicateIdentity
        | AuthError::AdminExists
        | AuthError::InvalidTransition { .. } => StatusCode::CONFLICT,
        AuthError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AuthError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.inner.is_server_error() {
            tracing::error!(
                error = %self.inner,
                category = ?self.inner.category(),
                "Request failed"
            );
        } else {
            tracing::debug!(code = self.inner.code(), "Request rejected");
        }

        let body = ErrorBody {
            error: self.inner.code(),
            message: self.inner.public_message(),
        };
        let mut response = (status, Json(body)).into_response();

        let headers = response.headers_mut();
        if self.challenge && status == StatusCode::UNAUTHORIZED {
            headers.insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(ADMIN_REALM),
            );
        }
        if self.inner.is_retryable() {
            headers.insert(header::RETRY_AFTER, HeaderValue::from_static("5"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ruralcare_auth::ApprovalStatus;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&AuthError::MissingCredentials),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&AuthError::AdminRegistrationForbidden),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&AuthError::DuplicateIdentity),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&AuthError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&AuthError::PendingApproval),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&AuthError::not_found("health worker")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&AuthError::InvalidTransition {
                current: ApprovalStatus::Approved
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&AuthError::store_unavailable("pool timed out")),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&AuthError::internal("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_challenge_only_on_unauthorized() {
        let response = ApiError::from(AuthError::InvalidCredentials)
            .with_challenge()
            .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

        let response = ApiError::from(AuthError::AccessDenied)
            .with_challenge()
            .into_response();
        assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[test]
    fn test_unavailable_sets_retry_after() {
        let response = ApiError::from(AuthError::store_unavailable("timeout")).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
    }
}
