//! Admin Basic-auth extractor.
//!
//! Admin endpoints carry the admin's email and password on every request as
//! HTTP Basic credentials; no session or token is issued. The credentials go
//! through the same admin login as `POST /auth/admin/login`, so the static
//! operator credential works here too.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use ruralcare_auth::{AccountView, AuthError, IdentityService};

use crate::error::ApiError;

/// The authenticated admin.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    pub admin: AccountView,
}

impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
    IdentityService: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = IdentityService::from_ref(state);

        let (email, password) = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|header| {
                parse_basic_auth(header)
                    .inspect_err(|reason| tracing::debug!(reason, "Malformed admin credentials"))
                    .ok()
            })
            .ok_or_else(|| ApiError::from(AuthError::InvalidCredentials).with_challenge())?;

        let admin = identity
            .admin_login(&email, &password)
            .await
            .map_err(|e| ApiError::from(e).with_challenge())?;

        tracing::debug!(
            admin_id = %admin.id,
            endpoint = %parts.uri.path(),
            method = %parts.method,
            "Admin authenticated via Basic Auth"
        );

        Ok(AdminAuth { admin })
    }
}

/// Parse Basic Auth header.
///
/// Extracts credentials from "Basic <base64>" format.
fn parse_basic_auth(header: &str) -> Result<(String, String), &'static str> {
    let credentials = header
        .strip_prefix("Basic ")
        .ok_or("Authorization header must start with 'Basic '")?;

    let decoded = STANDARD
        .decode(credentials.trim())
        .map_err(|_| "Invalid base64 encoding in Authorization header")?;

    let credentials_str =
        String::from_utf8(decoded).map_err(|_| "Invalid UTF-8 in decoded credentials")?;

    let (email, password) = credentials_str
        .split_once(':')
        .ok_or("Credentials must be in format 'email:password'")?;

    Ok((email.to_string(), password.to_string()))
}
