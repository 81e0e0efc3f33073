use std::net::SocketAddr;

use axum::{
    Router,
    extract::FromRef,
    middleware,
    routing::{get, post},
};
use ruralcare_auth::{BootstrapOutcome, IdentityService};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{config::AppConfig, handlers, middleware as app_middleware, storage};

/// Shared handler state.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub identity: IdentityService,
}

impl AppState {
    pub fn new(identity: IdentityService) -> Self {
        Self { identity }
    }
}

pub struct RuralcareServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(state: AppState, cfg: &AppConfig) -> Router {
    let body_limit = cfg.server.body_limit_bytes;

    let admin = Router::new()
        .route("/health-workers", get(handlers::list_health_workers))
        .route(
            "/health-workers/{id}/approve",
            post(handlers::approve_health_worker),
        )
        .route(
            "/health-workers/{id}/deny",
            post(handlers::deny_health_worker),
        );

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/admin/login", post(handlers::admin_login))
        .nest("/admin", admin)
        .with_state(state)
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri().path(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        // Outermost, so the trace span sees the request id.
        .layer(middleware::from_fn(app_middleware::request_id))
}

pub struct ServerBuilder {
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.config = cfg;
        self
    }

    /// Opens the store, runs the admin bootstrap and builds the router.
    ///
    /// A failed bootstrap is logged and does not stop the server.
    pub async fn build(self) -> anyhow::Result<RuralcareServer> {
        let store = storage::open_store(&self.config.storage, &self.config.auth).await?;
        let identity = IdentityService::new(store, &self.config.auth);

        match identity.ensure_admin_exists().await {
            BootstrapOutcome::Created(id) => tracing::info!(admin_id = %id, "Admin bootstrapped"),
            BootstrapOutcome::Failed => {
                tracing::warn!("No admin account could be ensured; static admin only")
            }
            BootstrapOutcome::AlreadyPresent | BootstrapOutcome::LostRace => {}
        }

        let app = build_app(AppState::new(identity), &self.config);
        Ok(RuralcareServer {
            addr: self.config.addr(),
            app,
        })
    }
}

impl RuralcareServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header::AUTHORIZATION};
    use base64::{Engine, engine::general_purpose::STANDARD};
    use ruralcare_auth::{AccountId, InMemoryCredentialStore, StaticAdminCredential};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        let config = AppConfig::default();
        let store = Arc::new(InMemoryCredentialStore::new());
        let identity = IdentityService::new(store, &config.auth);
        build_app(AppState::new(identity), &config)
    }

    #[tokio::test]
    async fn test_healthz_sets_request_id() {
        let response = app()
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .contains_key(app_middleware::REQUEST_ID_HEADER)
        );
    }

    #[tokio::test]
    async fn test_request_id_is_preserved() {
        let response = app()
            .oneshot(
                Request::get("/healthz")
                    .header(app_middleware::REQUEST_ID_HEADER, "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers()[app_middleware::REQUEST_ID_HEADER],
            "abc-123"
        );
    }

    #[tokio::test]
    async fn test_admin_routes_require_credentials() {
        let response = app()
            .oneshot(
                Request::get("/admin/health-workers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key("www-authenticate"));
    }

    #[tokio::test]
    async fn test_deny_without_body_is_missing_reason() {
        let mut config = AppConfig::default();
        config.auth.static_admin = Some(StaticAdminCredential::new("ops@x", "op-secret"));
        let store = Arc::new(InMemoryCredentialStore::new());
        let identity = IdentityService::new(store, &config.auth);
        let app = build_app(AppState::new(identity), &config);

        let credentials = STANDARD.encode("ops@x:op-secret");
        let response = app
            .oneshot(
                Request::post(format!("/admin/health-workers/{}/deny", AccountId::new()))
                    .header(AUTHORIZATION, format!("Basic {credentials}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "missing_reason");
        assert!(json["message"].is_string());
    }
}
