//! JSON REST adapter (axum).
//!
//! Exposes the bucket/trade operations over HTTP with session-cookie
//! authentication in front of the `/api` surface.

mod auth;
mod error;
mod handlers;

pub use auth::{AuthSession, Backend, Credentials, User};
pub use error::ApiError;
pub use handlers::*;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post, put},
};
use axum_login::{AuthManagerLayerBuilder, login_required};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::Key};

use crate::domain::error::TradebucketsError;
use crate::ports::bucket_store_port::BucketStorePort;
use crate::ports::config_port::ConfigPort;

pub struct AppState {
    pub store: Arc<dyn BucketStorePort + Send + Sync>,
    pub config: Arc<dyn ConfigPort + Send + Sync>,
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/buckets",
            get(handlers::list_buckets).post(handlers::create_bucket),
        )
        .route("/api/buckets/{bucket_id}", get(handlers::get_bucket))
        .route(
            "/api/buckets/{bucket_id}/trades",
            post(handlers::add_trade),
        )
        .route(
            "/api/buckets/{bucket_id}/trades/{trade_id}",
            put(handlers::update_trade),
        )
}

/// Build the full router: API routes behind `login_required`, session and
/// auth layers from the `[auth]` config section, CORS for the frontend
/// origin, and request tracing.
pub fn build_router(state: AppState) -> Result<Router, TradebucketsError> {
    let backend = Backend::from_config(&*state.config)?;

    let session_secret = state
        .config
        .get_string("auth", "session_secret")
        .ok_or_else(|| TradebucketsError::ConfigMissing {
            section: "auth".into(),
            key: "session_secret".into(),
        })?;
    let session_lifetime = state.config.get_int("auth", "session_lifetime", 86400);

    let secret = hex::decode(&session_secret).map_err(|_| TradebucketsError::ConfigInvalid {
        section: "auth".into(),
        key: "session_secret".into(),
        reason: "must be a hex string".into(),
    })?;
    if secret.len() < 64 {
        return Err(TradebucketsError::ConfigInvalid {
            section: "auth".into(),
            key: "session_secret".into(),
            reason: "must decode to at least 64 bytes".into(),
        });
    }
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(
            session_lifetime,
        )))
        .with_signed(Key::from(&secret));
    let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

    let cors_origin = state
        .config
        .get_string("web", "cors_origin")
        .unwrap_or_else(|| "http://localhost:5173".to_string());
    let origin: HeaderValue =
        cors_origin
            .parse()
            .map_err(|_| TradebucketsError::ConfigInvalid {
                section: "web".into(),
                key: "cors_origin".into(),
                reason: "not a valid header value".into(),
            })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let router = Router::new()
        .merge(api_routes().route_layer(login_required!(Backend, login_url = "/login")))
        .route("/health", get(handlers::health))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .layer(auth_layer)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state));

    Ok(router)
}

/// Router without the session/auth stack, for exercising handlers directly.
pub fn build_test_router(state: AppState) -> Router {
    Router::new()
        .merge(api_routes())
        .route("/health", get(handlers::health))
        .with_state(Arc::new(state))
}
