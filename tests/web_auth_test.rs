//! Session authentication tests.
//!
//! Tests cover:
//! - API routes rejecting unauthenticated requests (redirect to /login)
//! - Login with wrong/right credentials, session cookie issuance
//! - Authenticated access with the session cookie
//! - Logout invalidating the session
//! - Router construction failing on incomplete auth config

mod common;

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use rand::rngs::OsRng;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;
use tradebuckets::adapters::web::{AppState, build_router};
use tradebuckets::domain::error::TradebucketsError;

use common::*;

const TEST_USERNAME: &str = "testuser";
const TEST_PASSWORD: &str = "hunter2hunter2";
const SESSION_SECRET: &str = "0000000000000000000000000000000100000000000000000000000000000001\
0000000000000000000000000000000100000000000000000000000000000001";

fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

fn auth_config() -> MockConfigPort {
    MockConfigPort::empty()
        .with("auth", "username", TEST_USERNAME)
        .with("auth", "password_hash", &hash_password(TEST_PASSWORD))
        .with("auth", "session_secret", SESSION_SECRET)
        .with("auth", "session_lifetime", "86400")
}

fn create_auth_app() -> Router {
    let state = AppState {
        store: Arc::new(MockBucketStore::new()),
        config: Arc::new(auth_config()),
    };
    build_router(state).unwrap()
}

fn extract_cookies(response: &axum::http::Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

fn build_cookie_header(set_cookies: &[String]) -> String {
    set_cookies
        .iter()
        .map(|sc| sc.split(';').next().unwrap_or("").to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn login_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": username, "password": password }).to_string(),
        ))
        .unwrap()
}

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn unauthenticated_api_access_redirects_to_login() {
        let app = create_auth_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/buckets")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        // login_required! returns 307 Temporary Redirect with ?next= query param
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        let location = response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(
            location.starts_with("/login"),
            "should redirect to /login, got: {location}"
        );
    }

    #[tokio::test]
    async fn health_accessible_without_auth() {
        let app = create_auth_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn login_with_correct_credentials_sets_session_cookie() {
        let app = create_auth_app();

        let response = app
            .oneshot(login_request(TEST_USERNAME, TEST_PASSWORD))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let cookies = extract_cookies(&response);
        assert!(!cookies.is_empty(), "login should set a session cookie");
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let app = create_auth_app();

        let response = app
            .oneshot(login_request(TEST_USERNAME, "wrongpassword"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Invalid username or password");
    }

    #[tokio::test]
    async fn login_with_wrong_username_is_unauthorized() {
        let app = create_auth_app();

        let response = app
            .oneshot(login_request("wronguser", TEST_PASSWORD))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn authenticated_user_can_access_api() {
        let app = create_auth_app();

        let login_resp = app
            .clone()
            .oneshot(login_request(TEST_USERNAME, TEST_PASSWORD))
            .await
            .unwrap();
        assert_eq!(login_resp.status(), StatusCode::OK);
        let cookie_header = build_cookie_header(&extract_cookies(&login_resp));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/buckets")
                    .header(header::COOKIE, cookie_header)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn logout_invalidates_session() {
        let app = create_auth_app();

        let login_resp = app
            .clone()
            .oneshot(login_request(TEST_USERNAME, TEST_PASSWORD))
            .await
            .unwrap();
        let cookie_header = build_cookie_header(&extract_cookies(&login_resp));

        let logout_resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/logout")
                    .header(header::COOKIE, cookie_header.clone())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(logout_resp.status(), StatusCode::OK);

        // Old cookie no longer authenticates (307 from login_required!)
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/buckets")
                    .header(header::COOKIE, cookie_header)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    }
}

mod router_config_tests {
    use super::*;

    #[test]
    fn missing_auth_section_fails_router_construction() {
        let state = AppState {
            store: Arc::new(MockBucketStore::new()),
            config: Arc::new(MockConfigPort::empty()),
        };
        match build_router(state) {
            Err(TradebucketsError::ConfigMissing { section, key }) => {
                assert_eq!(section, "auth");
                assert_eq!(key, "username");
            }
            other => panic!("expected ConfigMissing, got: {other:?}"),
        }
    }

    #[test]
    fn short_session_secret_is_rejected() {
        let config = MockConfigPort::empty()
            .with("auth", "username", TEST_USERNAME)
            .with("auth", "password_hash", "x")
            .with("auth", "session_secret", "deadbeef");
        let state = AppState {
            store: Arc::new(MockBucketStore::new()),
            config: Arc::new(config),
        };
        match build_router(state) {
            Err(TradebucketsError::ConfigInvalid { section, key, .. }) => {
                assert_eq!(section, "auth");
                assert_eq!(key, "session_secret");
            }
            other => panic!("expected ConfigInvalid, got: {other:?}"),
        }
    }
}
