pub mod auth;
pub mod testing;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for public endpoints (no auth required)
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/test/unauthed-ping",
            get(testing::unauthed_ping::unauthed_ping),
        )
        .route("/api/auth/signup", post(auth::signup::signup))
        // Path used by the original web client.
        .route("/api/auth/register", post(auth::signup::signup))
        .route("/api/auth/login", post(auth::login::login))
        .route(
            "/api/auth/forgot-password",
            post(auth::forgot_password::forgot_password),
        )
        .route(
            "/api/auth/reset-password",
            post(auth::reset_password::reset_password),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::forgot_password::forgot_password,
        auth::login::login,
        auth::reset_password::reset_password,
        auth::signup::signup,
        testing::unauthed_ping::unauthed_ping,
    ),
    components(schemas(
        auth::forgot_password::ForgotPasswordRequest,
        auth::forgot_password::ForgotPasswordResponse,
        auth::login::LoginRequest,
        auth::login::LoginResponse,
        auth::reset_password::ResetPasswordRequest,
        auth::reset_password::ResetPasswordResponse,
        auth::signup::SignupRequest,
        auth::signup::SignupResponse,
        testing::unauthed_ping::UnauthedPingResponse,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use potluck_core::{LocalDiskStore, MediaBackend, MediaResolver, StagingArea};
    use serde_json::{json, Value};

    // Every request here is rejected before a database connection is needed.
    fn server() -> (tempfile::TempDir, TestServer) {
        let tmp = tempfile::tempdir().unwrap();
        let media = MediaResolver::new(
            MediaBackend::Local(LocalDiskStore::new(tmp.path().join("uploads"))),
            StagingArea::new(tmp.path().join("staging")),
        );
        let app = router().with_state(AppState::without_database(media));
        (tmp, TestServer::new(app).unwrap())
    }

    async fn bad_request(server: &TestServer, path: &str, body: Value) -> String {
        let response = server.post(path).json(&body).expect_failure().await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        body["error"].as_str().unwrap_or_default().to_string()
    }

    #[tokio::test]
    async fn test_register_is_an_alias_for_signup() {
        let (_tmp, server) = server();
        let body = json!({ "name": "Ada", "email": "ada@example.com", "password": "123" });

        for path in ["/api/auth/signup", "/api/auth/register"] {
            assert_eq!(
                bad_request(&server, path, body.clone()).await,
                "Password must be at least 6 characters"
            );
        }
    }

    #[tokio::test]
    async fn test_overlong_signup_name_is_a_bad_request() {
        let (_tmp, server) = server();
        let body = json!({ "name": "n".repeat(300), "email": "ada@example.com", "password": "secret" });

        assert_eq!(
            bad_request(&server, "/api/auth/signup", body).await,
            "Name must be at most 255 characters"
        );
    }

    #[tokio::test]
    async fn test_malformed_auth_bodies_are_bad_requests() {
        let (_tmp, server) = server();

        for path in [
            "/api/auth/signup",
            "/api/auth/login",
            "/api/auth/forgot-password",
            "/api/auth/reset-password",
        ] {
            assert!(!bad_request(&server, path, json!({ "unexpected": true })).await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_reset_password_validates_before_lookup() {
        let (_tmp, server) = server();

        assert_eq!(
            bad_request(
                &server,
                "/api/auth/reset-password",
                json!({ "token": "  ", "password": "long-enough" })
            )
            .await,
            "Invalid or expired reset token"
        );
        assert_eq!(
            bad_request(
                &server,
                "/api/auth/reset-password",
                json!({ "token": "abc", "password": "short" })
            )
            .await,
            "Password must be at least 6 characters"
        );
    }
}
