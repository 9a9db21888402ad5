use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    routing::{get, post},
};
use http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use usersync::{User, login_user, user_from_identity};

use crate::error::envelope_for;
use crate::identity::AuthIdentity;
use crate::response::ApiResponse;

/// Create a router for the user endpoints
///
/// Mount this under [`usersync::USERSYNC_ROUTE_PREFIX`]. The `/login` and
/// `/health` routes are anonymous; `/me` requires the authenticate
/// middleware to have resolved an identity.
pub fn router() -> Router<()> {
    Router::new()
        .route("/me", get(get_me))
        .route("/login", post(login))
        .route("/health", get(health))
}

/// Request payload for the login endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginRequest {
    pub external_user_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub tenant_id: Option<String>,
}

/// `POST /login` - login-time user upsert
///
/// Guard clauses run in order and return immediately, before the service is
/// invoked: a missing or null body, then a missing or empty email. The final
/// envelope status is assigned exactly once from the service outcome.
async fn login(body: Result<Json<Option<LoginRequest>>, JsonRejection>) -> ApiResponse<User> {
    let payload = match body {
        Ok(Json(Some(payload))) => payload,
        // Null, absent, or unreadable body: reject before touching anything
        Ok(Json(None)) | Err(_) => {
            return ApiResponse::error(StatusCode::BAD_REQUEST, "User data is required");
        }
    };

    if payload.email.as_deref().is_none_or(str::is_empty) {
        return ApiResponse::error(StatusCode::BAD_REQUEST, "Email is required");
    }

    let candidate = User::new(
        payload.external_user_id,
        payload.email,
        payload.name,
        payload.tenant_id,
    );

    match login_user(candidate).await {
        Ok(user) => ApiResponse::ok(user),
        Err(err) => envelope_for(err),
    }
}

/// `GET /me` - the caller's identity as a user shape
///
/// Resolved purely from the authenticated request's claims; the store is not
/// consulted and the result carries the unpersisted sentinel id.
async fn get_me(AuthIdentity(identity): AuthIdentity) -> ApiResponse<User> {
    ApiResponse::ok(user_from_identity(&identity))
}

/// `GET /health` - anonymous liveness probe, not enveloped
async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
        "environment": std::env::var("APP_ENVIRONMENT").ok(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::Once;
    use usersync::Identity;

    async fn init_test_environment() {
        static ENV_INIT: Once = Once::new();
        ENV_INIT.call_once(|| {
            if dotenvy::from_filename(".env_test").is_err() {
                dotenvy::dotenv().ok();
            }
            let _ = std::fs::remove_file("/tmp/usersync_axum_test.sqlite3");
        });
        usersync::init().await.expect("Failed to initialize stores");
    }

    fn login_payload(email: Option<&str>) -> LoginRequest {
        LoginRequest {
            external_user_id: Some("ext-handler".to_string()),
            email: email.map(str::to_string),
            name: Some("Handler Tester".to_string()),
            tenant_id: None,
        }
    }

    /// Null body: bad request, exact error text, nothing else happens
    #[tokio::test]
    async fn test_login_rejects_null_body() {
        let envelope = login(Ok(Json(None))).await;

        assert!(envelope.result.is_none());
        assert_eq!(envelope.status, 400);
        assert_eq!(envelope.errors, vec!["User data is required".to_string()]);
        assert!(envelope.exception_details.is_none());
    }

    /// Missing and empty emails short-circuit before the service runs
    #[tokio::test]
    async fn test_login_rejects_missing_email() {
        for email in [None, Some("")] {
            let envelope = login(Ok(Json(Some(login_payload(email))))).await;

            assert!(envelope.result.is_none());
            assert_eq!(envelope.status, 400);
            assert_eq!(envelope.errors, vec!["Email is required".to_string()]);
        }
    }

    /// Whitespace-only email passes the endpoint guard but the service
    /// rejects it; the envelope must not be downgraded to success
    #[tokio::test]
    #[serial]
    async fn test_login_service_error_is_not_success() {
        init_test_environment().await;

        let envelope = login(Ok(Json(Some(login_payload(Some("   ")))))).await;

        assert!(envelope.result.is_none());
        assert!(!envelope.is_success());
        assert_eq!(envelope.status, 400);
        assert_eq!(envelope.errors, vec!["Email is required for login.".to_string()]);
    }

    #[tokio::test]
    #[serial]
    async fn test_login_success_envelope() {
        init_test_environment().await;

        let envelope = login(Ok(Json(Some(login_payload(Some("handler@example.com")))))).await;

        assert!(envelope.is_success());
        assert_eq!(envelope.status, 200);
        let user = envelope.result.expect("Success envelope carries the user");
        assert!(user.is_persisted());
        assert_eq!(user.email.as_deref(), Some("handler@example.com"));
    }

    /// Repeat login returns the same user with a refreshed stamp
    #[tokio::test]
    #[serial]
    async fn test_login_upsert_roundtrip() {
        init_test_environment().await;

        let first = login(Ok(Json(Some(login_payload(Some("repeat-handler@example.com"))))))
            .await
            .result
            .expect("First login should succeed");
        let second = login(Ok(Json(Some(login_payload(Some("repeat-handler@example.com"))))))
            .await
            .result
            .expect("Second login should succeed");

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn test_get_me_wraps_identity() {
        let identity = Identity {
            external_user_id: Some("ext-me".to_string()),
            email: Some("me@example.com".to_string()),
            name: Some("Me".to_string()),
            tenant_id: Some("t1".to_string()),
        };

        let envelope = get_me(AuthIdentity(identity)).await;

        assert!(envelope.is_success());
        let user = envelope.result.expect("Envelope carries the derived user");
        assert!(!user.is_persisted());
        assert_eq!(user.email.as_deref(), Some("me@example.com"));
        assert_eq!(user.tenant_id.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_health_shape() {
        let Json(body) = health().await;

        assert_eq!(body["status"], "healthy");
        assert!(body.get("timestamp").is_some());
    }
}
