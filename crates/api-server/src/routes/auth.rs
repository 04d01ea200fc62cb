//! Account and session endpoints

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use taskflow_core::remote::wire::{AccountResponse, CredentialsRequest, SessionResponse};
use tracing::info;

use super::{core_error, internal_error, unauthorized, RouteError};
use crate::{
    auth::{format_expiry, resolve_identity},
    state::AppState,
};

/// POST /api/auth/register - Create an account without signing in
async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), RouteError> {
    let identity = state
        .accounts()
        .create(&req.email, &req.password)
        .await
        .map_err(core_error)?;

    info!("Registered {}", identity.email);
    Ok((StatusCode::CREATED, Json(identity.into())))
}

/// POST /api/auth/login - Exchange credentials for a bearer token
async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<SessionResponse>, RouteError> {
    let identity = state
        .accounts()
        .verify(&req.email, &req.password)
        .await
        .map_err(core_error)?;

    let (token, exp) = state.tokens().issue(&identity).map_err(internal_error)?;

    info!("Issued session for {}", identity.email);
    Ok(Json(SessionResponse {
        token,
        expires_at: format_expiry(exp),
        uid: identity.uid,
        email: identity.email,
    }))
}

/// GET /api/auth/me - The account behind the bearer token
async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AccountResponse>, RouteError> {
    let claimed = resolve_identity(&headers, state.tokens()).map_err(unauthorized)?;

    let identity = state
        .accounts()
        .find_by_uid(&claimed.uid)
        .await
        .map_err(core_error)?
        .ok_or_else(|| unauthorized("Account no longer exists"))?;

    Ok(Json(identity.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::{config::ServerConfig, state::AppState};

    async fn build_app() -> (Router, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let state = AppState::new(&ServerConfig::for_data_dir(temp_dir.path()))
            .await
            .unwrap();
        (super::router().with_state(state), temp_dir)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn register_then_login_returns_token() {
        let (app, _tmp) = build_app().await;
        let credentials = json!({ "email": "a@example.com", "password": "secret1" });

        let register_response = app
            .clone()
            .oneshot(post_json("/api/auth/register", credentials.clone()))
            .await
            .unwrap();
        assert_eq!(register_response.status(), StatusCode::CREATED);
        let registered = read_json(register_response).await;
        assert_eq!(registered["email"], "a@example.com");
        assert!(registered.get("token").is_none());

        let login_response = app
            .clone()
            .oneshot(post_json("/api/auth/login", credentials))
            .await
            .unwrap();
        assert_eq!(login_response.status(), StatusCode::OK);
        let session = read_json(login_response).await;
        assert_eq!(session["uid"], registered["uid"]);
        let token = session["token"].as_str().unwrap();
        assert!(session["expiresAt"].is_string());

        let me_response = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/me")
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(me_response.status(), StatusCode::OK);
        assert_eq!(read_json(me_response).await["email"], "a@example.com");
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let (app, _tmp) = build_app().await;
        let credentials = json!({ "email": "a@example.com", "password": "secret1" });

        app.clone()
            .oneshot(post_json("/api/auth/register", credentials.clone()))
            .await
            .unwrap();
        let response = app
            .oneshot(post_json("/api/auth/register", credentials))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(read_json(response).await["code"], "conflict");
    }

    #[tokio::test]
    async fn login_tells_unknown_email_from_wrong_password() {
        let (app, _tmp) = build_app().await;
        app.clone()
            .oneshot(post_json(
                "/api/auth/register",
                json!({ "email": "a@example.com", "password": "secret1" }),
            ))
            .await
            .unwrap();

        let unknown = app
            .clone()
            .oneshot(post_json(
                "/api/auth/login",
                json!({ "email": "b@example.com", "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
        assert_eq!(read_json(unknown).await["code"], "unknown_identity");

        let wrong = app
            .oneshot(post_json(
                "/api/auth/login",
                json!({ "email": "a@example.com", "password": "secret2" }),
            ))
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(read_json(wrong).await["code"], "wrong_secret");
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let (app, _tmp) = build_app().await;

        let response = app
            .oneshot(post_json(
                "/api/auth/register",
                json!({ "email": "a@example.com", "password": "abc" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["code"], "validation");
    }

    #[tokio::test]
    async fn me_requires_bearer() {
        let (app, _tmp) = build_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(read_json(response).await["code"], "unauthenticated");
    }
}
