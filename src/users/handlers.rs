use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::{
        dto::{LoginRequest, PublicUser, RegisterRequest},
        repo_types::{NewUser, User},
        services::{hash_password, is_valid_email, normalize_email, verify_password},
    },
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<User>)> {
    let Json(payload) = payload?;
    let email = normalize_email(&payload.email);
    let username = payload.username.trim();

    if username.is_empty() {
        return Err(AppError::bad_request("Username is required"));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::bad_request("Invalid email"));
    }
    if payload.password.is_empty() {
        return Err(AppError::bad_request("Password is required"));
    }

    let hash = hash_password(&payload.password)?;

    let user = User::create(
        &state.db,
        &NewUser {
            username,
            password: &hash,
            email: &email,
            phone: &payload.phone,
            name: &payload.name,
            address: &payload.address,
            gender: &payload.gender,
        },
    )
    .await?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<PublicUser>> {
    let Json(payload) = payload?;
    let email = normalize_email(&payload.email);

    let Some(user) = User::find_by_email(&state.db, &email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    };

    if !verify_password(&payload.password, &user.password)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    info!(user_id = user.id, "user logged in");
    Ok(Json(PublicUser::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::build_app;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use tower::ServiceExt;

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn register_rejects_malformed_payload() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(post_json("/api/register", "{not json"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_rejects_bad_email_before_db() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(post_json(
                "/api/register",
                r#"{"username":"alice","password":"pw","email":"nope"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(res.into_body(), 1024).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["error"], "Invalid email");
    }

    #[tokio::test]
    async fn login_rejects_missing_fields() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(post_json("/api/login", r#"{"email":"a@b.co"}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn public_user_never_carries_password() {
        let json = serde_json::to_value(PublicUser {
            id: 1,
            username: "alice".into(),
            email: "alice@example.com".into(),
            phone: String::new(),
            name: String::new(),
            address: String::new(),
            gender: String::new(),
        })
        .unwrap();
        assert_eq!(json["ID"], 1);
        assert_eq!(json["Username"], "alice");
        assert!(json.get("Password").is_none());
    }
}
