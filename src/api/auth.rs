use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ApiError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session_id";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize)]
struct LoginResponse {
    message: String,
    session_id: String,
}

#[derive(Serialize)]
pub struct UserIdResponse {
    message: String,
    user_id: String,
}

// ============================================================================
// Cookie helpers
// ============================================================================

/// Pull the session id out of the request's Cookie header, if any.
pub(crate) fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.trim().to_string())
    })
}

fn session_cookie(session_id: &str, secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Strict");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn expired_session_cookie(secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Strict");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn validate_credentials(payload: &CredentialsRequest) -> Result<(), ApiError> {
    // Same message for a missing field as for bad credentials, so the
    // response shape never reveals which check tripped.
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Invalid username or password"));
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/signup
/// Create an account and sign it in; the session id is attached as an
/// HttpOnly strict-same-site cookie.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Response, ApiError> {
    validate_credentials(&payload)?;

    let session_id = state
        .auth
        .sign_up(&payload.username, &payload.password)
        .await?;

    let cookie = session_cookie(&session_id, state.config.server.secure_cookies);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse {
            message: "Signup successful".to_string(),
        }),
    )
        .into_response())
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Response, ApiError> {
    validate_credentials(&payload)?;

    let session_id = state
        .auth
        .sign_in(&payload.username, &payload.password)
        .await?;

    let cookie = session_cookie(&session_id, state.config.server.secure_cookies);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            message: "Login successful".to_string(),
            session_id,
        }),
    )
        .into_response())
}

/// POST /auth/logout
/// Revoke the current session and clear the cookie. Revoking an already-gone
/// session still succeeds.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session_id = session_id_from_headers(&headers).ok_or(ApiError::NotLoggedIn)?;

    state.auth.sign_out(&session_id).await?;

    let cookie = expired_session_cookie(state.config.server.secure_cookies);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse {
            message: "Logged out".to_string(),
        }),
    )
        .into_response())
}

/// GET /auth/get-user-id
/// Resolve the session cookie to the identity it was issued for.
pub async fn get_user_id(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<UserIdResponse>, ApiError> {
    let session_id = session_id_from_headers(&headers).ok_or(ApiError::NotLoggedIn)?;

    let user_id = state
        .auth
        .resolve_identity(&session_id)
        .await?
        .ok_or_else(|| ApiError::AuthFailed("Invalid session".to_string()))?;

    Ok(Json(UserIdResponse {
        message: "Get user id successful".to_string(),
        user_id,
    }))
}

/// DELETE /auth/delete-user
/// Remove an account. Requires the session, username, and password to all
/// agree; the service mutates nothing until every check passes.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Response, ApiError> {
    let session_id = session_id_from_headers(&headers).ok_or(ApiError::NotLoggedIn)?;

    validate_credentials(&payload)?;

    state
        .auth
        .delete_account(&session_id, &payload.username, &payload.password)
        .await?;

    let cookie = expired_session_cookie(state.config.server.secure_cookies);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse {
            message: "User deleted".to_string(),
        }),
    )
        .into_response())
}
