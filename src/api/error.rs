use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

use crate::clients::places::PlacesError;
use crate::services::AuthError;

/// All failure bodies share one shape so clients cannot tell which internal
/// check rejected them.
#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed request fields.
    Validation(String),

    /// No session cookie on a request that requires one.
    NotLoggedIn,

    /// Any other authentication failure, surfaced vaguely on purpose.
    AuthFailed(String),

    /// Duplicate username or an already-active session.
    Conflict(String),

    ExternalApi { service: String, message: String },

    DatabaseError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ApiError::NotLoggedIn => write!(f, "Not logged in"),
            ApiError::AuthFailed(msg) => write!(f, "Authentication failed: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ExternalApi { service, message } => {
                write!(f, "{} error: {}", service, message)
            }
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Everything auth-shaped is a flat 400 with a terse message; the
        // status code never distinguishes unknown user, bad password, and
        // revoked session.
        let (status, message) = match self {
            ApiError::Validation(msg) | ApiError::AuthFailed(msg) | ApiError::Conflict(msg) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::NotLoggedIn => (StatusCode::BAD_REQUEST, "Not logged in".to_string()),
            ApiError::ExternalApi { service, message } => {
                tracing::warn!("{} API error: {}", service, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{} service is unavailable", service),
                )
            }
            ApiError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::UserNotFound
            | AuthError::InvalidSession
            | AuthError::InvalidPassword => ApiError::AuthFailed(err.to_string()),
            AuthError::UsernameTaken | AuthError::AlreadyLoggedIn => {
                ApiError::Conflict(err.to_string())
            }
            AuthError::Database(msg) => ApiError::DatabaseError(msg),
            AuthError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

impl From<PlacesError> for ApiError {
    fn from(err: PlacesError) -> Self {
        match err {
            PlacesError::MissingApiKey => ApiError::InternalError(err.to_string()),
            PlacesError::Http(e) => ApiError::ExternalApi {
                service: "Google Maps".to_string(),
                message: e.to_string(),
            },
            PlacesError::Api(message) => ApiError::ExternalApi {
                service: "Google Maps".to_string(),
                message,
            },
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }
}
