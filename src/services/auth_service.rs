//! Domain service for identity, credential, and session management.
//!
//! Orchestrates sign-up, sign-in, sign-out, identity resolution, and account
//! deletion over the credential store and session manager.

use thiserror::Error;

/// Errors specific to authentication operations.
///
/// `InvalidCredentials` deliberately covers both "no such user" and "wrong
/// password" so callers cannot enumerate usernames.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Already logged in")]
    AlreadyLoggedIn,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid session")]
    InvalidSession,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account and immediately signs it in, returning the new
    /// session token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UsernameTaken`] if the username exists.
    async fn sign_up(&self, username: &str, password: &str) -> Result<String, AuthError>;

    /// Verifies credentials and issues a session token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown username or a
    /// wrong password, and [`AuthError::AlreadyLoggedIn`] when the user
    /// already holds an active session.
    async fn sign_in(&self, username: &str, password: &str) -> Result<String, AuthError>;

    /// Revokes a session. Idempotent: revoking a stale token is not an error.
    async fn sign_out(&self, session_id: &str) -> Result<(), AuthError>;

    /// Resolves a session token to the identity it was issued for, or `None`
    /// if the session has been revoked.
    async fn resolve_identity(&self, session_id: &str) -> Result<Option<String>, AuthError>;

    /// Deletes an account. The named user must exist, the session must
    /// resolve to that same user, and the password must verify; nothing is
    /// mutated until every check passes.
    async fn delete_account(
        &self,
        session_id: &str,
        username: &str,
        password: &str,
    ) -> Result<(), AuthError>;
}
