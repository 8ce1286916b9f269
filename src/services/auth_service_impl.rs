//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::debug;

use crate::db::{IdTarget, Store};
use crate::services::auth_service::{AuthError, AuthService};
use crate::services::password::PasswordService;

pub struct SeaOrmAuthService {
    store: Store,
    passwords: PasswordService,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, passwords: PasswordService) -> Self {
        Self { store, passwords }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn sign_up(&self, username: &str, password: &str) -> Result<String, AuthError> {
        if self.store.get_user_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let user_id = self.store.generate_id(IdTarget::UserId).await?;
        let salt = self.store.generate_id(IdTarget::Salt).await?;
        let password_hash = self.passwords.hash(password, &salt).await?;

        // The UNIQUE constraint on username is the authoritative duplicate
        // signal; the pre-check above only exists for the common fast path.
        let created = self
            .store
            .create_user(&user_id, username, &password_hash)
            .await?;
        if !created {
            return Err(AuthError::UsernameTaken);
        }

        self.store.record_salt(&salt).await?;

        debug!("Created user {user_id}");

        self.sign_in(username, password).await
    }

    async fn sign_in(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let Some((user, password_hash)) =
            self.store.get_user_by_username_with_hash(username).await?
        else {
            return Err(AuthError::InvalidCredentials);
        };

        if !self.passwords.verify(password, &password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        if self
            .store
            .get_session_by_user(&user.user_id)
            .await?
            .is_some()
        {
            return Err(AuthError::AlreadyLoggedIn);
        }

        let session_id = self.store.generate_id(IdTarget::SessionId).await?;

        // The UNIQUE constraint on sessions.user_id is the authoritative
        // single-session signal; the lookup above only covers the common
        // fast path and can race a concurrent sign-in.
        let created = self.store.create_session(&session_id, &user.user_id).await?;
        if !created {
            return Err(AuthError::AlreadyLoggedIn);
        }

        debug!("Issued session for user {}", user.user_id);

        Ok(session_id)
    }

    async fn sign_out(&self, session_id: &str) -> Result<(), AuthError> {
        self.store.delete_session(session_id).await?;
        Ok(())
    }

    async fn resolve_identity(&self, session_id: &str) -> Result<Option<String>, AuthError> {
        let session = self.store.get_session(session_id).await?;
        Ok(session.map(|s| s.user_id))
    }

    async fn delete_account(
        &self,
        session_id: &str,
        username: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        let Some((user, password_hash)) =
            self.store.get_user_by_username_with_hash(username).await?
        else {
            return Err(AuthError::UserNotFound);
        };

        let identity = self.resolve_identity(session_id).await?;
        if identity.as_deref() != Some(user.user_id.as_str()) {
            return Err(AuthError::InvalidSession);
        }

        if !self.passwords.verify(password, &password_hash).await? {
            return Err(AuthError::InvalidPassword);
        }

        self.store.delete_user(&user.user_id).await?;

        debug!("Deleted user {}", user.user_id);

        Ok(())
    }
}
