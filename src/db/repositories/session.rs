use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};

use crate::entities::sessions;

/// A server-held login: binds an opaque token to a user identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
}

impl From<sessions::Model> for Session {
    fn from(model: sessions::Model) -> Self {
        Self {
            session_id: model.session_id,
            user_id: model.user_id,
        }
    }
}

pub struct SessionRepository {
    conn: DatabaseConnection,
}

impl SessionRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a new session row. Returns `false` when the user already holds
    /// a session: the UNIQUE constraint on `sessions.user_id` is the
    /// authoritative single-session signal, so two concurrent sign-ins that
    /// both pass the existence pre-check cannot produce a second row.
    pub async fn create(&self, session_id: &str, user_id: &str) -> Result<bool> {
        let session = sessions::ActiveModel {
            session_id: Set(session_id.to_string()),
            user_id: Set(user_id.to_string()),
        };

        match session.insert(&self.conn).await {
            Ok(_) => Ok(true),
            Err(err) => {
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    return Ok(false);
                }
                Err(err).context("Failed to insert session")
            }
        }
    }

    /// Idempotent: deleting a session that no longer exists is not an error.
    pub async fn delete(&self, session_id: &str) -> Result<()> {
        sessions::Entity::delete_by_id(session_id)
            .exec(&self.conn)
            .await
            .context("Failed to delete session")?;

        Ok(())
    }

    pub async fn get(&self, session_id: &str) -> Result<Option<Session>> {
        let session = sessions::Entity::find_by_id(session_id)
            .one(&self.conn)
            .await
            .context("Failed to query session")?;

        Ok(session.map(Session::from))
    }

    /// Supports the single-active-session policy: at most one row per user.
    /// Advisory only; the UNIQUE index enforced in [`Self::create`] is what
    /// actually closes the race.
    pub async fn get_by_user(&self, user_id: &str) -> Result<Option<Session>> {
        let session = sessions::Entity::find()
            .filter(sessions::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query session by user")?;

        Ok(session.map(Session::from))
    }
}
