use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};

use crate::entities::{salts, sessions, users};

/// User data returned from the repository (without the password hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: String,
    pub username: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            user_id: model.user_id,
            username: model.username,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    /// Get user by username along with the stored password hash
    /// (for credential verification only).
    pub async fn get_by_username_with_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    pub async fn get_id_by_username(&self, username: &str) -> Result<Option<String>> {
        Ok(self
            .get_by_username(username)
            .await?
            .map(|user| user.user_id))
    }

    /// Insert a new user row. Returns `false` when the username is already
    /// taken: the UNIQUE constraint on `users.username` is the authoritative
    /// duplicate signal, so callers' existence pre-checks can race without
    /// producing a duplicate row.
    pub async fn create(
        &self,
        user_id: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<bool> {
        let user = users::ActiveModel {
            user_id: Set(user_id.to_string()),
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
        };

        match user.insert(&self.conn).await {
            Ok(_) => Ok(true),
            Err(err) => {
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    return Ok(false);
                }
                Err(err).context("Failed to insert user")
            }
        }
    }

    /// Persist a salt in the salt ledger. Salts are never deleted.
    pub async fn record_salt(&self, salt: &str) -> Result<()> {
        let row = salts::ActiveModel {
            salt: Set(salt.to_string()),
        };
        row.insert(&self.conn)
            .await
            .context("Failed to insert salt")?;

        Ok(())
    }

    /// Remove a user row and every session bound to it, so no session can
    /// resolve to a deleted identity.
    pub async fn delete(&self, user_id: &str) -> Result<()> {
        sessions::Entity::delete_many()
            .filter(sessions::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to delete sessions for user")?;

        users::Entity::delete_by_id(user_id)
            .exec(&self.conn)
            .await
            .context("Failed to delete user")?;

        Ok(())
    }
}
