use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod id;
pub mod migrator;
pub mod repositories;

pub use id::{DEFAULT_ID_LENGTH, IdTarget};
pub use repositories::classification::ClassificationRecord;
pub use repositories::session::Session;
pub use repositories::user::User;

/// Facade over the database connection. Every request path goes through
/// here; per-table logic lives in the repositories.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn session_repo(&self) -> repositories::session::SessionRepository {
        repositories::session::SessionRepository::new(self.conn.clone())
    }

    fn classification_repo(&self) -> repositories::classification::ClassificationRepository {
        repositories::classification::ClassificationRepository::new(self.conn.clone())
    }

    /// Generate a collision-free identifier for the given table/column.
    pub async fn generate_id(&self, target: IdTarget) -> Result<String> {
        id::generate_id(&self.conn, target, DEFAULT_ID_LENGTH).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_username_with_hash(
        &self,
        username: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_username_with_hash(username).await
    }

    pub async fn get_user_id_by_username(&self, username: &str) -> Result<Option<String>> {
        self.user_repo().get_id_by_username(username).await
    }

    /// Returns `false` when the username is already taken.
    pub async fn create_user(
        &self,
        user_id: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<bool> {
        self.user_repo()
            .create(user_id, username, password_hash)
            .await
    }

    pub async fn record_salt(&self, salt: &str) -> Result<()> {
        self.user_repo().record_salt(salt).await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        self.user_repo().delete(user_id).await
    }

    /// Returns `false` when the user already holds a session.
    pub async fn create_session(&self, session_id: &str, user_id: &str) -> Result<bool> {
        self.session_repo().create(session_id, user_id).await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.session_repo().delete(session_id).await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<Session>> {
        self.session_repo().get(session_id).await
    }

    pub async fn get_session_by_user(&self, user_id: &str) -> Result<Option<Session>> {
        self.session_repo().get_by_user(user_id).await
    }

    pub async fn save_classification(&self, record: ClassificationRecord) -> Result<()> {
        self.classification_repo().save(record).await
    }

    pub async fn get_classification(
        &self,
        classification_id: &str,
        user_id: &str,
    ) -> Result<Option<ClassificationRecord>> {
        self.classification_repo()
            .get_for_user(classification_id, user_id)
            .await
    }

    pub async fn list_classification_ids(&self, user_id: &str) -> Result<Vec<String>> {
        self.classification_repo().list_ids_for_user(user_id).await
    }
}
