use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
};

use crate::entities::classifications;

/// A stored image classification: the uploaded image plus the label the
/// user assigned to it.
#[derive(Debug, Clone)]
pub struct ClassificationRecord {
    pub classification_id: String,
    pub user_id: String,
    pub classification: String,
    pub filename: String,
    pub data: Vec<u8>,
    pub content_type: String,
}

impl From<classifications::Model> for ClassificationRecord {
    fn from(model: classifications::Model) -> Self {
        Self {
            classification_id: model.classification_id,
            user_id: model.user_id,
            classification: model.classification,
            filename: model.filename,
            data: model.data,
            content_type: model.content_type,
        }
    }
}

pub struct ClassificationRepository {
    conn: DatabaseConnection,
}

impl ClassificationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn save(&self, record: ClassificationRecord) -> Result<()> {
        let row = classifications::ActiveModel {
            classification_id: Set(record.classification_id),
            user_id: Set(record.user_id),
            classification: Set(record.classification),
            filename: Set(record.filename),
            data: Set(record.data),
            content_type: Set(record.content_type),
            created_at: Set(chrono::Utc::now()),
        };
        row.insert(&self.conn)
            .await
            .context("Failed to insert classification")?;

        Ok(())
    }

    /// Fetch one record, scoped to its owner: an id belonging to another
    /// user reads as absent.
    pub async fn get_for_user(
        &self,
        classification_id: &str,
        user_id: &str,
    ) -> Result<Option<ClassificationRecord>> {
        let row = classifications::Entity::find_by_id(classification_id)
            .filter(classifications::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query classification")?;

        Ok(row.map(ClassificationRecord::from))
    }

    /// Ids only; the image blobs stay in the database.
    pub async fn list_ids_for_user(&self, user_id: &str) -> Result<Vec<String>> {
        let ids = classifications::Entity::find()
            .select_only()
            .column(classifications::Column::ClassificationId)
            .filter(classifications::Column::UserId.eq(user_id))
            .into_tuple::<String>()
            .all(&self.conn)
            .await
            .context("Failed to query classification ids")?;

        Ok(ids)
    }
}
