use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "classifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub classification_id: String,

    pub user_id: String,

    /// Label the user assigned to the uploaded image
    pub classification: String,

    pub filename: String,

    #[sea_orm(column_type = "Blob")]
    pub data: Vec<u8>,

    pub content_type: String,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
