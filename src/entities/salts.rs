use sea_orm::entity::prelude::*;

/// Ledger of every salt ever handed to the password hasher. Rows are
/// never deleted; the id generator checks this table so no salt is
/// issued twice.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "salts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub salt: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
