use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::services::credentials::hash_if_changed;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub image: Option<String>,
    pub active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Disabled admins cannot log in
    pub fn disabled(&self) -> bool {
        !self.active
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    /// Every write path goes through here, so a changed password is always
    /// hashed exactly once before it reaches the table.
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let hashed = hash_if_changed(&mut self.password)
            .map_err(|e| DbErr::Custom(format!("Failed to hash password: {}", e)))?;
        if hashed {
            tracing::debug!(insert, "Hashed changed admin password");
        }
        Ok(self)
    }
}
