use sea_orm::{entity::prelude::*, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "portfolio_user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub password: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_username(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::Validation("username required".into())); }
    if name.len() > 128 { return Err(errors::ModelError::Validation("username too long".into())); }
    Ok(())
}

/// Plaintext equality on both columns.
pub async fn find_by_credentials(db: &DatabaseConnection, username: &str, password: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Username.eq(username))
        .filter(Column::Password.eq(password))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Create the user, or replace the password of an existing one.
pub async fn upsert(db: &DatabaseConnection, username: &str, password: &str) -> Result<Model, errors::ModelError> {
    validate_username(username)?;
    if password.is_empty() { return Err(errors::ModelError::Validation("password required".into())); }
    let existing = Entity::find()
        .filter(Column::Username.eq(username))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    match existing {
        Some(found) => {
            let mut am: ActiveModel = found.into();
            am.password = Set(password.to_string());
            am.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
        }
        None => {
            let am = ActiveModel {
                id: Set(Uuid::new_v4()),
                username: Set(username.to_string()),
                password: Set(password.to_string()),
            };
            am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
        }
    }
}
