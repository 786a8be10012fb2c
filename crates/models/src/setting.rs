//! `setting` entity: one JSON document per portfolio section key.
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DatabaseConnection, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Width of the `key` column.
pub const MAX_KEY_LEN: usize = 255;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "setting")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub value: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_key(key: &str) -> Result<(), ModelError> {
    if key.trim().is_empty() {
        return Err(ModelError::Validation("setting key must not be empty".into()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(ModelError::Validation(format!("setting key longer than {MAX_KEY_LEN} bytes")));
    }
    Ok(())
}

/// Every stored setting, ordered by key.
pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Model>, ModelError> {
    Entity::find()
        .order_by_asc(Column::Key)
        .all(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

pub async fn find(db: &DatabaseConnection, key: &str) -> Result<Option<Model>, ModelError> {
    Entity::find_by_id(key.to_string())
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

/// Like [`find`], taking a row lock until `db`'s transaction ends.
pub async fn find_for_update<C: ConnectionTrait>(db: &C, key: &str) -> Result<Option<Model>, ModelError> {
    Entity::find_by_id(key.to_string())
        .lock_exclusive()
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

/// Insert or fully replace the value under `key` in one statement.
pub async fn upsert<C: ConnectionTrait>(db: &C, key: &str, value: Json) -> Result<(), ModelError> {
    validate_key(key)?;
    let am = ActiveModel { key: Set(key.to_string()), value: Set(value) };
    Entity::insert(am)
        .on_conflict(OnConflict::column(Column::Key).update_column(Column::Value).to_owned())
        .exec_without_returning(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(())
}
