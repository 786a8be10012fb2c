use models::errors::ModelError;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::debug;

use crate::settings::domain::{Document, Setting};
use crate::settings::errors::SettingsError;
use crate::settings::repository::{SettingsRepository, UpdateFn};

/// PostgreSQL-backed repository: one `setting` row per key.
pub struct SeaOrmSettingsRepository {
    pub db: DatabaseConnection,
}

#[async_trait::async_trait]
impl SettingsRepository for SeaOrmSettingsRepository {
    async fn get_all(&self) -> Result<Vec<Setting>, SettingsError> {
        let rows = models::setting::list_all(&self.db).await?;
        Ok(rows.into_iter().map(|m| Setting::new(m.key, m.value)).collect())
    }

    async fn upsert(&self, key: &str, value: Document) -> Result<Document, SettingsError> {
        models::setting::upsert(&self.db, key, value.clone()).await?;
        debug!(%key, "setting row upserted");
        Ok(value)
    }

    async fn update(&self, key: &str, f: UpdateFn) -> Result<Document, SettingsError> {
        models::setting::validate_key(key)?;
        let txn = self.db.begin().await.map_err(ModelError::from)?;
        let current = models::setting::find_for_update(&txn, key).await?.map(|m| m.value);
        // dropping `txn` on error rolls back
        let next = f(current)?;
        models::setting::upsert(&txn, key, next.clone()).await?;
        txn.commit().await.map_err(ModelError::from)?;
        debug!(%key, "setting row updated in place");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn seaorm_repository_round_trip() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let repo = SeaOrmSettingsRepository { db };

        let k1 = format!("profile_{}", Uuid::new_v4());
        let k2 = format!("skills_{}", Uuid::new_v4());
        repo.upsert(&k1, json!({"name": "A"})).await?;
        repo.upsert(&k2, json!([{"title": "Rust", "percentage": 90}])).await?;
        repo.upsert(&k1, json!({"name": "B"})).await?;

        let all = repo.get_all().await?;
        let v1: Vec<_> = all.iter().filter(|s| s.key == k1).collect();
        assert_eq!(v1.len(), 1);
        assert_eq!(v1[0].value, json!({"name": "B"}));
        assert!(all.iter().any(|s| s.key == k2));
        Ok(())
    }

    #[tokio::test]
    async fn seaorm_repository_update_sees_current_value() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let repo = SeaOrmSettingsRepository { db };
        let key = format!("counter_{}", Uuid::new_v4());

        let bump: fn(Option<Document>) -> Result<Document, SettingsError> =
            |cur| Ok(json!(cur.and_then(|v| v.as_i64()).unwrap_or(0) + 1));
        repo.update(&key, Box::new(bump)).await?;
        let second = repo.update(&key, Box::new(bump)).await?;
        assert_eq!(second, json!(2));
        Ok(())
    }

    #[tokio::test]
    async fn seaorm_repository_rejects_empty_key() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await? else { return Ok(()) };
        let repo = SeaOrmSettingsRepository { db };
        let err = repo.upsert("", json!(1)).await.unwrap_err();
        assert!(matches!(err, SettingsError::InvalidKey(_)));
        Ok(())
    }
}
