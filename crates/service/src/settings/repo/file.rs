use std::path::PathBuf;
use std::sync::Arc;

use crate::settings::domain::{validate_key, Document, Setting};
use crate::settings::errors::SettingsError;
use crate::errors::ServiceError;
use crate::settings::repository::{SettingsRepository, UpdateFn};
use crate::storage::json_map_store::JsonMapStore;

/// File-backed repository keeping every setting in one JSON object on disk.
#[derive(Clone)]
pub struct JsonFileSettingsRepository {
    store: Arc<JsonMapStore<String, Document>>,
}

impl JsonFileSettingsRepository {
    /// Open (or create) the store file.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, SettingsError> {
        let store = JsonMapStore::<String, Document>::new(path).await?;
        Ok(Self { store })
    }
}

#[async_trait::async_trait]
impl SettingsRepository for JsonFileSettingsRepository {
    async fn get_all(&self) -> Result<Vec<Setting>, SettingsError> {
        let mut all: Vec<Setting> = self
            .store
            .list()
            .await
            .into_iter()
            .map(|(k, v)| Setting::new(k, v))
            .collect();
        all.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(all)
    }

    async fn upsert(&self, key: &str, value: Document) -> Result<Document, SettingsError> {
        validate_key(key)?;
        self.store.insert(key.to_string(), value.clone()).await?;
        Ok(value)
    }

    async fn update(&self, key: &str, f: UpdateFn) -> Result<Document, SettingsError> {
        validate_key(key)?;
        let mut outcome: Option<Result<Document, SettingsError>> = None;
        let persisted = self
            .store
            .update_map(|map| {
                let res = f(map.get(key).cloned());
                let step = match &res {
                    Ok(next) => {
                        map.insert(key.to_string(), next.clone());
                        Ok(())
                    }
                    Err(_) => Err(ServiceError::Validation("update aborted".into())),
                };
                outcome = Some(res);
                step
            })
            .await;
        match outcome {
            Some(Err(e)) => Err(e),
            Some(Ok(next)) => persisted.map(|_| next).map_err(SettingsError::from),
            None => Err(persisted.err().map(SettingsError::from).unwrap_or_else(|| {
                SettingsError::StoreUnavailable("update closure did not run".into())
            })),
        }
    }
}
