//! Process-level wiring of the persistence backends.
//!
//! [`Backends::connect`] builds the one store handle shared by every service;
//! [`Backends::shutdown`] releases it.

use std::sync::Arc;

use anyhow::Context;
use configs::{AppConfig, SettingsConfig, StorageBackend};
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::auth::repo::{SeaOrmUserRepository, SettingsUserRepository};
use crate::auth::repository::UserRepository;
use crate::auth::AuthService;
use crate::settings::repo::{JsonFileSettingsRepository, SeaOrmSettingsRepository};
use crate::settings::{SettingsRepository, SettingsService, SettingsServiceConfig};

/// Ensure expected directories exist; warn on missing optional ones.
pub async fn ensure_env(uploads_dir: &str, data_file: Option<&str>) -> anyhow::Result<()> {
    common::env::ensure_env(uploads_dir, data_file).await
}

/// Store handles for the configured backend.
#[derive(Clone)]
pub struct Backends {
    pub settings: Arc<dyn SettingsRepository>,
    pub users: Arc<dyn UserRepository>,
    db: Option<DatabaseConnection>,
}

impl Backends {
    pub async fn connect(cfg: &AppConfig) -> anyhow::Result<Self> {
        match cfg.storage.backend {
            StorageBackend::Postgres => {
                let db = models::db::connect_with_config(&cfg.database)
                    .await
                    .context("connect to postgres")?;
                info!(backend = "postgres", "settings store ready");
                Ok(Self {
                    settings: Arc::new(SeaOrmSettingsRepository { db: db.clone() }),
                    users: Arc::new(SeaOrmUserRepository { db: db.clone() }),
                    db: Some(db),
                })
            }
            StorageBackend::File => {
                let path = &cfg.storage.settings_file;
                let repo = JsonFileSettingsRepository::open(path)
                    .await
                    .with_context(|| format!("open settings file {path}"))?;
                let settings: Arc<dyn SettingsRepository> = Arc::new(repo);
                info!(backend = "file", %path, "settings store ready");
                Ok(Self { users: Arc::new(SettingsUserRepository::new(Arc::clone(&settings))), settings, db: None })
            }
        }
    }

    /// Apply pending schema migrations. A no-op for the file backend.
    pub async fn apply_schema(&self) -> anyhow::Result<()> {
        if let Some(db) = &self.db {
            migration::Migrator::up(db, None).await.context("apply schema migrations")?;
            info!("schema up to date");
        }
        Ok(())
    }

    pub fn settings_service(&self, cfg: &SettingsConfig) -> SettingsService {
        SettingsService::new(Arc::clone(&self.settings), SettingsServiceConfig::from(cfg))
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(Arc::clone(&self.users))
    }

    pub async fn shutdown(self) -> anyhow::Result<()> {
        if let Some(db) = self.db {
            db.close().await.context("close database pool")?;
            info!("database pool closed");
        }
        Ok(())
    }
}
