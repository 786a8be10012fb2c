#![cfg(test)]
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

/// A migrated connection, or `None` when `DATABASE_URL` is not set.
pub async fn get_db() -> Result<Option<DatabaseConnection>, anyhow::Error> {
    let _ = dotenvy::dotenv();
    if std::env::var("DATABASE_URL").is_err() {
        return Ok(None);
    }
    let cfg = || {
        let mut cfg = DatabaseConfig::from_file().unwrap_or_else(|_| DatabaseConfig::from_env());
        cfg.max_connections = cfg.max_connections.max(10);
        cfg.min_connections = cfg.min_connections.min(1);
        cfg
    };

    // Run migrations exactly once, with a throwaway connection
    let migrated = *MIGRATED
        .get_or_init(|| async {
            match connect_with_config(&cfg()).await {
                Ok(db) => migration::Migrator::up(&db, None).await.is_ok(),
                Err(_) => false,
            }
        })
        .await;
    if !migrated {
        anyhow::bail!("DATABASE_URL is set but migrations could not be applied");
    }

    // Return a fresh connection for the current test's runtime
    Ok(Some(connect_with_config(&cfg()).await?))
}
