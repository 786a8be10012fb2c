use crate::db::{connect_with_config, DatabaseConfig};
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
use std::time::{Duration, Instant};
use anyhow::Result;

use super::setup_test_db;

/// Test basic database connection
#[tokio::test]
async fn test_basic_connection() -> Result<()> {
    let Some(db) = setup_test_db().await? else { return Ok(()) };

    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1 as test".to_string());
    let row = db.query_one(stmt).await?.expect("one row");
    let test_value: i32 = row.try_get("", "test")?;
    assert_eq!(test_value, 1);
    Ok(())
}

/// Test connection with pool settings from config
#[tokio::test]
async fn test_custom_config_connection() -> Result<()> {
    if std::env::var("DATABASE_URL").is_err() {
        return Ok(());
    }
    let mut cfg = DatabaseConfig::from_env();
    cfg.max_connections = 3;
    cfg.min_connections = 1;
    cfg.connect_timeout_secs = 5;

    let start = Instant::now();
    let db = connect_with_config(&cfg).await?;
    assert!(start.elapsed() < Duration::from_secs(5), "connection took too long");

    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1".to_string());
    assert!(db.query_one(stmt).await?.is_some());
    db.close().await?;
    Ok(())
}
