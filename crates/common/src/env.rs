//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the uploads directory and the parent of the settings file exist.
pub async fn ensure_env(uploads_dir: &str, data_file: Option<&str>) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(uploads_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {uploads_dir}: {e}"))?;
    info!(%uploads_dir, "uploads directory ready");

    if let Some(file) = data_file {
        match Path::new(file).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
            }
            _ => warn!(%file, "settings file has no parent directory; using working directory"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_env_creates_directories() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("portfolio_env_{}", uuid::Uuid::new_v4()));
        let uploads = root.join("uploads");
        let data_file = root.join("data").join("settings.json");

        ensure_env(uploads.to_str().unwrap(), Some(data_file.to_str().unwrap())).await?;

        assert!(tokio::fs::metadata(&uploads).await?.is_dir());
        assert!(tokio::fs::metadata(root.join("data")).await?.is_dir());
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }
}
