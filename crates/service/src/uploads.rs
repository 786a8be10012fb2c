//! Project image uploads stored on local disk and served under `/uploads`.

use std::path::{Path, PathBuf};

use rand::Rng;
use thiserror::Error;
use tracing::info;

/// URL prefix the uploads directory is served under.
pub const URL_PREFIX: &str = "/uploads";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub file_name: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    pub fn dir(&self) -> &Path { &self.dir }

    /// `<prefix>-<unix millis>-<random 0..1e9><.ext>`; the extension is taken
    /// from the client's file name and kept only if it is plain alphanumeric.
    pub fn file_name(prefix: &str, original: Option<&str>) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
        let ext = original
            .and_then(|name| Path::new(name).extension())
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.len() <= 16 && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default();
        format!("{prefix}-{millis}-{suffix}{ext}")
    }

    pub async fn save(&self, prefix: &str, original: Option<&str>, bytes: &[u8]) -> Result<StoredUpload, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::Validation("empty file".into()));
        }
        tokio::fs::create_dir_all(&self.dir).await?;
        let file_name = Self::file_name(prefix, original);
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;
        info!(file = %file_name, size = bytes.len(), "upload stored");
        let url = format!("{URL_PREFIX}/{file_name}");
        Ok(StoredUpload { file_name, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_keeps_safe_extension_only() {
        let name = UploadStore::file_name("project-image", Some("shot.PNG"));
        assert!(name.starts_with("project-image-"));
        assert!(name.ends_with(".png"));
        let parts: Vec<&str> = name.trim_end_matches(".png").rsplitn(3, '-').collect();
        assert!(parts[0].parse::<u32>().unwrap() < 1_000_000_000);
        assert!(parts[1].parse::<i64>().is_ok());

        let bare = UploadStore::file_name("project-image", Some("../../etc/passwd"));
        assert!(!bare.contains('/') && !bare.contains('.'));
        let weird = UploadStore::file_name("project-image", Some("x.p/hp"));
        assert!(!weird.contains('/'));
        assert!(!UploadStore::file_name("project-image", None).contains('.'));
    }

    #[tokio::test]
    async fn save_writes_under_dir_and_returns_url() {
        let dir = std::env::temp_dir().join(format!("uploads_{}", uuid::Uuid::new_v4()));
        let store = UploadStore::new(&dir);
        let stored = store.save("project-image", Some("a.jpg"), b"jpeg-bytes").await.unwrap();

        assert_eq!(stored.url, format!("/uploads/{}", stored.file_name));
        let on_disk = tokio::fs::read(dir.join(&stored.file_name)).await.unwrap();
        assert_eq!(on_disk, b"jpeg-bytes");
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let store = UploadStore::new(std::env::temp_dir());
        assert!(matches!(store.save("p", Some("a.png"), b"").await, Err(UploadError::Validation(_))));
    }
}
