use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub uploads: UploadsConfig,
    #[serde(default)]
    pub migration: MigrationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".into(), port: 10000, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }

/// Which persistence medium backs the settings store.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    File,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "file" | "json" => Ok(Self::File),
            other => Err(anyhow!("unknown storage backend `{other}` (expected postgres or file)")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Only read by the file backend.
    #[serde(default = "default_settings_file")]
    pub settings_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: StorageBackend::default(), settings_file: default_settings_file() }
    }
}

fn default_settings_file() -> String { "data/settings.json".into() }

#[derive(Debug, Clone, Deserialize)]
pub struct SettingsConfig {
    /// Upper bound for a single store operation.
    #[serde(default = "default_op_timeout")]
    pub op_timeout_secs: u64,
}

impl Default for SettingsConfig {
    fn default() -> Self { Self { op_timeout_secs: default_op_timeout() } }
}

fn default_op_timeout() -> u64 { 10 }

impl SettingsConfig {
    pub fn op_timeout(&self) -> Duration { Duration::from_secs(self.op_timeout_secs) }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadsConfig {
    #[serde(default = "default_uploads_dir")]
    pub dir: String,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl Default for UploadsConfig {
    fn default() -> Self { Self { dir: default_uploads_dir(), body_limit_bytes: default_body_limit() } }
}

fn default_uploads_dir() -> String { "uploads".into() }
fn default_body_limit() -> usize { 500 * 1024 * 1024 }

#[derive(Debug, Clone, Deserialize)]
pub struct MigrationConfig {
    #[serde(default = "default_migration_source")]
    pub source_path: String,
}

impl Default for MigrationConfig {
    fn default() -> Self { Self { source_path: default_migration_source() } }
}

fn default_migration_source() -> String { "backend/data/dynamicData.json".into() }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

fn is_missing_file(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

impl AppConfig {
    /// Load `CONFIG_PATH` (default `config.toml`), then apply the environment.
    pub fn load_or_env() -> Result<Self> {
        Self::load_or_env_from(&config_path())
    }

    /// Only a missing file falls back to defaults; a file that exists but
    /// cannot be read or parsed is an error.
    pub fn load_or_env_from(path: &str) -> Result<Self> {
        let mut cfg = match load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) if is_missing_file(&e) => AppConfig::default(),
            Err(e) => return Err(e.context(format!("invalid config file {path}"))),
        };
        cfg.apply_env();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Environment variables take precedence over values from the file.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("PORT")
            .or_else(|_| std::env::var("SERVER_PORT"))
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Some(backend) = std::env::var("STORAGE_BACKEND").ok().and_then(|b| b.parse().ok()) {
            self.storage.backend = backend;
        }
        if let Ok(file) = std::env::var("SETTINGS_FILE") {
            self.storage.settings_file = file;
        }
        if let Some(secs) = std::env::var("SETTINGS_OP_TIMEOUT_SECS").ok().and_then(|s| s.parse().ok()) {
            self.settings.op_timeout_secs = secs;
        }
        if let Ok(dir) = std::env::var("UPLOADS_DIR") {
            self.uploads.dir = dir;
        }
        if let Some(limit) = std::env::var("BODY_LIMIT_BYTES").ok().and_then(|s| s.parse().ok()) {
            self.uploads.body_limit_bytes = limit;
        }
        if let Ok(source) = std::env::var("MIGRATION_SOURCE") {
            self.migration.source_path = source;
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize_from_env();
        if self.storage.backend == StorageBackend::Postgres {
            self.database.validate()?;
        } else if self.storage.settings_file.trim().is_empty() {
            return Err(anyhow!("storage.settings_file is required for the file backend"));
        }
        if self.settings.op_timeout_secs == 0 {
            return Err(anyhow!("settings.op_timeout_secs must be > 0"));
        }
        if self.uploads.dir.trim().is_empty() {
            return Err(anyhow!("uploads.dir must not be empty"));
        }
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "0.0.0.0".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String { format!("{}:{}", self.host, self.port) }
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.normalize_from_env();
        cfg
    }

    pub fn from_file() -> Result<Self> {
        Ok(load_default()?.database)
    }

    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_toml() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8081

            [database]
            url = "postgres://u:p@localhost/portfolio"

            [storage]
            backend = "file"
            settings_file = "tmp/settings.json"

            [settings]
            op_timeout_secs = 3

            [uploads]
            dir = "tmp/uploads"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 8081);
        assert_eq!(cfg.storage.backend, StorageBackend::File);
        assert_eq!(cfg.settings.op_timeout(), Duration::from_secs(3));
        assert_eq!(cfg.uploads.body_limit_bytes, 500 * 1024 * 1024);
        assert_eq!(cfg.migration.source_path, "backend/data/dynamicData.json");
        assert_eq!(cfg.database.max_connections, 10);
    }

    #[test]
    fn file_backend_does_not_require_database_url() {
        let mut cfg = AppConfig::default();
        cfg.storage.backend = StorageBackend::File;
        cfg.database.url = String::new();
        // DATABASE_URL may be set in the environment; the file backend ignores it either way.
        assert!(cfg.normalize_and_validate().is_ok());
    }

    #[test]
    fn postgres_backend_rejects_foreign_scheme() {
        let mut cfg = AppConfig::default();
        cfg.database.url = "mysql://localhost/db".into();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut cfg = AppConfig::default();
        cfg.storage.backend = StorageBackend::File;
        cfg.settings.op_timeout_secs = 0;
        assert!(cfg.normalize_and_validate().is_err());
    }

    fn tmp_config(content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "config_{}_{}.toml",
            std::process::id(),
            std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or_default()
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn malformed_config_file_is_an_error() {
        let path = tmp_config(
            r#"
            [storage]
            backend = "file"
            settings_file = "custom/store.json"

            [server]
            port = "not-a-number"
            "#,
        );
        let res = AppConfig::load_or_env_from(path.to_str().unwrap());
        let _ = std::fs::remove_file(&path);
        let err = res.unwrap_err();
        assert!(err.to_string().contains("invalid config file"), "{err:#}");
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("no_such_dir_for_config").join("config.toml");
        assert!(is_missing_file(&load_from_file(path.to_str().unwrap()).unwrap_err()));
    }

    #[test]
    fn storage_backend_from_str() {
        assert_eq!("Postgres".parse::<StorageBackend>().unwrap(), StorageBackend::Postgres);
        assert_eq!("json".parse::<StorageBackend>().unwrap(), StorageBackend::File);
        assert!("mongo".parse::<StorageBackend>().is_err());
    }
}
