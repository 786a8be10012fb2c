use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::domain::{validate_key, Document, SettingsMap};
use super::errors::{BulkUpsertError, SettingsError};
use super::repository::SettingsRepository;

/// Settings service configuration
#[derive(Clone, Debug)]
pub struct SettingsServiceConfig {
    /// Upper bound for each store operation.
    pub op_timeout: Duration,
}

impl Default for SettingsServiceConfig {
    fn default() -> Self { Self { op_timeout: Duration::from_secs(10) } }
}

impl From<&configs::SettingsConfig> for SettingsServiceConfig {
    fn from(cfg: &configs::SettingsConfig) -> Self { Self { op_timeout: cfg.op_timeout() } }
}

/// Settings business service independent of web framework and backend.
///
/// Every operation takes a [`CancellationToken`] and is bounded by
/// `op_timeout`. A write that has started is never torn: it runs in its own
/// task and commits fully even when the caller stops waiting, in which case
/// the caller gets `Cancelled` or `DeadlineExceeded`.
#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
    cfg: SettingsServiceConfig,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepository>, cfg: SettingsServiceConfig) -> Self { Self { repo, cfg } }

    pub fn config(&self) -> &SettingsServiceConfig { &self.cfg }

    /// Every stored key with its current value, as an owned snapshot.
    #[instrument(skip(self, cancel))]
    pub async fn get_all(&self, cancel: &CancellationToken) -> Result<SettingsMap, SettingsError> {
        if cancel.is_cancelled() {
            return Err(SettingsError::Cancelled);
        }
        let timeout = self.cfg.op_timeout;
        let settings = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SettingsError::Cancelled),
            res = tokio::time::timeout(timeout, self.repo.get_all()) => {
                res.map_err(|_| SettingsError::DeadlineExceeded(timeout))??
            }
        };
        debug!(count = settings.len(), "settings loaded");
        Ok(settings.into_iter().map(|s| (s.key, s.value)).collect())
    }

    /// Create or fully replace one setting; returns the persisted value.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use serde_json::json;
    /// use tokio_util::sync::CancellationToken;
    /// use service::settings::{SettingsService, SettingsServiceConfig, repository::mock::MockSettingsRepository};
    /// let repo = Arc::new(MockSettingsRepository::default());
    /// let svc = SettingsService::new(repo, SettingsServiceConfig::default());
    /// let cancel = CancellationToken::new();
    /// tokio_test::block_on(async {
    ///     svc.upsert("profile", json!({"name": "Ada"}), &cancel).await.unwrap();
    ///     svc.upsert("profile", json!({"title": "Engineer"}), &cancel).await.unwrap();
    ///     let all = svc.get_all(&cancel).await.unwrap();
    ///     assert_eq!(all["profile"], json!({"title": "Engineer"}));
    /// });
    /// ```
    #[instrument(skip(self, value, cancel))]
    pub async fn upsert(&self, key: &str, value: Document, cancel: &CancellationToken) -> Result<Document, SettingsError> {
        upsert_detached(Arc::clone(&self.repo), key.to_string(), value, self.cfg.op_timeout, cancel.clone()).await
    }

    /// Apply one upsert per entry, concurrently.
    ///
    /// On success returns the applied keys. If any entry fails, the error
    /// names every failed key; the other entries stay applied.
    #[instrument(skip(self, entries, cancel), fields(count = entries.len()))]
    pub async fn bulk_upsert(&self, entries: SettingsMap, cancel: &CancellationToken) -> Result<Vec<String>, BulkUpsertError> {
        let writes: Vec<(String, JoinHandle<Result<Document, SettingsError>>)> = entries
            .into_iter()
            .map(|(key, value)| {
                let repo = Arc::clone(&self.repo);
                let handle = tokio::spawn(upsert_detached(repo, key.clone(), value, self.cfg.op_timeout, cancel.clone()));
                (key, handle)
            })
            .collect();

        let mut applied = Vec::with_capacity(writes.len());
        let mut failed = BTreeMap::new();
        for (key, handle) in writes {
            match handle.await {
                Ok(Ok(_)) => applied.push(key),
                Ok(Err(e)) => {
                    failed.insert(key, e);
                }
                Err(join) => {
                    failed.insert(key, SettingsError::StoreUnavailable(format!("write task failed: {join}")));
                }
            }
        }

        if failed.is_empty() {
            info!(applied = applied.len(), "bulk settings update applied");
            Ok(applied)
        } else {
            let err = BulkUpsertError { applied, failed };
            error!(failed = ?err.failed_keys(), applied = err.applied.len(), "bulk settings update incomplete");
            Err(err)
        }
    }
}

/// Validate, then run the write in its own task so that dropping or
/// cancelling the caller cannot interrupt it halfway.
async fn upsert_detached(
    repo: Arc<dyn SettingsRepository>,
    key: String,
    value: Document,
    timeout: Duration,
    cancel: CancellationToken,
) -> Result<Document, SettingsError> {
    validate_key(&key)?;
    if cancel.is_cancelled() {
        return Err(SettingsError::Cancelled);
    }

    let write_key = key.clone();
    let write = tokio::spawn(async move { repo.upsert(&write_key, value).await });

    let res = tokio::select! {
        biased;
        joined = write => match joined {
            Ok(res) => res,
            Err(e) => Err(SettingsError::StoreUnavailable(format!("write task failed: {e}"))),
        },
        _ = cancel.cancelled() => {
            warn!(%key, "upsert cancelled while in flight; write will still complete");
            Err(SettingsError::Cancelled)
        }
        _ = tokio::time::sleep(timeout) => {
            warn!(%key, ?timeout, "upsert exceeded deadline; write will still complete");
            Err(SettingsError::DeadlineExceeded(timeout))
        }
    };

    match &res {
        Ok(_) => info!(%key, event = "setting_upserted", "setting stored"),
        Err(e) => error!(%key, code = e.code(), error = %e, "setting upsert failed"),
    }
    res
}
