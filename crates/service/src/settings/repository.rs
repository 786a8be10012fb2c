use async_trait::async_trait;

use super::domain::{Document, Setting};
use super::errors::SettingsError;

/// Computes a key's next value from its current one, if any.
pub type UpdateFn = Box<dyn FnOnce(Option<Document>) -> Result<Document, SettingsError> + Send>;

/// Repository abstraction over the persistence medium holding settings.
///
/// Implementations own the medium exclusively and must make each `upsert`
/// atomic for its key: readers see either the previous value or the new one.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Every stored setting. An empty store yields an empty vector.
    async fn get_all(&self) -> Result<Vec<Setting>, SettingsError>;

    /// Create or fully replace the value under `key`; returns the stored value.
    async fn upsert(&self, key: &str, value: Document) -> Result<Document, SettingsError>;

    /// Read-modify-write of one key, atomic with respect to every other write
    /// through this repository. An error from `f` leaves the key untouched.
    async fn update(&self, key: &str, f: UpdateFn) -> Result<Document, SettingsError>;
}

/// In-memory mock repository for tests and doc examples, with fault injection.
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, HashSet};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    pub struct MockSettingsRepository {
        entries: Mutex<BTreeMap<String, Document>>,
        unavailable_keys: Mutex<HashSet<String>>,
        offline: AtomicBool,
        upsert_delay: Mutex<Option<Duration>>,
        get_all_delay: Mutex<Option<Duration>>,
        upsert_calls: AtomicUsize,
    }

    fn poisoned<T>(_: T) -> SettingsError {
        SettingsError::StoreUnavailable("mock lock poisoned".into())
    }

    impl MockSettingsRepository {
        /// Make every upsert of `key` fail with `StoreUnavailable`.
        pub fn fail_key(&self, key: &str) {
            if let Ok(mut keys) = self.unavailable_keys.lock() {
                keys.insert(key.to_string());
            }
        }

        /// Make every operation fail with `StoreUnavailable`.
        pub fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        /// Sleep this long inside each upsert before committing.
        pub fn set_upsert_delay(&self, delay: Duration) {
            if let Ok(mut d) = self.upsert_delay.lock() {
                *d = Some(delay);
            }
        }

        /// Sleep this long inside each `get_all` before reading.
        pub fn set_get_all_delay(&self, delay: Duration) {
            if let Ok(mut d) = self.get_all_delay.lock() {
                *d = Some(delay);
            }
        }

        /// Number of upserts that reached the repository.
        pub fn upsert_calls(&self) -> usize {
            self.upsert_calls.load(Ordering::SeqCst)
        }

        pub fn snapshot(&self) -> BTreeMap<String, Document> {
            self.entries.lock().map(|e| e.clone()).unwrap_or_default()
        }

        fn check_online(&self) -> Result<(), SettingsError> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(SettingsError::StoreUnavailable("mock store offline".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl SettingsRepository for MockSettingsRepository {
        async fn get_all(&self) -> Result<Vec<Setting>, SettingsError> {
            self.check_online()?;
            let delay = *self.get_all_delay.lock().map_err(poisoned)?;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let entries = self.entries.lock().map_err(poisoned)?;
            Ok(entries.iter().map(|(k, v)| Setting::new(k.clone(), v.clone())).collect())
        }

        async fn upsert(&self, key: &str, value: Document) -> Result<Document, SettingsError> {
            self.upsert_calls.fetch_add(1, Ordering::SeqCst);
            self.check_online()?;
            if self.unavailable_keys.lock().map_err(poisoned)?.contains(key) {
                return Err(SettingsError::StoreUnavailable(format!("injected failure for `{key}`")));
            }
            let delay = *self.upsert_delay.lock().map_err(poisoned)?;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let mut entries = self.entries.lock().map_err(poisoned)?;
            entries.insert(key.to_string(), value.clone());
            Ok(value)
        }

        async fn update(&self, key: &str, f: UpdateFn) -> Result<Document, SettingsError> {
            self.check_online()?;
            let mut entries = self.entries.lock().map_err(poisoned)?;
            let next = f(entries.get(key).cloned())?;
            entries.insert(key.to_string(), next.clone());
            Ok(next)
        }
    }
}
