use std::collections::BTreeMap;
use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::errors::MigrationError;
use super::source::{self, LoadedDocument, SourceOrigin};
use crate::settings::{SettingsError, SettingsService};

/// Progress of a single loader run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationPhase {
    Idle,
    Loading,
    FallbackLoading,
    Migrating { key: String, index: usize, total: usize },
    Done,
    PartialFailure,
}

/// Per-key outcome of a run.
#[derive(Debug, Clone)]
pub struct MigrationReport {
    pub origin: SourceOrigin,
    pub migrated: Vec<String>,
    pub failed: BTreeMap<String, SettingsError>,
}

impl MigrationReport {
    pub fn is_success(&self) -> bool { self.failed.is_empty() }

    pub fn failed_keys(&self) -> Vec<String> { self.failed.keys().cloned().collect() }

    /// `PartialFailure` naming every failed key, or the report itself.
    pub fn into_result(self) -> Result<Self, MigrationError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(MigrationError::PartialFailure { failed_keys: self.failed_keys() })
        }
    }
}

/// Best-effort bulk migration: every key is attempted, failures are
/// collected and reported once at the end. Nothing is retried or rolled
/// back; upserts are idempotent, so re-running is safe.
pub struct MigrationLoader {
    settings: SettingsService,
    phase: MigrationPhase,
}

impl MigrationLoader {
    pub fn new(settings: SettingsService) -> Self {
        Self { settings, phase: MigrationPhase::Idle }
    }

    pub fn phase(&self) -> &MigrationPhase { &self.phase }

    fn enter(&mut self, phase: MigrationPhase) {
        info!(from = ?self.phase, to = ?phase, "migration phase");
        self.phase = phase;
    }

    /// Read `source_path`, falling back to the embedded default when it is
    /// missing or malformed. The fallback is logged, never returned.
    pub async fn load(&mut self, source_path: Option<&Path>) -> Result<LoadedDocument, MigrationError> {
        self.enter(MigrationPhase::Loading);
        if let Some(path) = source_path {
            match source::read_file(path).await {
                Ok(sections) => {
                    info!(path = %path.display(), sections = sections.len(), "migration source loaded");
                    return Ok(LoadedDocument { origin: SourceOrigin::File(path.to_path_buf()), sections });
                }
                Err(e) => warn!(error = %e, "could not read migration source, using embedded default"),
            }
        }
        self.enter(MigrationPhase::FallbackLoading);
        let sections = source::embedded_default()?;
        Ok(LoadedDocument { origin: SourceOrigin::EmbeddedDefault, sections })
    }

    /// Load the document and upsert each top-level field as one key.
    ///
    /// Returns `Err` only when no document could be loaded at all; per-key
    /// failures land in the report.
    pub async fn run(&mut self, source_path: Option<&Path>, cancel: &CancellationToken) -> Result<MigrationReport, MigrationError> {
        let LoadedDocument { origin, sections } = self.load(source_path).await?;

        let total = sections.len();
        let mut migrated = Vec::with_capacity(total);
        let mut failed = BTreeMap::new();
        for (index, (key, value)) in sections.into_iter().enumerate() {
            self.enter(MigrationPhase::Migrating { key: key.clone(), index, total });
            match self.settings.upsert(&key, value, cancel).await {
                Ok(_) => {
                    info!(%key, "migrated key");
                    migrated.push(key);
                }
                Err(e) => {
                    error!(%key, error = %e, "failed to migrate key");
                    failed.insert(key, e);
                }
            }
        }

        let report = MigrationReport { origin, migrated, failed };
        if report.is_success() {
            self.enter(MigrationPhase::Done);
            info!(migrated = report.migrated.len(), "data migration completed");
        } else {
            self.enter(MigrationPhase::PartialFailure);
            error!(failed = ?report.failed_keys(), migrated = report.migrated.len(), "data migration incomplete");
        }
        Ok(report)
    }
}
